//! Modal that slides up from the bottom (or floats centered) and dims
//! the rest of the app.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;

use airship_core::platform::{AnimatedScalar, Platform};
use airship_core::sides::Sides;

use super::Color;
use crate::bridge::{AirshipBridge, BridgeEvent};

/// Where the modal body sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPlacement {
    /// Anchored to the bottom edge.
    #[default]
    Bottom,
    /// Floating in the center of the screen.
    Center,
}

/// Options for [`Modal::attach`].
#[derive(Debug, Clone)]
pub struct ModalConfig {
    pub placement: ModalPlacement,
    pub background: Color,
    pub border_radius: f32,
    /// Minimum gap between the modal and the screen edges.
    pub margin: Sides,
    pub padding: Sides,
    pub max_width: f32,
    pub max_height: Option<f32>,
    pub slide_in: Duration,
    pub slide_out: Duration,
    /// Color of the window underlay behind the modal.
    pub underlay: Color,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            placement: ModalPlacement::Bottom,
            background: Color::WHITE,
            border_radius: 10.0,
            margin: Sides::ZERO,
            padding: Sides::ZERO,
            max_width: 512.0,
            max_height: None,
            slide_in: Duration::from_millis(300),
            slide_out: Duration::from_millis(300),
            underlay: Color::UNDERLAY,
        }
    }
}

impl ModalConfig {
    pub fn centered(mut self) -> Self {
        self.placement = ModalPlacement::Center;
        self
    }

    /// 0-4 values, web `margin` shorthand.
    pub fn margin(mut self, values: &[f32]) -> Self {
        self.margin = Sides::unpack(values);
        self
    }

    /// 0-4 values, web `padding` shorthand.
    pub fn padding(mut self, values: &[f32]) -> Self {
        self.padding = Sides::unpack(values);
        self
    }
}

/// Lifecycle controller for a modal guest.
pub struct Modal {
    offset: Arc<dyn AnimatedScalar>,
    underlay_opacity: Arc<dyn AnimatedScalar>,
    cancel: Arc<dyn Fn() + Send + Sync>,
}

impl Modal {
    /// Wire the modal lifecycle onto a bridge. `on_cancel` runs when the
    /// user dismisses the modal (underlay tap, back action) and when a
    /// global clear arrives; it normally resolves the bridge with a
    /// cancellation value. Settlement slides the modal out, fades the
    /// underlay, and removes the guest.
    pub fn attach<T: Send + 'static>(
        bridge: &AirshipBridge<T>,
        platform: &Arc<dyn Platform>,
        config: ModalConfig,
        on_cancel: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let handle = Handle::current();
        let cancel: Arc<dyn Fn() + Send + Sync> = Arc::new(on_cancel);

        // Enter: slide up from below the window, fade the underlay in.
        let start_offset = platform.window_size().height;
        let offset = platform.animated_scalar(start_offset);
        let underlay_opacity = platform.animated_scalar(0.0);
        offset.animate_to(0.0, config.slide_in);
        underlay_opacity.animate_to(1.0, config.slide_in);

        {
            let cancel = Arc::clone(&cancel);
            let _ = bridge.on(BridgeEvent::Clear, move || cancel());
        }

        {
            let exit = bridge.clone();
            let offset = Arc::clone(&offset);
            let underlay_opacity = Arc::clone(&underlay_opacity);
            let slide_out = config.slide_out;
            let _ = bridge.on_result(move || {
                offset.animate_to(start_offset, slide_out);
                underlay_opacity.animate_to(0.0, slide_out);
                let exit = exit.clone();
                handle.spawn(async move {
                    sleep(slide_out).await;
                    exit.remove();
                });
            });
        }

        Self {
            offset,
            underlay_opacity,
            cancel,
        }
    }

    /// Route a user dismissal (underlay tap, back action) through the
    /// cancel handler.
    pub fn cancel(&self) {
        (self.cancel)();
    }

    /// Current slide offset, 0 when fully shown.
    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    /// Current underlay opacity.
    pub fn underlay_opacity(&self) -> f32 {
        self.underlay_opacity.value()
    }
}
