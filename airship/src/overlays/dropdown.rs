//! Notification that slides down from the top of the screen.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;

use airship_core::platform::{AnimatedScalar, Platform};
use airship_core::sides::Sides;

use super::Color;
use crate::bridge::{AirshipBridge, BridgeEvent};

/// Options for [`Dropdown::attach`].
#[derive(Debug, Clone)]
pub struct DropdownConfig {
    /// How long the dropdown stays visible, or `None` to disable
    /// auto-hide.
    pub auto_hide: Option<Duration>,
    pub slide_in: Duration,
    pub slide_out: Duration,
    pub margin: Sides,
    pub padding: Sides,
    /// Defaults to 25% of the longest screen dimension when `None`.
    pub max_height: Option<f32>,
    pub max_width: f32,
    pub background: Color,
    /// Radius on the bottom corners.
    pub border_radius: f32,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            auto_hide: Some(Duration::from_secs(5)),
            slide_in: Duration::from_millis(300),
            slide_out: Duration::from_millis(500),
            margin: Sides::ZERO,
            padding: Sides::ZERO,
            max_height: None,
            max_width: 512.0,
            background: Color::WHITE,
            border_radius: 4.0,
        }
    }
}

impl DropdownConfig {
    pub fn auto_hide(mut self, delay: Option<Duration>) -> Self {
        self.auto_hide = delay;
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

/// Lifecycle controller for a dropdown guest.
///
/// A tap anywhere in the dropdown body should resolve the bridge; the
/// application routes its own press events there.
pub struct Dropdown {
    offset: Arc<dyn AnimatedScalar>,
    hidden_offset: f32,
}

impl Dropdown {
    /// Wire the dropdown lifecycle onto a bridge: slide in from above
    /// the top edge, auto-hide after the configured delay, and on
    /// settlement slide back out and remove. A global clear resolves
    /// immediately.
    pub fn attach(
        bridge: &AirshipBridge<()>,
        platform: &Arc<dyn Platform>,
        config: DropdownConfig,
    ) -> Self {
        let handle = Handle::current();

        let max_height = config.max_height.unwrap_or_else(|| {
            let screen = platform.screen_size();
            0.25 * screen.width.max(screen.height)
        });
        let hidden_offset = -(max_height + config.margin.bottom);

        let offset = platform.animated_scalar(hidden_offset);
        offset.animate_to(0.0, config.slide_in);

        let timer = config.auto_hide.map(|delay| {
            let bridge = bridge.clone();
            let lead = config.slide_in;
            handle.spawn(async move {
                sleep(lead + delay).await;
                bridge.resolve(());
            })
        });

        {
            let exit = bridge.clone();
            let offset = Arc::clone(&offset);
            let slide_out = config.slide_out;
            let handle = handle.clone();
            let mut timer = timer;
            let _ = bridge.on_result(move || {
                if let Some(timer) = timer.take() {
                    timer.abort();
                }
                offset.animate_to(hidden_offset, slide_out);
                let exit = exit.clone();
                handle.spawn(async move {
                    sleep(slide_out).await;
                    exit.remove();
                });
            });
        }

        {
            let dismiss = bridge.clone();
            let _ = bridge.on(BridgeEvent::Clear, move || dismiss.resolve(()));
        }

        Self {
            offset,
            hidden_offset,
        }
    }

    /// Current vertical offset, 0 when fully shown.
    pub fn offset(&self) -> f32 {
        self.offset.value()
    }

    /// Offset at which the dropdown is fully off-screen.
    pub fn hidden_offset(&self) -> f32 {
        self.hidden_offset
    }
}
