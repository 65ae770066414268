//! Semi-transparent message overlay that fades in, lingers, fades out.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;

use airship_core::platform::{AnimatedScalar, Platform};
use airship_core::sides::Sides;

use super::Color;
use crate::bridge::{AirshipBridge, BridgeEvent};

const TEXT_SIZE: f32 = 14.0;

/// Options for [`Toast::attach`].
#[derive(Debug, Clone)]
pub struct ToastConfig {
    /// Message shown inside the toast, before any other content.
    pub message: Option<String>,
    /// How long the toast stays visible, or `None` to disable auto-hide.
    pub auto_hide: Option<Duration>,
    pub fade_in: Duration,
    pub fade_out: Duration,
    /// Minimum gap between the toast and the screen edges.
    pub margin: Sides,
    pub padding: Sides,
    pub max_width: f32,
    /// Opacity the toast fades up to.
    pub opacity: f32,
    pub background: Color,
    pub text_color: Color,
    pub border_radius: f32,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            message: None,
            auto_hide: Some(Duration::from_secs(3)),
            fade_in: Duration::from_millis(300),
            fade_out: Duration::from_millis(1000),
            margin: Sides::from(2.0 * TEXT_SIZE),
            padding: Sides::from(TEXT_SIZE),
            max_width: 512.0,
            opacity: 0.9,
            background: Color::WHITE,
            text_color: Color::BLACK,
            border_radius: 1.5 * TEXT_SIZE,
        }
    }
}

impl ToastConfig {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

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

/// Lifecycle controller for a toast guest.
pub struct Toast {
    opacity: Arc<dyn AnimatedScalar>,
}

impl Toast {
    /// Wire the toast lifecycle onto a bridge: fade in, start the
    /// auto-hide timer, resolve on expiry, and on settlement fade out
    /// and remove. A global clear resolves immediately.
    pub fn attach(bridge: &AirshipBridge<()>, platform: &Arc<dyn Platform>, config: ToastConfig) -> Self {
        let handle = Handle::current();

        let opacity = platform.animated_scalar(0.0);
        opacity.animate_to(config.opacity, config.fade_in);

        // The timer only starts counting once the toast is fully in.
        let timer = config.auto_hide.map(|delay| {
            let bridge = bridge.clone();
            let lead = config.fade_in;
            handle.spawn(async move {
                sleep(lead + delay).await;
                bridge.resolve(());
            })
        });

        {
            let exit = bridge.clone();
            let opacity = Arc::clone(&opacity);
            let fade_out = config.fade_out;
            let handle = handle.clone();
            let mut timer = timer;
            let _ = bridge.on_result(move || {
                if let Some(timer) = timer.take() {
                    timer.abort();
                }
                opacity.animate_to(0.0, fade_out);
                let exit = exit.clone();
                handle.spawn(async move {
                    sleep(fade_out).await;
                    exit.remove();
                });
            });
        }

        {
            let dismiss = bridge.clone();
            let _ = bridge.on(BridgeEvent::Clear, move || dismiss.resolve(()));
        }

        Self { opacity }
    }

    /// Current opacity, for binding to rendered output.
    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }
}
