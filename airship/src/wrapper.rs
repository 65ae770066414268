//! Environment-aware wrapper hosts apply around each guest element.

use std::sync::{Arc, Mutex};

use airship_core::layout::LayoutSnapshot;
use airship_core::platform::{safe_area_insets, EventSubscription, Platform};
use airship_core::sides::Sides;

use crate::barometer::Barometer;
use crate::keyboard::{KeyboardMonitor, KeyboardTracker, UpValue};

/// Recognized host container options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostOptions {
    /// Keep padding above the keyboard even on platforms whose window
    /// already resizes when the keyboard opens. Off by default: those
    /// platforms handle it natively.
    pub avoid_native_keyboard: bool,
    /// Add the status-bar height to the top padding when the status bar
    /// draws over content.
    pub status_bar_translucent: bool,
}

/// Offset and padding a host applies around one guest element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WrapperFrame {
    pub offset: Sides,
    pub padding: Sides,
}

/// Consults the environment tracker and the keyboard coordinator to
/// place a guest: offset expands the container to the true window edges,
/// padding keeps content clear of chrome and keyboard. The bottom
/// padding is the tracker's animated value, so guests ride the keyboard
/// instead of jumping over it.
pub struct Wrapper {
    platform: Arc<dyn Platform>,
    options: HostOptions,
    tracker: KeyboardTracker,
    layout: Arc<Mutex<LayoutSnapshot>>,
    _layout_subscription: EventSubscription,
}

impl Wrapper {
    pub(crate) fn new(
        platform: Arc<dyn Platform>,
        barometer: &Barometer,
        keyboard: &KeyboardMonitor,
        options: HostOptions,
    ) -> Self {
        let insets = safe_area_insets(platform.as_ref());
        let down = insets.bottom;
        let tracker = keyboard.tracker(down, UpValue::Map(Arc::new(move |height| height.max(down))));

        let layout = Arc::new(Mutex::new(barometer.current().unwrap_or_default()));
        let subscription = {
            let layout = Arc::clone(&layout);
            barometer.subscribe(move |snapshot| {
                *layout.lock().unwrap_or_else(|e| e.into_inner()) = snapshot;
            })
        };

        Self {
            platform,
            options,
            tracker,
            layout,
            _layout_subscription: subscription,
        }
    }

    pub fn options(&self) -> HostOptions {
        self.options
    }

    /// The keyboard consumer driving this wrapper's bottom padding.
    pub fn tracker(&self) -> &KeyboardTracker {
        &self.tracker
    }

    /// Current placement for guest elements.
    pub fn frame(&self) -> WrapperFrame {
        let caps = self.platform.capabilities();
        let insets = safe_area_insets(self.platform.as_ref());
        let snapshot = *self.layout.lock().unwrap_or_else(|e| e.into_inner());

        // Insets change on rotation; keep the tracker aimed at them.
        let down = insets.bottom;
        self.tracker
            .set_range(down, UpValue::Map(Arc::new(move |height| height.max(down))));

        let mut padding = snapshot.padding;
        if self.options.status_bar_translucent && caps.status_bar_height > 0.0 {
            padding.top += caps.status_bar_height;
        }
        let native_resize = caps.window_resizes_for_keyboard && !self.options.avoid_native_keyboard;
        padding.bottom = if native_resize {
            // The window itself shrinks for the keyboard; only the
            // safe-area inset remains ours to reserve.
            insets.bottom
        } else {
            self.tracker.value()
        };

        WrapperFrame {
            offset: snapshot.offset,
            padding,
        }
    }
}
