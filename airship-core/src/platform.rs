//! External collaborators, expressed as traits.
//!
//! The engine consumes four narrow capabilities: asynchronous view
//! measurement, safe-area insets, keyboard events, and animated scalar
//! values. A platform adapter implements [`Platform`] to supply all of
//! them; the [`crate::sim`] module ships a scriptable implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::geometry::{RectF, SizeF};
use crate::sides::Sides;

/// Error from an asynchronous view measurement.
///
/// Measurement failures are recoverable by design: the caller discards
/// the whole measurement cycle and keeps its previous result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MeasureError {
    #[error("view is no longer mounted")]
    Unmounted,
    #[error("platform measurement failed: {0}")]
    Platform(String),
}

/// An invisible, full-bleed reference view mounted by the environment
/// tracker. Its geometry is governed only by window edges, never by
/// keyboard-avoiding chrome, so measuring it reveals the real insets.
#[async_trait]
pub trait ProbeView: Send + Sync {
    /// Bounding box in window coordinates.
    async fn frame_in_window(&self) -> Result<RectF, MeasureError>;

    /// Bounding box of the safe-area child in window coordinates.
    ///
    /// Platforms without distinct safe-area geometry return the same
    /// frame as [`Self::frame_in_window`].
    async fn safe_frame_in_window(&self) -> Result<RectF, MeasureError>;

    /// Bounding box in physical screen coordinates. The gap below this
    /// frame is where the keyboard would intrude.
    async fn frame_on_screen(&self) -> Result<RectF, MeasureError>;
}

/// Behavior flags a platform reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlatformCaps {
    /// The window already resizes when the keyboard opens, so overlays
    /// normally need no extra bottom padding for it.
    pub window_resizes_for_keyboard: bool,
    /// Height of a status bar that draws over content, or 0.
    pub status_bar_height: f32,
    /// Keyboard visibility arrives as discrete did-show/did-hide events
    /// with no animation timing.
    pub discrete_keyboard_events: bool,
}

/// One notification from the keyboard event source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyboardEvent {
    WillShow {
        /// Top edge of the keyboard frame, in screen coordinates.
        frame_top: f32,
        height: f32,
        duration: Duration,
    },
    DidShow {
        frame_top: f32,
        height: f32,
    },
    WillHide {
        duration: Duration,
    },
    DidHide,
    /// Unified notification for platforms whose show/hide events are
    /// unreliable mid-transition. A frame at or below the screen bottom
    /// means the keyboard is going away.
    FrameWillChange {
        frame_top: f32,
        height: f32,
        duration: Duration,
    },
}

impl KeyboardEvent {
    /// Keyboard height implied by this event on a screen of the given
    /// size, or `None` when the event carries no height.
    ///
    /// The reported frame and the reported height disagree on some
    /// platforms; the smaller answer is the right one.
    pub fn effective_height(&self, screen: SizeF) -> Option<f32> {
        match *self {
            KeyboardEvent::WillShow {
                frame_top, height, ..
            }
            | KeyboardEvent::DidShow { frame_top, height }
            | KeyboardEvent::FrameWillChange {
                frame_top, height, ..
            } => Some((screen.height - frame_top).min(height).max(0.0)),
            KeyboardEvent::WillHide { .. } => None,
            KeyboardEvent::DidHide => Some(0.0),
        }
    }

    /// Animation timing carried by this event, or zero for discrete
    /// notifications.
    pub fn duration(&self) -> Duration {
        match *self {
            KeyboardEvent::WillShow { duration, .. }
            | KeyboardEvent::WillHide { duration }
            | KeyboardEvent::FrameWillChange { duration, .. } => duration,
            KeyboardEvent::DidShow { .. } | KeyboardEvent::DidHide => Duration::ZERO,
        }
    }
}

/// A mutable scalar that can jump or transition over a duration, bound
/// to rendered output by the platform.
pub trait AnimatedScalar: Send + Sync {
    /// Jump to a value with no animation.
    fn set(&self, value: f32);

    /// Transition to a value over the given duration.
    fn animate_to(&self, value: f32, duration: Duration);

    /// Current target value.
    fn value(&self) -> f32;
}

/// Window edge, for safe-area inset queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

pub type KeyboardListener = Arc<dyn Fn(&KeyboardEvent) + Send + Sync>;
pub type LayoutListener = Arc<dyn Fn() + Send + Sync>;

/// RAII unsubscribe handle. Dropping it detaches the listener, so a
/// consumer that registers on creation always unregisters on disposal,
/// error paths included.
pub struct EventSubscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl EventSubscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Detach now instead of waiting for drop.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for EventSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription").finish_non_exhaustive()
    }
}

/// Everything the engine needs from the platform underneath it.
pub trait Platform: Send + Sync {
    fn window_size(&self) -> SizeF;

    fn screen_size(&self) -> SizeF;

    fn capabilities(&self) -> PlatformCaps;

    /// Mount the invisible reference view used for measurement.
    fn mount_probe(&self) -> Arc<dyn ProbeView>;

    /// Current safe-area inset for one edge. Platforms without notches
    /// return 0.
    fn safe_area_inset(&self, edge: Edge, landscape: bool) -> f32;

    fn subscribe_keyboard(&self, listener: KeyboardListener) -> EventSubscription;

    /// Layout-affecting events other than the keyboard: initial mount,
    /// rotation, window resize.
    fn subscribe_layout(&self, listener: LayoutListener) -> EventSubscription;

    fn animated_scalar(&self, initial: f32) -> Arc<dyn AnimatedScalar>;
}

/// Current safe-area insets on all four edges, with orientation derived
/// from the window size.
pub fn safe_area_insets(platform: &dyn Platform) -> Sides {
    let size = platform.window_size();
    let landscape = size.height < size.width;
    Sides::new(
        platform.safe_area_inset(Edge::Top, landscape),
        platform.safe_area_inset(Edge::Right, landscape),
        platform.safe_area_inset(Edge::Bottom, landscape),
        platform.safe_area_inset(Edge::Left, landscape),
    )
}
