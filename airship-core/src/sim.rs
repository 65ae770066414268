//! Scriptable platform for tests, examples, and demos.
//!
//! `SimPlatform` plays the role of the real device: tests set window and
//! probe geometry, raise and lower a pretend keyboard, and trigger layout
//! events, then observe what the engine publishes. `SimScalar` records
//! every transition so a test can tell an animated move from a snap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::trace;

use crate::geometry::{RectF, SizeF};
use crate::platform::{
    AnimatedScalar, Edge, EventSubscription, KeyboardEvent, KeyboardListener, LayoutListener,
    MeasureError, Platform, PlatformCaps, ProbeView,
};
use crate::sides::Sides;

/// One recorded change of a [`SimScalar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTransition {
    pub to: f32,
    pub duration: Duration,
}

/// An [`AnimatedScalar`] that completes instantly and keeps a history of
/// every `set`/`animate_to` call.
#[derive(Debug, Default)]
pub struct SimScalar {
    value: Mutex<f32>,
    transitions: Mutex<Vec<SimTransition>>,
}

impl SimScalar {
    pub fn new(initial: f32) -> Self {
        Self {
            value: Mutex::new(initial),
            transitions: Mutex::new(Vec::new()),
        }
    }

    pub fn transitions(&self) -> Vec<SimTransition> {
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_transition(&self) -> Option<SimTransition> {
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .copied()
    }
}

impl AnimatedScalar for SimScalar {
    fn set(&self, value: f32) {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = value;
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SimTransition {
                to: value,
                duration: Duration::ZERO,
            });
    }

    fn animate_to(&self, value: f32, duration: Duration) {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = value;
        self.transitions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SimTransition {
                to: value,
                duration,
            });
    }

    fn value(&self) -> f32 {
        *self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct SimState {
    window: SizeF,
    screen: SizeF,
    caps: PlatformCaps,
    safe_insets: Sides,
    probe_window: RectF,
    probe_safe: RectF,
    probe_screen: RectF,
    probe_fail: bool,
    probe_override: Option<Arc<dyn ProbeView>>,
}

struct SimInner {
    state: Mutex<SimState>,
    keyboard: Mutex<Vec<(u64, KeyboardListener)>>,
    layout: Mutex<Vec<(u64, LayoutListener)>>,
    scalars: Mutex<Vec<Arc<SimScalar>>>,
    next_listener: AtomicU64,
}

/// A platform whose every input is scripted by the test.
#[derive(Clone)]
pub struct SimPlatform {
    inner: Arc<SimInner>,
}

impl SimPlatform {
    /// A plain portrait device: no notch, no status bar overlay, window
    /// and screen identical.
    pub fn new() -> Self {
        let window = SizeF::new(375.0, 812.0);
        Self::with_geometry(window, window)
    }

    /// A notched portrait phone: 44pt top inset, 34pt home indicator.
    pub fn phone() -> Self {
        let sim = Self::new();
        sim.set_safe_insets(Sides::new(44.0, 0.0, 34.0, 0.0));
        sim
    }

    pub fn with_geometry(window: SizeF, screen: SizeF) -> Self {
        Self {
            inner: Arc::new(SimInner {
                state: Mutex::new(SimState {
                    window,
                    screen,
                    caps: PlatformCaps::default(),
                    safe_insets: Sides::ZERO,
                    probe_window: RectF::full(window),
                    probe_safe: RectF::full(window),
                    probe_screen: RectF::full(screen),
                    probe_fail: false,
                    probe_override: None,
                }),
                keyboard: Mutex::new(Vec::new()),
                layout: Mutex::new(Vec::new()),
                scalars: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_window_size(&self, window: SizeF) {
        self.state().window = window;
    }

    pub fn set_screen_size(&self, screen: SizeF) {
        self.state().screen = screen;
    }

    pub fn set_caps(&self, caps: PlatformCaps) {
        self.state().caps = caps;
    }

    pub fn set_safe_insets(&self, insets: Sides) {
        self.state().safe_insets = insets;
    }

    /// Script the three probe measurements directly.
    pub fn set_probe_frames(&self, window: RectF, safe: RectF, screen: RectF) {
        let mut state = self.state();
        state.probe_window = window;
        state.probe_safe = safe;
        state.probe_screen = screen;
    }

    /// Make every measurement fail until turned off again.
    pub fn fail_measurements(&self, fail: bool) {
        self.state().probe_fail = fail;
    }

    /// Replace the probe the next `mount_probe` call returns. Lets a
    /// test interpose its own measurement behavior (delays, gates).
    pub fn set_probe(&self, probe: Arc<dyn ProbeView>) {
        self.state().probe_override = Some(probe);
    }

    /// Scalars handed out so far, oldest first.
    pub fn scalars(&self) -> Vec<Arc<SimScalar>> {
        self.inner
            .scalars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Deliver a raw keyboard event to every subscriber.
    pub fn emit_keyboard(&self, event: &KeyboardEvent) {
        trace!("sim keyboard event: {event:?}");
        let listeners: Vec<KeyboardListener> = self
            .inner
            .keyboard
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Open the keyboard, emitting whichever event shape the configured
    /// capabilities imply.
    pub fn show_keyboard(&self, height: f32, duration: Duration) {
        let (discrete, screen) = {
            let state = self.state();
            (state.caps.discrete_keyboard_events, state.screen)
        };
        let frame_top = screen.height - height;
        let event = if discrete {
            KeyboardEvent::DidShow { frame_top, height }
        } else {
            KeyboardEvent::WillShow {
                frame_top,
                height,
                duration,
            }
        };
        self.emit_keyboard(&event);
    }

    /// Close the keyboard.
    pub fn hide_keyboard(&self, duration: Duration) {
        let discrete = self.state().caps.discrete_keyboard_events;
        if !discrete {
            self.emit_keyboard(&KeyboardEvent::WillHide { duration });
        }
        self.emit_keyboard(&KeyboardEvent::DidHide);
    }

    /// Fire a layout event (initial mount, rotation, resize).
    pub fn trigger_layout(&self) {
        let listeners: Vec<LayoutListener> = self
            .inner
            .layout
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

struct SimProbe {
    inner: Arc<SimInner>,
}

impl SimProbe {
    fn read(&self, pick: impl Fn(&SimState) -> RectF) -> Result<RectF, MeasureError> {
        let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.probe_fail {
            return Err(MeasureError::Unmounted);
        }
        Ok(pick(&state))
    }
}

#[async_trait]
impl ProbeView for SimProbe {
    async fn frame_in_window(&self) -> Result<RectF, MeasureError> {
        self.read(|state| state.probe_window)
    }

    async fn safe_frame_in_window(&self) -> Result<RectF, MeasureError> {
        self.read(|state| state.probe_safe)
    }

    async fn frame_on_screen(&self) -> Result<RectF, MeasureError> {
        self.read(|state| state.probe_screen)
    }
}

impl Platform for SimPlatform {
    fn window_size(&self) -> SizeF {
        self.state().window
    }

    fn screen_size(&self) -> SizeF {
        self.state().screen
    }

    fn capabilities(&self) -> PlatformCaps {
        self.state().caps
    }

    fn mount_probe(&self) -> Arc<dyn ProbeView> {
        if let Some(probe) = self.state().probe_override.clone() {
            return probe;
        }
        Arc::new(SimProbe {
            inner: Arc::clone(&self.inner),
        })
    }

    fn safe_area_inset(&self, edge: Edge, _landscape: bool) -> f32 {
        let insets = self.state().safe_insets;
        match edge {
            Edge::Top => insets.top,
            Edge::Right => insets.right,
            Edge::Bottom => insets.bottom,
            Edge::Left => insets.left,
        }
    }

    fn subscribe_keyboard(&self, listener: KeyboardListener) -> EventSubscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .keyboard
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        let inner = Arc::downgrade(&self.inner);
        EventSubscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .keyboard
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    fn subscribe_layout(&self, listener: LayoutListener) -> EventSubscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .layout
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        let inner = Arc::downgrade(&self.inner);
        EventSubscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .layout
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    fn animated_scalar(&self, initial: f32) -> Arc<dyn AnimatedScalar> {
        let scalar = Arc::new(SimScalar::new(initial));
        self.inner
            .scalars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::clone(&scalar));
        scalar
    }
}
