//! Keyboard animation coordinator.
//!
//! One [`KeyboardMonitor`] per overlay system subscribes to the platform
//! keyboard and fans events out to every attached [`KeyboardTracker`].
//! Each tracker keeps its own animated value and goal, but trackers
//! notified in the same tick share the queued duration, so independent
//! mount points move in lockstep with the system keyboard animation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::trace;

use airship_core::platform::{AnimatedScalar, EventSubscription, KeyboardEvent, Platform};

/// Target for a tracker's up position.
#[derive(Clone)]
pub enum UpValue {
    Fixed(f32),
    /// Track the raw keyboard height.
    Height,
    /// Derive the target from the keyboard height, e.g. to keep a
    /// safe-area inset underneath it.
    Map(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl UpValue {
    fn resolve(&self, keyboard_height: f32) -> f32 {
        match self {
            UpValue::Fixed(value) => *value,
            UpValue::Height => keyboard_height,
            UpValue::Map(map) => map(keyboard_height),
        }
    }
}

impl fmt::Debug for UpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpValue::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            UpValue::Height => f.write_str("Height"),
            UpValue::Map(_) => f.write_str("Map(..)"),
        }
    }
}

/// Hiding means the keyboard is either down or moving down.
struct KeyboardState {
    hiding: bool,
    height: f32,
}

struct TrackerInner {
    scalar: Arc<dyn AnimatedScalar>,
    down_value: Mutex<f32>,
    up_value: Mutex<UpValue>,
    goal: Mutex<f32>,
    next_duration: Mutex<Duration>,
}

impl TrackerInner {
    fn calculate_goal(&self, hiding: bool, height: f32) -> f32 {
        if hiding {
            *self.down_value.lock().unwrap_or_else(|e| e.into_inner())
        } else {
            self.up_value
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .resolve(height)
        }
    }

    /// Re-aim at the goal the current keyboard state implies. Animates
    /// over the queued duration when one exists, snaps otherwise.
    fn trigger(&self, hiding: bool, height: f32) {
        let next_goal = self.calculate_goal(hiding, height);
        let mut goal = self.goal.lock().unwrap_or_else(|e| e.into_inner());
        if next_goal == *goal {
            return;
        }
        let duration = std::mem::take(
            &mut *self
                .next_duration
                .lock()
                .unwrap_or_else(|e| e.into_inner()),
        );
        if duration.is_zero() {
            self.scalar.set(next_goal);
        } else {
            self.scalar.animate_to(next_goal, duration);
        }
        *goal = next_goal;
    }
}

struct MonitorInner {
    platform: Arc<dyn Platform>,
    state: Mutex<KeyboardState>,
    trackers: Mutex<Vec<(u64, Arc<TrackerInner>)>>,
    next_tracker: AtomicU64,
}

impl MonitorInner {
    fn handle(inner: &Arc<Self>, event: &KeyboardEvent) {
        trace!("keyboard event: {event:?}");
        let screen = inner.platform.screen_size();
        let queue = event.duration();
        {
            let mut state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
            match *event {
                KeyboardEvent::WillShow { .. } | KeyboardEvent::DidShow { .. } => {
                    state.hiding = false;
                    if let Some(height) = event.effective_height(screen) {
                        state.height = height;
                    }
                }
                KeyboardEvent::WillHide { .. } => {
                    state.hiding = true;
                }
                KeyboardEvent::DidHide => {
                    state.hiding = true;
                    state.height = 0.0;
                }
                KeyboardEvent::FrameWillChange { .. } => {
                    let height = event.effective_height(screen).unwrap_or(0.0);
                    state.hiding = height <= 0.0;
                    state.height = height;
                }
            }
        }
        if !queue.is_zero() {
            Self::queue_duration(inner, queue);
        }
        Self::trigger(inner);
    }

    /// Queue the platform-reported timing on every tracker, so the whole
    /// batch animates with the same duration.
    fn queue_duration(inner: &Arc<Self>, duration: Duration) {
        let trackers = inner.trackers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, tracker) in trackers.iter() {
            *tracker
                .next_duration
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = duration;
        }
    }

    fn trigger(inner: &Arc<Self>) {
        let (hiding, height) = {
            let state = inner.state.lock().unwrap_or_else(|e| e.into_inner());
            (state.hiding, state.height)
        };
        let trackers: Vec<Arc<TrackerInner>> = {
            let trackers = inner.trackers.lock().unwrap_or_else(|e| e.into_inner());
            trackers
                .iter()
                .map(|(_, tracker)| Arc::clone(tracker))
                .collect()
        };
        for tracker in trackers {
            tracker.trigger(hiding, height);
        }
    }
}

/// Shared keyboard subscriber for one overlay system.
pub struct KeyboardMonitor {
    inner: Arc<MonitorInner>,
    _subscription: EventSubscription,
}

impl KeyboardMonitor {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        let inner = Arc::new(MonitorInner {
            platform: Arc::clone(&platform),
            state: Mutex::new(KeyboardState {
                hiding: true,
                height: 0.0,
            }),
            trackers: Mutex::new(Vec::new()),
            next_tracker: AtomicU64::new(0),
        });
        let subscription = {
            let inner = Arc::downgrade(&inner);
            platform.subscribe_keyboard(Arc::new(move |event| {
                if let Some(inner) = inner.upgrade() {
                    MonitorInner::handle(&inner, event);
                }
            }))
        };
        Self {
            inner,
            _subscription: subscription,
        }
    }

    pub fn hiding(&self) -> bool {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .hiding
    }

    pub fn height(&self) -> f32 {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .height
    }

    /// Attach a consumer. The tracker's animated value starts at the
    /// goal the current keyboard state implies and detaches on drop.
    pub fn tracker(&self, down_value: f32, up_value: UpValue) -> KeyboardTracker {
        let (hiding, height) = {
            let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
            (state.hiding, state.height)
        };
        let initial = if hiding {
            down_value
        } else {
            up_value.resolve(height)
        };
        let tracker = Arc::new(TrackerInner {
            scalar: self.inner.platform.animated_scalar(initial),
            down_value: Mutex::new(down_value),
            up_value: Mutex::new(up_value),
            goal: Mutex::new(initial),
            next_duration: Mutex::new(Duration::ZERO),
        });
        let id = self.inner.next_tracker.fetch_add(1, Ordering::Relaxed);
        self.inner
            .trackers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::clone(&tracker)));
        KeyboardTracker {
            id,
            inner: tracker,
            monitor: Arc::downgrade(&self.inner),
        }
    }
}

/// One consumer of the shared keyboard timing.
pub struct KeyboardTracker {
    id: u64,
    inner: Arc<TrackerInner>,
    monitor: Weak<MonitorInner>,
}

impl KeyboardTracker {
    /// Current value of the animated scalar.
    pub fn value(&self) -> f32 {
        self.inner.scalar.value()
    }

    /// The endpoint the tracker is currently aimed at.
    pub fn goal(&self) -> f32 {
        *self.inner.goal.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The underlying animated value, for binding to rendered output.
    pub fn animation(&self) -> Arc<dyn AnimatedScalar> {
        Arc::clone(&self.inner.scalar)
    }

    /// Replace the endpoints (rotation, inset changes) and re-aim.
    pub fn set_range(&self, down_value: f32, up_value: UpValue) {
        *self
            .inner
            .down_value
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = down_value;
        *self.inner.up_value.lock().unwrap_or_else(|e| e.into_inner()) = up_value;
        if let Some(monitor) = self.monitor.upgrade() {
            let (hiding, height) = {
                let state = monitor.state.lock().unwrap_or_else(|e| e.into_inner());
                (state.hiding, state.height)
            };
            self.inner.trigger(hiding, height);
        }
    }
}

impl Drop for KeyboardTracker {
    fn drop(&mut self) {
        if let Some(monitor) = self.monitor.upgrade() {
            monitor
                .trackers
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .retain(|(id, _)| *id != self.id);
        }
    }
}
