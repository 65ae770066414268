//! Environment tracker.
//!
//! Continuously answers "how must a full-screen overlay be offset and
//! padded to avoid notches, status bars, home indicators, and the
//! on-screen keyboard". The tracker mounts an invisible reference view,
//! re-measures it on every layout-affecting event, and publishes a
//! [`LayoutSnapshot`] whenever the answer actually changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, trace};
use tokio::runtime::Handle;

use airship_core::layout::LayoutSnapshot;
use airship_core::platform::{EventSubscription, KeyboardEvent, Platform, ProbeView};

/// Tunables for the environment tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarometerConfig {
    /// Delay before the unconditional re-measurement that follows every
    /// published change. Some platforms drop a layout callback after an
    /// environment change; the backstop guarantees eventual consistency
    /// at the cost of one delayed extra measurement. A tunable, not a
    /// contract.
    pub backstop_delay: Duration,
}

impl Default for BarometerConfig {
    fn default() -> Self {
        Self {
            backstop_delay: Duration::from_secs(2),
        }
    }
}

type LayoutCallback = Arc<dyn Fn(LayoutSnapshot) + Send + Sync>;

struct Inner {
    platform: Arc<dyn Platform>,
    probe: Arc<dyn ProbeView>,
    config: BarometerConfig,
    runtime: Handle,
    keyboard_height: Mutex<f32>,
    published: Mutex<Option<LayoutSnapshot>>,
    listeners: Mutex<Vec<(u64, LayoutCallback)>>,
    next_listener: AtomicU64,
    /// Next measurement cycle number.
    cycle: AtomicU64,
    /// Highest cycle that finished combining its measurements. A slower
    /// cycle that loses the race is discarded, so stale data never
    /// overwrites fresh data.
    last_done: AtomicU64,
}

/// Measures the overlay environment and publishes changes.
///
/// Must be created inside a tokio runtime; measurement cycles and the
/// backstop run as spawned tasks.
pub struct Barometer {
    inner: Arc<Inner>,
    _keyboard: EventSubscription,
    _layout: EventSubscription,
}

impl Barometer {
    pub fn new(platform: Arc<dyn Platform>, config: BarometerConfig) -> Self {
        let probe = platform.mount_probe();
        let inner = Arc::new(Inner {
            platform: Arc::clone(&platform),
            probe,
            config,
            runtime: Handle::current(),
            keyboard_height: Mutex::new(0.0),
            published: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            cycle: AtomicU64::new(0),
            last_done: AtomicU64::new(0),
        });

        // Rotation and resize re-measure; so does every keyboard event,
        // which additionally refreshes the tracked keyboard height.
        let layout = {
            let inner = Arc::downgrade(&inner);
            platform.subscribe_layout(Arc::new(move || {
                if let Some(inner) = inner.upgrade() {
                    Inner::spawn_measure(&inner);
                }
            }))
        };
        let keyboard = {
            let inner = Arc::downgrade(&inner);
            platform.subscribe_keyboard(Arc::new(move |event| {
                if let Some(inner) = inner.upgrade() {
                    Inner::on_keyboard(&inner, event);
                }
            }))
        };

        // Initial layout.
        Inner::spawn_measure(&inner);

        Self {
            inner,
            _keyboard: keyboard,
            _layout: layout,
        }
    }

    /// Last published snapshot, if any cycle has completed yet.
    pub fn current(&self) -> Option<LayoutSnapshot> {
        *self.inner.published.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Keyboard height as of the most recent keyboard event.
    pub fn keyboard_height(&self) -> f32 {
        *self
            .inner
            .keyboard_height
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribe to published snapshots. The listener detaches when the
    /// returned handle drops.
    pub fn subscribe(
        &self,
        listener: impl Fn(LayoutSnapshot) + Send + Sync + 'static,
    ) -> EventSubscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        let inner = Arc::downgrade(&self.inner);
        EventSubscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Run one measurement cycle to completion. Event-driven cycles are
    /// spawned instead; this is for deterministic sequencing in tests.
    pub async fn measure_now(&self) {
        Inner::measure(Arc::clone(&self.inner)).await;
    }
}

impl Inner {
    fn on_keyboard(inner: &Arc<Self>, event: &KeyboardEvent) {
        if let Some(height) = event.effective_height(inner.platform.screen_size()) {
            *inner
                .keyboard_height
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = height;
        }
        Self::spawn_measure(inner);
    }

    fn spawn_measure(inner: &Arc<Self>) {
        let task = Arc::clone(inner);
        inner.runtime.spawn(async move {
            Self::measure(task).await;
        });
    }

    async fn measure(inner: Arc<Self>) {
        let seq = inner.cycle.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("measurement cycle {seq} started");

        let window = inner.platform.window_size();
        let screen = inner.platform.screen_size();

        // Any failed measurement (view unmounted mid-cycle) drops the
        // whole cycle; the previous snapshot stays valid.
        let Ok(view_frame) = inner.probe.frame_in_window().await else {
            return;
        };
        let Ok(safe_frame) = inner.probe.safe_frame_in_window().await else {
            return;
        };
        let Ok(screen_frame) = inner.probe.frame_on_screen().await else {
            return;
        };

        // A newer cycle may have finished while we were waiting.
        if inner.last_done.fetch_max(seq, Ordering::AcqRel) > seq {
            trace!("measurement cycle {seq} superseded, discarding");
            return;
        }

        let raw = view_frame.insets_in(window);
        let safe = safe_frame.insets_in(window);
        let bottom_gap = screen_frame.insets_in(screen).bottom;

        // Cancel any positive inset so the overlay covers the full
        // window, then restore the insets as inward padding plus the
        // safe-area portion.
        let offset = raw.map(|side| -side.max(0.0));
        let mut padding = safe.subtract(raw).add(raw.map(f32::abs));

        // Content must not sit beneath the keyboard.
        let keyboard_height = *inner
            .keyboard_height
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let keyboard_padding = (keyboard_height - bottom_gap - offset.bottom).max(0.0);
        padding.bottom = padding.bottom.max(keyboard_padding);

        let snapshot = LayoutSnapshot { offset, padding };

        let changed = {
            let mut published = inner.published.lock().unwrap_or_else(|e| e.into_inner());
            if published.as_ref() == Some(&snapshot) {
                false
            } else {
                *published = Some(snapshot);
                true
            }
        };
        if !changed {
            return;
        }
        debug!("layout published: {snapshot:?}");

        let listeners: Vec<LayoutCallback> = {
            let listeners = inner.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener(snapshot);
        }

        // Re-measure once after a delay, in case the platform swallows
        // the layout callback for whatever changed next.
        Self::spawn_backstop(Arc::clone(&inner));
    }

    fn spawn_backstop(inner: Arc<Self>) {
        let runtime = inner.runtime.clone();
        runtime.spawn(async move {
            tokio::time::sleep(inner.config.backstop_delay).await;
            Self::measure(inner).await;
        });
    }
}
