use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use airship::barometer::{Barometer, BarometerConfig};
use airship_core::geometry::{RectF, SizeF};
use airship_core::layout::LayoutSnapshot;
use airship_core::platform::{MeasureError, Platform, ProbeView};
use airship_core::sides::Sides;
use airship_core::sim::SimPlatform;
use async_trait::async_trait;
use tokio::sync::Notify;

const WINDOW: SizeF = SizeF::new(375.0, 812.0);

/// Reference view pushed down 20pt by a status bar, otherwise full
/// window; safe-area child inset 44 top / 34 bottom; no screen gap.
fn notched_frames(sim: &SimPlatform) {
    sim.set_probe_frames(
        RectF::new(0.0, 20.0, 375.0, 792.0),
        RectF::new(0.0, 44.0, 375.0, 734.0),
        RectF::new(0.0, 20.0, 375.0, 792.0),
    );
}

fn subscribe_count(barometer: &Barometer) -> (Arc<AtomicUsize>, airship_core::platform::EventSubscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscription = barometer.subscribe({
        let count = Arc::clone(&count);
        move |_snapshot| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });
    (count, subscription)
}

// =============================================================================
// Measurement math
// =============================================================================

#[tokio::test]
async fn test_offset_cancels_insets_and_padding_restores_them() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());

    barometer.measure_now().await;
    let snapshot = barometer.current().expect("one cycle completed");

    // The 20pt status-bar inset is cancelled outward and re-issued as
    // padding; the safe-area child contributes the rest.
    assert_eq!(snapshot.offset, Sides::new(-20.0, 0.0, 0.0, 0.0));
    assert_eq!(snapshot.padding, Sides::new(44.0, 0.0, 34.0, 0.0));
}

#[tokio::test]
async fn test_keyboard_raises_bottom_padding() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());
    barometer.measure_now().await;

    sim.show_keyboard(300.0, Duration::from_millis(250));
    barometer.measure_now().await;

    let snapshot = barometer.current().expect("cycle completed");
    assert_eq!(snapshot.padding.bottom, 300.0);

    sim.hide_keyboard(Duration::from_millis(250));
    barometer.measure_now().await;
    assert_eq!(barometer.current().unwrap().padding.bottom, 34.0);
}

#[tokio::test]
async fn test_keyboard_height_takes_smaller_answer() {
    // The reported frame says 250, the reported height says 300; the
    // frame wins because it is smaller.
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());

    sim.emit_keyboard(&airship_core::platform::KeyboardEvent::WillShow {
        frame_top: WINDOW.height - 250.0,
        height: 300.0,
        duration: Duration::from_millis(250),
    });
    assert_eq!(barometer.keyboard_height(), 250.0);
}

// =============================================================================
// Publication
// =============================================================================

#[tokio::test]
async fn test_equal_cycles_publish_once() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());
    let (count, _subscription) = subscribe_count(&barometer);

    barometer.measure_now().await;
    barometer.measure_now().await;
    barometer.measure_now().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_changed_cycle_publishes_again() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());
    let (count, _subscription) = subscribe_count(&barometer);

    barometer.measure_now().await;
    sim.set_probe_frames(
        RectF::full(WINDOW),
        RectF::new(0.0, 44.0, 375.0, 734.0),
        RectF::full(WINDOW),
    );
    barometer.measure_now().await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_measurement_keeps_previous_snapshot() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(Arc::new(sim.clone()), BarometerConfig::default());
    barometer.measure_now().await;
    let before = barometer.current().unwrap();

    sim.fail_measurements(true);
    sim.set_probe_frames(RectF::full(WINDOW), RectF::full(WINDOW), RectF::full(WINDOW));
    barometer.measure_now().await;

    // The failing cycle was dropped silently.
    assert_eq!(barometer.current(), Some(before));
}

#[tokio::test(start_paused = true)]
async fn test_backstop_remeasures_after_delay() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);
    let barometer = Barometer::new(
        Arc::new(sim.clone()),
        BarometerConfig {
            backstop_delay: Duration::from_secs(2),
        },
    );
    let (count, _subscription) = subscribe_count(&barometer);

    barometer.measure_now().await;
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // The environment changes but the platform swallows the layout
    // callback. The backstop catches it anyway.
    sim.set_probe_frames(RectF::full(WINDOW), RectF::full(WINDOW), RectF::full(WINDOW));
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(barometer.current(), Some(LayoutSnapshot::default()));
}

// =============================================================================
// Racing cycles
// =============================================================================

/// Delegates to the real probe, but parks the first armed cycle after
/// its last measurement so a younger cycle can finish first.
struct GatedProbe {
    inner: Arc<dyn ProbeView>,
    gate: Arc<Notify>,
    armed: AtomicBool,
}

#[async_trait]
impl ProbeView for GatedProbe {
    async fn frame_in_window(&self) -> Result<RectF, MeasureError> {
        self.inner.frame_in_window().await
    }

    async fn safe_frame_in_window(&self) -> Result<RectF, MeasureError> {
        self.inner.safe_frame_in_window().await
    }

    async fn frame_on_screen(&self) -> Result<RectF, MeasureError> {
        let frame = self.inner.frame_on_screen().await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.gate.notified().await;
        }
        frame
    }
}

#[tokio::test]
async fn test_stale_cycle_does_not_overwrite_newer_publication() {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    notched_frames(&sim);

    let gate = Arc::new(Notify::new());
    let probe = Arc::new(GatedProbe {
        inner: Platform::mount_probe(&sim),
        gate: Arc::clone(&gate),
        armed: AtomicBool::new(false),
    });
    sim.set_probe(Arc::clone(&probe) as Arc<dyn ProbeView>);

    let barometer = Arc::new(Barometer::new(
        Arc::new(sim.clone()),
        BarometerConfig::default(),
    ));
    barometer.measure_now().await;
    let stale = barometer.current().unwrap();
    let (count, _subscription) = subscribe_count(&barometer);

    // Slow cycle: reads the old frames, then parks at the gate.
    probe.armed.store(true, Ordering::SeqCst);
    let slow = tokio::spawn({
        let barometer = Arc::clone(&barometer);
        async move {
            barometer.measure_now().await;
        }
    });
    tokio::task::yield_now().await;

    // Fast cycle: the environment changed and a fresh cycle wins the race.
    sim.set_probe_frames(RectF::full(WINDOW), RectF::full(WINDOW), RectF::full(WINDOW));
    barometer.measure_now().await;
    assert_eq!(barometer.current(), Some(LayoutSnapshot::default()));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // Release the slow cycle: its older data must be discarded.
    gate.notify_one();
    slow.await.unwrap();
    assert_eq!(barometer.current(), Some(LayoutSnapshot::default()));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_ne!(barometer.current(), Some(stale));
}
