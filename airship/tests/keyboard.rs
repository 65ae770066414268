use std::sync::Arc;
use std::time::Duration;

use airship::keyboard::{KeyboardMonitor, UpValue};
use airship_core::platform::PlatformCaps;
use airship_core::sim::{SimPlatform, SimTransition};

fn monitor_over(sim: &SimPlatform) -> KeyboardMonitor {
    KeyboardMonitor::new(Arc::new(sim.clone()))
}

// =============================================================================
// Goal + timing
// =============================================================================

#[test]
fn test_show_animates_over_reported_duration() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(20.0, UpValue::Height);
    assert_eq!(tracker.goal(), 20.0);

    sim.show_keyboard(300.0, Duration::from_millis(250));

    // The goal moved to the keyboard height via a timed transition, not
    // an instant jump.
    assert_eq!(tracker.goal(), 300.0);
    assert_eq!(tracker.value(), 300.0);
    let scalar = sim.scalars().pop().unwrap();
    assert_eq!(
        scalar.last_transition(),
        Some(SimTransition {
            to: 300.0,
            duration: Duration::from_millis(250),
        })
    );
}

#[test]
fn test_hide_animates_back_down() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(20.0, UpValue::Height);

    sim.show_keyboard(300.0, Duration::from_millis(250));
    sim.hide_keyboard(Duration::from_millis(200));

    assert_eq!(tracker.goal(), 20.0);
    let scalar = sim.scalars().pop().unwrap();
    let transitions = scalar.transitions();
    assert_eq!(
        transitions,
        vec![
            SimTransition {
                to: 300.0,
                duration: Duration::from_millis(250),
            },
            SimTransition {
                to: 20.0,
                duration: Duration::from_millis(200),
            },
        ]
    );
}

#[test]
fn test_discrete_events_snap() {
    let sim = SimPlatform::new();
    sim.set_caps(PlatformCaps {
        discrete_keyboard_events: true,
        ..PlatformCaps::default()
    });
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(0.0, UpValue::Height);

    // Discrete platforms report bare booleans; no duration means no
    // animation.
    sim.show_keyboard(300.0, Duration::from_millis(250));
    assert_eq!(tracker.goal(), 300.0);
    let scalar = sim.scalars().pop().unwrap();
    assert_eq!(
        scalar.last_transition(),
        Some(SimTransition {
            to: 300.0,
            duration: Duration::ZERO,
        })
    );

    sim.hide_keyboard(Duration::ZERO);
    assert_eq!(tracker.goal(), 0.0);
    assert_eq!(
        scalar.last_transition(),
        Some(SimTransition {
            to: 0.0,
            duration: Duration::ZERO,
        })
    );
}

#[test]
fn test_up_value_map_adds_inset() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(34.0, UpValue::Map(Arc::new(|height| height.max(34.0))));

    sim.show_keyboard(300.0, Duration::from_millis(100));
    assert_eq!(tracker.goal(), 300.0);

    // A tiny keyboard never drops the content below the safe area.
    sim.hide_keyboard(Duration::from_millis(100));
    sim.show_keyboard(10.0, Duration::from_millis(100));
    assert_eq!(tracker.goal(), 34.0);
}

#[test]
fn test_unchanged_goal_does_not_reanimate() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(0.0, UpValue::Fixed(100.0));

    sim.show_keyboard(300.0, Duration::from_millis(250));
    sim.show_keyboard(320.0, Duration::from_millis(250));

    // The goal is fixed; the second event changes nothing.
    assert_eq!(tracker.goal(), 100.0);
    let scalar = sim.scalars().pop().unwrap();
    assert_eq!(scalar.transitions().len(), 1);
}

// =============================================================================
// Fan-out
// =============================================================================

#[test]
fn test_trackers_move_in_lockstep() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let _first = monitor.tracker(0.0, UpValue::Height);
    let _second = monitor.tracker(34.0, UpValue::Map(Arc::new(|height| height + 34.0)));

    sim.show_keyboard(300.0, Duration::from_millis(250));

    let scalars = sim.scalars();
    assert_eq!(scalars.len(), 2);
    let first = scalars[0].last_transition().unwrap();
    let second = scalars[1].last_transition().unwrap();
    assert_eq!(first.to, 300.0);
    assert_eq!(second.to, 334.0);
    // Same tick, same duration: the overlays move together.
    assert_eq!(first.duration, second.duration);
    assert_eq!(first.duration, Duration::from_millis(250));
}

#[test]
fn test_dropped_tracker_stops_tracking() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(0.0, UpValue::Height);
    drop(tracker);

    sim.show_keyboard(300.0, Duration::from_millis(250));
    let scalar = sim.scalars().pop().unwrap();
    assert!(scalar.transitions().is_empty());
}

#[test]
fn test_set_range_reaims_immediately() {
    let sim = SimPlatform::new();
    let monitor = monitor_over(&sim);
    let tracker = monitor.tracker(0.0, UpValue::Height);

    sim.show_keyboard(300.0, Duration::from_millis(250));
    assert_eq!(tracker.goal(), 300.0);

    // Rotation changed the layout; new endpoints take effect at once.
    tracker.set_range(34.0, UpValue::Map(Arc::new(|height| height + 34.0)));
    assert_eq!(tracker.goal(), 334.0);

    sim.hide_keyboard(Duration::from_millis(200));
    assert_eq!(tracker.goal(), 34.0);
}
