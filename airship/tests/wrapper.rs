use std::sync::Arc;
use std::time::Duration;

use airship::registry::Airship;
use airship::wrapper::HostOptions;
use airship_core::geometry::{RectF, SizeF};
use airship_core::platform::{Platform, PlatformCaps};
use airship_core::sides::Sides;
use airship_core::sim::SimPlatform;

const WINDOW: SizeF = SizeF::new(375.0, 812.0);

/// Probe geometry matching a notched portrait phone: the reference view
/// covers the window, the safe-area child is inset 44 top / 34 bottom.
fn phone_sim() -> SimPlatform {
    let sim = SimPlatform::with_geometry(WINDOW, WINDOW);
    sim.set_safe_insets(Sides::new(44.0, 0.0, 34.0, 0.0));
    sim.set_probe_frames(
        RectF::full(WINDOW),
        RectF::new(0.0, 44.0, 375.0, 734.0),
        RectF::full(WINDOW),
    );
    sim
}

fn airship_over(sim: &SimPlatform) -> Airship<&'static str> {
    let platform: Arc<dyn Platform> = Arc::new(sim.clone());
    Airship::new(platform)
}

#[tokio::test]
async fn test_frame_combines_snapshot_and_safe_area() {
    let sim = phone_sim();
    let airship = airship_over(&sim);
    let host = airship.host(HostOptions::default(), || {});
    airship.barometer().measure_now().await;

    let frame = host.wrapper().frame();
    assert_eq!(frame.offset, Sides::ZERO);
    assert_eq!(frame.padding.top, 44.0);
    // Keyboard down: the tracker rests at the safe-area bottom inset.
    assert_eq!(frame.padding.bottom, 34.0);
}

#[tokio::test]
async fn test_frame_rides_the_keyboard() {
    let sim = phone_sim();
    let airship = airship_over(&sim);
    let host = airship.host(HostOptions::default(), || {});
    airship.barometer().measure_now().await;

    sim.show_keyboard(300.0, Duration::from_millis(250));
    let frame = host.wrapper().frame();
    assert_eq!(frame.padding.bottom, 300.0);

    sim.hide_keyboard(Duration::from_millis(250));
    let frame = host.wrapper().frame();
    assert_eq!(frame.padding.bottom, 34.0);
}

#[tokio::test]
async fn test_native_keyboard_resize_skips_keyboard_padding() {
    let sim = phone_sim();
    sim.set_caps(PlatformCaps {
        window_resizes_for_keyboard: true,
        ..PlatformCaps::default()
    });
    let airship = airship_over(&sim);
    let host = airship.host(HostOptions::default(), || {});
    airship.barometer().measure_now().await;

    // The window already resizes for the keyboard; only the safe-area
    // inset remains ours to reserve.
    sim.show_keyboard(300.0, Duration::from_millis(250));
    let frame = host.wrapper().frame();
    assert_eq!(frame.padding.bottom, 34.0);
}

#[tokio::test]
async fn test_avoid_native_keyboard_opts_back_in() {
    let sim = phone_sim();
    sim.set_caps(PlatformCaps {
        window_resizes_for_keyboard: true,
        ..PlatformCaps::default()
    });
    let airship = airship_over(&sim);
    let host = airship.host(
        HostOptions {
            avoid_native_keyboard: true,
            ..HostOptions::default()
        },
        || {},
    );
    airship.barometer().measure_now().await;

    sim.show_keyboard(300.0, Duration::from_millis(250));
    let frame = host.wrapper().frame();
    assert_eq!(frame.padding.bottom, 300.0);
}

#[tokio::test]
async fn test_translucent_status_bar_adds_top_padding() {
    let sim = phone_sim();
    sim.set_caps(PlatformCaps {
        status_bar_height: 24.0,
        ..PlatformCaps::default()
    });
    let airship = airship_over(&sim);
    let plain = airship.host(HostOptions::default(), || {});
    let translucent = airship.host(
        HostOptions {
            status_bar_translucent: true,
            ..HostOptions::default()
        },
        || {},
    );
    airship.barometer().measure_now().await;

    assert_eq!(plain.wrapper().frame().padding.top, 44.0);
    assert_eq!(translucent.wrapper().frame().padding.top, 68.0);
}
