//! Toast and dropdown lifecycle, end to end against the simulated
//! platform: show, auto-hide, exit animation, removal, global clear.

use std::sync::Arc;
use std::time::Duration;

use airship::prelude::*;
use airship_core::sim::SimPlatform;
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

#[tokio::main]
async fn main() {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    let sim = SimPlatform::phone();
    let platform: Arc<dyn Platform> = Arc::new(sim.clone());
    let airship: Airship<String> = Airship::new(Arc::clone(&platform));
    let host = airship.host(HostOptions::default(), || info!("guest list changed"));

    info!("showing a toast with a short auto-hide");
    let future = airship.show(|bridge| {
        Toast::attach(
            &bridge,
            &platform,
            ToastConfig::default()
                .message("File saved")
                .auto_hide(Some(Duration::from_millis(500))),
        );
        "toast: File saved".to_string()
    });
    info!("guests while visible: {}", host.guests().len());

    let result = future.await;
    info!("toast settled: {result:?}");

    // The exit animation owns the removal; give it time to finish.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    info!("guests after exit: {}", host.guests().len());

    info!("showing a dropdown, then clearing everything");
    let future = airship.show(|bridge| {
        Dropdown::attach(&bridge, &platform, DropdownConfig::default());
        "dropdown: New message".to_string()
    });
    airship.clear();

    let result = future.await;
    info!("dropdown settled: {result:?}");
    tokio::time::sleep(Duration::from_millis(600)).await;
    info!("guests after clear: {}", host.guests().len());
}
