//! Modal show/await flow: programmatic confirm, then a global clear
//! driving the cancel handler.

use std::sync::{Arc, Mutex};
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

    info!("showing a modal and confirming it from outside");
    let slot: Arc<Mutex<Option<AirshipBridge<&'static str>>>> = Arc::new(Mutex::new(None));
    let future = airship.show({
        let slot = Arc::clone(&slot);
        let platform = Arc::clone(&platform);
        move |bridge| {
            let cancel = bridge.clone();
            Modal::attach(&bridge, &platform, ModalConfig::default(), move || {
                cancel.resolve("cancelled")
            });
            *slot.lock().unwrap() = Some(bridge);
            "modal: Save changes?".to_string()
        }
    });

    let bridge = slot.lock().unwrap().take().unwrap();
    bridge.resolve("confirmed");
    info!("modal settled: {:?}", future.await);
    tokio::time::sleep(Duration::from_millis(400)).await;
    info!("guests after exit: {}", host.guests().len());

    info!("showing a centered modal and clearing it");
    let future = airship.show({
        let platform = Arc::clone(&platform);
        move |bridge| {
            let cancel = bridge.clone();
            Modal::attach(
                &bridge,
                &platform,
                ModalConfig::default().centered(),
                move || cancel.resolve("cancelled"),
            );
            "modal: Are you sure?".to_string()
        }
    });
    airship.clear();
    info!("modal settled: {:?}", future.await);
    tokio::time::sleep(Duration::from_millis(400)).await;
    info!("guests after clear: {}", host.guests().len());
}
