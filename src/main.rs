#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod bridge;
mod command;
mod config;
mod console_communication;
mod http_handler;
mod keychain;
mod logger;
mod mission;
mod notifier;
mod status;
mod supervisor;
mod telemetry;

use crate::bridge::BridgeLink;
use crate::command::CommandChannel;
use crate::config::Config;
use crate::console_communication::ConsoleMessenger;
use crate::http_handler::RobotConfigPoller;
use crate::keychain::Keychain;
use crate::mission::FileMissionStore;
use crate::status::StatusPublisher;
use crate::supervisor::Supervisor;
use crate::telemetry::TelemetrySnapshot;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let mut config = Config::from_env();
    let shutdown = CancellationToken::new();
    let remote = config.remote.clone();

    let bridge = BridgeLink::new(config.bridge_addr.clone(), config.mission_dir.clone());
    let telemetry = Arc::new(TelemetrySnapshot::new());
    info!("Connecting to autopilot bridge at {}", config.bridge_addr);
    let mut tasks =
        vec![tokio::spawn(Arc::clone(&bridge).run(Arc::clone(&telemetry), shutdown.clone()))];
    config.load_servo_limits(&CommandChannel::new(bridge.clone())).await;

    let store = Arc::new(FileMissionStore::new(config.state_file.clone()));
    let k = Keychain::with_telemetry(config, bridge, store, telemetry, shutdown.clone());
    restore_mission(&k).await;

    let console = match ConsoleMessenger::start(k.clone()).await {
        Ok(console) => console,
        Err(e) => fatal!("Could not open console endpoint on {}: {e}", k.config().console_addr),
    };
    info!("Operator console ready on {}", console.local_addr());

    tasks.extend(Supervisor::spawn_all(&k));

    let (multiplier_tx, multiplier_rx) = watch::channel(1.0);
    tasks.push(tokio::spawn(StatusPublisher::new(k.clone(), multiplier_rx).run()));
    if let Some(remote) = remote {
        match RobotConfigPoller::new(&remote, multiplier_tx) {
            Ok(poller) => tasks.push(tokio::spawn(poller.run(k.shutdown()))),
            Err(e) => error!("Remote robot configuration disabled: {e}"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Could not listen for shutdown signal: {e}");
    }
    info!("Shutting down");
    shutdown.cancel();
    futures::future::join_all(tasks).await;
    console.join().await;
}

async fn restore_mission(k: &Keychain) {
    let pager = k.pager();
    match pager.restore().await {
        Ok(true) => {
            let state = pager.state().await;
            info!(
                "Restored mission of {} waypoints, page {:?}",
                state.mission().len(),
                state.page()
            );
        }
        Ok(false) => info!("No stored mission found"),
        Err(e) => warn!("Could not restore stored mission: {e}"),
    }
}
