use crate::console_communication::console_endpoint::{ConsoleEndpoint, ConsoleEvent};
use crate::console_communication::rover_messages::{
    self, DownstreamContent, DriveCommand, NavigateStep, UpstreamContent,
};
use crate::keychain::Keychain;
use crate::notifier::{LogLevel, Notification};
use crate::supervisor::InterventionOutcome;
use crate::telemetry::{JoystickSample, TelemetryMsg};
use crate::{error, event, info};
use futures::future::join_all;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Source tag for interventions requested from the console.
const OPERATOR: &str = "operator";

/// Bridges the operator console to the rover: executes upstream commands and
/// forwards log lines and status summaries downstream.
pub(crate) struct ConsoleMessenger {
    endpoint: Arc<ConsoleEndpoint>,
    tasks: Vec<JoinHandle<()>>,
}

impl ConsoleMessenger {
    pub(crate) async fn start(k: Keychain) -> std::io::Result<Self> {
        let endpoint =
            Arc::new(ConsoleEndpoint::bind(&k.config().console_addr, k.shutdown()).await?);
        info!("Console endpoint listening on {}", endpoint.local_addr());

        let mut receiver = endpoint.upstream_event_receiver();
        let endpoint_local = Arc::clone(&endpoint);
        let k_local = k.clone();
        let shutdown = k.shutdown();
        let upstream = tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    () = shutdown.cancelled() => break,
                    received = receiver.recv() => received,
                };
                let event = match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(n)) => {
                        k_local.notifier().log(LogLevel::Warning, format!("Dropped {n} console events"));
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                match event {
                    ConsoleEvent::Connected => event!("Console connected"),
                    ConsoleEvent::Disconnected => event!("Console disconnected"),
                    ConsoleEvent::Message(content) => {
                        Self::dispatch(&k_local, &endpoint_local, content).await;
                    }
                }
            }
        });

        let mut notifications = k.notifier().subscribe();
        let endpoint_local = Arc::clone(&endpoint);
        let shutdown = k.shutdown();
        let downstream = tokio::spawn(async move {
            loop {
                let notification = tokio::select! {
                    () = shutdown.cancelled() => break,
                    n = notifications.recv() => n,
                };
                let notification = match notification {
                    Ok(n) => n,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                };
                if !endpoint_local.is_console_connected() {
                    continue;
                }
                endpoint_local.send_downstream(match notification {
                    Notification::Log { level, message } => {
                        DownstreamContent::LogLine(rover_messages::LogLine::new(level, message))
                    }
                    Notification::Status(summary) => {
                        DownstreamContent::Status(rover_messages::Status::from_summary(&summary))
                    }
                });
            }
        });

        Ok(Self { endpoint, tasks: vec![upstream, downstream] })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.endpoint.local_addr() }

    /// Waits for both relay loops, which stop once shutdown is requested.
    pub(crate) async fn join(self) {
        for res in join_all(self.tasks).await {
            if let Err(e) = res {
                error!("Console relay task failed: {e}");
            }
        }
    }

    /// Ping and joystick samples are answered in order; everything that
    /// may pause the rover runs on its own task.
    async fn dispatch(k: &Keychain, endpoint: &Arc<ConsoleEndpoint>, content: UpstreamContent) {
        match content {
            UpstreamContent::Ping(ping) => {
                endpoint.send_downstream(DownstreamContent::Pong(rover_messages::Pong {
                    echo: ping.echo,
                }));
            }
            UpstreamContent::Joystick(sample) => Self::joystick(k, sample).await,
            other => {
                let k = k.clone();
                let endpoint = Arc::clone(endpoint);
                tokio::spawn(async move {
                    let shutdown = k.shutdown();
                    let reply = tokio::select! {
                        () = shutdown.cancelled() => return,
                        reply = Self::execute(&k, other) => reply,
                    };
                    if let Some(reply) = reply {
                        endpoint.send_downstream(reply);
                    }
                });
            }
        }
    }

    /// Runs one operator command, returning the reply to send back if any.
    pub(crate) async fn execute(k: &Keychain, content: UpstreamContent) -> Option<DownstreamContent> {
        let notifier = k.notifier();
        match content {
            UpstreamContent::Ping(ping) => {
                Some(DownstreamContent::Pong(rover_messages::Pong { echo: ping.echo }))
            }
            UpstreamContent::LoadMission(load) => {
                let waypoints = load.into_waypoints();
                let count = waypoints.len();
                let success = k.pager().load_mission(waypoints).await;
                let level = if success { LogLevel::Info } else { LogLevel::Error };
                notifier.log(level, format!("Loading mission of {count} waypoints: success={success}"));
                Some(DownstreamContent::LoadMissionReply(rover_messages::LoadMissionReply {
                    success,
                }))
            }
            UpstreamContent::Navigate(nav) => {
                let Ok(step) = NavigateStep::try_from(nav.step) else {
                    notifier.log(LogLevel::Warning, format!("Unknown navigation step {}", nav.step));
                    return None;
                };
                match k.pager().navigate(step.into()).await {
                    Ok(seq) => notifier.log(LogLevel::Info, format!("{step:?}: going to waypoint {seq}")),
                    Err(e) => notifier.log(LogLevel::Warning, format!("{step:?} failed: {e}")),
                }
                None
            }
            UpstreamContent::Drive(drive) => {
                let Ok(command) = DriveCommand::try_from(drive.command) else {
                    notifier.log(LogLevel::Warning, format!("Unknown drive command {}", drive.command));
                    return None;
                };
                Self::drive(k, command).await;
                None
            }
            UpstreamContent::Joystick(sample) => {
                Self::joystick(k, sample).await;
                None
            }
        }
    }

    async fn drive(k: &Keychain, command: DriveCommand) {
        let arbiter = k.arbiter();
        let outcome = match command {
            DriveCommand::Stop => arbiter.kill(OPERATOR).await,
            DriveCommand::Start => arbiter.start(OPERATOR).await,
            DriveCommand::Hold => arbiter.hold(OPERATOR).await,
            DriveCommand::HoldKeepWaypoint => arbiter.hold_keep_waypoint(OPERATOR).await,
            DriveCommand::Manual => {
                let config = k.config();
                k.cmd().enter_manual(config.servo_left.trim, config.servo_right.trim).await.into()
            }
            DriveCommand::PowerOn => k.cmd().set_actuator_power(true).await.into(),
            DriveCommand::PowerOff => k.cmd().set_actuator_power(false).await.into(),
        };
        let level = match outcome {
            InterventionOutcome::Executed => LogLevel::Info,
            _ => LogLevel::Warning,
        };
        k.notifier().log(level, format!("Operator {command:?}: {outcome:?}"));
    }

    async fn joystick(k: &Keychain, sample: rover_messages::Joystick) {
        k.telemetry()
            .update(TelemetryMsg::Joystick(JoystickSample { x: sample.x, y: sample.y }))
            .await;
        let cmd = k.cmd();
        let result = match cmd.override_drive_channel(1, axis_to_pwm(sample.x)).await {
            Ok(()) => cmd.override_drive_channel(3, axis_to_pwm(sample.y)).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            k.notifier().log(LogLevel::Warning, format!("Joystick override failed: {e}"));
        }
    }
}

/// Maps a joystick axis in `[-1, 1]` onto a PWM value around 1500.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn axis_to_pwm(axis: f64) -> u16 {
    let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
    (1500.0 + 500.0 * axis).round() as u16
}
