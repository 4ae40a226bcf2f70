use crate::command::{CommandChannel, CommandError};
use crate::{info, warn};
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tokio::time::sleep;

/// Output limits of one drive channel, in microseconds of PWM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoLimits {
    pub min: u16,
    pub trim: u16,
    pub max: u16,
}

impl ServoLimits {
    pub const DEFAULT: ServoLimits = ServoLimits { min: 1000, trim: 1500, max: 2000 };

    /// Whether `pwm` sits on either end of the channel's travel.
    pub fn is_extreme(&self, pwm: u16) -> bool { pwm == self.min || pwm == self.max }

    pub fn is_trim(&self, pwm: u16) -> bool { pwm == self.trim }

    /// Reads `SERVO<channel>_MIN`, `_TRIM` and `_MAX` from the autopilot.
    ///
    /// A parameter the autopilot does not know or reports out of range keeps
    /// the value from `self`; limits that end up out of order are dropped as
    /// a whole. Fails only when the link itself does.
    async fn read_from(self, cmd: &CommandChannel, channel: u8) -> Result<Self, CommandError> {
        let limits = ServoLimits {
            min: read_pwm(cmd, &format!("SERVO{channel}_MIN"), self.min).await?,
            trim: read_pwm(cmd, &format!("SERVO{channel}_TRIM"), self.trim).await?,
            max: read_pwm(cmd, &format!("SERVO{channel}_MAX"), self.max).await?,
        };
        if limits.min <= limits.trim && limits.trim <= limits.max {
            Ok(limits)
        } else {
            warn!("Ignoring servo {channel} limits {limits:?} from autopilot, keeping {self:?}");
            Ok(self)
        }
    }
}

async fn read_pwm(cmd: &CommandChannel, name: &str, fallback: u16) -> Result<u16, CommandError> {
    match cmd.read_parameter(name).await {
        Ok(value) => Ok(pwm_from_param(value).unwrap_or_else(|| {
            warn!("Autopilot reported {value} for {name}, keeping {fallback}");
            fallback
        })),
        Err(CommandError::Rejected(reason)) => {
            warn!("{name} not available ({reason}), keeping {fallback}");
            Ok(fallback)
        }
        Err(e) => Err(e),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pwm_from_param(value: f32) -> Option<u16> {
    (value.is_finite() && value >= 1.0 && value <= f32::from(u16::MAX)).then(|| value.round() as u16)
}

/// Sizes of the windows the mission is cut into.
#[derive(Debug, Clone, Copy)]
pub struct PagingConfig {
    /// Number of points following index 0 on the first page.
    pub initial_page_size: usize,
    /// Number of points following the overlap point on every later page.
    pub subsequent_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self { Self { initial_page_size: 100, subsequent_page_size: 250 } }
}

/// Credentials for polling the robot's remote configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub robot_id: String,
    pub auth_token: String,
}

/// Process-wide configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bridge_addr: String,
    pub console_addr: String,
    pub state_file: PathBuf,
    pub mission_dir: PathBuf,
    pub paging: PagingConfig,
    /// Left drive output (servo 1).
    pub servo_left: ServoLimits,
    /// Right drive output (servo 3).
    pub servo_right: ServoLimits,
    pub advance_radius_m: Option<f64>,
    pub remote: Option<RemoteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bridge_addr: String::from("127.0.0.1:14600"),
            console_addr: String::from("0.0.0.0:1337"),
            state_file: PathBuf::from("./rover_mission.bin"),
            mission_dir: PathBuf::from("./temp"),
            paging: PagingConfig::default(),
            servo_left: ServoLimits::DEFAULT,
            servo_right: ServoLimits::DEFAULT,
            advance_radius_m: None,
            remote: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let def = Config::default();
        let paging = PagingConfig {
            initial_page_size: parse_var("ROVER_INITIAL_PAGE")
                .unwrap_or(def.paging.initial_page_size)
                .max(1),
            subsequent_page_size: parse_var("ROVER_SUBSEQUENT_PAGE")
                .unwrap_or(def.paging.subsequent_page_size)
                .max(1),
        };
        let remote = match (
            env::var("ROVER_REMOTE_URL"),
            env::var("ROVER_ID"),
            env::var("ROVER_AUTH_TOKEN"),
        ) {
            (Ok(base_url), Ok(robot_id), Ok(auth_token)) => {
                Some(RemoteConfig { base_url, robot_id, auth_token })
            }
            _ => None,
        };
        Self {
            bridge_addr: env::var("ROVER_BRIDGE_ADDR").unwrap_or(def.bridge_addr),
            console_addr: env::var("ROVER_CONSOLE_ADDR").unwrap_or(def.console_addr),
            state_file: env::var("ROVER_STATE_FILE").map_or(def.state_file, PathBuf::from),
            mission_dir: env::var("ROVER_MISSION_DIR").map_or(def.mission_dir, PathBuf::from),
            paging,
            servo_left: servo_from_env(1),
            servo_right: servo_from_env(3),
            advance_radius_m: parse_var("ROVER_ADVANCE_RADIUS_M"),
            remote,
        }
    }
}

impl Config {
    const PARAM_ATTEMPTS: u32 = 5;
    const PARAM_RETRY_DELAY: Duration = Duration::from_secs(2);

    /// Replaces both servo limits with the autopilot's parameters, keeping the
    /// configured limits if the autopilot stays unreachable.
    pub async fn load_servo_limits(&mut self, cmd: &CommandChannel) {
        for attempt in 1..=Self::PARAM_ATTEMPTS {
            let (left, right) = (self.servo_left, self.servo_right);
            let read = async move {
                Ok::<_, CommandError>((left.read_from(cmd, 1).await?, right.read_from(cmd, 3).await?))
            };
            match read.await {
                Ok((left, right)) => {
                    info!("Servo limits from autopilot: left {left:?}, right {right:?}");
                    self.servo_left = left;
                    self.servo_right = right;
                    return;
                }
                Err(e) if attempt < Self::PARAM_ATTEMPTS => {
                    warn!("Reading servo limits failed ({attempt}/{}): {e}", Self::PARAM_ATTEMPTS);
                    sleep(Self::PARAM_RETRY_DELAY).await;
                }
                Err(e) => warn!("Reading servo limits failed: {e}"),
            }
        }
        warn!(
            "Keeping configured servo limits: left {:?}, right {:?}",
            self.servo_left, self.servo_right
        );
    }
}

fn servo_from_env(channel: u8) -> ServoLimits {
    let def = ServoLimits::DEFAULT;
    ServoLimits {
        min: parse_var(&format!("ROVER_SERVO{channel}_MIN")).unwrap_or(def.min),
        trim: parse_var(&format!("ROVER_SERVO{channel}_TRIM")).unwrap_or(def.trim),
        max: parse_var(&format!("ROVER_SERVO{channel}_MAX")).unwrap_or(def.max),
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    if let Ok(val) = raw.trim().parse::<T>() {
        Some(val)
    } else {
        warn!("Ignoring unparsable value {raw:?} for {name}");
        None
    }
}
