use std::fmt;

/// Drive modes of the rover autopilot, identified by their custom mode number.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum DriveMode {
    Manual,
    Hold,
    Auto,
    Initialising,
    Other(u32),
}

impl DriveMode {
    /// The custom mode number the autopilot reports and expects.
    pub fn custom_mode(self) -> u32 {
        match self {
            DriveMode::Manual => 0,
            DriveMode::Hold => 4,
            DriveMode::Auto => 10,
            DriveMode::Initialising => 16,
            DriveMode::Other(code) => code,
        }
    }
}

impl From<u32> for DriveMode {
    fn from(value: u32) -> Self {
        match value {
            0 => DriveMode::Manual,
            4 => DriveMode::Hold,
            10 => DriveMode::Auto,
            16 => DriveMode::Initialising,
            code => DriveMode::Other(code),
        }
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveMode::Manual => write!(f, "manual"),
            DriveMode::Hold => write!(f, "hold"),
            DriveMode::Auto => write!(f, "auto"),
            DriveMode::Initialising => write!(f, "initialising"),
            DriveMode::Other(code) => write!(f, "unknown mode: {code}"),
        }
    }
}
