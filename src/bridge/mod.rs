//! Link to the bridge process that speaks MAVLink with the autopilot.

mod bridge_link;
mod bridge_messages;
#[cfg(test)]
mod tests;

pub use bridge_link::{BridgeLink, LinkError};
