mod command_channel;
mod command_sink;
#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
mod tests;

pub use command_channel::CommandChannel;
pub use command_sink::{CommandError, CommandSink};
