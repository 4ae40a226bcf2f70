//! Communication with the operator console.
//! `console_endpoint` owns the TCP side with its length-prefixed frames,
//! `console_messenger` turns frames into rover commands and notifications
//! into frames, and `rover_messages` defines the protobuf messages.

mod console_endpoint;
mod console_messenger;
mod rover_messages;

pub(crate) use console_messenger::ConsoleMessenger;
