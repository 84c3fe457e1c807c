//! Album protocol implementation
//!
//! This module turns request bodies into album commands and command
//! outcomes into JSON replies. It knows nothing about HTTP transport.

pub mod command;
pub mod reply;

pub use command::Command;
pub use reply::Reply;
