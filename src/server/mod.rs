//! Connection state machine and accept loop, spec §4.5/§5.

pub mod connection;
pub mod listener;

pub use connection::{Connection, HandlerContext, GSUP_PROTOCOL};
