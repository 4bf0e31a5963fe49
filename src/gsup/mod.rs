//! GSUP (Generic Subscriber Update Protocol), spec §4.1-§4.2.

pub mod constants;
pub mod ie;
pub mod message;

pub use message::{decode_message, GsupMessage};
