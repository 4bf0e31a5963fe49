//! IPA (IP Access) multiplexing framing, spec §4.3-§4.4.

pub mod ccm;
pub mod frame;

pub use frame::{read_frame, write_frame, IpaFrame, CCM_PROTOCOL};
