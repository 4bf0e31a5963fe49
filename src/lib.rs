//! GSUP/IPA front-end for a mobile-core Home Location Register.
//!
//! Speaks the IPA multiplexed framing ([`ipa`]) carrying either CCM control
//! traffic or GSUP application messages ([`gsup`]) over a plain TCP
//! connection ([`server`]), backed by an external HTTP provisioner
//! ([`auth`]) and a process-local routing table ([`routing`]).

pub mod auth;
pub mod config;
pub mod errors;
pub mod gsup;
pub mod ipa;
pub mod routing;
pub mod server;
