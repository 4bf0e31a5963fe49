//! Error taxonomy for the HLR GSUP front-end.
//!
//! Mirrors the layered shape of a SIGTRAN-style error stack: a top-level
//! error per connection task, wrapping the per-layer error that actually
//! occurred.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HlrError>;

/// Top-level error for the HLR front-end.
#[derive(Debug, Error)]
pub enum HlrError {
    #[error("IE codec error: {0}")]
    Ie(#[from] IeError),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("provisioner error: {0}")]
    Provisioner(#[from] ProvisionerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for nested Update Location result")]
    Timeout,
}

/// Errors from the IE (Information Element) codec, spec §4.1.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IeError {
    #[error("value of {len} bytes exceeds the 255-byte IE length limit")]
    ValueTooLong { len: usize },

    #[error("malformed IE at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("{0} trailing byte(s) do not form a complete IE")]
    TrailingBytes(usize),
}

/// Fatal framing errors, spec §4.3 / §7. Always close the connection.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("short IPA header: expected 3 bytes, got {0}")]
    ShortHeader(usize),

    #[error("short IPA payload: expected {expected} bytes, got {actual}")]
    ShortPayload { expected: usize, actual: usize },

    #[error("peer closed the connection")]
    ConnectionClosed,
}

/// Protocol-level errors, spec §7. Answered with a `*Error` GSUP reply; the
/// connection stays open.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("missing required IE 0x{0:02X}")]
    MissingIe(u8),

    #[error("malformed IMSI: {0}")]
    MalformedImsi(String),

    #[error("unexpected nested message type 0x{0:02X}, expected InsertSubscriberDataResult")]
    UnexpectedNestedMessage(u8),

    #[error("nested InsertSubscriberDataResult IMSI {got} does not match pending {expected}")]
    MismatchedImsi { expected: String, got: String },

    #[error("an Update Location procedure is already pending on this connection")]
    UpdateLocationAlreadyPending,

    #[error("duplicate IE type 0x{0:02X}")]
    DuplicateIe(u8),

    #[error("empty GSUP payload")]
    EmptyPayload,
}

/// Failures talking to the external auth/provisioning service, spec §6.5.
#[derive(Debug, Error)]
pub enum ProvisionerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provisioner response missing or empty field: {0}")]
    MissingField(&'static str),

    #[error("provisioner field {field} is not valid hex: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },
}
