//! GSUP message codec, spec §4.2.
//!
//! A GSUP payload is `[message_type:1][IE]*` with no length prefix of its
//! own — the IPA layer supplies the outer length (spec §6.1/§6.2). Encode
//! concatenates type and IEs in the order supplied; decode returns the type
//! byte plus the ordered IE sequence, rejecting duplicate IE types as a
//! protocol error per spec §3/§7.

use super::constants::ie_type;
use super::ie::{self, Ie};
use crate::errors::{HlrError, IeError, ProtocolError};
use bytes::{Bytes, BytesMut};

/// A decoded GSUP message: type byte plus IEs in wire order.
#[derive(Debug, Clone)]
pub struct GsupMessage {
    pub message_type: u8,
    ies: Vec<Ie>,
}

impl GsupMessage {
    /// First occurrence of `ie_type`, per spec §3 ("decoded form maps IE
    /// type to first occurrence's value").
    pub fn ie(&self, ie_type: u8) -> Option<&Bytes> {
        self.ies.iter().find(|ie| ie.ie_type == ie_type).map(|ie| &ie.value)
    }

    /// Required-IE lookup: returns [`ProtocolError::MissingIe`] if absent.
    pub fn require_ie(&self, ie_type: u8) -> Result<&Bytes, ProtocolError> {
        self.ie(ie_type).ok_or(ProtocolError::MissingIe(ie_type))
    }

    /// The IMSI IE, decoded and validated as 5-15 ASCII digits (spec §4.5.1).
    pub fn imsi(&self) -> Result<String, ProtocolError> {
        let raw = self.require_ie(ie_type::IMSI)?;
        decode_imsi(raw)
    }
}

/// Validate and decode an IMSI IE value: 5-15 ASCII digits.
pub fn decode_imsi(raw: &[u8]) -> Result<String, ProtocolError> {
    let s = std::str::from_utf8(raw)
        .map_err(|_| ProtocolError::MalformedImsi("not valid UTF-8".to_string()))?;
    if s.len() < 5 || s.len() > 15 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::MalformedImsi(s.to_string()));
    }
    Ok(s.to_string())
}

/// Encode a GSUP message from an ordered list of `(ie_type, value)` pairs.
/// The output preserves the supplied order exactly (spec §8 IE-order
/// invariant).
pub fn encode_message(message_type: u8, ies: &[(u8, &[u8])]) -> Result<Bytes, IeError> {
    let mut buf = BytesMut::with_capacity(1 + ies.len() * 4);
    buf.extend_from_slice(&[message_type]);
    for (ie_type, value) in ies {
        ie::encode_ie(&mut buf, *ie_type, value)?;
    }
    Ok(buf.freeze())
}

/// Decode a GSUP payload (message type + IE sequence).
///
/// An empty payload is a protocol error (spec §4.2); a duplicate IE type is
/// also a protocol error (spec §3/§7), reported against the *first*
/// conflicting occurrence's type.
pub fn decode_message(payload: &[u8]) -> Result<GsupMessage, HlrError> {
    if payload.is_empty() {
        return Err(ProtocolError::EmptyPayload.into());
    }

    let message_type = payload[0];
    let ies = ie::decode_ies(&payload[1..])?;

    let mut seen = std::collections::HashSet::new();
    for ie in &ies {
        if !seen.insert(ie.ie_type) {
            return Err(ProtocolError::DuplicateIe(ie.ie_type).into());
        }
    }

    Ok(GsupMessage { message_type, ies })
}

// ==================== Typed constructors ====================
//
// One constructor per message kind this core handles (spec §2, "expose
// typed constructors for each message kind").

use super::constants::{cause, message_type, network_access_mode, subscriber_status};

pub fn send_auth_info_request(imsi: &str) -> Result<Bytes, IeError> {
    encode_message(
        message_type::SEND_AUTH_INFO_REQUEST,
        &[(ie_type::IMSI, imsi.as_bytes())],
    )
}

pub fn send_auth_info_result(imsi: &str, rand: &[u8], autn: &[u8]) -> Result<Bytes, IeError> {
    encode_message(
        message_type::SEND_AUTH_INFO_RESULT,
        &[
            (ie_type::IMSI, imsi.as_bytes()),
            (ie_type::RAND, rand),
            (ie_type::AUTN, autn),
        ],
    )
}

pub fn send_auth_info_error(cause: u8) -> Result<Bytes, IeError> {
    encode_error(message_type::SEND_AUTH_INFO_ERROR, cause)
}

pub fn send_subscriber_data_request(imsi: &str) -> Result<Bytes, IeError> {
    encode_message(
        message_type::SEND_SUBSCRIBER_DATA_REQUEST,
        &[(ie_type::IMSI, imsi.as_bytes())],
    )
}

pub fn send_subscriber_data_result(
    imsi: &str,
    msisdn: &str,
    bearer_services: Option<&[u8]>,
    teleservices: Option<&[u8]>,
) -> Result<Bytes, IeError> {
    let status = [subscriber_status::SERVICE_GRANTED];
    let nam = [network_access_mode::PACKET_AND_CIRCUIT];
    let mut ies: Vec<(u8, &[u8])> = vec![
        (ie_type::IMSI, imsi.as_bytes()),
        (ie_type::MSISDN, msisdn.as_bytes()),
        (ie_type::SUBSCRIBER_STATUS, &status),
        (ie_type::NETWORK_ACCESS_MODE, &nam),
    ];
    if let Some(bs) = bearer_services {
        ies.push((ie_type::BEARER_SERVICES, bs));
    }
    if let Some(ts) = teleservices {
        ies.push((ie_type::TELESERVICES, ts));
    }
    encode_message(message_type::SEND_SUBSCRIBER_DATA_RESULT, &ies)
}

pub fn send_subscriber_data_error(cause: u8) -> Result<Bytes, IeError> {
    encode_error(message_type::SEND_SUBSCRIBER_DATA_ERROR, cause)
}

pub fn send_routing_info_for_sm_request(imsi: &str) -> Result<Bytes, IeError> {
    encode_message(
        message_type::SEND_ROUTING_INFO_FOR_SM_REQUEST,
        &[(ie_type::IMSI, imsi.as_bytes())],
    )
}

pub fn send_routing_info_for_sm_result(
    imsi: &str,
    msc_number: Option<&str>,
    sgsn_number: Option<&str>,
    mme_number: Option<&str>,
) -> Result<Bytes, IeError> {
    let mut ies: Vec<(u8, &[u8])> = vec![(ie_type::IMSI, imsi.as_bytes())];
    if let Some(v) = msc_number {
        ies.push((ie_type::MSC_NUMBER, v.as_bytes()));
    }
    if let Some(v) = sgsn_number {
        ies.push((ie_type::SGSN_NUMBER, v.as_bytes()));
    }
    if let Some(v) = mme_number {
        ies.push((ie_type::MME_NUMBER, v.as_bytes()));
    }
    encode_message(message_type::SEND_ROUTING_INFO_FOR_SM_RESULT, &ies)
}

pub fn send_routing_info_for_sm_error(cause: u8) -> Result<Bytes, IeError> {
    encode_error(message_type::SEND_ROUTING_INFO_FOR_SM_ERROR, cause)
}

pub fn update_location_request(
    imsi: &str,
    vlr_number: Option<&str>,
    msc_number: Option<&str>,
) -> Result<Bytes, IeError> {
    let mut ies: Vec<(u8, &[u8])> = vec![(ie_type::IMSI, imsi.as_bytes())];
    if let Some(v) = vlr_number {
        ies.push((ie_type::VLR_NUMBER, v.as_bytes()));
    }
    if let Some(v) = msc_number {
        ies.push((ie_type::MSC_NUMBER, v.as_bytes()));
    }
    encode_message(message_type::UPDATE_LOCATION_REQUEST, &ies)
}

pub fn update_location_result(imsi: &str) -> Result<Bytes, IeError> {
    encode_message(
        message_type::UPDATE_LOCATION_RESULT,
        &[(ie_type::IMSI, imsi.as_bytes())],
    )
}

pub fn update_location_error(cause: u8) -> Result<Bytes, IeError> {
    encode_error(message_type::UPDATE_LOCATION_ERROR, cause)
}

pub fn insert_subscriber_data_request(
    imsi: &str,
    msisdn: Option<&str>,
) -> Result<Bytes, IeError> {
    let status = [subscriber_status::SERVICE_GRANTED];
    let nam = [network_access_mode::PACKET_AND_CIRCUIT];
    let flags = [0x00u8];
    let bearer_caps = [0x00u8];
    let mut ies: Vec<(u8, &[u8])> = vec![(ie_type::IMSI, imsi.as_bytes())];
    if let Some(v) = msisdn {
        ies.push((ie_type::MSISDN, v.as_bytes()));
    }
    ies.push((ie_type::SUBSCRIBER_STATUS, &status));
    ies.push((ie_type::NETWORK_ACCESS_MODE, &nam));
    ies.push((ie_type::SUBSCRIBER_DATA_FLAGS, &flags));
    ies.push((ie_type::GSM_BEARER_CAPABILITIES, &bearer_caps));
    encode_message(message_type::INSERT_SUBSCRIBER_DATA_REQUEST, &ies)
}

pub fn insert_subscriber_data_result(imsi: &str) -> Result<Bytes, IeError> {
    encode_message(
        message_type::INSERT_SUBSCRIBER_DATA_RESULT,
        &[(ie_type::IMSI, imsi.as_bytes())],
    )
}

fn encode_error(message_type: u8, cause: u8) -> Result<Bytes, IeError> {
    encode_message(message_type, &[(ie_type::CAUSE, &[cause])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_send_auth_info_result() {
        let rand = [0x00u8, 0x01, 0x02, 0x03];
        let autn = [0x10u8, 0x11, 0x12, 0x13];
        let encoded = send_auth_info_result("001017890123453", &rand, &autn).unwrap();

        let decoded = decode_message(&encoded).unwrap();
        assert_eq!(decoded.message_type, message_type::SEND_AUTH_INFO_RESULT);
        assert_eq!(decoded.imsi().unwrap(), "001017890123453");
        assert_eq!(&decoded.ie(ie_type::RAND).unwrap()[..], &rand);
        assert_eq!(&decoded.ie(ie_type::AUTN).unwrap()[..], &autn);
    }

    #[test]
    fn empty_payload_is_protocol_error() {
        let err = decode_message(&[]).unwrap_err();
        assert!(matches!(
            err,
            HlrError::Protocol(ProtocolError::EmptyPayload)
        ));
    }

    #[test]
    fn duplicate_ie_is_protocol_error() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&[message_type::SEND_AUTH_INFO_REQUEST]);
        ie::encode_ie(&mut buf, ie_type::IMSI, b"001017890123453").unwrap();
        ie::encode_ie(&mut buf, ie_type::IMSI, b"999999999999999").unwrap();

        let err = decode_message(&buf).unwrap_err();
        assert!(matches!(
            err,
            HlrError::Protocol(ProtocolError::DuplicateIe(ie_type::IMSI))
        ));
    }

    #[test]
    fn missing_imsi_is_protocol_error() {
        let encoded = encode_message(message_type::SEND_AUTH_INFO_REQUEST, &[]).unwrap();
        let decoded = decode_message(&encoded).unwrap();
        assert!(matches!(
            decoded.imsi().unwrap_err(),
            ProtocolError::MissingIe(ie_type::IMSI)
        ));
    }

    #[test]
    fn imsi_length_validated() {
        assert!(decode_imsi(b"1234").is_err());
        assert!(decode_imsi(b"1234567890123456").is_err());
        assert!(decode_imsi(b"12a4567890").is_err());
        assert!(decode_imsi(b"001017890123453").is_ok());
    }

    #[test]
    fn update_location_error_carries_cause() {
        let encoded = update_location_error(cause::PROTOCOL_ERROR).unwrap();
        let decoded = decode_message(&encoded).unwrap();
        assert_eq!(decoded.message_type, message_type::UPDATE_LOCATION_ERROR);
        assert_eq!(decoded.ie(ie_type::CAUSE).unwrap()[0], cause::PROTOCOL_ERROR);
    }
}
