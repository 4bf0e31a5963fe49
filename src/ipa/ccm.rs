//! CCM (the IPA control sub-protocol), spec §4.4/§6.3.
//!
//! Answers PING with PONG, Identity Request with Identity Response, and
//! silently acknowledges Identity ACK. CCM frames are valid in any
//! handshake-state and are handled the same way regardless of when they
//! arrive (spec §4.5) — in particular a PING during the nested Update
//! Location wait gets a PONG without disturbing the pending procedure.

use bytes::{BufMut, Bytes, BytesMut};

/// CCM sub-type, carried as the first payload byte.
pub mod ccm_type {
    pub const PING: u8 = 0x00;
    pub const PONG: u8 = 0x01;
    pub const ID_REQUEST: u8 = 0x04;
    pub const ID_RESPONSE: u8 = 0x05;
    pub const ID_ACK: u8 = 0x06;
}

mod ccm_tag {
    pub const SERIAL_NUMBER: u8 = 0x00;
    pub const UNIT_NAME: u8 = 0x01;
    pub const LOCATION: u8 = 0x02;
    pub const UNIT_TYPE: u8 = 0x03;
    pub const EQUIPMENT_VERSION: u8 = 0x04;
    pub const SOFTWARE_VERSION: u8 = 0x05;
    pub const MAC_ADDRESS: u8 = 0x07;
    pub const UNIT_ID: u8 = 0x08;
}

/// Default software-version string reported in the Identity Response.
const SOFTWARE_VERSION: &str = "osmo-hlr-rs-1.0.0";
/// Default serial-number string reported in the Identity Response.
const SERIAL_NUMBER: &str = "unnamed-hlr";
/// Unit name reported in the Identity Response, spec §6.3.
const UNIT_NAME: &str = "HLR";

/// What the connection handler should do in response to an inbound CCM
/// frame.
pub enum CcmOutcome {
    /// Write this payload back as a CCM frame.
    Reply(Bytes),
    /// No reply; mark the connection `identified`.
    MarkIdentified,
    /// No reply, no state change (e.g. an unrecognized CCM sub-type).
    Ignored,
}

/// Handle one CCM payload (the frame's payload after the IPA header).
pub fn handle(payload: &[u8]) -> CcmOutcome {
    match payload.first() {
        Some(&ccm_type::PING) => CcmOutcome::Reply(build_pong()),
        Some(&ccm_type::ID_REQUEST) => CcmOutcome::Reply(build_identity_response()),
        Some(&ccm_type::ID_ACK) => CcmOutcome::MarkIdentified,
        _ => CcmOutcome::Ignored,
    }
}

fn build_pong() -> Bytes {
    Bytes::from_static(&[ccm_type::PONG])
}

fn build_identity_response() -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_u8(ccm_type::ID_RESPONSE);
    push_tag_value(&mut buf, ccm_tag::UNIT_ID, "0/0/0");
    push_tag_value(&mut buf, ccm_tag::MAC_ADDRESS, "00:00:00:00:00:00");
    push_tag_value(&mut buf, ccm_tag::LOCATION, "");
    push_tag_value(&mut buf, ccm_tag::UNIT_TYPE, "");
    push_tag_value(&mut buf, ccm_tag::EQUIPMENT_VERSION, "");
    push_tag_value(&mut buf, ccm_tag::SOFTWARE_VERSION, SOFTWARE_VERSION);
    push_tag_value(&mut buf, ccm_tag::UNIT_NAME, UNIT_NAME);
    push_tag_value(&mut buf, ccm_tag::SERIAL_NUMBER, SERIAL_NUMBER);
    buf.freeze()
}

/// `[tag][utf-8 value][0x00]`, spec §4.4/§6.3.
fn push_tag_value(buf: &mut BytesMut, tag: u8, value: &str) {
    buf.put_u8(tag);
    buf.put_slice(value.as_bytes());
    buf.put_u8(0x00);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_gets_pong() {
        match handle(&[ccm_type::PING]) {
            CcmOutcome::Reply(b) => assert_eq!(&b[..], &[ccm_type::PONG]),
            _ => panic!("expected a reply"),
        }
    }

    #[test]
    fn identity_ack_marks_identified_with_no_reply() {
        assert!(matches!(handle(&[ccm_type::ID_ACK]), CcmOutcome::MarkIdentified));
    }

    #[test]
    fn identity_response_has_eight_tag_value_pairs_in_order() {
        let body = match handle(&[ccm_type::ID_REQUEST]) {
            CcmOutcome::Reply(b) => b,
            _ => panic!("expected a reply"),
        };
        assert_eq!(body[0], ccm_type::ID_RESPONSE);

        let mut offset = 1;
        let expected_tags = [
            ccm_tag::UNIT_ID,
            ccm_tag::MAC_ADDRESS,
            ccm_tag::LOCATION,
            ccm_tag::UNIT_TYPE,
            ccm_tag::EQUIPMENT_VERSION,
            ccm_tag::SOFTWARE_VERSION,
            ccm_tag::UNIT_NAME,
            ccm_tag::SERIAL_NUMBER,
        ];
        for expected_tag in expected_tags {
            assert_eq!(body[offset], expected_tag);
            offset += 1;
            let nul = body[offset..].iter().position(|&b| b == 0).unwrap();
            offset += nul + 1;
        }
        assert_eq!(offset, body.len());
    }

    #[test]
    fn unknown_ccm_subtype_is_ignored() {
        assert!(matches!(handle(&[0xFF]), CcmOutcome::Ignored));
    }
}
