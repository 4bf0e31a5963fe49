//! GSUP message-type, IE-type and cause constants, spec §6.2.
//!
//! The source repository this was distilled from defines some of these
//! message types twice with conflicting values (`InsertSubscriberData*` as
//! both `0x07` and `0x10`). This module adopts the 3GPP-consistent values
//! per spec §9: `Insert*` = `0x07/0x08/0x09`, `SendSubscriberData*` =
//! `0x10/0x11/0x12`.

/// GSUP message-type byte.
pub mod message_type {
    pub const UPDATE_LOCATION_REQUEST: u8 = 0x04;
    pub const UPDATE_LOCATION_RESULT: u8 = 0x05;
    pub const UPDATE_LOCATION_ERROR: u8 = 0x06;

    pub const INSERT_SUBSCRIBER_DATA_REQUEST: u8 = 0x07;
    pub const INSERT_SUBSCRIBER_DATA_RESULT: u8 = 0x08;
    pub const INSERT_SUBSCRIBER_DATA_ERROR: u8 = 0x09;

    pub const SEND_AUTH_INFO_REQUEST: u8 = 0x0A;
    pub const SEND_AUTH_INFO_RESULT: u8 = 0x0B;
    pub const SEND_AUTH_INFO_ERROR: u8 = 0x0C;

    pub const SEND_SUBSCRIBER_DATA_REQUEST: u8 = 0x10;
    pub const SEND_SUBSCRIBER_DATA_RESULT: u8 = 0x11;
    pub const SEND_SUBSCRIBER_DATA_ERROR: u8 = 0x12;

    pub const SEND_ROUTING_INFO_FOR_SM_REQUEST: u8 = 0x14;
    pub const SEND_ROUTING_INFO_FOR_SM_RESULT: u8 = 0x15;
    pub const SEND_ROUTING_INFO_FOR_SM_ERROR: u8 = 0x16;
}

/// GSUP IE-type byte.
pub mod ie_type {
    pub const IMSI: u8 = 0x01;
    pub const CAUSE: u8 = 0x02;
    pub const RAND: u8 = 0x04;
    pub const AUTN: u8 = 0x09;
    pub const MSISDN: u8 = 0x0C;
    pub const SUBSCRIBER_STATUS: u8 = 0x0D;
    pub const NETWORK_ACCESS_MODE: u8 = 0x0E;
    pub const BEARER_SERVICES: u8 = 0x0F;
    pub const TELESERVICES: u8 = 0x10;
    pub const VLR_NUMBER: u8 = 0x11;
    pub const MSC_NUMBER: u8 = 0x12;
    pub const SGSN_NUMBER: u8 = 0x13;
    /// MME Number. Context here is SMS routing (spec §6.2), distinct from
    /// the location-management GMLC number some 3GPP texts assign to this
    /// tag value.
    pub const MME_NUMBER: u8 = 0x14;
    pub const SM_RP_DA: u8 = 0x15;
    pub const SM_RP_OA: u8 = 0x16;
    pub const SUBSCRIBER_DATA_FLAGS: u8 = 0x18;
    pub const GSM_BEARER_CAPABILITIES: u8 = 0x19;
}

/// GSUP cause values carried in error responses.
pub mod cause {
    pub const IMSI_UNKNOWN: u8 = 0x02;
    pub const ILLEGAL_MS: u8 = 0x03;
    pub const AUTH_UNACCEPTABLE: u8 = 0x05;
    pub const SUBSCRIBER_DATA_NOT_AVAILABLE: u8 = 0x1A;
    pub const SMS_ROUTING_ERROR: u8 = 0x1B;
    pub const PROTOCOL_ERROR: u8 = 0x6F;
}

/// Subscriber status values, spec §4.5.2.
pub mod subscriber_status {
    pub const SERVICE_GRANTED: u8 = 0x00;
}

/// Network access mode values, spec §4.5.2.
pub mod network_access_mode {
    pub const PACKET_AND_CIRCUIT: u8 = 0x00;
}
