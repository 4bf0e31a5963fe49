//! Per-connection protocol state machine, spec §4.5.
//!
//! One task per connection (spec §5), processing frames strictly
//! sequentially. The Update Location procedure (§4.5.4) is the one
//! stateful, multi-leg exchange: rather than spawning a second reader for
//! the nested InsertSubscriberDataResult (the design note in spec §9 warns
//! against that), the handler simply keeps driving the same read loop
//! in-line until the correlated reply arrives or the bound expires — there
//! is still only ever one reader of the socket, it's just that this
//! function is that reader for the duration of the wait.

use crate::auth::AuthClient;
use crate::errors::{HlrError, Result};
use crate::gsup::constants::{cause, ie_type, message_type};
use crate::gsup::{self, GsupMessage};
use crate::ipa::ccm::CcmOutcome;
use crate::ipa::{self, ccm, frame, IpaFrame};
use crate::routing::{RoutingEntry, RoutingStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout_at;
use tracing::{debug, info, instrument, warn};

/// GSUP payload protocol byte used for outbound frames. Spec §6.1 defines
/// only the CCM sentinel (`0xFE`) precisely and treats any other value as
/// "embedded GSUP"; this implementation picks a single fixed discriminator
/// for frames it originates.
pub const GSUP_PROTOCOL: u8 = 0x01;

/// Connection handshake progress, spec §3. No GSUP request is currently
/// rejected based on this state (spec §4.5 leaves that policy to a future
/// deployment); it is tracked so that policy has something to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    PreId,
    Identified,
    PingedOk,
}

/// A single in-flight Update Location procedure, spec §3/§4.5.4.
struct PendingUpdateLocation {
    imsi: String,
    started_at: Instant,
}

/// Shared collaborators a connection's handlers consult.
#[derive(Clone)]
pub struct HandlerContext {
    pub auth_client: Arc<dyn AuthClient>,
    pub routing: RoutingStore,
    pub update_location_timeout: Duration,
}

/// Per-connection state, spec §3.
pub struct Connection<S> {
    stream: S,
    peer_addr: SocketAddr,
    handshake_state: HandshakeState,
    pending_update_location: Option<PendingUpdateLocation>,
    ctx: HandlerContext,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer_addr: SocketAddr, ctx: HandlerContext) -> Self {
        Self {
            stream,
            peer_addr,
            handshake_state: HandshakeState::PreId,
            pending_update_location: None,
            ctx,
        }
    }

    /// Drive the connection until the peer closes it or a fatal framing
    /// error occurs. Every exit path closes the socket (dropping `self`).
    #[instrument(skip(self), fields(peer = %self.peer_addr))]
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let frame = match frame::read_frame(&mut self.stream).await {
                Ok(f) => f,
                Err(crate::errors::FramingError::ConnectionClosed) => {
                    info!("peer closed connection");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if frame.is_ccm() {
                self.handle_ccm_frame(&frame).await?;
                continue;
            }

            self.handle_gsup_frame(&frame).await?;
        }
    }

    async fn handle_ccm_frame(&mut self, frame: &IpaFrame) -> Result<()> {
        match ccm::handle(&frame.payload) {
            CcmOutcome::Reply(payload) => {
                frame::write_frame(&mut self.stream, ipa::CCM_PROTOCOL, &payload).await?;
                let is_ping = frame.payload.first() == Some(&ccm::ccm_type::PING);
                if is_ping && self.handshake_state == HandshakeState::PreId {
                    self.handshake_state = HandshakeState::PingedOk;
                }
            }
            CcmOutcome::MarkIdentified => {
                self.handshake_state = HandshakeState::Identified;
            }
            CcmOutcome::Ignored => {}
        }
        Ok(())
    }

    async fn handle_gsup_frame(&mut self, frame: &IpaFrame) -> Result<()> {
        let message_type_byte = match frame.payload.first() {
            Some(&b) => b,
            None => {
                // No type byte to reply against; spec §7 treats this like
                // an unknown message type: log only, connection stays open.
                warn!("ignoring empty GSUP payload");
                return Ok(());
            }
        };

        let message = match gsup::decode_message(&frame.payload) {
            Ok(m) => m,
            Err(HlrError::Protocol(_)) => {
                return self.reply_protocol_error(message_type_byte).await;
            }
            Err(e) => return Err(e),
        };

        let reply = match message.message_type {
            message_type::SEND_AUTH_INFO_REQUEST => Some(self.handle_send_auth_info(&message).await?),
            message_type::SEND_SUBSCRIBER_DATA_REQUEST => {
                Some(self.handle_send_subscriber_data(&message).await?)
            }
            message_type::SEND_ROUTING_INFO_FOR_SM_REQUEST => {
                Some(self.handle_send_routing_info_for_sm(&message).await?)
            }
            message_type::UPDATE_LOCATION_REQUEST => Some(self.handle_update_location(&message).await?),
            message_type::INSERT_SUBSCRIBER_DATA_RESULT => {
                // Only ever consumed inline by handle_update_location's
                // correlated wait; arriving here means no Update Location
                // was pending for it. Spec dispatch table: no response.
                debug!("ignoring unsolicited InsertSubscriberDataResult");
                None
            }
            other => {
                warn!(message_type = format!("0x{other:02X}"), "ignoring unknown GSUP message type");
                None
            }
        };

        if let Some(payload) = reply {
            frame::write_frame(&mut self.stream, GSUP_PROTOCOL, &payload).await?;
        }
        Ok(())
    }

    /// Reply to a request we couldn't even fully decode (duplicate IE,
    /// missing IMSI) with the `*Error` message matching its request type,
    /// `Cause=ProtocolError` (spec §7). Request types with no defined
    /// `*Error` reply are logged and otherwise ignored.
    async fn reply_protocol_error(&mut self, message_type_byte: u8) -> Result<()> {
        let payload = match message_type_byte {
            message_type::SEND_AUTH_INFO_REQUEST => gsup::message::send_auth_info_error(cause::PROTOCOL_ERROR)?,
            message_type::SEND_SUBSCRIBER_DATA_REQUEST => {
                gsup::message::send_subscriber_data_error(cause::PROTOCOL_ERROR)?
            }
            message_type::SEND_ROUTING_INFO_FOR_SM_REQUEST => {
                gsup::message::send_routing_info_for_sm_error(cause::PROTOCOL_ERROR)?
            }
            message_type::UPDATE_LOCATION_REQUEST => gsup::message::update_location_error(cause::PROTOCOL_ERROR)?,
            other => {
                warn!(message_type = format!("0x{other:02X}"), "protocol error on a message type with no defined error reply");
                return Ok(());
            }
        };
        frame::write_frame(&mut self.stream, GSUP_PROTOCOL, &payload).await?;
        Ok(())
    }

    // ==================== §4.5.1 Authentication Info ====================

    #[instrument(skip(self, message))]
    async fn handle_send_auth_info(&mut self, message: &GsupMessage) -> Result<bytes::Bytes> {
        let imsi = match message.imsi() {
            Ok(imsi) => imsi,
            Err(_) => return Ok(gsup::message::send_auth_info_error(cause::PROTOCOL_ERROR)?),
        };

        // Bug-compatible mapping preserved from the source under test:
        // ki -> RAND, opc -> AUTN. Not a correct Milenage derivation
        // (spec §4.5.1/§9).
        let pair = self
            .ctx
            .auth_client
            .fetch_auth_data(&imsi)
            .await
            .and_then(|record| Ok((record.ki_bytes()?, record.opc_bytes()?)));

        match pair {
            Ok((rand, autn)) => Ok(gsup::message::send_auth_info_result(&imsi, &rand, &autn)?),
            Err(e) => {
                warn!(imsi, error = %e, "auth info request failed");
                Ok(gsup::message::send_auth_info_error(cause::IMSI_UNKNOWN)?)
            }
        }
    }

    // ==================== §4.5.2 Subscriber Data ====================

    #[instrument(skip(self, message))]
    async fn handle_send_subscriber_data(&mut self, message: &GsupMessage) -> Result<bytes::Bytes> {
        let imsi = match message.imsi() {
            Ok(imsi) => imsi,
            Err(_) => return Ok(gsup::message::send_subscriber_data_error(cause::PROTOCOL_ERROR)?),
        };

        match self.ctx.auth_client.fetch_auth_data(&imsi).await {
            Ok(record) => {
                let msisdn = record.msisdn.unwrap_or_default();
                Ok(gsup::message::send_subscriber_data_result(
                    &imsi, &msisdn, None, None,
                )?)
            }
            Err(e) => {
                warn!(imsi, error = %e, "subscriber data request failed");
                Ok(gsup::message::send_subscriber_data_error(
                    cause::SUBSCRIBER_DATA_NOT_AVAILABLE,
                )?)
            }
        }
    }

    // ==================== §4.5.3 Routing Info for SM ====================

    #[instrument(skip(self, message))]
    async fn handle_send_routing_info_for_sm(&mut self, message: &GsupMessage) -> Result<bytes::Bytes> {
        let imsi = match message.imsi() {
            Ok(imsi) => imsi,
            Err(_) => return Ok(gsup::message::send_routing_info_for_sm_error(cause::PROTOCOL_ERROR)?),
        };

        let entry = self.ctx.routing.get(&imsi).await;
        match entry {
            Some(e) if e.has_any_number() => Ok(gsup::message::send_routing_info_for_sm_result(
                &imsi,
                e.msc_number.as_deref(),
                e.sgsn_number.as_deref(),
                e.mme_number.as_deref(),
            )?),
            _ => Ok(gsup::message::send_routing_info_for_sm_error(
                cause::SMS_ROUTING_ERROR,
            )?),
        }
    }

    // ==================== §4.5.4 Update Location ====================

    #[instrument(skip(self, message))]
    async fn handle_update_location(&mut self, message: &GsupMessage) -> Result<bytes::Bytes> {
        let imsi = match message.imsi() {
            Ok(imsi) => imsi,
            Err(_) => return Ok(gsup::message::update_location_error(cause::PROTOCOL_ERROR)?),
        };

        if self.pending_update_location.is_some() {
            return Ok(gsup::message::update_location_error(cause::PROTOCOL_ERROR)?);
        }

        self.pending_update_location = Some(PendingUpdateLocation {
            imsi: imsi.clone(),
            started_at: Instant::now(),
        });

        let record = match self.ctx.auth_client.fetch_auth_data(&imsi).await {
            Ok(record) => record,
            Err(e) => {
                warn!(imsi, error = %e, "update location provisioner lookup failed");
                self.pending_update_location = None;
                return Ok(gsup::message::update_location_error(
                    cause::SUBSCRIBER_DATA_NOT_AVAILABLE,
                )?);
            }
        };

        let insert_request =
            gsup::message::insert_subscriber_data_request(&imsi, record.msisdn.as_deref())?;
        frame::write_frame(&mut self.stream, GSUP_PROTOCOL, &insert_request).await?;

        match self.await_insert_subscriber_data_result(&imsi).await {
            Ok(()) => {
                let vlr = message.ie(ie_type::VLR_NUMBER).cloned();
                let msc = message.ie(ie_type::MSC_NUMBER).cloned();
                let sgsn = message.ie(ie_type::SGSN_NUMBER).cloned();

                self.ctx
                    .routing
                    .upsert(
                        &imsi,
                        RoutingEntry {
                            vlr_number: vlr.map(|v| String::from_utf8_lossy(&v).into_owned()),
                            msc_number: msc.map(|v| String::from_utf8_lossy(&v).into_owned()),
                            sgsn_number: sgsn.map(|v| String::from_utf8_lossy(&v).into_owned()),
                            mme_number: None,
                        },
                    )
                    .await;

                self.pending_update_location = None;
                Ok(gsup::message::update_location_result(&imsi)?)
            }
            Err(()) => {
                self.pending_update_location = None;
                Ok(gsup::message::update_location_error(cause::PROTOCOL_ERROR)?)
            }
        }
    }

    /// Wait for the correlated InsertSubscriberDataResult, bounded by
    /// `update_location_timeout`. CCM frames arriving in the window are
    /// handled normally and do not count as the awaited result (spec
    /// §4.5.4 step 5).
    async fn await_insert_subscriber_data_result(&mut self, expected_imsi: &str) -> std::result::Result<(), ()> {
        let deadline = match self.pending_update_location.as_ref() {
            Some(p) => p.started_at + self.ctx.update_location_timeout,
            None => return Err(()),
        };

        loop {
            let frame = match timeout_at(deadline.into(), frame::read_frame(&mut self.stream)).await {
                Ok(Ok(frame)) => frame,
                Ok(Err(_)) | Err(_) => return Err(()),
            };

            if frame.is_ccm() {
                if self.handle_ccm_frame(&frame).await.is_err() {
                    return Err(());
                }
                continue;
            }

            let message = match gsup::decode_message(&frame.payload) {
                Ok(m) => m,
                Err(_) => return Err(()),
            };

            if message.message_type != message_type::INSERT_SUBSCRIBER_DATA_RESULT {
                return Err(());
            }

            return match message.imsi() {
                Ok(got) if got == expected_imsi => Ok(()),
                _ => Err(()),
            };
        }
    }
}
