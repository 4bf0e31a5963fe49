//! IPA (IP Access) multiplexing frame, spec §4.3/§6.1.
//!
//! `{length: u16 big-endian, protocol: u8, payload: bytes[length]}`. The
//! framer only classifies the protocol byte (CCM sentinel vs. "pass up as
//! GSUP"); it never interprets payload contents.

use crate::errors::FramingError;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol byte marking a CCM control frame.
pub const CCM_PROTOCOL: u8 = 0xFE;

/// A single decoded IPA frame.
#[derive(Debug, Clone)]
pub struct IpaFrame {
    pub protocol: u8,
    pub payload: Bytes,
}

impl IpaFrame {
    pub fn is_ccm(&self) -> bool {
        self.protocol == CCM_PROTOCOL
    }
}

/// Read exactly one IPA frame from `stream`.
///
/// A short header or short payload read is fatal to the connection per
/// spec §4.3/§7 and surfaces as [`FramingError`].
pub async fn read_frame<R>(stream: &mut R) -> Result<IpaFrame, FramingError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 3];
    match stream.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(FramingError::ConnectionClosed)
        }
        Err(_) => return Err(FramingError::ShortHeader(0)),
    }

    let length = u16::from_be_bytes([header[0], header[1]]) as usize;
    let protocol = header[2];

    let mut payload = vec![0u8; length];
    if length > 0 {
        stream
            .read_exact(&mut payload)
            .await
            .map_err(|_| FramingError::ShortPayload {
                expected: length,
                actual: 0,
            })?;
    }

    Ok(IpaFrame {
        protocol,
        payload: Bytes::from(payload),
    })
}

/// Write one IPA frame: a single contiguous header+payload buffer so bytes
/// from two frames on the same connection never interleave (spec §5).
pub async fn write_frame<W>(stream: &mut W, protocol: u8, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::with_capacity(3 + payload.len());
    buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buf.push(protocol);
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn round_trip_frame() {
        let mut out = Vec::new();
        write_frame(&mut out, CCM_PROTOCOL, &[0x00]).await.unwrap();

        let mut cursor = Cursor::new(out);
        let frame = read_frame(&mut cursor).await.unwrap();
        assert!(frame.is_ccm());
        assert_eq!(&frame.payload[..], &[0x00]);
    }

    #[tokio::test]
    async fn concatenated_frames_read_in_order() {
        let mut out = Vec::new();
        write_frame(&mut out, CCM_PROTOCOL, b"a").await.unwrap();
        write_frame(&mut out, 0x01, b"bc").await.unwrap();

        let mut cursor = Cursor::new(out);
        let first = read_frame(&mut cursor).await.unwrap();
        let second = read_frame(&mut cursor).await.unwrap();

        assert_eq!(&first.payload[..], b"a");
        assert_eq!(&second.payload[..], b"bc");
        assert!(!second.is_ccm());
    }

    #[tokio::test]
    async fn empty_stream_is_connection_closed() {
        let mut cursor = Cursor::new(Vec::new());
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FramingError::ConnectionClosed));
    }

    #[tokio::test]
    async fn short_payload_is_fatal() {
        // header declares 5 bytes of payload but only 2 are present
        let mut cursor = Cursor::new(vec![0x00, 0x05, 0xFE, 0x01, 0x02]);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FramingError::ShortPayload { .. }));
    }
}
