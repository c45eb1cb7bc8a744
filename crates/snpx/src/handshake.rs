//! Connection handshake with the controller.
//!
//! A fresh connection is initialized with three exchanges: a 56-byte
//! all-zero probe whose first response byte must equal 1, a protocol
//! negotiation frame, and a `CLRASG` command that clears assignments
//! left over from a prior session. Each frame consumes one response.

use std::io::{Read, Write};

use bytes::BytesMut;
use snpx_frame::{
    encode_request, PacketHeader, PacketReader, PacketWriter, FRAME_TYPE_NEGOTIATE, HEADER_SIZE,
    MSG_TYPE_READ,
};
use tracing::debug;

use crate::codes::SERVICE_NEGOTIATE;
use crate::command::{text_command, CLEAR_COMMAND};
use crate::error::{ClientError, Result};

/// First response byte of an accepted connection probe.
const PROBE_ACK: u8 = 1;

/// Sequence values the fixed setup frames carry, captured from a live
/// trace.
const NEGOTIATE_SEQUENCE: u16 = 1;
const CLEAR_SEQUENCE: u16 = 2;

/// Perform the connection handshake over a freshly opened channel.
pub fn handshake<R: Read, W: Write>(
    reader: &mut PacketReader<R>,
    writer: &mut PacketWriter<W>,
) -> Result<()> {
    writer.send(&[0u8; HEADER_SIZE])?;
    let ack = reader.read_response(64)?;
    match ack.first() {
        Some(&PROBE_ACK) => {}
        Some(&status) => {
            return Err(ClientError::HandshakeFailed(format!(
                "probe rejected (status {status:#04x})"
            )));
        }
        None => {
            return Err(ClientError::HandshakeFailed(
                "empty probe response".to_string(),
            ));
        }
    }
    debug!("probe acknowledged");

    writer.send(&negotiation_request())?;
    reader.read_frame()?;
    debug!("protocol negotiated");

    writer.send(&text_command(CLEAR_SEQUENCE, CLEAR_COMMAND)?)?;
    reader.read_frame()?;
    debug!("stale assignments cleared");

    Ok(())
}

fn negotiation_request() -> BytesMut {
    let header = PacketHeader {
        frame_type: FRAME_TYPE_NEGOTIATE,
        count: NEGOTIATE_SEQUENCE,
        message_type: MSG_TYPE_READ,
        service: SERVICE_NEGOTIATE,
        area: 0x01,
        start_address: 0,
        data_size: 0,
        ..PacketHeader::default()
    };
    encode_request(&header)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;

    use super::*;

    /// Replays one scripted response per read call, like a socket
    /// delivering one controller reply at a time.
    struct ScriptedReader {
        chunks: VecDeque<Vec<u8>>,
        current: Vec<u8>,
        pos: usize,
    }

    impl ScriptedReader {
        fn new(chunks: Vec<Vec<u8>>) -> Self {
            Self {
                chunks: chunks.into(),
                current: Vec::new(),
                pos: 0,
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.current.len() {
                match self.chunks.pop_front() {
                    Some(next) => {
                        self.current = next;
                        self.pos = 0;
                    }
                    None => return Ok(0),
                }
            }
            let n = (self.current.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn ack_frame() -> Vec<u8> {
        encode_request(&PacketHeader::default()).to_vec()
    }

    #[test]
    fn successful_handshake_sends_three_frames() {
        let wire = ScriptedReader::new(vec![vec![PROBE_ACK], ack_frame(), ack_frame()]);
        let mut reader = PacketReader::new(wire);
        let mut writer = PacketWriter::new(Vec::new());

        handshake(&mut reader, &mut writer).unwrap();

        let sent = writer.into_inner();
        assert_eq!(&sent[..HEADER_SIZE], &[0u8; HEADER_SIZE]);
        assert_eq!(sent[HEADER_SIZE], FRAME_TYPE_NEGOTIATE);
        assert_eq!(sent[HEADER_SIZE + 42], SERVICE_NEGOTIATE);
        let clear = &sent[2 * HEADER_SIZE..];
        assert_eq!(&clear[48..54], b"CLRASG");
        assert_eq!(clear.len(), HEADER_SIZE);
    }

    #[test]
    fn rejected_probe_fails() {
        let wire = ScriptedReader::new(vec![vec![0x00]]);
        let mut reader = PacketReader::new(wire);
        let mut writer = PacketWriter::new(Vec::new());

        let err = handshake(&mut reader, &mut writer).unwrap_err();
        assert!(matches!(err, ClientError::HandshakeFailed(_)));
    }

    #[test]
    fn closed_channel_during_handshake() {
        let mut reader = PacketReader::new(Cursor::new(Vec::<u8>::new()));
        let mut writer = PacketWriter::new(Vec::new());

        let err = handshake(&mut reader, &mut writer).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(snpx_frame::FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn negotiation_frame_shape() {
        let frame = negotiation_request();
        let header = PacketHeader::decode(&frame).unwrap();

        assert_eq!(header.frame_type, FRAME_TYPE_NEGOTIATE);
        assert_eq!(header.count, 1);
        assert_eq!(header.service, SERVICE_NEGOTIATE);
        assert_eq!(header.area, 0x01);
    }
}
