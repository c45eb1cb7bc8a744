use bytes::{BufMut, BytesMut};

use crate::codec::{
    offset, PacketHeader, HEADER_SIZE, INLINE_CAPACITY, MSG_TYPE_LONG_WRITE, MSG_TYPE_READ,
};
use crate::error::{FrameError, Result};

/// Largest signal count a write can carry in the inline frame shape.
pub const INLINE_SIGNAL_MAX: usize = 48;

/// Sub-opcode inserted ahead of the relocated service fields in an
/// appended write frame.
const APPENDED_SUBCODE: [u8; 2] = [0x01, 0x01];

/// The two wire shapes a write frame can take.
///
/// Inline frames splice the payload into the header's reserved tail and
/// stay exactly [`HEADER_SIZE`] bytes long. Appended frames relocate the
/// service fields, drop the reserved tail, and carry the payload after
/// the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFrame {
    Inline,
    Appended,
}

impl WriteFrame {
    /// Select the frame shape for a digital-signal write of `count` bits.
    pub fn for_signals(count: usize) -> Self {
        if count > INLINE_SIGNAL_MAX {
            Self::Appended
        } else {
            Self::Inline
        }
    }

    /// Select the frame shape for a raw payload of `len` bytes.
    pub fn for_payload(len: usize) -> Self {
        if len > INLINE_CAPACITY {
            Self::Appended
        } else {
            Self::Inline
        }
    }

    /// Encode a write frame of this shape.
    pub fn encode(self, header: &PacketHeader, payload: &[u8]) -> Result<BytesMut> {
        match self {
            Self::Inline => encode_inline(header, payload),
            Self::Appended => encode_appended(header, payload),
        }
    }
}

/// Inline shape: payload overlays the reserved tail at offset 48; the
/// frame length stays at exactly 56 bytes.
fn encode_inline(header: &PacketHeader, payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > INLINE_CAPACITY {
        return Err(FrameError::InlineOverflow {
            len: payload.len(),
            max: INLINE_CAPACITY,
        });
    }

    let mut header = header.clone();
    header.packet_index = 0x01;
    header.packet_total = 0x01;
    header.message_type = MSG_TYPE_READ;

    let mut buf = header.encode();
    buf[offset::RESERVED_TAIL..offset::RESERVED_TAIL + payload.len()].copy_from_slice(payload);
    Ok(BytesMut::from(&buf[..]))
}

/// Appended shape: six zero bytes displace the service fields to offset
/// 50 behind the sub-opcode, the reserved tail is dropped, and the
/// payload follows the 56-byte header with its length at offset 4.
fn encode_appended(header: &PacketHeader, payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > u8::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: u8::MAX as usize,
        });
    }

    let mut header = header.clone();
    header.packet_index = 0x02;
    header.packet_total = 0x02;
    header.message_type = MSG_TYPE_LONG_WRITE;
    header.text_len = payload.len() as u8;
    let base = header.encode();

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_slice(&base[..offset::SERVICE]);
    buf.put_bytes(0, 6);
    buf.put_slice(&APPENDED_SUBCODE);
    buf.put_u8(header.service);
    buf.put_u8(header.area);
    buf.put_u16_le(header.start_address);
    buf.put_u16_le(header.data_size);
    buf.put_slice(payload);

    debug_assert_eq!(buf.len(), HEADER_SIZE + payload.len());
    Ok(buf)
}
