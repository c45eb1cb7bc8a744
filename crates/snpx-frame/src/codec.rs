use bytes::BytesMut;

use crate::error::{FrameError, Result};

/// Fixed packet header size. Every frame starts with exactly this many bytes.
pub const HEADER_SIZE: usize = 56;

/// Offset at which an appended (out-of-header) payload begins.
pub const PAYLOAD_OFFSET: usize = HEADER_SIZE;

/// Capacity of the reserved tail region (offsets 48..56) available to
/// inline write payloads.
pub const INLINE_CAPACITY: usize = 8;

/// Message-type byte for read-style and short-write frames.
pub const MSG_TYPE_READ: u8 = 0xC0;

/// Message-type byte for long-write frames with an appended payload.
pub const MSG_TYPE_LONG_WRITE: u8 = 0x80;

/// Frame type of ordinary data frames.
pub const FRAME_TYPE_DATA: u8 = 0x02;

/// Frame type of the protocol negotiation frame sent during session setup.
pub const FRAME_TYPE_NEGOTIATE: u8 = 0x08;

/// Byte offsets of the header fields. The layout is fixed by the wire
/// format and must be reproduced bit-for-bit.
pub mod offset {
    /// Frame type.
    pub const FRAME_TYPE: usize = 0;
    /// Bit/word count depending on operation (LE16). Command-style frames
    /// carry the non-advancing sequence value here instead.
    pub const COUNT: usize = 2;
    /// Appended payload length in bytes (string assignment length).
    pub const TEXT_LEN: usize = 4;
    /// Packet index within the request.
    pub const PACKET_INDEX: usize = 9;
    /// Total packet count of the request.
    pub const PACKET_TOTAL: usize = 17;
    /// Mirrors the low byte of the count field.
    pub const SIZE_ECHO: usize = 30;
    /// Message-type byte (0xC0 read-style, 0x80 long-write).
    pub const MESSAGE_TYPE: usize = 31;
    /// Source mailbox (4 bytes, constant).
    pub const SOURCE_MAILBOX: usize = 36;
    /// Destination mailbox (constant for this client).
    pub const DEST_MAILBOX: usize = 40;
    /// Service-request code (0x04 read, 0x07 write).
    pub const SERVICE: usize = 42;
    /// Memory-area / signal code.
    pub const AREA: usize = 43;
    /// Zero-based word/bit start address (LE16).
    pub const START_ADDRESS: usize = 44;
    /// Data size in bytes (LE16), rounded as the operation requires.
    pub const DATA_SIZE: usize = 46;
    /// Reserved tail, spliced with the payload of inline writes.
    pub const RESERVED_TAIL: usize = 48;
}

/// The 56-byte base template every request starts from.
///
/// Constant regions: frame type 0x02, packet index/total 1, source mailbox
/// `10 0e 00 00` at 36..40, destination mailbox bytes `01 01` at 40..42,
/// default service 0x04 and area 0x46.
pub const BASE_TEMPLATE: [u8; HEADER_SIZE] = [
    0x02, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x0e, 0x00, 0x00, //
    0x01, 0x01, 0x04, 0x46, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Named view of the mutable header fields.
///
/// The wire layout (little-endian multi-byte fields):
///
/// ```text
/// ┌────────┬──────────────────┬─────────────────────────────────────────┐
/// │ Offset │ Field            │ Notes                                   │
/// ├────────┼──────────────────┼─────────────────────────────────────────┤
/// │ 0      │ frame type       │ 0x02 data, 0x08 negotiation             │
/// │ 2–3    │ count (LE16)     │ bit/word count, or sequence value       │
/// │ 4      │ text length      │ appended payload byte count             │
/// │ 9, 17  │ index / total    │ packet index and total-packet count     │
/// │ 30     │ size echo        │ low byte of count                       │
/// │ 31     │ message type     │ 0xC0 read-style / 0x80 long-write       │
/// │ 36–41  │ mailboxes        │ constant routing fields                 │
/// │ 42     │ service code     │ 0x04 read, 0x07 write                   │
/// │ 43     │ memory area      │ I/O table or register space             │
/// │ 44–45  │ start addr (LE16)│ zero-based word/bit address             │
/// │ 46–47  │ data size (LE16) │ allocation size in bytes                │
/// │ 48–55  │ reserved tail    │ inline payload region for short writes  │
/// └────────┴──────────────────┴─────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    pub frame_type: u8,
    pub count: u16,
    pub text_len: u8,
    pub packet_index: u8,
    pub packet_total: u8,
    pub message_type: u8,
    pub service: u8,
    pub area: u8,
    pub start_address: u16,
    pub data_size: u16,
}

impl Default for PacketHeader {
    fn default() -> Self {
        Self {
            frame_type: FRAME_TYPE_DATA,
            count: 0,
            text_len: 0,
            packet_index: 1,
            packet_total: 1,
            message_type: 0,
            service: 0x04,
            area: 0x46,
            start_address: 0,
            data_size: 0,
        }
    }
}

impl PacketHeader {
    /// Serialize the header onto the base template.
    ///
    /// The size-echo byte is derived from the count field; the mailbox
    /// regions come from the template unchanged.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = BASE_TEMPLATE;
        buf[offset::FRAME_TYPE] = self.frame_type;
        buf[offset::COUNT..offset::COUNT + 2].copy_from_slice(&self.count.to_le_bytes());
        buf[offset::TEXT_LEN] = self.text_len;
        buf[offset::PACKET_INDEX] = self.packet_index;
        buf[offset::PACKET_TOTAL] = self.packet_total;
        buf[offset::SIZE_ECHO] = (self.count & 0xFF) as u8;
        buf[offset::MESSAGE_TYPE] = self.message_type;
        buf[offset::SERVICE] = self.service;
        buf[offset::AREA] = self.area;
        buf[offset::START_ADDRESS..offset::START_ADDRESS + 2]
            .copy_from_slice(&self.start_address.to_le_bytes());
        buf[offset::DATA_SIZE..offset::DATA_SIZE + 2]
            .copy_from_slice(&self.data_size.to_le_bytes());
        buf
    }

    /// Parse the fixed-offset fields from a received buffer.
    ///
    /// Fails with [`FrameError::Truncated`] if the buffer is shorter than
    /// the minimum header size.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(FrameError::Truncated { len: buf.len() });
        }

        Ok(Self {
            frame_type: buf[offset::FRAME_TYPE],
            count: u16::from_le_bytes([buf[offset::COUNT], buf[offset::COUNT + 1]]),
            text_len: buf[offset::TEXT_LEN],
            packet_index: buf[offset::PACKET_INDEX],
            packet_total: buf[offset::PACKET_TOTAL],
            message_type: buf[offset::MESSAGE_TYPE],
            service: buf[offset::SERVICE],
            area: buf[offset::AREA],
            start_address: u16::from_le_bytes([
                buf[offset::START_ADDRESS],
                buf[offset::START_ADDRESS + 1],
            ]),
            data_size: u16::from_le_bytes([buf[offset::DATA_SIZE], buf[offset::DATA_SIZE + 1]]),
        })
    }
}

/// Encode a plain request frame (header only, no payload).
pub fn encode_request(header: &PacketHeader) -> BytesMut {
    BytesMut::from(&header.encode()[..])
}

/// Slice an appended payload out of a received frame.
///
/// Payload starts at the protocol-defined payload offset; the returned
/// slice is clamped to the declared length and to what was actually
/// received.
pub fn extract_payload(buf: &[u8], declared_len: usize) -> &[u8] {
    if buf.len() <= PAYLOAD_OFFSET {
        return &[];
    }
    let payload = &buf[PAYLOAD_OFFSET..];
    &payload[..declared_len.min(payload.len())]
}
