//! Digital-signal codec: boolean arrays over the controller's I/O table.
//!
//! Signals are packed least-significant-bit first, byte by byte. Reads
//! are best-effort telemetry: a malformed or undersized response decodes
//! to zero-filled bits rather than an error, and only an empty or
//! too-short response yields an empty sequence.

use bytes::BytesMut;
use snpx_frame::{encode_request, PacketHeader, WriteFrame, HEADER_SIZE, MSG_TYPE_READ};

use crate::codes::{AREA_DIGITAL_IN, AREA_DIGITAL_OUT, SERVICE_READ, SERVICE_WRITE};
use crate::error::Result;

/// An addressable block of the controller's digital I/O table.
///
/// Immutable configuration: the memory-area code and the block's word
/// offset into the I/O table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalBlock {
    /// Memory-area code selecting the I/O table.
    pub code: u8,
    /// Offset of the block within the table.
    pub base: u16,
}

impl SignalBlock {
    /// Digital inputs.
    pub const DIGITAL_IN: SignalBlock = SignalBlock::new(AREA_DIGITAL_IN, 0);
    /// Digital outputs.
    pub const DIGITAL_OUT: SignalBlock = SignalBlock::new(AREA_DIGITAL_OUT, 0);
    /// User operator panel inputs.
    pub const USER_IN: SignalBlock = SignalBlock::new(AREA_DIGITAL_IN, 6000);
    /// User operator panel outputs.
    pub const USER_OUT: SignalBlock = SignalBlock::new(AREA_DIGITAL_OUT, 6000);

    /// A block at `base` in the table selected by `code`.
    pub const fn new(code: u8, base: u16) -> Self {
        Self { code, base }
    }

    /// Absolute address of a 1-based signal index within this block.
    fn address(&self, start_index: u16) -> u16 {
        self.base + start_index.saturating_sub(1)
    }
}

/// Offset of the payload in a short read response, with its two-byte
/// trailer. Observed firmware behavior, not derived from a length field.
const SHORT_PAYLOAD_OFFSET: usize = 44;
const SHORT_TRAILER_LEN: usize = 2;
const SHORT_RESPONSE_MIN: usize = SHORT_PAYLOAD_OFFSET + SHORT_TRAILER_LEN + 1;

/// Round a bit count up to the allocation granularity the controller
/// expects in the data-size field.
pub(crate) fn rounded_allocation(count: usize) -> u16 {
    (count.div_ceil(8) * 8) as u16
}

/// Pack booleans LSB-first: bit `j` of byte `i` is input `i * 8 + j`.
pub fn pack_bits(values: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; values.len().div_ceil(8)];
    for (i, &set) in values.iter().enumerate() {
        if set {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Unpack up to `count` booleans LSB-first from packed bytes.
pub fn unpack_bits(bytes: &[u8], count: usize) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).map(move |bit| (byte >> bit) & 1 == 1))
        .take(count)
        .collect()
}

/// Build a read request for `count` signals starting at a 1-based index.
pub(crate) fn read_request(block: &SignalBlock, count: usize, start_index: u16) -> BytesMut {
    let header = PacketHeader {
        count: count as u16,
        message_type: MSG_TYPE_READ,
        service: SERVICE_READ,
        area: block.code,
        start_address: block.address(start_index),
        data_size: rounded_allocation(count),
        ..PacketHeader::default()
    };
    encode_request(&header)
}

/// Build a write frame for a boolean array, or `None` for an empty array
/// (no packet is sent).
pub(crate) fn write_request(
    block: &SignalBlock,
    values: &[bool],
    start_index: u16,
) -> Result<Option<BytesMut>> {
    if values.is_empty() {
        return Ok(None);
    }

    let count = values.len();
    let header = PacketHeader {
        count: count as u16,
        service: SERVICE_WRITE,
        area: block.code,
        start_address: block.address(start_index),
        data_size: rounded_allocation(count),
        ..PacketHeader::default()
    };

    let frame = WriteFrame::for_signals(count).encode(&header, &pack_bits(values))?;
    Ok(Some(frame))
}

/// Best-effort decode of a digital read response.
///
/// The payload normally starts right after the fixed header; short
/// responses carry it at the fallback offset instead. Undersized
/// payloads zero-fill the remaining requested bits.
pub(crate) fn decode_read_response(resp: &[u8], count: usize) -> Vec<bool> {
    let payload: &[u8] = if resp.len() > HEADER_SIZE {
        &resp[HEADER_SIZE..]
    } else if resp.len() >= SHORT_RESPONSE_MIN {
        &resp[SHORT_PAYLOAD_OFFSET..resp.len() - SHORT_TRAILER_LEN]
    } else {
        return Vec::new();
    };

    let mut bits = unpack_bits(payload, count);
    bits.resize(count, false);
    bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use snpx_frame::MSG_TYPE_LONG_WRITE;

    fn alternating(len: usize) -> Vec<bool> {
        (0..len).map(|i| i % 2 == 0).collect()
    }

    #[test]
    fn pack_is_lsb_first() {
        assert_eq!(pack_bits(&[true, false, true]), vec![0b101]);
        assert_eq!(
            pack_bits(&[false, false, false, false, false, false, false, false, true]),
            vec![0x00, 0x01]
        );
    }

    #[test]
    fn pack_unpack_roundtrip_across_frame_boundary() {
        for count in [0usize, 1, 8, 47, 48, 49, 64, 128] {
            let values = alternating(count);
            let packed = pack_bits(&values);
            assert_eq!(packed.len(), count.div_ceil(8));
            assert_eq!(unpack_bits(&packed, count), values);
        }
    }

    #[test]
    fn rounded_allocation_snaps_to_eight() {
        assert_eq!(rounded_allocation(1), 8);
        assert_eq!(rounded_allocation(8), 8);
        assert_eq!(rounded_allocation(9), 16);
        assert_eq!(rounded_allocation(48), 48);
        assert_eq!(rounded_allocation(128), 128);
    }

    #[test]
    fn read_request_fields() {
        let frame = read_request(&SignalBlock::USER_IN, 12, 3);
        let header = PacketHeader::decode(&frame).unwrap();

        assert_eq!(header.count, 12);
        assert_eq!(header.message_type, MSG_TYPE_READ);
        assert_eq!(header.service, SERVICE_READ);
        assert_eq!(header.area, AREA_DIGITAL_IN);
        assert_eq!(header.start_address, 6002);
        assert_eq!(header.data_size, 16);
    }

    #[test]
    fn small_write_is_inline() {
        let frame = write_request(&SignalBlock::DIGITAL_OUT, &alternating(2), 1)
            .unwrap()
            .unwrap();

        assert_eq!(frame.len(), HEADER_SIZE);
        assert_eq!(frame[31], MSG_TYPE_READ);
        assert_eq!(frame[48], 0b01);
    }

    #[test]
    fn large_write_packs_sixteen_bytes() {
        // 128 alternating signals: appended frame, 16-byte payload,
        // text-length field set to the payload size.
        let frame = write_request(&SignalBlock::DIGITAL_OUT, &alternating(128), 1)
            .unwrap()
            .unwrap();

        assert_eq!(frame.len(), HEADER_SIZE + 16);
        assert_eq!(frame[4], 16);
        assert_eq!(frame[31], MSG_TYPE_LONG_WRITE);
        assert!(frame[HEADER_SIZE..].iter().all(|&b| b == 0b0101_0101));
    }

    #[test]
    fn empty_write_is_a_no_op() {
        let frame = write_request(&SignalBlock::DIGITAL_OUT, &[], 1).unwrap();
        assert!(frame.is_none());
    }

    #[test]
    fn decode_normal_response() {
        let mut resp = vec![0u8; HEADER_SIZE];
        resp.push(0b0000_0101);
        assert_eq!(
            decode_read_response(&resp, 4),
            vec![true, false, true, false]
        );
    }

    #[test]
    fn decode_short_response_uses_fallback_window() {
        // 48 bytes: payload is bytes 44..46 behind the two-byte trailer.
        let mut resp = vec![0u8; 48];
        resp[44] = 0b11;
        assert_eq!(
            decode_read_response(&resp, 4),
            vec![true, true, false, false]
        );
    }

    #[test]
    fn decode_undersized_payload_zero_fills() {
        // One payload byte but twelve bits requested.
        let mut resp = vec![0u8; HEADER_SIZE];
        resp.push(0xFF);
        let bits = decode_read_response(&resp, 12);

        assert_eq!(bits.len(), 12);
        assert!(bits[..8].iter().all(|&b| b));
        assert!(bits[8..].iter().all(|&b| !b));
    }

    #[test]
    fn decode_empty_or_too_short_response() {
        assert!(decode_read_response(&[], 8).is_empty());
        assert!(decode_read_response(&[0u8; 46], 8).is_empty());
        // A bare header still exposes the fallback window: all-clear bits.
        assert_eq!(
            decode_read_response(&[0u8; HEADER_SIZE], 8),
            vec![false; 8]
        );
    }
}
