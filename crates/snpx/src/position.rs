//! Position reads: ordered float vectors from the controller's mapped
//! register space.
//!
//! The controller exposes the current joint and cartesian vectors at
//! fixed register bases. A read requests a fixed byte window large
//! enough for nine float channels; the response carries the values as
//! consecutive little-endian IEEE-754 singles between a fixed lead and
//! trailer. The trim offsets are observed firmware behavior, not derived
//! from a length field, and may shift across firmware revisions.

use bytes::BytesMut;
use snpx_frame::{encode_request, PacketHeader, MSG_TYPE_READ};

use crate::codes::{AREA_REGISTER, SERVICE_READ};

/// Which position vector to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    /// Joint angles.
    Joint,
    /// Cartesian pose.
    Cartesian,
}

impl PositionKind {
    /// Register base address the controller maps this vector at.
    pub fn register_base(self) -> u16 {
        match self {
            PositionKind::Cartesian => 12000,
            PositionKind::Joint => 12026,
        }
    }
}

/// Bytes requested per position read: enough for nine float channels.
const POSITION_READ_SIZE: u16 = 0x32;

/// Sequence value position reads carry, captured from a live trace. The
/// controller does not appear to check it.
const READ_SEQUENCE: u16 = 4;

/// Float data sits between this lead and trailer in the raw response.
const PAYLOAD_LEAD: usize = 108;
const PAYLOAD_TRAILER: usize = 24;

/// Build a position read request.
pub(crate) fn read_request(kind: PositionKind) -> BytesMut {
    let header = PacketHeader {
        count: READ_SEQUENCE,
        message_type: MSG_TYPE_READ,
        service: SERVICE_READ,
        area: AREA_REGISTER,
        start_address: kind.register_base(),
        data_size: POSITION_READ_SIZE,
        ..PacketHeader::default()
    };
    encode_request(&header)
}

/// Decode consecutive little-endian floats from a position response.
///
/// Partial trailing bytes are dropped; a response too short to contain
/// the data window decodes to an empty vector.
pub(crate) fn decode_read_response(resp: &[u8]) -> Vec<f32> {
    if resp.len() <= PAYLOAD_LEAD + PAYLOAD_TRAILER {
        return Vec::new();
    }

    resp[PAYLOAD_LEAD..resp.len() - PAYLOAD_TRAILER]
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(values: &[f32], extra: usize) -> Vec<u8> {
        let mut resp = vec![0u8; PAYLOAD_LEAD];
        for v in values {
            resp.extend_from_slice(&v.to_le_bytes());
        }
        resp.extend_from_slice(&vec![0u8; extra]);
        resp.extend_from_slice(&[0u8; PAYLOAD_TRAILER]);
        resp
    }

    #[test]
    fn read_request_fields() {
        let frame = read_request(PositionKind::Joint);
        let header = PacketHeader::decode(&frame).unwrap();

        assert_eq!(header.message_type, MSG_TYPE_READ);
        assert_eq!(header.service, SERVICE_READ);
        assert_eq!(header.area, AREA_REGISTER);
        assert_eq!(header.start_address, 12026);
        assert_eq!(header.data_size, 0x32);

        let cart = PacketHeader::decode(&read_request(PositionKind::Cartesian)).unwrap();
        assert_eq!(cart.start_address, 12000);
    }

    #[test]
    fn decodes_six_joint_values() {
        let joints = [10.5f32, -20.25, 0.0, 90.0, -45.125, 180.0];
        let resp = response_with(&joints, 0);

        assert_eq!(decode_read_response(&resp), joints);
    }

    #[test]
    fn partial_trailing_bytes_are_dropped() {
        let mut resp = vec![0u8; PAYLOAD_LEAD];
        resp.extend_from_slice(&1.5f32.to_le_bytes());
        resp.extend_from_slice(&[0xAA, 0xBB]); // incomplete float
        resp.extend_from_slice(&[0u8; PAYLOAD_TRAILER]);

        assert_eq!(decode_read_response(&resp), vec![1.5]);
    }

    #[test]
    fn short_response_decodes_empty() {
        assert!(decode_read_response(&[]).is_empty());
        assert!(decode_read_response(&[0u8; PAYLOAD_LEAD + PAYLOAD_TRAILER]).is_empty());
    }
}
