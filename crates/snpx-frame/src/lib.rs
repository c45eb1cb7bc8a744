//! Fixed-layout packet codec for the SNPX robot controller protocol.
//!
//! Every message is a 56-byte header with fields at protocol-fixed byte
//! offsets, optionally followed by a payload. Short writes splice their
//! payload into the header's reserved tail; long writes append it after
//! the header. All multi-byte numeric fields are little-endian.
//!
//! This crate owns the byte-exact framing; what the fields mean for a
//! given operation is the `snpx` crate's business.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;
pub mod write;

pub use codec::{
    encode_request, extract_payload, PacketHeader, BASE_TEMPLATE, FRAME_TYPE_DATA,
    FRAME_TYPE_NEGOTIATE, HEADER_SIZE, INLINE_CAPACITY, MSG_TYPE_LONG_WRITE, MSG_TYPE_READ,
    PAYLOAD_OFFSET,
};
pub use error::{FrameError, Result};
pub use reader::PacketReader;
pub use write::{WriteFrame, INLINE_SIGNAL_MAX};
pub use writer::PacketWriter;
