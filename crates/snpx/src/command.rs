//! Controller text commands.
//!
//! Commands like `SETASG` and `CLRASG` are ASCII text carried in write
//! frames against the command area: inline when the text fits the
//! header's reserved tail, appended otherwise.

use bytes::BytesMut;
use snpx_frame::{PacketHeader, WriteFrame};

use crate::codes::{AREA_COMMAND, SERVICE_WRITE};
use crate::error::Result;

/// Clears every controller-side assignment.
pub(crate) const CLEAR_COMMAND: &str = "CLRASG";

/// Sequence value runtime command frames carry, captured from a live
/// trace. The controller does not appear to check it.
pub(crate) const COMMAND_SEQUENCE: u16 = 3;

/// Build a text-command write frame.
pub(crate) fn text_command(sequence: u16, text: &str) -> Result<BytesMut> {
    let payload = text.as_bytes();
    let header = PacketHeader {
        count: sequence,
        service: SERVICE_WRITE,
        area: AREA_COMMAND,
        start_address: 0,
        data_size: payload.len() as u16,
        ..PacketHeader::default()
    };

    WriteFrame::for_payload(payload.len())
        .encode(&header, payload)
        .map_err(Into::into)
}
