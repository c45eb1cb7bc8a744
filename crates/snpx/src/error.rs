use snpx_frame::FrameError;
use snpx_transport::TransportError;

/// Errors surfaced by the protocol engine.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Session handshake failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// No contiguous run of `size` free word slots remains in the
    /// assignment window.
    #[error("no free assignment slot for {size} words")]
    SlotExhausted { size: u16 },

    /// The explicitly requested slot overlaps an existing assignment or
    /// falls outside the window.
    #[error("assignment slot {slot} cannot hold {size} words")]
    SlotUnavailable { slot: u16, size: u16 },

    /// A value does not match the variable's declared type.
    #[error("{expected} variable cannot carry a {found} value")]
    ValueType {
        expected: &'static str,
        found: &'static str,
    },

    /// Register data shorter than the declared type width.
    #[error("register payload too short ({len} bytes, need {need})")]
    ShortPayload { len: usize, need: usize },
}

pub type Result<T> = std::result::Result<T, ClientError>;
