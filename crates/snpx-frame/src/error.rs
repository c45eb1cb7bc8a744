/// Errors that can occur during packet encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The received buffer is shorter than the fixed 56-byte header.
    #[error("short frame ({len} bytes, header is 56 bytes)")]
    Truncated { len: usize },

    /// The payload does not fit the reserved tail of an inline write frame.
    #[error("inline payload too large ({len} bytes, max {max})")]
    InlineOverflow { len: usize, max: usize },

    /// The payload exceeds what the length fields can express.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
