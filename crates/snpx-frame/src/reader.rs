use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{PacketHeader, HEADER_SIZE};
use crate::error::{FrameError, Result};

/// Reads controller responses from any `Read` stream (blocking).
///
/// Two receive modes are provided. [`read_response`] performs a single
/// bounded read, matching the controller's one-segment telemetry replies.
/// [`read_frame`] is length-aware: it reads the fixed header, then keeps
/// reading until the declared continuation is satisfied or the channel
/// closes.
///
/// [`read_response`]: PacketReader::read_response
/// [`read_frame`]: PacketReader::read_frame
pub struct PacketReader<T> {
    inner: T,
}

impl<T: Read> PacketReader<T> {
    /// Create a new packet reader.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Read one response of at most `max` bytes (blocking, single read).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when the channel is
    /// closed. Short responses are returned as-is; callers that treat
    /// reads as best-effort telemetry decode whatever arrived.
    pub fn read_response(&mut self, max: usize) -> Result<Bytes> {
        let mut buf = vec![0u8; max];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => {
                    buf.truncate(n);
                    trace!(len = n, "response received");
                    return Ok(Bytes::from(buf));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Read one complete frame: the fixed header plus its declared
    /// payload continuation.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` if the channel closes
    /// before the frame is complete.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(HEADER_SIZE);
        self.read_exact(&mut buf[..])?;

        let header = PacketHeader::decode(&buf)?;
        let continuation = header.text_len as usize;
        if continuation > 0 {
            let start = buf.len();
            buf.resize(start + continuation, 0);
            self.read_exact(&mut buf[start..])?;
        }

        trace!(len = buf.len(), continuation, "frame received");
        Ok(buf.freeze())
    }

    fn read_exact(&mut self, mut out: &mut [u8]) -> Result<()> {
        while !out.is_empty() {
            match self.inner.read(out) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => {
                    let rest = out;
                    out = &mut rest[n..];
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::{encode_request, PacketHeader};

    #[test]
    fn read_response_returns_what_arrived() {
        let mut reader = PacketReader::new(Cursor::new(vec![1, 2, 3]));
        let resp = reader.read_response(1024).unwrap();
        assert_eq!(resp.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn read_response_on_closed_channel() {
        let mut reader = PacketReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_response(64).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn read_frame_without_continuation() {
        let wire = encode_request(&PacketHeader::default());
        let mut reader = PacketReader::new(Cursor::new(wire.to_vec()));

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.len(), HEADER_SIZE);
    }

    #[test]
    fn read_frame_with_continuation() {
        let header = PacketHeader {
            text_len: 5,
            ..PacketHeader::default()
        };
        let mut wire = encode_request(&header).to_vec();
        wire.extend_from_slice(b"hello");

        let mut reader = PacketReader::new(Cursor::new(wire));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.len(), HEADER_SIZE + 5);
        assert_eq!(&frame[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn read_frame_handles_partial_reads() {
        let header = PacketHeader {
            text_len: 4,
            ..PacketHeader::default()
        };
        let mut wire = encode_request(&header).to_vec();
        wire.extend_from_slice(b"slow");

        let mut reader = PacketReader::new(ByteByByteReader { bytes: wire, pos: 0 });
        let frame = reader.read_frame().unwrap();
        assert_eq!(&frame[HEADER_SIZE..], b"slow");
    }

    #[test]
    fn read_frame_closed_mid_header() {
        let mut reader = PacketReader::new(Cursor::new(vec![0u8; 20]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn read_frame_closed_mid_continuation() {
        let header = PacketHeader {
            text_len: 16,
            ..PacketHeader::default()
        };
        let mut wire = encode_request(&header).to_vec();
        wire.extend_from_slice(b"only-part");

        let mut reader = PacketReader::new(Cursor::new(wire));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_read_retries() {
        let wire = encode_request(&PacketHeader::default()).to_vec();
        let mut reader = PacketReader::new(InterruptedThenData {
            interrupted: false,
            bytes: wire,
            pos: 0,
        });

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.len(), HEADER_SIZE);
    }

    #[test]
    fn io_error_propagates() {
        struct BrokenReader;
        impl Read for BrokenReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let mut reader = PacketReader::new(BrokenReader);
        let err = reader.read_response(64).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = PacketReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
