use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected duplex channel to the controller, implementing Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// The protocol is strictly request/response over a single connection,
/// so the reader and writer halves are obtained via [`try_clone`].
///
/// [`try_clone`]: ControllerStream::try_clone
pub struct ControllerStream {
    inner: TcpStream,
}

impl Read for ControllerStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for ControllerStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl ControllerStream {
    /// Create a ControllerStream from a connected TCP stream.
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned))
    }

    /// The controller's address on the other end of this stream.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Shut down both halves of the connection.
    ///
    /// The protocol has no in-band cancellation; a caller that abandons a
    /// request mid-flight must close the channel and connect again.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.shutdown(std::net::Shutdown::Both)?;
        Ok(())
    }
}

impl std::fmt::Debug for ControllerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerStream")
            .field("peer", &self.inner.peer_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn read_write_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).unwrap();
            server.write_all(&buf).unwrap();
        });

        let mut stream = ControllerStream::from_tcp(TcpStream::connect(addr).unwrap());
        stream.write_all(b"hello").unwrap();

        let mut echo = [0u8; 5];
        stream.read_exact(&mut echo).unwrap();
        assert_eq!(&echo, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn try_clone_shares_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let (mut server, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4];
            server.read_exact(&mut buf).unwrap();
            server.write_all(b"pong").unwrap();
        });

        let stream = ControllerStream::from_tcp(TcpStream::connect(addr).unwrap());
        let mut writer = stream.try_clone().unwrap();
        let mut reader = stream;

        writer.write_all(b"ping").unwrap();
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"pong");

        handle.join().unwrap();
    }

    #[test]
    fn timeouts_are_applied() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let stream = ControllerStream::from_tcp(TcpStream::connect(addr).unwrap());
        stream
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();

        let mut reader = stream;
        let mut buf = [0u8; 1];
        let err = reader.read_exact(&mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        ));
    }
}
