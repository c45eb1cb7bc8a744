use std::net::TcpStream;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::ControllerStream;

/// Default SNPX service port on the controller.
pub const DEFAULT_PORT: u16 = 60008;

/// Options for establishing the controller connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Timeout for the TCP connect itself. `None` blocks indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Read timeout applied to the connected stream.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the connected stream.
    pub write_timeout: Option<Duration>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Connect to a controller with default options.
pub fn connect(host: &str, port: u16) -> Result<ControllerStream> {
    connect_with(host, port, &ConnectOptions::default())
}

/// Connect to a controller with explicit options.
///
/// Resolves `host:port`, establishes the TCP connection, disables Nagle
/// (request frames are small and latency-sensitive), and applies the
/// configured stream timeouts.
pub fn connect_with(host: &str, port: u16, options: &ConnectOptions) -> Result<ControllerStream> {
    let addr = format!("{host}:{port}");

    let stream = match options.connect_timeout {
        Some(timeout) => {
            let resolved = resolve(&addr)?;
            TcpStream::connect_timeout(&resolved, timeout)
        }
        None => TcpStream::connect(&addr),
    }
    .map_err(|e| TransportError::Connect {
        addr: addr.clone(),
        source: e,
    })?;

    stream.set_nodelay(true)?;
    debug!(%addr, "tcp connection established");

    let stream = ControllerStream::from_tcp(stream);
    stream.set_read_timeout(options.read_timeout)?;
    stream.set_write_timeout(options.write_timeout)?;

    info!(%addr, "connected to controller");
    Ok(stream)
}

fn resolve(addr: &str) -> Result<std::net::SocketAddr> {
    use std::net::ToSocketAddrs;

    addr.to_socket_addrs()
        .map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?
        .next()
        .ok_or_else(|| TransportError::Connect {
            addr: addr.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved"),
        })
}
