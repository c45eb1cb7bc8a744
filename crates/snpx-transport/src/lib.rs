//! TCP transport channel to an SNPX robot controller.
//!
//! Provides the duplex byte channel the protocol engine reads from and
//! writes to. This is the lowest layer of the workspace. Everything else
//! builds on top of the [`ControllerStream`] type provided here.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::ControllerStream;
pub use tcp::{connect, connect_with, ConnectOptions, DEFAULT_PORT};
