//! Protocol engine for the SNPX robot controller link.
//!
//! This is the "just works" layer. Connect to a controller, read and
//! write digital I/O blocks, read position vectors, and access named
//! system variables through dynamically bound register slots.
//!
//! ```no_run
//! use snpx::{PositionKind, Session, SignalBlock, Value, VarType};
//!
//! fn main() -> snpx::Result<()> {
//!     let mut session = Session::connect("192.168.0.10", snpx::DEFAULT_PORT)?;
//!
//!     let joints = session.read_position(PositionKind::Joint)?;
//!     println!("joints: {joints:?}");
//!
//!     session.write_signals(&SignalBlock::DIGITAL_IN, &[true, true])?;
//!
//!     let tolerance = session.read_variable("$ANGTOL[1]", &VarType::REAL)?;
//!     if let Value::Real(v) = tolerance {
//!         println!("$ANGTOL[1] = {v}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod assign;
pub mod codes;
mod command;
pub mod error;
pub mod handshake;
pub mod position;
pub mod session;
pub mod signal;
pub mod variable;

pub use assign::{AssignmentSlot, AssignmentTable, REGISTER_SLOTS};
pub use error::{ClientError, Result};
pub use handshake::handshake;
pub use position::PositionKind;
pub use session::{Session, SessionConfig};
pub use signal::{pack_bits, unpack_bits, SignalBlock};
pub use snpx_transport::DEFAULT_PORT;
pub use variable::{decode_value, encode_value, Value, VarType};
