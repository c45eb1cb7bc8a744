//! Session management: one connection, one request in flight.
//!
//! Every operation sends exactly one packet and blocks until its
//! response is consumed before returning. The protocol has no request
//! IDs or pipelining, so overlapping requests would corrupt response
//! matching; the session takes `&mut self` throughout to make that
//! impossible. The assignment table is the only mutable state and is
//! owned here, one table per session.

use std::io::{Read, Write};
use std::time::Duration;

use snpx_frame::{extract_payload, PacketReader, PacketWriter};
use snpx_transport::{connect_with, ConnectOptions, ControllerStream, DEFAULT_PORT};
use tracing::{debug, info};

use crate::assign::{set_assignment_command, AssignmentSlot, AssignmentTable};
use crate::command::{text_command, CLEAR_COMMAND, COMMAND_SEQUENCE};
use crate::error::{ClientError, Result};
use crate::handshake::handshake;
use crate::position::{self, PositionKind};
use crate::signal::{self, SignalBlock};
use crate::variable::{self, Value, VarType};

/// Receive buffer for signal and register reads.
const READ_BUFFER: usize = 1024;

/// Receive buffer for position reads.
const POSITION_BUFFER: usize = 2048;

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller hostname or address.
    pub host: String,
    /// Controller port.
    pub port: u16,
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Option<Duration>,
    /// Receive timeout applied to the channel. The engine itself never
    /// retries on timeout.
    pub read_timeout: Option<Duration>,
    /// Send timeout applied to the channel.
    pub write_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// A connected SNPX session.
///
/// Owns the duplex channel's reader and writer halves and the
/// per-session [`AssignmentTable`].
pub struct Session<R, W> {
    reader: PacketReader<R>,
    writer: PacketWriter<W>,
    assignments: AssignmentTable,
}

impl Session<ControllerStream, ControllerStream> {
    /// Connect to a controller and perform the handshake.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with(&SessionConfig {
            host: host.to_string(),
            port,
            ..SessionConfig::default()
        })
    }

    /// Connect with explicit configuration.
    pub fn connect_with(config: &SessionConfig) -> Result<Self> {
        let options = ConnectOptions {
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        };
        let stream = connect_with(&config.host, config.port, &options)?;
        let reader_stream = stream.try_clone()?;

        let mut session = Self::from_parts(
            PacketReader::new(reader_stream),
            PacketWriter::new(stream),
        );
        session.handshake()?;

        info!(host = %config.host, port = config.port, "session established");
        Ok(session)
    }
}

impl<R: Read, W: Write> Session<R, W> {
    /// Assemble a session from already-connected reader and writer
    /// halves. No handshake is performed.
    pub fn from_parts(reader: PacketReader<R>, writer: PacketWriter<W>) -> Self {
        Self {
            reader,
            writer,
            assignments: AssignmentTable::new(),
        }
    }

    /// Perform the connection handshake.
    pub fn handshake(&mut self) -> Result<()> {
        handshake(&mut self.reader, &mut self.writer)
    }

    /// The session's assignment table.
    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    /// Tear the session apart into its reader and writer halves.
    pub fn into_parts(self) -> (PacketReader<R>, PacketWriter<W>) {
        (self.reader, self.writer)
    }

    /// Read `count` signals from a block, starting at signal index 1.
    pub fn read_signals(&mut self, block: &SignalBlock, count: usize) -> Result<Vec<bool>> {
        self.read_signals_at(block, count, 1)
    }

    /// Read `count` signals starting at a 1-based signal index.
    ///
    /// Signal reads are best-effort telemetry: truncated responses
    /// decode to zero-filled bits rather than an error.
    pub fn read_signals_at(
        &mut self,
        block: &SignalBlock,
        count: usize,
        start_index: u16,
    ) -> Result<Vec<bool>> {
        let frame = signal::read_request(block, count, start_index);
        self.writer.send(&frame)?;
        let resp = self.reader.read_response(READ_BUFFER)?;
        Ok(signal::decode_read_response(&resp, count))
    }

    /// Write a boolean array to a block, starting at signal index 1.
    pub fn write_signals(&mut self, block: &SignalBlock, values: &[bool]) -> Result<()> {
        self.write_signals_at(block, values, 1)
    }

    /// Write a boolean array starting at a 1-based signal index.
    ///
    /// Writing an empty array is a no-op: no packet is sent.
    pub fn write_signals_at(
        &mut self,
        block: &SignalBlock,
        values: &[bool],
        start_index: u16,
    ) -> Result<()> {
        let Some(frame) = signal::write_request(block, values, start_index)? else {
            return Ok(());
        };
        self.writer.send(&frame)?;
        self.reader.read_frame()?;
        Ok(())
    }

    /// Read the current joint or cartesian vector.
    pub fn read_position(&mut self, kind: PositionKind) -> Result<Vec<f32>> {
        let frame = position::read_request(kind);
        self.writer.send(&frame)?;
        let resp = self.reader.read_response(POSITION_BUFFER)?;
        Ok(position::decode_read_response(&resp))
    }

    /// Bind a variable name to an automatically chosen register slot.
    ///
    /// Idempotent: a name that is already bound returns its existing
    /// slot without any wire interaction.
    pub fn set_assignment(&mut self, name: &str, ty: &VarType) -> Result<AssignmentSlot> {
        self.assign(name, ty, None)
    }

    /// Bind a variable name to an explicit register slot.
    pub fn set_assignment_at(
        &mut self,
        name: &str,
        ty: &VarType,
        slot: u16,
    ) -> Result<AssignmentSlot> {
        self.assign(name, ty, Some(slot))
    }

    fn assign(&mut self, name: &str, ty: &VarType, explicit: Option<u16>) -> Result<AssignmentSlot> {
        if let Some(existing) = self.assignments.get(name) {
            return Ok(existing.clone());
        }

        let size = ty.words();
        let index = match explicit {
            Some(slot) => {
                if !self.assignments.is_range_free(slot, size) {
                    return Err(ClientError::SlotUnavailable { slot, size });
                }
                slot
            }
            None => self
                .assignments
                .next_free_slot(size)
                .ok_or(ClientError::SlotExhausted { size })?,
        };

        let command = set_assignment_command(index, ty, name);
        self.writer.send(&text_command(COMMAND_SEQUENCE, &command)?)?;
        self.reader.read_frame()?;

        // Recorded only once the controller has acknowledged the binding,
        // so a failed exchange leaves no stale local entry.
        let slot = AssignmentSlot {
            name: name.to_string(),
            index,
            size,
            scale: ty.scale(),
        };
        self.assignments.insert(slot.clone());
        debug!(name, index, size, "assignment bound");
        Ok(slot)
    }

    /// Clear all assignments, controller-side and local.
    pub fn clear_assignments(&mut self) -> Result<()> {
        self.writer
            .send(&text_command(COMMAND_SEQUENCE, CLEAR_COMMAND)?)?;
        self.reader.read_frame()?;
        self.assignments.clear();
        debug!("assignments cleared");
        Ok(())
    }

    /// Read a named system variable, binding it to a slot on first use.
    pub fn read_variable(&mut self, name: &str, ty: &VarType) -> Result<Value> {
        let slot = self.assign(name, ty, None)?;
        let frame = variable::read_request(&slot);
        self.writer.send(&frame)?;

        let resp = self.reader.read_response(READ_BUFFER)?;
        variable::decode_value(ty, extract_payload(&resp, ty.byte_len()))
    }

    /// Write a named system variable, binding it to a slot on first use.
    pub fn write_variable(&mut self, name: &str, ty: &VarType, value: &Value) -> Result<()> {
        let slot = self.assign(name, ty, None)?;
        let raw = variable::encode_value(ty, value)?;
        let frame = variable::write_request(&slot, &raw)?;
        self.writer.send(&frame)?;
        self.reader.read_frame()?;
        Ok(())
    }
}
