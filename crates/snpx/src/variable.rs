//! Typed marshalling of named controller variables.
//!
//! Scalar variables occupy two words (4 bytes) of register space; strings
//! occupy a fixed window of two ASCII characters per word. Integers may
//! carry a scale factor bound into the controller-side assignment:
//! scaled integers decode as `raw / scale` and encode as
//! `round(value * scale)`.

use bytes::BytesMut;
use snpx_frame::{encode_request, PacketHeader, WriteFrame, MSG_TYPE_READ};

use crate::assign::AssignmentSlot;
use crate::codes::{AREA_REGISTER, SERVICE_READ, SERVICE_WRITE};
use crate::error::{ClientError, Result};

/// Declared type of a named controller variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarType {
    /// 32-bit signed integer. A nonzero `scale` divides on decode and
    /// multiplies (with rounding) on encode; zero passes through.
    Int { scale: f32 },
    /// Raw IEEE-754 single float, no scaling.
    Real,
    /// Fixed-width ASCII, NUL padded, two characters per word.
    Str { words: u16 },
}

impl VarType {
    /// Unscaled integer.
    pub const INT: VarType = VarType::Int { scale: 0.0 };
    /// Single-precision float.
    pub const REAL: VarType = VarType::Real;
    /// 80-word (160-byte) string.
    pub const STRING: VarType = VarType::Str { words: 80 };

    /// Word footprint in the register window.
    pub fn words(&self) -> u16 {
        match self {
            VarType::Int { .. } | VarType::Real => 2,
            VarType::Str { words } => *words,
        }
    }

    /// Byte footprint on the wire.
    pub fn byte_len(&self) -> usize {
        self.words() as usize * 2
    }

    /// Scale factor bound into the controller-side assignment.
    pub fn scale(&self) -> f32 {
        match self {
            VarType::Int { scale } => *scale,
            _ => 0.0,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            VarType::Int { .. } => "integer",
            VarType::Real => "real",
            VarType::Str { .. } => "string",
        }
    }
}

/// A decoded variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Real(f32),
    Text(String),
}

impl Value {
    fn name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "string",
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Encode a value against its declared type.
///
/// String values longer than the declared width are truncated silently;
/// shorter ones are right-padded with NUL bytes.
pub fn encode_value(ty: &VarType, value: &Value) -> Result<Vec<u8>> {
    match (ty, value) {
        (VarType::Int { scale }, Value::Int(v)) if *scale == 0.0 => Ok(v.to_le_bytes().to_vec()),
        (VarType::Int { scale }, Value::Int(v)) => Ok(scaled_raw(*v as f64, *scale)),
        (VarType::Int { scale }, Value::Real(v)) if *scale != 0.0 => {
            Ok(scaled_raw(*v as f64, *scale))
        }
        (VarType::Real, Value::Real(v)) => Ok(v.to_le_bytes().to_vec()),
        (VarType::Str { .. }, Value::Text(text)) => {
            let width = ty.byte_len();
            let mut raw = text.as_bytes().to_vec();
            raw.resize(width, 0);
            Ok(raw)
        }
        (ty, value) => Err(ClientError::ValueType {
            expected: ty.name(),
            found: value.name(),
        }),
    }
}

/// Decode raw register bytes against a declared type.
pub fn decode_value(ty: &VarType, raw: &[u8]) -> Result<Value> {
    let need = match ty {
        VarType::Int { .. } | VarType::Real => 4,
        VarType::Str { .. } => ty.byte_len(),
    };
    if raw.len() < need {
        return Err(ClientError::ShortPayload {
            len: raw.len(),
            need,
        });
    }

    match ty {
        VarType::Int { scale } => {
            let v = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            if *scale == 0.0 {
                Ok(Value::Int(v))
            } else {
                Ok(Value::Real((v as f64 / *scale as f64) as f32))
            }
        }
        VarType::Real => Ok(Value::Real(f32::from_le_bytes([
            raw[0], raw[1], raw[2], raw[3],
        ]))),
        VarType::Str { .. } => {
            let text = String::from_utf8_lossy(&raw[..need]);
            Ok(Value::Text(text.trim_end_matches('\0').to_string()))
        }
    }
}

fn scaled_raw(value: f64, scale: f32) -> Vec<u8> {
    let raw = (value * scale as f64).round() as i32;
    raw.to_le_bytes().to_vec()
}

/// Build a register read for an assigned variable.
pub(crate) fn read_request(slot: &AssignmentSlot) -> BytesMut {
    let header = PacketHeader {
        count: slot.size,
        message_type: MSG_TYPE_READ,
        service: SERVICE_READ,
        area: AREA_REGISTER,
        start_address: slot.index - 1,
        data_size: slot.size * 2,
        ..PacketHeader::default()
    };
    encode_request(&header)
}

/// Build a register write for an assigned variable.
pub(crate) fn write_request(slot: &AssignmentSlot, raw: &[u8]) -> Result<BytesMut> {
    let header = PacketHeader {
        count: slot.size,
        service: SERVICE_WRITE,
        area: AREA_REGISTER,
        start_address: slot.index - 1,
        data_size: slot.size * 2,
        ..PacketHeader::default()
    };
    WriteFrame::for_payload(raw.len())
        .encode(&header, raw)
        .map_err(Into::into)
}
