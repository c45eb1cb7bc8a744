//! Service-request and memory-area codes.
//!
//! The service code selects what the controller should do; the area code
//! selects which address space the request targets.

/// Read from a memory area.
pub const SERVICE_READ: u8 = 0x04;

/// Write to a memory area.
pub const SERVICE_WRITE: u8 = 0x07;

/// Protocol negotiation during session setup.
pub const SERVICE_NEGOTIATE: u8 = 0x4F;

/// Digital input table.
pub const AREA_DIGITAL_IN: u8 = 0x48;

/// Digital output table.
pub const AREA_DIGITAL_OUT: u8 = 0x46;

/// Register space (%R), including the mapped position vectors.
pub const AREA_REGISTER: u8 = 0x08;

/// Controller text-command channel (SETASG, CLRASG).
pub const AREA_COMMAND: u8 = 0x38;

/// Returns a human-readable name for a service code.
pub fn service_name(code: u8) -> &'static str {
    match code {
        SERVICE_READ => "READ",
        SERVICE_WRITE => "WRITE",
        SERVICE_NEGOTIATE => "NEGOTIATE",
        _ => "UNKNOWN",
    }
}

/// Returns a human-readable name for a memory-area code.
pub fn area_name(code: u8) -> &'static str {
    match code {
        AREA_DIGITAL_IN => "DIGITAL-IN",
        AREA_DIGITAL_OUT => "DIGITAL-OUT",
        AREA_REGISTER => "REGISTER",
        AREA_COMMAND => "COMMAND",
        _ => "UNKNOWN",
    }
}
