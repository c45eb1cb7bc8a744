//! Assignment-slot allocation over the controller's register window.
//!
//! Named variables cannot be addressed directly; the controller exposes
//! an 80-word register window and a `SETASG` command that binds a
//! variable name to a numbered slot inside it. The [`AssignmentTable`]
//! owns the local view of those bindings and hands out non-overlapping
//! first-fit ranges. Bindings live for the session; there is no
//! controller-side deletion short of `CLRASG`.

use std::collections::HashMap;

use crate::variable::VarType;

/// Number of word slots in the assignment register window.
pub const REGISTER_SLOTS: u16 = 80;

/// A binding of a variable name to a register range.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSlot {
    /// The bound variable name.
    pub name: String,
    /// First slot of the range, 1-based.
    pub index: u16,
    /// Range length in words.
    pub size: u16,
    /// Scale factor bound into the assignment.
    pub scale: f32,
}

/// Name → slot mapping over the register window, owned by the session.
#[derive(Debug, Default)]
pub struct AssignmentTable {
    entries: HashMap<String, AssignmentSlot>,
}

impl AssignmentTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing binding.
    pub fn get(&self, name: &str) -> Option<&AssignmentSlot> {
        self.entries.get(name)
    }

    /// Number of bindings in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `[start, start + size)` lies inside the window and clear
    /// of every existing binding.
    pub fn is_range_free(&self, start: u16, size: u16) -> bool {
        if start < 1 || size == 0 {
            return false;
        }
        if u32::from(start) + u32::from(size) - 1 > u32::from(REGISTER_SLOTS) {
            return false;
        }
        !self
            .entries
            .values()
            .any(|slot| ranges_overlap(start, size, slot.index, slot.size))
    }

    /// First-fit scan for a free range of `size` words.
    pub fn next_free_slot(&self, size: u16) -> Option<u16> {
        (1..=REGISTER_SLOTS).find(|&start| self.is_range_free(start, size))
    }

    /// Record a binding. The caller has already validated the range and
    /// completed the controller-side `SETASG` exchange.
    pub(crate) fn insert(&mut self, slot: AssignmentSlot) {
        self.entries.insert(slot.name.clone(), slot);
    }

    /// Drop every binding.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

fn ranges_overlap(a_start: u16, a_size: u16, b_start: u16, b_size: u16) -> bool {
    let a_end = u32::from(a_start) + u32::from(a_size);
    let b_end = u32::from(b_start) + u32::from(b_size);
    u32::from(a_start) < b_end && u32::from(b_start) < a_end
}

/// Wire form of the set-assignment command:
/// `SETASG <slot> <words> <name> <scale>`.
pub(crate) fn set_assignment_command(index: u16, ty: &VarType, name: &str) -> String {
    format!(
        "SETASG {index} {} {name} {}",
        ty.words(),
        format_scale(ty.scale())
    )
}

fn format_scale(scale: f32) -> String {
    if scale.fract() == 0.0 {
        format!("{scale:.1}")
    } else {
        format!("{scale}")
    }
}
