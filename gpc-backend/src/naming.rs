//! Centralized naming for labels and compiler temporaries
//!
//! Temporaries live in the frame's temporary region under names starting
//! with `$`, which no Pascal identifier can, so they never shadow user
//! variables.

use gpc_codegen::Reg;
use gpc_common::LabelId;

/// Temporary holding a constant divisor, since `idivl` takes no immediate
pub const DIV_CONST_TEMP: &str = "$div_const";

/// Label generator for one compilation unit
///
/// Labels are numbered across the whole unit so nested and sibling
/// subprograms never collide.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next_label_id: LabelId,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self { next_label_id: 0 }
    }

    /// Get the next label and increment the counter
    pub fn next_label(&mut self) -> String {
        let id = self.next_label_id;
        self.next_label_id += 1;
        local_label(id)
    }
}

/// Assembler-local label for `id`
pub fn local_label(id: LabelId) -> String {
    format!(".L{}", id)
}

/// Temporary staging argument `index` of a call made at nesting `depth`
pub fn arg_temp(depth: u32, index: usize) -> String {
    format!("$arg{}_{}", depth, index)
}

/// Temporary preserving `reg` across a call made at nesting `depth`
pub fn save_temp(depth: u32, reg: Reg) -> String {
    format!("$save{}_{}", depth, &reg.name64()[1..])
}
