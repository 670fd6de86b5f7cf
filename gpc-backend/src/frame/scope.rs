//! One activation's slot bindings

use crate::error::BackendError;
use gpc_codegen::Operand;
use std::fmt;

/// Size of every slot; only 32-bit integers are laid out
pub const DOUBLEWORD: u32 = 4;

/// Frame region a slot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Argument,
    Local,
    Temporary,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Argument => write!(f, "argument"),
            Region::Local => write!(f, "local"),
            Region::Temporary => write!(f, "temporary"),
        }
    }
}

/// A named doubleword at `-offset(%rbp)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSlot {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    pub region: Region,
}

impl StackSlot {
    pub fn operand(&self) -> Operand {
        Operand::frame_slot(self.offset)
    }
}

/// Arguments, locals and temporaries of one function body
///
/// Offsets grow across the regions in that order, so a slot's offset never
/// changes once handed out.
#[derive(Debug, Default)]
pub struct StackScope {
    args: Vec<StackSlot>,
    locals: Vec<StackSlot>,
    temps: Vec<StackSlot>,
    arg_bytes: u32,
    local_bytes: u32,
    temp_bytes: u32,
}

impl StackScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes used by all three regions
    pub fn used_bytes(&self) -> u32 {
        self.arg_bytes + self.local_bytes + self.temp_bytes
    }

    /// Search arguments, then locals, then temporaries
    pub fn find(&self, name: &str) -> Option<&StackSlot> {
        self.args
            .iter()
            .chain(self.locals.iter())
            .chain(self.temps.iter())
            .find(|slot| slot.name == name)
    }

    pub fn add(&mut self, region: Region, name: &str) -> Result<StackSlot, BackendError> {
        let later_regions_used = match region {
            Region::Argument => !self.locals.is_empty() || !self.temps.is_empty(),
            Region::Local => !self.temps.is_empty(),
            Region::Temporary => false,
        };
        if later_regions_used {
            return Err(BackendError::FrameLayout(format!(
                "{} slot {} added after a later region was laid out",
                region, name
            )));
        }
        if self.find(name).is_some() {
            return Err(BackendError::FrameLayout(format!(
                "{} is already bound in this scope",
                name
            )));
        }

        let slot = StackSlot {
            name: name.to_string(),
            offset: self.used_bytes() + DOUBLEWORD,
            size: DOUBLEWORD,
            region,
        };
        match region {
            Region::Argument => {
                self.arg_bytes += DOUBLEWORD;
                self.args.push(slot.clone());
            }
            Region::Local => {
                self.local_bytes += DOUBLEWORD;
                self.locals.push(slot.clone());
            }
            Region::Temporary => {
                self.temp_bytes += DOUBLEWORD;
                self.temps.push(slot.clone());
            }
        }
        Ok(slot)
    }
}
