//! Stack Frame Manager
//!
//! Keeps one [`StackScope`] per function body being compiled. Scopes nest
//! the way subprogram declarations nest; only the innermost one is ever
//! searched or extended, so a body cannot address an enclosing body's
//! variables.

pub use self::scope::{Region, StackScope, StackSlot, DOUBLEWORD};

use crate::error::BackendError;
use gpc_codegen::{align_frame_size, CallingConvention};
use log::debug;

mod scope;

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
pub struct StackFrameManager {
    scopes: Vec<StackScope>,
}

impl StackFrameManager {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Number of open scopes
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(StackScope::new());
        debug!("frame: push scope (depth {})", self.scopes.len());
    }

    pub fn pop_scope(&mut self) -> Result<StackScope, BackendError> {
        let scope = self
            .scopes
            .pop()
            .ok_or_else(|| BackendError::FrameLayout("pop with no open scope".to_string()))?;
        debug!("frame: pop scope (depth {})", self.scopes.len());
        Ok(scope)
    }

    pub fn current(&self) -> Result<&StackScope, BackendError> {
        self.scopes
            .last()
            .ok_or_else(|| BackendError::FrameLayout("no open scope".to_string()))
    }

    fn add(&mut self, region: Region, name: &str) -> Result<StackSlot, BackendError> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| BackendError::FrameLayout(format!("no open scope for {}", name)))?;
        let slot = scope.add(region, name)?;
        debug!("frame: {} {} at -{}(%rbp)", region, name, slot.offset);
        Ok(slot)
    }

    pub fn add_argument(&mut self, name: &str) -> Result<StackSlot, BackendError> {
        self.add(Region::Argument, name)
    }

    pub fn add_local(&mut self, name: &str) -> Result<StackSlot, BackendError> {
        self.add(Region::Local, name)
    }

    pub fn add_temporary(&mut self, name: &str) -> Result<StackSlot, BackendError> {
        self.add(Region::Temporary, name)
    }

    /// Look `name` up in the current scope only
    pub fn find(&self, name: &str) -> Option<&StackSlot> {
        self.scopes.last().and_then(|scope| scope.find(name))
    }

    /// Whether some enclosing scope (not the current one) binds `name`
    pub fn bound_in_enclosing(&self, name: &str) -> bool {
        let enclosing = self.scopes.len().saturating_sub(1);
        self.scopes[..enclosing]
            .iter()
            .any(|scope| scope.find(name).is_some())
    }

    /// Bytes the current scope's slots occupy, before alignment
    pub fn needed_space(&self) -> Result<u32, BackendError> {
        Ok(self.current()?.used_bytes())
    }

    /// Stack allocation for the current scope, rounded to the ABI alignment
    pub fn total_frame_size(&self) -> Result<u32, BackendError> {
        let raw = self.needed_space()? + CallingConvention::RESERVED_FRAME_BYTES;
        Ok(align_frame_size(raw))
    }
}
