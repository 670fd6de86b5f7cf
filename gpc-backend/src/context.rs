//! Mutable state of one compilation
//!
//! `CodegenContext` owns the scope stack, the register pool and the label
//! counter, and is threaded by reference through every generator.

use crate::error::BackendError;
use crate::frame::{StackFrameManager, StackSlot};
use crate::naming::LabelGenerator;
use crate::regmgmt::RegisterPool;
use crate::CodegenOptions;
use gpc_codegen::Operand;
use gpc_common::{ErrorReporter, LineNumber, SourceLocation};
use log::warn;

pub struct CodegenContext {
    pub frames: StackFrameManager,
    pub pool: RegisterPool,
    options: CodegenOptions,
    labels: LabelGenerator,
    /// Array names declared per open scope; they get no slot
    arrays: Vec<Vec<String>>,
    /// How many calls are being marshaled around the current point
    call_depth: u32,
    reporter: ErrorReporter,
}

impl CodegenContext {
    pub fn new(options: CodegenOptions) -> Result<Self, BackendError> {
        let pool = RegisterPool::new(options.register_count)?;
        Ok(Self {
            frames: StackFrameManager::new(),
            pool,
            options,
            labels: LabelGenerator::new(),
            arrays: Vec::new(),
            call_depth: 0,
            reporter: ErrorReporter::new(),
        })
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn new_label(&mut self) -> String {
        self.labels.next_label()
    }

    pub fn enter_scope(&mut self) {
        self.frames.push_scope();
        self.arrays.push(Vec::new());
    }

    pub fn leave_scope(&mut self) -> Result<(), BackendError> {
        self.frames.pop_scope()?;
        self.arrays.pop();
        Ok(())
    }

    /// Remember an array declared in the current scope
    pub fn skip_array(&mut self, name: &str) {
        if let Some(names) = self.arrays.last_mut() {
            names.push(name.to_string());
        }
    }

    fn is_array(&self, name: &str) -> bool {
        self.arrays
            .last()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Resolve a variable of the current body to its slot
    pub fn lookup(&self, name: &str, line: LineNumber) -> Result<&StackSlot, BackendError> {
        if let Some(slot) = self.frames.find(name) {
            return Ok(slot);
        }
        if self.is_array(name) {
            return Err(BackendError::unsupported(format!("array variable {}", name), line));
        }
        if self.frames.bound_in_enclosing(name) {
            return Err(BackendError::unsupported(
                format!("non-local access to {}", name),
                line,
            ));
        }
        Err(BackendError::UndefinedVariable {
            name: name.to_string(),
            line: Some(line),
        })
    }

    pub fn var_operand(&self, name: &str, line: LineNumber) -> Result<Operand, BackendError> {
        Ok(self.lookup(name, line)?.operand())
    }

    /// Slot of the named temporary, laid out on first use
    pub fn temp_operand(&mut self, name: &str) -> Result<Operand, BackendError> {
        if let Some(slot) = self.frames.find(name) {
            return Ok(slot.operand());
        }
        Ok(self.frames.add_temporary(name)?.operand())
    }

    pub fn call_depth(&self) -> u32 {
        self.call_depth
    }

    pub fn enter_call(&mut self) {
        self.call_depth += 1;
    }

    pub fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Record a non-fatal coercion
    pub fn warn(&mut self, message: impl Into<String>, line: LineNumber) {
        let message = message.into();
        warn!("{}:{}: {}", self.options.source_name, line, message);
        let location = SourceLocation::at_line(&self.options.source_name, line);
        self.reporter.warning(message, location);
    }

    #[cfg(test)]
    pub(crate) fn diagnostics(&self) -> &[gpc_common::Diagnostic] {
        self.reporter.diagnostics()
    }

    /// Verify everything was released and hand back the collected warnings
    pub fn finish(self) -> Result<ErrorReporter, BackendError> {
        if self.frames.depth() != 0 {
            return Err(BackendError::internal(
                format!("{} scopes left open", self.frames.depth()),
                None,
            ));
        }
        if !self.pool.is_full() {
            return Err(BackendError::RegisterImbalance {
                allocations: self.pool.allocations(),
                frees: self.pool.frees(),
                line: None,
            });
        }
        Ok(self.reporter)
    }
}
