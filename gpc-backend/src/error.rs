//! Backend error type
//!
//! Every failure aborts code generation for the whole compilation unit, so
//! the variants only need to say what went wrong and where.

use gpc_codegen::CodegenError;
use gpc_common::{CompilerError, LineNumber, SourceLocation};
use thiserror::Error;

fn at(line: &Option<LineNumber>) -> String {
    match line {
        Some(line) => format!("line {}: ", line),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    // Resource exhaustion
    #[error("{}no free register left in the pool", at(.line))]
    RegisterExhausted { line: Option<LineNumber> },

    #[error("{}expression needs {label} registers but only {capacity} exist", at(.line))]
    ExpressionTooComplex {
        label: u32,
        capacity: usize,
        line: Option<LineNumber>,
    },

    #[error("{}call to {callee} passes {count} arguments (maximum: {max})", at(.line))]
    TooManyArguments {
        callee: String,
        count: usize,
        max: usize,
        line: Option<LineNumber>,
    },

    // Unsupported constructs
    #[error("{}{construct} is not supported", at(.line))]
    Unsupported {
        construct: String,
        line: Option<LineNumber>,
    },

    // Internal invariant violations
    #[error("{}variable {name} has no stack slot", at(.line))]
    UndefinedVariable {
        name: String,
        line: Option<LineNumber>,
    },

    #[error("{}register pool unbalanced: {allocations} allocations, {frees} frees", at(.line))]
    RegisterImbalance {
        allocations: usize,
        frees: usize,
        line: Option<LineNumber>,
    },

    #[error("stack frame layout error: {0}")]
    FrameLayout(String),

    #[error("invalid register request: {0}")]
    InvalidRegister(String),

    #[error("{}internal code generator error: {message}", at(.line))]
    Internal {
        message: String,
        line: Option<LineNumber>,
    },

    #[error(transparent)]
    Emit(#[from] CodegenError),
}

impl BackendError {
    pub fn unsupported(construct: impl Into<String>, line: LineNumber) -> Self {
        BackendError::Unsupported {
            construct: construct.into(),
            line: Some(line),
        }
    }

    pub fn internal(message: impl Into<String>, line: Option<LineNumber>) -> Self {
        BackendError::Internal {
            message: message.into(),
            line,
        }
    }

    /// Source line the error is attributed to, if known
    pub fn line(&self) -> Option<LineNumber> {
        match self {
            BackendError::RegisterExhausted { line }
            | BackendError::ExpressionTooComplex { line, .. }
            | BackendError::TooManyArguments { line, .. }
            | BackendError::Unsupported { line, .. }
            | BackendError::UndefinedVariable { line, .. }
            | BackendError::RegisterImbalance { line, .. }
            | BackendError::Internal { line, .. } => *line,
            BackendError::FrameLayout(_) | BackendError::InvalidRegister(_) | BackendError::Emit(_) => None,
        }
    }

    /// Attach `line` unless the error already carries one
    pub fn with_line(mut self, at_line: LineNumber) -> Self {
        match &mut self {
            BackendError::RegisterExhausted { line }
            | BackendError::ExpressionTooComplex { line, .. }
            | BackendError::TooManyArguments { line, .. }
            | BackendError::Unsupported { line, .. }
            | BackendError::UndefinedVariable { line, .. }
            | BackendError::RegisterImbalance { line, .. }
            | BackendError::Internal { line, .. } => {
                if line.is_none() {
                    *line = Some(at_line);
                }
            }
            BackendError::FrameLayout(_) | BackendError::InvalidRegister(_) | BackendError::Emit(_) => {}
        }
        self
    }

    /// Convert into the driver-facing error, locating it in `source_name`
    pub fn into_compiler_error(self, source_name: &str) -> CompilerError {
        let location = SourceLocation::at_line(source_name, self.line().unwrap_or(0));
        CompilerError::codegen_error(self.to_string(), location)
    }
}

impl From<BackendError> for CompilerError {
    fn from(err: BackendError) -> Self {
        err.into_compiler_error("<input>")
    }
}
