//! GPC Pascal Compiler - Backend
//!
//! This crate turns a semantically checked syntax tree into x86-64 assembly:
//! - Sethi-Ullman labeling and register-stack code generation for expressions
//! - A fixed LIFO register pool, with no spilling
//! - One stack frame per subprogram with argument, local and temporary regions
//! - Statement lowering, including calls and the `read`/`write` builtins

pub mod context;
pub mod error;
pub mod expr;
pub mod frame;
pub mod function;
pub mod naming;
pub mod regmgmt;
pub mod stmt;

pub use context::CodegenContext;
pub use error::BackendError;
pub use frame::{Region, StackFrameManager, StackSlot};
pub use function::generate_functions;
pub use regmgmt::RegisterPool;

use gpc_codegen::{emit_program, AsmProgram};
use gpc_common::{CompilerError, ErrorReporter};
use gpc_frontend::Program;
use log::info;

/// Options for code generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Size of the register pool, 2 or 3
    pub register_count: usize,
    /// Interleave `# ...` comments naming each source statement
    pub emit_comments: bool,
    /// File name recorded in the `.file` directive and in diagnostics
    pub source_name: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            register_count: 3,
            emit_comments: false,
            source_name: "<input>".to_string(),
        }
    }
}

/// Everything one successful compilation produces
#[derive(Debug, Clone)]
pub struct CodegenOutput {
    pub program: AsmProgram,
    pub assembly: String,
    /// Warnings raised while coercing unsupported declarations
    pub reporter: ErrorReporter,
}

/// Generate a whole program with options
///
/// The assembly text is only produced once every function has been
/// generated, so an error never leaves partial output behind.
pub fn generate_program(
    program: &Program,
    options: CodegenOptions,
) -> Result<CodegenOutput, BackendError> {
    info!(
        "generating program {} with {} registers",
        program.name, options.register_count
    );
    let source_name = options.source_name.clone();

    let mut ctx = CodegenContext::new(options)?;
    let functions = generate_functions(&mut ctx, program)?;
    let reporter = ctx.finish()?;

    let program = AsmProgram {
        source_name,
        entry: program.name.clone(),
        functions,
    };
    let assembly = emit_program(&program)?;
    info!(
        "generated {} functions, {}",
        program.functions.len(),
        reporter.summary()
    );

    Ok(CodegenOutput {
        program,
        assembly,
        reporter,
    })
}

/// Driver-facing entry point
pub fn compile(program: &Program, options: CodegenOptions) -> Result<CodegenOutput, CompilerError> {
    let source_name = options.source_name.clone();
    generate_program(program, options).map_err(|e| e.into_compiler_error(&source_name))
}
