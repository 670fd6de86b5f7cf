//! Assembly text emission
//!
//! Renders a whole compilation unit: file header with the `printf`/`scanf`
//! format strings, one block per function, the `main` wrapper that calls the
//! program symbol, and the closing footer.

use crate::abi::{AbiError, CallingConvention, Frame};
use crate::asm::{AsmInst, Operand};
use gpc_common::{CompilerError, SourceLocation};
use log::debug;
use std::collections::HashSet;
use std::fmt::Write;
use thiserror::Error;

/// Label of the `"%d\n"` format string used by `write`
pub const WRITE_FORMAT_LABEL: &str = ".LC0";
/// Label of the `"%d"` format string used by `read`
pub const READ_FORMAT_LABEL: &str = ".LC1";

pub const PRINTF_SYMBOL: &str = "printf";
pub const SCANF_SYMBOL: &str = "__isoc99_scanf";

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("ABI violation: {0}")]
    Abi(#[from] AbiError),

    #[error("Duplicate function symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        CompilerError::codegen_error(err.to_string(), SourceLocation::dummy())
    }
}

/// One function's finished instruction body and frame size
#[derive(Debug, Clone, PartialEq)]
pub struct AsmFunction {
    pub name: String,
    pub frame_size: u32,
    pub body: Vec<AsmInst>,
}

/// A complete compilation unit ready for emission
#[derive(Debug, Clone, PartialEq)]
pub struct AsmProgram {
    /// Source file name recorded in the `.file` directive
    pub source_name: String,
    /// Symbol `main` calls
    pub entry: String,
    /// Functions in emission order
    pub functions: Vec<AsmFunction>,
}

/// Render one instruction as a line of assembly text
pub fn format_instruction(inst: &AsmInst) -> String {
    if inst.is_label() {
        inst.to_string()
    } else {
        format!("\t{}", inst)
    }
}

/// Render a list of instructions, one per line
pub fn emit_instructions(instructions: &[AsmInst]) -> Result<String, CodegenError> {
    let mut output = String::new();
    for inst in instructions {
        writeln!(output, "{}", format_instruction(inst))?;
    }
    Ok(output)
}

fn emit_header(out: &mut String, source_name: &str) -> Result<(), CodegenError> {
    writeln!(out, "\t.file\t\"{}\"", source_name)?;
    writeln!(out, "\t.section\t.rodata")?;
    writeln!(out, "{}:", WRITE_FORMAT_LABEL)?;
    writeln!(out, "\t.string\t\"%d\\n\"")?;
    writeln!(out, "{}:", READ_FORMAT_LABEL)?;
    writeln!(out, "\t.string\t\"%d\"")?;
    writeln!(out, "\t.text")?;
    Ok(())
}

fn emit_function(out: &mut String, function: &AsmFunction) -> Result<(), CodegenError> {
    let frame = Frame::new(function.name.as_str(), function.frame_size)?;
    out.push_str(&emit_instructions(&frame.gen_prologue())?);
    out.push_str(&emit_instructions(&function.body)?);
    out.push_str(&emit_instructions(&frame.gen_epilogue())?);
    Ok(())
}

/// The `main` wrapper: zero `%eax`, call the program symbol, return 0
pub fn main_wrapper(entry: &str) -> AsmFunction {
    let zero_eax = AsmInst::Movl(Operand::Imm(0), Operand::Reg(CallingConvention::RETURN_REG));
    AsmFunction {
        name: "main".to_string(),
        frame_size: 0,
        body: vec![zero_eax.clone(), AsmInst::Call(entry.to_string()), zero_eax],
    }
}

fn emit_footer(out: &mut String) -> Result<(), CodegenError> {
    writeln!(out, "\t.ident\t\"GPC: {}\"", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "\t.section\t.note.GNU-stack,\"\",@progbits")?;
    Ok(())
}

/// Render the whole compilation unit to text
///
/// Nothing is returned unless every function renders, so a caller never sees
/// a partial program.
pub fn emit_program(program: &AsmProgram) -> Result<String, CodegenError> {
    let mut seen = HashSet::new();
    for function in &program.functions {
        if function.name == "main" || !seen.insert(function.name.as_str()) {
            return Err(CodegenError::DuplicateSymbol(function.name.clone()));
        }
    }

    let mut out = String::new();
    emit_header(&mut out, &program.source_name)?;
    for function in &program.functions {
        debug!("emitting {} ({} bytes of frame)", function.name, function.frame_size);
        emit_function(&mut out, function)?;
    }
    emit_function(&mut out, &main_wrapper(&program.entry))?;
    emit_footer(&mut out)?;
    Ok(out)
}
