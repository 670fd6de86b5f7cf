//! System V x86-64 ABI Implementation
//!
//! This module implements the parts of the System V AMD64 ABI the Pascal
//! backend relies on: register argument passing, the return register, stack
//! alignment, and function prologue/epilogue generation.

use crate::asm::{AsmInst, Reg};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AbiError {
    #[error("Too many arguments: {0} (maximum: {1})")]
    TooManyArguments(usize, usize),

    #[error("Stack frame of {0} bytes is not {1}-byte aligned")]
    MisalignedFrame(u32, u32),
}

/// System V AMD64 calling convention, restricted to integer arguments
///
/// Register Usage:
/// - RDI, RSI, RDX, RCX: first four integer arguments
/// - RAX: return value, and the count of vector arguments for variadic calls
/// - RDX:RAX: dividend/remainder pair for `idivl`
/// - RBP, RSP: frame and stack pointer
pub struct CallingConvention;

impl CallingConvention {
    /// Maximum number of arguments passed in registers
    pub const MAX_REG_ARGS: usize = 4;

    /// Registers used for passing arguments, in order
    pub const ARG_REGS: [Reg; 4] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx];

    pub const RETURN_REG: Reg = Reg::Rax;

    /// Holds the number of vector registers used by a variadic call
    pub const VECTOR_COUNT_REG: Reg = Reg::Rax;

    pub const DIVIDEND_REG: Reg = Reg::Rax;
    pub const REMAINDER_REG: Reg = Reg::Rdx;

    pub const STACK_PTR: Reg = Reg::Rsp;
    pub const FRAME_PTR: Reg = Reg::Rbp;

    /// `%rsp` must be a multiple of this at every call
    pub const STACK_ALIGNMENT: u32 = 16;

    /// Saved frame pointer plus return address
    pub const RESERVED_FRAME_BYTES: u32 = 16;

    /// Get the register for an argument index (0-based)
    pub fn arg_reg(index: usize) -> Result<Reg, AbiError> {
        if index >= Self::MAX_REG_ARGS {
            return Err(AbiError::TooManyArguments(index + 1, Self::MAX_REG_ARGS));
        }
        Ok(Self::ARG_REGS[index])
    }
}

/// Round `bytes` up to the next multiple of the stack alignment
pub fn align_frame_size(bytes: u32) -> u32 {
    let align = CallingConvention::STACK_ALIGNMENT;
    bytes.div_ceil(align) * align
}

/// Stack Frame Layout
///
/// The frame grows downward from `%rbp`:
/// 1. Return address and saved frame pointer
/// 2. Argument slots
/// 3. Local variable slots
/// 4. Temporaries
///
/// `size` is the amount subtracted from `%rsp` after the frame pointer is set.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub size: u32,
}

impl Frame {
    pub fn new(name: impl Into<String>, size: u32) -> Result<Self, AbiError> {
        if size % CallingConvention::STACK_ALIGNMENT != 0 {
            return Err(AbiError::MisalignedFrame(size, CallingConvention::STACK_ALIGNMENT));
        }
        Ok(Self {
            name: name.into(),
            size,
        })
    }

    /// Generate function prologue
    ///
    /// The prologue:
    /// 1. Declares the symbol global and typed as a function
    /// 2. Saves the old frame pointer
    /// 3. Sets up the new frame pointer
    /// 4. Allocates the frame, if it is non-empty
    pub fn gen_prologue(&self) -> Vec<AsmInst> {
        let mut code = vec![
            AsmInst::Directive(format!(".globl\t{}", self.name)),
            AsmInst::Directive(format!(".type\t{}, @function", self.name)),
            AsmInst::Label(self.name.clone()),
            AsmInst::Pushq(CallingConvention::FRAME_PTR),
            AsmInst::Movq(CallingConvention::STACK_PTR, CallingConvention::FRAME_PTR),
        ];

        if self.size > 0 {
            code.push(AsmInst::SubqImm(self.size, CallingConvention::STACK_PTR));
        }

        code
    }

    /// Generate function epilogue
    ///
    /// Releases the frame, restores the caller's frame pointer, returns, and
    /// records the symbol size.
    pub fn gen_epilogue(&self) -> Vec<AsmInst> {
        vec![
            AsmInst::Movq(CallingConvention::FRAME_PTR, CallingConvention::STACK_PTR),
            AsmInst::Popq(CallingConvention::FRAME_PTR),
            AsmInst::Ret,
            AsmInst::Directive(format!(".size\t{}, .-{}", self.name, self.name)),
        ]
    }
}
