//! GPC Pascal Compiler - x86-64 Target
//!
//! This crate handles the target side of code generation: the machine model
//! the backend emits into and the final text rendering. It includes:
//!
//! - Assembly instruction and register definitions (AT&T syntax)
//! - ABI implementation (argument registers, stack frames)
//! - Whole-program emission (header, functions, `main`, footer)

pub mod abi;
pub mod asm;
pub mod emit;

pub use abi::{align_frame_size, AbiError, CallingConvention, Frame};
pub use asm::{ArithOp, AsmInst, Condition, Operand, Reg};
pub use emit::{emit_instructions, emit_program, AsmFunction, AsmProgram, CodegenError};
