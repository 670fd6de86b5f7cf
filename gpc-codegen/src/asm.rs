//! x86-64 Assembly Instruction Definitions
//!
//! This module defines the register model and the subset of the x86-64
//! instruction set the Pascal backend emits. Instructions are structured
//! records; `Display` renders them in GNU AT&T syntax (source operand first).

use std::fmt;

/// x86-64 general purpose registers used by the backend
///
/// Only 32-bit arithmetic is generated, so most instructions name the
/// 32-bit half (`%edi`); frame and stack manipulation uses the 64-bit name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
}

impl Reg {
    /// 64-bit register name, e.g. `%rdi`
    pub fn name64(self) -> &'static str {
        match self {
            Reg::Rax => "%rax",
            Reg::Rcx => "%rcx",
            Reg::Rdx => "%rdx",
            Reg::Rsi => "%rsi",
            Reg::Rdi => "%rdi",
            Reg::Rbp => "%rbp",
            Reg::Rsp => "%rsp",
        }
    }

    /// 32-bit register name, e.g. `%edi`
    pub fn name32(self) -> &'static str {
        match self {
            Reg::Rax => "%eax",
            Reg::Rcx => "%ecx",
            Reg::Rdx => "%edx",
            Reg::Rsi => "%esi",
            Reg::Rdi => "%edi",
            Reg::Rbp => "%ebp",
            Reg::Rsp => "%esp",
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name64())
    }
}

/// Operand of a 32-bit instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// 32-bit view of a register
    Reg(Reg),
    /// `$value`
    Imm(i32),
    /// `disp(%base)`
    Mem { base: Reg, disp: i32 },
    /// `label(%rip)`
    RipRel(String),
}

impl Operand {
    /// A frame slot at byte offset `offset` below the frame pointer
    pub fn frame_slot(offset: u32) -> Self {
        Operand::Mem {
            base: Reg::Rbp,
            disp: -(offset as i32),
        }
    }

    pub fn is_imm(&self) -> bool {
        matches!(self, Operand::Imm(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{}", r.name32()),
            Operand::Imm(v) => write!(f, "${}", v),
            Operand::Mem { base, disp } => write!(f, "{}({})", disp, base.name64()),
            Operand::RipRel(label) => write!(f, "{}(%rip)", label),
        }
    }
}

/// Two-operand integer arithmetic that writes its result into the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Imul,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "addl",
            ArithOp::Sub => "subl",
            ArithOp::Imul => "imull",
        }
    }
}

/// Condition codes for conditional jumps after a signed `cmpl`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    E,
    Ne,
    L,
    Le,
    G,
    Ge,
}

impl Condition {
    /// Condition that holds exactly when `self` does not
    pub fn inverse(self) -> Condition {
        match self {
            Condition::E => Condition::Ne,
            Condition::Ne => Condition::E,
            Condition::L => Condition::Ge,
            Condition::Le => Condition::G,
            Condition::G => Condition::Le,
            Condition::Ge => Condition::L,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Condition::E => "e",
            Condition::Ne => "ne",
            Condition::L => "l",
            Condition::Le => "le",
            Condition::G => "g",
            Condition::Ge => "ge",
        }
    }

    /// Evaluate the condition against the operands of `cmpl src, dest`
    pub fn holds(self, dest: i32, src: i32) -> bool {
        match self {
            Condition::E => dest == src,
            Condition::Ne => dest != src,
            Condition::L => dest < src,
            Condition::Le => dest <= src,
            Condition::G => dest > src,
            Condition::Ge => dest >= src,
        }
    }
}

/// x86-64 Assembly Instructions
///
/// 32-bit data movement and arithmetic, 64-bit frame/stack manipulation,
/// control flow, and the pseudo-instructions needed to lay out a function.
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // 32-bit data and arithmetic (AT&T order: src, dest)
    Movl(Operand, Operand),
    Arith(ArithOp, Operand, Operand),
    Negl(Operand),
    Cmpl(Operand, Operand),
    Cdq,
    Idivl(Operand),

    // 64-bit frame and stack manipulation
    Movq(Reg, Reg),
    Pushq(Reg),
    Popq(Reg),
    SubqImm(u32, Reg),
    Leaq(Operand, Reg),

    // Control flow
    Jmp(String),
    Jcc(Condition, String),
    Call(String),
    Ret,

    // Assembly pseudo-instructions
    Label(String),
    Directive(String),
    Comment(String),
}

impl AsmInst {
    /// Whether the line is rendered flush left rather than indented
    pub fn is_label(&self) -> bool {
        matches!(self, AsmInst::Label(_))
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Movl(src, dst) => write!(f, "movl\t{}, {}", src, dst),
            AsmInst::Arith(op, src, dst) => write!(f, "{}\t{}, {}", op.mnemonic(), src, dst),
            AsmInst::Negl(dst) => write!(f, "negl\t{}", dst),
            AsmInst::Cmpl(src, dst) => write!(f, "cmpl\t{}, {}", src, dst),
            AsmInst::Cdq => write!(f, "cdq"),
            AsmInst::Idivl(divisor) => write!(f, "idivl\t{}", divisor),

            AsmInst::Movq(src, dst) => write!(f, "movq\t{}, {}", src, dst),
            AsmInst::Pushq(r) => write!(f, "pushq\t{}", r),
            AsmInst::Popq(r) => write!(f, "popq\t{}", r),
            AsmInst::SubqImm(imm, r) => write!(f, "subq\t${}, {}", imm, r),
            AsmInst::Leaq(src, r) => write!(f, "leaq\t{}, {}", src, r),

            AsmInst::Jmp(label) => write!(f, "jmp\t{}", label),
            AsmInst::Jcc(cond, label) => write!(f, "j{}\t{}", cond.suffix(), label),
            AsmInst::Call(target) => write!(f, "call\t{}", target),
            AsmInst::Ret => write!(f, "ret"),

            AsmInst::Label(name) => write!(f, "{}:", name),
            AsmInst::Directive(text) => write!(f, "{}", text),
            AsmInst::Comment(text) => write!(f, "# {}", text),
        }
    }
}
