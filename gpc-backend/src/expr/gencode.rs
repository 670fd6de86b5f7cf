//! The gencode walk
//!
//! Evaluates a labeled tree into the register at the top of the pool. The
//! harder operand is evaluated first; case 2 swaps the top two pool entries
//! around its evaluation so the combining instruction still reads
//! `left OP right`.

use super::tree::{BinOp, ExprNode, Leaf, NodeKind};
use crate::context::CodegenContext;
use crate::error::BackendError;
use crate::naming::DIV_CONST_TEMP;
use crate::stmt::call;
use gpc_codegen::{ArithOp, AsmInst, CallingConvention, Operand, Reg};
use gpc_common::LineNumber;
use log::trace;

pub fn gencode(
    ctx: &mut CodegenContext,
    node: &ExprNode<'_>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let capacity = ctx.pool.capacity();
    if node.label as usize > capacity {
        return Err(BackendError::ExpressionTooComplex {
            label: node.label,
            capacity,
            line: Some(node.line),
        });
    }

    match &node.kind {
        NodeKind::Negate(child) => {
            gencode(ctx, child, out)?;
            let reg = ctx.pool.peek()?;
            out.push(AsmInst::Negl(Operand::Reg(reg)));
            Ok(())
        }
        NodeKind::Leaf(leaf) => case0(ctx, leaf, node.line, out),
        NodeKind::Binary { op, left, right } => {
            if right.is_operand_leaf() {
                case1(ctx, *op, left, right, out)
            } else if left.label < right.label {
                case2(ctx, *op, left, right, out)
            } else {
                case3(ctx, *op, left, right, out)
            }
        }
    }
}

/// Leaf straight into the top register
fn case0(
    ctx: &mut CodegenContext,
    leaf: &Leaf<'_>,
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let target = ctx.pool.peek()?;
    trace!("gencode case 0 into {}", target);
    match leaf {
        Leaf::Call { id, args } => call::generate_call_value(ctx, id, args, line, target, out),
        _ => {
            let src = leaf_operand(ctx, leaf, line)?;
            out.push(AsmInst::Movl(src, Operand::Reg(target)));
            Ok(())
        }
    }
}

/// Right operand is a plain leaf: combine it into the left result in place
fn case1(
    ctx: &mut CodegenContext,
    op: BinOp,
    left: &ExprNode<'_>,
    right: &ExprNode<'_>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    gencode(ctx, left, out)?;
    let NodeKind::Leaf(leaf) = &right.kind else {
        return Err(BackendError::internal("case 1 without a leaf operand", Some(right.line)));
    };
    let src = leaf_operand(ctx, leaf, right.line)?;
    let dest = ctx.pool.peek()?;
    trace!("gencode case 1 {} into {}", op, dest);
    apply_op(ctx, op, src, dest, out)
}

/// Right subtree is harder: evaluate it first in the second register
fn case2(
    ctx: &mut CodegenContext,
    op: BinOp,
    left: &ExprNode<'_>,
    right: &ExprNode<'_>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    ctx.pool.swap_top_two()?;
    gencode(ctx, right, out)?;
    let right_reg = ctx.pool.allocate_any()?;
    gencode(ctx, left, out)?;
    let left_reg = ctx.pool.peek()?;
    trace!("gencode case 2 {} {} <- {}", op, left_reg, right_reg);
    apply_op(ctx, op, Operand::Reg(right_reg), left_reg, out)?;
    ctx.pool.free(right_reg)?;
    ctx.pool.swap_top_two()
}

/// Left subtree is at least as hard: evaluate it first and hold it
fn case3(
    ctx: &mut CodegenContext,
    op: BinOp,
    left: &ExprNode<'_>,
    right: &ExprNode<'_>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    gencode(ctx, left, out)?;
    let left_reg = ctx.pool.allocate_any()?;
    gencode(ctx, right, out)?;
    let right_reg = ctx.pool.peek()?;
    trace!("gencode case 3 {} {} <- {}", op, left_reg, right_reg);
    apply_op(ctx, op, Operand::Reg(right_reg), left_reg, out)?;
    ctx.pool.free(left_reg)
}

fn leaf_operand(ctx: &CodegenContext, leaf: &Leaf<'_>, line: LineNumber) -> Result<Operand, BackendError> {
    match leaf {
        Leaf::Var(name) => ctx.var_operand(name, line),
        Leaf::Int(value) => Ok(Operand::Imm(*value)),
        Leaf::Call { id, .. } => Err(BackendError::internal(
            format!("call to {} used as a direct operand", id),
            Some(line),
        )),
    }
}

/// `dest = dest OP src`
fn apply_op(
    ctx: &mut CodegenContext,
    op: BinOp,
    src: Operand,
    dest: Reg,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let arith = match op {
        BinOp::Add => ArithOp::Add,
        BinOp::Sub => ArithOp::Sub,
        BinOp::Mul => ArithOp::Imul,
        BinOp::Div => return emit_division(ctx, false, src, dest, out),
        BinOp::Mod => return emit_division(ctx, true, src, dest, out),
        BinOp::Compare(_) => {
            out.push(AsmInst::Cmpl(src, Operand::Reg(dest)));
            return Ok(());
        }
    };
    out.push(AsmInst::Arith(arith, src, Operand::Reg(dest)));
    Ok(())
}

/// Signed division through `%edx:%eax`
///
/// `idivl` takes no immediate, so a constant divisor goes through a
/// temporary slot first.
fn emit_division(
    ctx: &mut CodegenContext,
    remainder: bool,
    src: Operand,
    dest: Reg,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let divisor = if src.is_imm() {
        let slot = ctx.temp_operand(DIV_CONST_TEMP)?;
        out.push(AsmInst::Movl(src, slot.clone()));
        slot
    } else {
        src
    };

    out.push(AsmInst::Movl(
        Operand::Reg(dest),
        Operand::Reg(CallingConvention::DIVIDEND_REG),
    ));
    out.push(AsmInst::Cdq);
    out.push(AsmInst::Idivl(divisor));

    let result = if remainder {
        CallingConvention::REMAINDER_REG
    } else {
        CallingConvention::DIVIDEND_REG
    };
    out.push(AsmInst::Movl(Operand::Reg(result), Operand::Reg(dest)));
    Ok(())
}
