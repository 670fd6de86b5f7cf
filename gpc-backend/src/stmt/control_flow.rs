//! Conditional jumps, `if`, `while` and `for`

use super::{generate_assign, generate_statement};
use crate::context::CodegenContext;
use crate::error::BackendError;
use crate::expr::{condition_code, generate_condition};
use gpc_codegen::AsmInst;
use gpc_common::LineNumber;
use gpc_frontend::{Expression, ExpressionKind, ForInit, LogicalOp, RelOp, Statement, TreeBuilder};

/// Jump to `target` when `cond` is false, fall through otherwise
pub fn jump_if_false(
    ctx: &mut CodegenContext,
    cond: &Expression,
    target: &str,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    match &cond.kind {
        ExpressionKind::Relational { .. } => {
            let op = generate_condition(ctx, cond, out)?;
            out.push(AsmInst::Jcc(condition_code(op).inverse(), target.to_string()));
            Ok(())
        }
        ExpressionKind::Not(inner) => jump_if_true(ctx, inner, target, out),
        ExpressionKind::Logical { op: LogicalOp::And, left, right } => {
            jump_if_false(ctx, left, target, out)?;
            jump_if_false(ctx, right, target, out)
        }
        ExpressionKind::Logical { op: LogicalOp::Or, left, right } => {
            let taken = ctx.new_label();
            jump_if_true(ctx, left, &taken, out)?;
            jump_if_false(ctx, right, target, out)?;
            out.push(AsmInst::Label(taken));
            Ok(())
        }
        _ => Err(non_boolean(cond)),
    }
}

/// Jump to `target` when `cond` is true, fall through otherwise
pub fn jump_if_true(
    ctx: &mut CodegenContext,
    cond: &Expression,
    target: &str,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    match &cond.kind {
        ExpressionKind::Relational { .. } => {
            let op = generate_condition(ctx, cond, out)?;
            out.push(AsmInst::Jcc(condition_code(op), target.to_string()));
            Ok(())
        }
        ExpressionKind::Not(inner) => jump_if_false(ctx, inner, target, out),
        ExpressionKind::Logical { op: LogicalOp::Or, left, right } => {
            jump_if_true(ctx, left, target, out)?;
            jump_if_true(ctx, right, target, out)
        }
        ExpressionKind::Logical { op: LogicalOp::And, left, right } => {
            let skip = ctx.new_label();
            jump_if_false(ctx, left, &skip, out)?;
            jump_if_true(ctx, right, target, out)?;
            out.push(AsmInst::Label(skip));
            Ok(())
        }
        _ => Err(non_boolean(cond)),
    }
}

fn non_boolean(cond: &Expression) -> BackendError {
    BackendError::unsupported(format!("non-boolean condition {}", cond), cond.line)
}

pub fn generate_if(
    ctx: &mut CodegenContext,
    condition: &Expression,
    then_stmt: &Statement,
    else_stmt: Option<&Statement>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let else_label = ctx.new_label();
    jump_if_false(ctx, condition, &else_label, out)?;
    generate_statement(ctx, then_stmt, out)?;

    match else_stmt {
        Some(else_stmt) => {
            let end_label = ctx.new_label();
            out.push(AsmInst::Jmp(end_label.clone()));
            out.push(AsmInst::Label(else_label));
            generate_statement(ctx, else_stmt, out)?;
            out.push(AsmInst::Label(end_label));
        }
        None => out.push(AsmInst::Label(else_label)),
    }
    Ok(())
}

/// Test at the bottom: `jmp test; body: ...; test: if cond goto body`
fn emit_loop(
    ctx: &mut CodegenContext,
    condition: &Expression,
    body: &Statement,
    step: Option<&Statement>,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let body_label = ctx.new_label();
    let test_label = ctx.new_label();

    out.push(AsmInst::Jmp(test_label.clone()));
    out.push(AsmInst::Label(body_label.clone()));
    generate_statement(ctx, body, out)?;
    if let Some(step) = step {
        generate_statement(ctx, step, out)?;
    }
    out.push(AsmInst::Label(test_label));
    jump_if_true(ctx, condition, &body_label, out)
}

pub fn generate_while(
    ctx: &mut CodegenContext,
    condition: &Expression,
    body: &Statement,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    emit_loop(ctx, condition, body, None, out)
}

/// `for` runs as a while loop over `var < to` with `var := var + 1` after
/// each pass
pub fn generate_for(
    ctx: &mut CodegenContext,
    init: &ForInit,
    to: &Expression,
    body: &Statement,
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let var = init.var();
    if var.as_var().is_none() {
        return Err(BackendError::unsupported(
            format!("for loop over {}", var),
            line,
        ));
    }

    if let ForInit::Assign { var, value } = init {
        generate_assign(ctx, var, value, line, out)?;
    }

    let b = TreeBuilder::at(line);
    let condition = b.rel(RelOp::Lt, var.clone(), to.clone());
    let step = b.assign_to(var.clone(), b.add(var.clone(), b.int(1)));
    emit_loop(ctx, &condition, body, Some(&step), out)
}
