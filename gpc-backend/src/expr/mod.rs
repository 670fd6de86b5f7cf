//! Expression code generation
//!
//! An expression is turned into a labeled [`ExprNode`] tree and walked by
//! [`gencode`]. Integer-valued expressions end in one allocated register the
//! caller must free; comparisons end in the flags and report their operator.

pub use self::gencode::gencode;
pub use self::tree::{build_condition_tree, build_value_tree, BinOp, ExprNode, Leaf, NodeKind};

use crate::context::CodegenContext;
use crate::error::BackendError;
use gpc_codegen::{AsmInst, Condition, Reg};
use gpc_frontend::{Expression, RelOp};
use log::trace;

mod gencode;
mod tree;

#[cfg(test)]
mod tests;

/// Evaluate `expr` into a freshly allocated register
///
/// Instructions are only appended to `out` once the whole expression has
/// been generated.
pub fn generate_expr(
    ctx: &mut CodegenContext,
    expr: &Expression,
    out: &mut Vec<AsmInst>,
) -> Result<Reg, BackendError> {
    let tree = build_value_tree(ctx, expr)?;
    trace!("expression tree for {}:\n{}", expr, tree);

    let checkpoint = ctx.pool.checkpoint();
    let mut code = Vec::new();
    gencode(ctx, &tree, &mut code).map_err(|e| e.with_line(expr.line))?;
    ctx.pool
        .check_balance(&checkpoint, 0)
        .map_err(|e| e.with_line(expr.line))?;

    let reg = ctx.pool.allocate_any().map_err(|e| e.with_line(expr.line))?;
    ctx.pool
        .check_balance(&checkpoint, 1)
        .map_err(|e| e.with_line(expr.line))?;

    out.extend(code);
    Ok(reg)
}

/// Evaluate a comparison, leaving its outcome in the flags
pub fn generate_condition(
    ctx: &mut CodegenContext,
    expr: &Expression,
    out: &mut Vec<AsmInst>,
) -> Result<RelOp, BackendError> {
    let tree = build_condition_tree(ctx, expr)?;
    trace!("condition tree for {}:\n{}", expr, tree);

    let NodeKind::Binary { op: BinOp::Compare(relop), .. } = &tree.kind else {
        return Err(BackendError::internal("condition tree without a comparison", Some(expr.line)));
    };
    let relop = *relop;

    let checkpoint = ctx.pool.checkpoint();
    let mut code = Vec::new();
    gencode(ctx, &tree, &mut code).map_err(|e| e.with_line(expr.line))?;
    ctx.pool
        .check_balance(&checkpoint, 0)
        .map_err(|e| e.with_line(expr.line))?;

    out.extend(code);
    Ok(relop)
}

/// Jump condition that holds when `left op right` after `cmpl right, left`
pub fn condition_code(op: RelOp) -> Condition {
    match op {
        RelOp::Eq => Condition::E,
        RelOp::Ne => Condition::Ne,
        RelOp::Lt => Condition::L,
        RelOp::Le => Condition::Le,
        RelOp::Gt => Condition::G,
        RelOp::Ge => Condition::Ge,
    }
}
