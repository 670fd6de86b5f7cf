//! Statement code generation
//!
//! Each statement appends its instructions to the current body. Expression
//! results are freed as soon as they are stored, so the pool is full again
//! between statements.

pub mod call;
mod control_flow;

pub use self::control_flow::{jump_if_false, jump_if_true};

use crate::context::CodegenContext;
use crate::error::BackendError;
use crate::expr::generate_expr;
use gpc_codegen::{AsmInst, Operand};
use gpc_common::LineNumber;
use gpc_frontend::{Expression, ExpressionKind, ForInit, Statement, StatementKind};
use log::trace;

pub fn generate_statement(
    ctx: &mut CodegenContext,
    stmt: &Statement,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    if ctx.options().emit_comments && !matches!(stmt.kind, StatementKind::Compound(_)) {
        out.push(AsmInst::Comment(describe(stmt)));
    }
    trace!("line {}: {} statement", stmt.line, stmt.kind_name());

    match &stmt.kind {
        StatementKind::Assign { target, value } => generate_assign(ctx, target, value, stmt.line, out),
        StatementKind::ProcedureCall { id, args } => {
            call::generate_procedure_call(ctx, id, args, stmt.line, out)
        }
        StatementKind::Compound(statements) => {
            for inner in statements {
                generate_statement(ctx, inner, out)?;
            }
            Ok(())
        }
        StatementKind::If {
            condition,
            then_stmt,
            else_stmt,
        } => control_flow::generate_if(ctx, condition, then_stmt, else_stmt.as_deref(), out),
        StatementKind::While { condition, body } => {
            control_flow::generate_while(ctx, condition, body, out)
        }
        StatementKind::For { init, to, body } => {
            control_flow::generate_for(ctx, init, to, body, stmt.line, out)
        }
    }
}

/// `target := value`
pub fn generate_assign(
    ctx: &mut CodegenContext,
    target: &Expression,
    value: &Expression,
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let slot = match &target.kind {
        ExpressionKind::Var(name) => ctx.var_operand(name, target.line)?,
        ExpressionKind::ArrayAccess { id, .. } => {
            return Err(BackendError::unsupported(
                format!("assignment to array element {}[...]", id),
                line,
            ));
        }
        _ => {
            return Err(BackendError::internal(
                format!("assignment target {} is not a variable", target),
                Some(line),
            ));
        }
    };

    let reg = generate_expr(ctx, value, out)?;
    out.push(AsmInst::Movl(Operand::Reg(reg), slot));
    ctx.pool.free(reg)
}

/// One-line source rendering of a statement for `# ...` comments
fn describe(stmt: &Statement) -> String {
    let text = match &stmt.kind {
        StatementKind::Assign { target, value } => format!("{} := {}", target, value),
        StatementKind::ProcedureCall { id, args } => {
            let args: Vec<String> = args.iter().map(ToString::to_string).collect();
            format!("{}({})", id, args.join(", "))
        }
        StatementKind::Compound(_) => "begin ... end".to_string(),
        StatementKind::If { condition, else_stmt, .. } => match else_stmt {
            Some(_) => format!("if {} then ... else ...", condition),
            None => format!("if {} then ...", condition),
        },
        StatementKind::While { condition, .. } => format!("while {} do ...", condition),
        StatementKind::For { init, to, .. } => match init {
            ForInit::Assign { var, value } => format!("for {} := {} to {} do ...", var, value, to),
            ForInit::Var(var) => format!("for {} to {} do ...", var, to),
        },
    };
    format!("line {}: {}", stmt.line, text)
}
