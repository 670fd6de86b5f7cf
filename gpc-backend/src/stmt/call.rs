//! Calls: the `read`/`write` builtins, user procedure calls, and function
//! calls inside expressions
//!
//! Arguments that need computing are evaluated first into per-depth
//! temporaries; only then are the ABI registers loaded, so evaluating one
//! argument can never clobber another.

use crate::context::CodegenContext;
use crate::error::BackendError;
use crate::expr::generate_expr;
use crate::naming::{arg_temp, save_temp};
use gpc_codegen::emit::{PRINTF_SYMBOL, READ_FORMAT_LABEL, SCANF_SYMBOL, WRITE_FORMAT_LABEL};
use gpc_codegen::{AsmInst, CallingConvention, Operand, Reg};
use gpc_common::LineNumber;
use gpc_frontend::{Expression, ExpressionKind};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builtin {
    Read,
    Write,
}

fn builtin(id: &str) -> Option<Builtin> {
    if id.eq_ignore_ascii_case("read") {
        Some(Builtin::Read)
    } else if id.eq_ignore_ascii_case("write") {
        Some(Builtin::Write)
    } else {
        None
    }
}

/// Procedure call statement
pub fn generate_procedure_call(
    ctx: &mut CodegenContext,
    id: &str,
    args: &[Expression],
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    match builtin(id) {
        Some(Builtin::Write) => generate_write(ctx, args, out),
        Some(Builtin::Read) => generate_read(ctx, args, line, out),
        None => emit_user_call(ctx, id, args, line, out),
    }
}

/// Function call evaluated into `target`
///
/// Registers held by enclosing evaluations are saved around the call, and
/// the pool is lent out whole for marshaling the call's own arguments.
pub fn generate_call_value(
    ctx: &mut CodegenContext,
    id: &str,
    args: &[Expression],
    line: LineNumber,
    target: Reg,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    if builtin(id).is_some() {
        return Err(BackendError::unsupported(
            format!("builtin procedure {} used as a value", id),
            line,
        ));
    }

    let depth = ctx.call_depth();
    let mut saved = Vec::new();
    for reg in ctx.pool.allocated() {
        let slot = ctx.temp_operand(&save_temp(depth, reg))?;
        out.push(AsmInst::Movl(Operand::Reg(reg), slot.clone()));
        saved.push((reg, slot));
    }
    debug!("call {} at depth {} saves {} registers", id, depth, saved.len());

    let snapshot = ctx.pool.snapshot();
    ctx.pool.reset();
    let result = emit_user_call(ctx, id, args, line, out);
    ctx.pool.restore(snapshot);
    result?;

    for (reg, slot) in saved {
        out.push(AsmInst::Movl(slot, Operand::Reg(reg)));
    }
    out.push(AsmInst::Movl(
        Operand::Reg(CallingConvention::RETURN_REG),
        Operand::Reg(target),
    ));
    Ok(())
}

/// Marshal `args` into the argument registers and call `id`
fn emit_user_call(
    ctx: &mut CodegenContext,
    id: &str,
    args: &[Expression],
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    if args.len() > CallingConvention::MAX_REG_ARGS {
        return Err(BackendError::TooManyArguments {
            callee: id.to_string(),
            count: args.len(),
            max: CallingConvention::MAX_REG_ARGS,
            line: Some(line),
        });
    }

    let depth = ctx.call_depth();
    ctx.enter_call();
    let staged = stage_arguments(ctx, args, depth, out);
    ctx.leave_call();
    let staged = staged?;

    let registers = CallingConvention::ARG_REGS[..staged.len()].to_vec();
    let claimed = claim(ctx, &registers)?;
    for (src, reg) in staged.into_iter().zip(registers) {
        out.push(AsmInst::Movl(src, Operand::Reg(reg)));
    }
    out.push(AsmInst::Movl(
        Operand::Imm(0),
        Operand::Reg(CallingConvention::VECTOR_COUNT_REG),
    ));
    out.push(AsmInst::Call(id.to_string()));
    release(ctx, claimed)
}

/// Produce a register-free operand for every argument
fn stage_arguments(
    ctx: &mut CodegenContext,
    args: &[Expression],
    depth: u32,
    out: &mut Vec<AsmInst>,
) -> Result<Vec<Operand>, BackendError> {
    let mut staged = Vec::with_capacity(args.len());
    for (index, arg) in args.iter().enumerate() {
        let operand = match &arg.kind {
            ExpressionKind::Var(name) => ctx.var_operand(name, arg.line)?,
            ExpressionKind::Integer(value) => Operand::Imm(*value),
            ExpressionKind::ArrayAccess { id, .. } => {
                return Err(BackendError::unsupported(
                    format!("array element {}[...] as an argument", id),
                    arg.line,
                ));
            }
            _ => {
                let reg = generate_expr(ctx, arg, out)?;
                let slot = ctx.temp_operand(&arg_temp(depth, index))?;
                out.push(AsmInst::Movl(Operand::Reg(reg), slot.clone()));
                ctx.pool.free(reg)?;
                slot
            }
        };
        staged.push(operand);
    }
    Ok(staged)
}

/// Take the pool members among `registers` for the duration of a call
fn claim(ctx: &mut CodegenContext, registers: &[Reg]) -> Result<Vec<Reg>, BackendError> {
    let mut claimed = Vec::new();
    for &reg in registers {
        if ctx.pool.is_member(reg) {
            claimed.push(ctx.pool.allocate_named(reg)?);
        }
    }
    Ok(claimed)
}

fn release(ctx: &mut CodegenContext, claimed: Vec<Reg>) -> Result<(), BackendError> {
    for reg in claimed.into_iter().rev() {
        ctx.pool.free(reg)?;
    }
    Ok(())
}

/// `write(e1, e2, ...)`: one `printf("%d\n", e)` per argument
fn generate_write(
    ctx: &mut CodegenContext,
    args: &[Expression],
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let value_reg = CallingConvention::ARG_REGS[1];
    let format_reg = CallingConvention::ARG_REGS[0];

    for arg in args {
        let reg = generate_expr(ctx, arg, out)?;
        out.push(AsmInst::Movl(Operand::Reg(reg), Operand::Reg(value_reg)));
        ctx.pool.free(reg)?;

        let claimed = claim(ctx, &[format_reg, value_reg])?;
        out.push(AsmInst::Leaq(
            Operand::RipRel(WRITE_FORMAT_LABEL.to_string()),
            format_reg,
        ));
        out.push(AsmInst::Movl(
            Operand::Imm(0),
            Operand::Reg(CallingConvention::VECTOR_COUNT_REG),
        ));
        out.push(AsmInst::Call(PRINTF_SYMBOL.to_string()));
        release(ctx, claimed)?;
    }
    Ok(())
}

/// `read(v1, v2, ...)`: one `scanf("%d", &v)` per argument
fn generate_read(
    ctx: &mut CodegenContext,
    args: &[Expression],
    line: LineNumber,
    out: &mut Vec<AsmInst>,
) -> Result<(), BackendError> {
    let address_reg = CallingConvention::ARG_REGS[1];
    let format_reg = CallingConvention::ARG_REGS[0];

    for arg in args {
        let slot = match &arg.kind {
            ExpressionKind::Var(name) => ctx.var_operand(name, arg.line)?,
            ExpressionKind::ArrayAccess { id, .. } => {
                return Err(BackendError::unsupported(
                    format!("read into array element {}[...]", id),
                    arg.line,
                ));
            }
            _ => {
                return Err(BackendError::internal(
                    format!("read target {} is not a variable", arg),
                    Some(line),
                ));
            }
        };

        let claimed = claim(ctx, &[format_reg, address_reg])?;
        out.push(AsmInst::Leaq(slot, address_reg));
        out.push(AsmInst::Leaq(
            Operand::RipRel(READ_FORMAT_LABEL.to_string()),
            format_reg,
        ));
        out.push(AsmInst::Movl(
            Operand::Imm(0),
            Operand::Reg(CallingConvention::VECTOR_COUNT_REG),
        ));
        out.push(AsmInst::Call(SCANF_SYMBOL.to_string()));
        release(ctx, claimed)?;
    }
    Ok(())
}
