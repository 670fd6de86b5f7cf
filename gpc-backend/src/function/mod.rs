//! Function and program emission
//!
//! Every subprogram and the program body become one [`AsmFunction`]. Nested
//! subprograms are finished before their parent's body is generated, so the
//! output lists inner functions first and the program last.

use crate::context::CodegenContext;
use crate::error::BackendError;
use crate::stmt::generate_statement;
use gpc_codegen::{AsmFunction, AsmInst, CallingConvention, Operand};
use gpc_common::LineNumber;
use gpc_frontend::{Declaration, DeclarationKind, Program, Statement, Subprogram, VarType};
use log::{debug, info};

/// The parts of a program or subprogram the emitter needs
struct Unit<'a> {
    name: &'a str,
    params: &'a [Declaration],
    declarations: &'a [Declaration],
    subprograms: &'a [Subprogram],
    body: &'a Statement,
    returns_value: bool,
    line: LineNumber,
}

impl<'a> From<&'a Program> for Unit<'a> {
    fn from(program: &'a Program) -> Self {
        Unit {
            name: &program.name,
            params: &[],
            declarations: &program.declarations,
            subprograms: &program.subprograms,
            body: &program.body,
            returns_value: false,
            line: program.line,
        }
    }
}

impl<'a> From<&'a Subprogram> for Unit<'a> {
    fn from(sub: &'a Subprogram) -> Self {
        Unit {
            name: &sub.name,
            params: &sub.params,
            declarations: &sub.declarations,
            subprograms: &sub.subprograms,
            body: &sub.body,
            returns_value: sub.is_function(),
            line: sub.line,
        }
    }
}

/// Generate every function of `program`, program body last
pub fn generate_functions(
    ctx: &mut CodegenContext,
    program: &Program,
) -> Result<Vec<AsmFunction>, BackendError> {
    let mut functions = Vec::new();
    generate_unit(ctx, Unit::from(program), &mut functions)?;
    Ok(functions)
}

/// Generate one subprogram and everything nested in it
pub fn generate_subprogram(
    ctx: &mut CodegenContext,
    sub: &Subprogram,
    functions: &mut Vec<AsmFunction>,
) -> Result<(), BackendError> {
    generate_unit(ctx, Unit::from(sub), functions)
}

fn generate_unit(
    ctx: &mut CodegenContext,
    unit: Unit<'_>,
    functions: &mut Vec<AsmFunction>,
) -> Result<(), BackendError> {
    info!(
        "generating {} ({} params, {} nested)",
        unit.name,
        unit.params.len(),
        unit.subprograms.len()
    );

    ctx.enter_scope();
    let generated = generate_body(ctx, &unit, functions);
    let frame_size = ctx.frames.total_frame_size();
    ctx.leave_scope()?;

    let body = generated?;
    let frame_size = frame_size?;
    debug!("{}: frame of {} bytes, {} instructions", unit.name, frame_size, body.len());

    functions.push(AsmFunction {
        name: unit.name.to_string(),
        frame_size,
        body,
    });
    Ok(())
}

fn generate_body(
    ctx: &mut CodegenContext,
    unit: &Unit<'_>,
    functions: &mut Vec<AsmFunction>,
) -> Result<Vec<AsmInst>, BackendError> {
    let params = bind_params(ctx, unit)?;
    bind_locals(ctx, unit.declarations)?;
    let return_slot = if unit.returns_value {
        Some(ctx.frames.add_local(unit.name)?.operand())
    } else {
        None
    };

    for sub in unit.subprograms {
        generate_subprogram(ctx, sub, functions)?;
    }

    let mut body = Vec::new();
    for (index, slot) in params.into_iter().enumerate() {
        let reg = CallingConvention::arg_reg(index).map_err(gpc_codegen::CodegenError::from)?;
        body.push(AsmInst::Movl(Operand::Reg(reg), slot));
    }

    generate_statement(ctx, unit.body, &mut body)?;

    if let Some(slot) = return_slot {
        body.push(AsmInst::Movl(slot, Operand::Reg(CallingConvention::RETURN_REG)));
    }
    Ok(body)
}

/// Lay out the parameters in declaration order, returning their slots
fn bind_params(ctx: &mut CodegenContext, unit: &Unit<'_>) -> Result<Vec<Operand>, BackendError> {
    let count: usize = unit.params.iter().map(|p| p.ids().len()).sum();
    if count > CallingConvention::MAX_REG_ARGS {
        return Err(BackendError::TooManyArguments {
            callee: unit.name.to_string(),
            count,
            max: CallingConvention::MAX_REG_ARGS,
            line: Some(unit.line),
        });
    }

    let mut slots = Vec::with_capacity(count);
    for param in unit.params {
        match &param.kind {
            DeclarationKind::Var { ids, var_type } => {
                if *var_type == VarType::Real {
                    ctx.warn("REAL parameters not supported, treating as integer", param.line);
                }
                for id in ids {
                    slots.push(ctx.frames.add_argument(id)?.operand());
                }
            }
            DeclarationKind::Array { ids, .. } => {
                return Err(BackendError::unsupported(
                    format!("array parameter {}", ids.join(", ")),
                    param.line,
                ));
            }
        }
    }
    Ok(slots)
}

fn bind_locals(ctx: &mut CodegenContext, declarations: &[Declaration]) -> Result<(), BackendError> {
    for decl in declarations {
        match &decl.kind {
            DeclarationKind::Var { ids, var_type } => {
                if *var_type == VarType::Real {
                    ctx.warn("REAL types not supported, treating as integer", decl.line);
                }
                for id in ids {
                    ctx.frames.add_local(id)?;
                }
            }
            DeclarationKind::Array { ids, .. } => {
                for id in ids {
                    ctx.warn(format!("array {} not supported, no storage allocated", id), decl.line);
                    ctx.skip_array(id);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
