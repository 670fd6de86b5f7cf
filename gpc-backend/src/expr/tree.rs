//! Expression tree builder and Sethi-Ullman labeling
//!
//! The syntax tree's expression is reshaped into a binary tree of the
//! operations codegen knows how to emit. Labels are computed bottom-up while
//! the tree is built.

use crate::context::CodegenContext;
use crate::error::BackendError;
use gpc_common::LineNumber;
use gpc_frontend::{AddOp, Expression, ExpressionKind, MulOp, RelOp};
use std::fmt;

/// Binary operations the generator can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// Comparison; only ever the root of a condition tree
    Compare(RelOp),
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "ADD"),
            BinOp::Sub => write!(f, "SUB"),
            BinOp::Mul => write!(f, "MUL"),
            BinOp::Div => write!(f, "DIV"),
            BinOp::Mod => write!(f, "MOD"),
            BinOp::Compare(op) => write!(f, "RELOP {}", op),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leaf<'a> {
    Var(&'a str),
    Int(i32),
    /// A function call is evaluated whole and behaves as one value
    Call { id: &'a str, args: &'a [Expression] },
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<'a> {
    Leaf(Leaf<'a>),
    Negate(Box<ExprNode<'a>>),
    Binary {
        op: BinOp,
        left: Box<ExprNode<'a>>,
        right: Box<ExprNode<'a>>,
    },
}

/// Labeled node of a codegen expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode<'a> {
    pub kind: NodeKind<'a>,
    pub label: u32,
    pub line: LineNumber,
}

impl<'a> ExprNode<'a> {
    /// A leaf that can appear directly as an instruction operand
    pub fn is_operand_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(Leaf::Var(_) | Leaf::Int(_)))
    }

    fn leaf(leaf: Leaf<'a>, operand: bool, line: LineNumber) -> Self {
        Self {
            kind: NodeKind::Leaf(leaf),
            label: u32::from(operand),
            line,
        }
    }

    fn negate(child: ExprNode<'a>, line: LineNumber) -> Self {
        Self {
            label: child.label,
            kind: NodeKind::Negate(Box::new(child)),
            line,
        }
    }

    fn binary(op: BinOp, left: ExprNode<'a>, right: ExprNode<'a>, line: LineNumber) -> Self {
        let label = if left.label == right.label {
            left.label + 1
        } else {
            left.label.max(right.label)
        };
        Self {
            kind: NodeKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            label,
            line,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match &self.kind {
            NodeKind::Leaf(Leaf::Var(name)) => writeln!(f, "{}[NODE VAR {}, L:{}]", pad, name, self.label),
            NodeKind::Leaf(Leaf::Int(value)) => writeln!(f, "{}[NODE INUM {}, L:{}]", pad, value, self.label),
            NodeKind::Leaf(Leaf::Call { id, args }) => {
                writeln!(f, "{}[NODE CALL {}/{}, L:{}]", pad, id, args.len(), self.label)
            }
            NodeKind::Negate(child) => {
                writeln!(f, "{}[NODE SIGN, L:{}]", pad, self.label)?;
                child.write_indented(f, indent + 1)
            }
            NodeKind::Binary { op, left, right } => {
                writeln!(f, "{}[NODE {}, L:{}]", pad, op, self.label)?;
                writeln!(f, "{}[LEFT]", pad)?;
                left.write_indented(f, indent + 1)?;
                writeln!(f, "{}[RIGHT]", pad)?;
                right.write_indented(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for ExprNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Build the labeled tree of an integer-valued expression
pub fn build_value_tree<'a>(
    ctx: &mut CodegenContext,
    expr: &'a Expression,
) -> Result<ExprNode<'a>, BackendError> {
    build(ctx, expr, false)
}

/// Build the labeled tree of a relational expression
pub fn build_condition_tree<'a>(
    ctx: &mut CodegenContext,
    expr: &'a Expression,
) -> Result<ExprNode<'a>, BackendError> {
    match &expr.kind {
        ExpressionKind::Relational { op, left, right } => {
            let left = build(ctx, left, true)?;
            let right = build(ctx, right, true)?;
            Ok(ExprNode::binary(BinOp::Compare(*op), left, right, expr.line))
        }
        _ => Err(BackendError::internal(
            format!("expected a comparison, found {}", expr),
            Some(expr.line),
        )),
    }
}

/// `operand` is true when `expr` feeds a parent node
fn build<'a>(
    ctx: &mut CodegenContext,
    expr: &'a Expression,
    operand: bool,
) -> Result<ExprNode<'a>, BackendError> {
    let line = expr.line;
    match &expr.kind {
        ExpressionKind::Var(name) => Ok(ExprNode::leaf(Leaf::Var(name), operand, line)),
        ExpressionKind::Integer(value) => Ok(ExprNode::leaf(Leaf::Int(*value), operand, line)),
        ExpressionKind::Real(value) => {
            ctx.warn(
                format!("REAL literal {} not supported, truncating to integer", value),
                line,
            );
            Ok(ExprNode::leaf(Leaf::Int(*value as i32), operand, line))
        }
        ExpressionKind::FunctionCall { id, args } => {
            Ok(ExprNode::leaf(Leaf::Call { id, args }, operand, line))
        }
        ExpressionKind::Sign(inner) => {
            let child = build(ctx, inner, true)?;
            Ok(ExprNode::negate(child, line))
        }
        ExpressionKind::Add { op, left, right } => {
            let bin = match op {
                AddOp::Plus => BinOp::Add,
                AddOp::Minus => BinOp::Sub,
            };
            build_binary(ctx, bin, left, right, line)
        }
        ExpressionKind::Mul { op, left, right } => {
            let bin = match op {
                MulOp::Star => BinOp::Mul,
                MulOp::Div => BinOp::Div,
                MulOp::Mod => BinOp::Mod,
                MulOp::Slash => {
                    ctx.warn("REAL division not supported, using integer division", line);
                    BinOp::Div
                }
            };
            build_binary(ctx, bin, left, right, line)
        }
        ExpressionKind::ArrayAccess { id, .. } => {
            Err(BackendError::unsupported(format!("array access {}[...]", id), line))
        }
        ExpressionKind::Relational { .. } | ExpressionKind::Logical { .. } | ExpressionKind::Not(_) => {
            Err(BackendError::unsupported(
                format!("boolean value {} inside an arithmetic expression", expr),
                line,
            ))
        }
    }
}

fn build_binary<'a>(
    ctx: &mut CodegenContext,
    op: BinOp,
    left: &'a Expression,
    right: &'a Expression,
    line: LineNumber,
) -> Result<ExprNode<'a>, BackendError> {
    let left = build(ctx, left, true)?;
    let right = build(ctx, right, true)?;
    Ok(ExprNode::binary(op, left, right, line))
}
