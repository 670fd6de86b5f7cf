//! Expression nodes of the Pascal syntax tree

use super::ops::{AddOp, LogicalOp, MulOp, RelOp};
use gpc_common::LineNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Syntax tree expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub line: LineNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    /// Relational comparison
    Relational {
        op: RelOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `and` / `or` between conditions
    Logical {
        op: LogicalOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `not` applied to a condition
    Not(Box<Expression>),

    /// Unary minus
    Sign(Box<Expression>),

    /// `+` / `-`
    Add {
        op: AddOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `*`, `/`, `div`, `mod`
    Mul {
        op: MulOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Variable reference
    Var(String),

    /// `id[index]`
    ArrayAccess {
        id: String,
        index: Box<Expression>,
    },

    /// Function call used as a value
    FunctionCall {
        id: String,
        args: Vec<Expression>,
    },

    /// Integer literal
    Integer(i32),

    /// Real literal
    Real(f32),
}

impl Expression {
    pub fn new(kind: ExpressionKind, line: LineNumber) -> Self {
        Self { kind, line }
    }

    /// Name of the variable if this is a plain variable reference
    pub fn as_var(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Var(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this expression yields a truth value rather than an integer
    pub fn is_condition(&self) -> bool {
        matches!(
            self.kind,
            ExpressionKind::Relational { .. } | ExpressionKind::Logical { .. } | ExpressionKind::Not(_)
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::Relational { op, left, right } => write!(f, "{} {} {}", left, op, right),
            ExpressionKind::Logical { op, left, right } => write!(f, "({}) {} ({})", left, op, right),
            ExpressionKind::Not(inner) => write!(f, "not ({})", inner),
            ExpressionKind::Sign(inner) => write!(f, "-{}", inner),
            ExpressionKind::Add { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExpressionKind::Mul { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExpressionKind::Var(name) => write!(f, "{}", name),
            ExpressionKind::ArrayAccess { id, index } => write!(f, "{}[{}]", id, index),
            ExpressionKind::FunctionCall { id, args } => {
                write!(f, "{}(", id)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ExpressionKind::Integer(value) => write!(f, "{}", value),
            ExpressionKind::Real(value) => write!(f, "{}", value),
        }
    }
}
