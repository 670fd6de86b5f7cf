//! Syntax tree definitions for the Pascal subset
//!
//! The tree is produced by the external parser and semantic checker and is
//! consumed read-only by the code generator.

pub mod expressions;
pub mod ops;
pub mod statements;

pub use expressions::{Expression, ExpressionKind};
pub use ops::{AddOp, LogicalOp, MulOp, RelOp};
pub use statements::{
    Declaration, DeclarationKind, ForInit, Program, Statement, StatementKind, Subprogram,
    SubprogramKind, VarType,
};
