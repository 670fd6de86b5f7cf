//! GPC Pascal Compiler - Frontend tree
//!
//! This crate holds the syntax tree the code generator consumes:
//! - AST: program, subprogram, declaration, statement and expression nodes
//! - Builder: convenience constructors used by tools and tests
//!
//! Lexing, parsing and semantic checking happen outside this workspace; their
//! output reaches the backend as a serialized [`Program`].

pub mod ast;
pub mod builder;

pub use ast::{
    AddOp, Declaration, DeclarationKind, Expression, ExpressionKind, ForInit, LogicalOp, MulOp,
    Program, RelOp, Statement, StatementKind, Subprogram, SubprogramKind, VarType,
};
pub use builder::TreeBuilder;

use gpc_common::CompilerError;

/// Read a syntax tree from its JSON form
pub fn program_from_json(text: &str) -> Result<Program, CompilerError> {
    serde_json::from_str(text).map_err(|e| CompilerError::InputError {
        message: e.to_string(),
    })
}

/// Serialize a syntax tree to JSON
pub fn program_to_json(program: &Program) -> Result<String, CompilerError> {
    serde_json::to_string_pretty(program).map_err(|e| CompilerError::InternalError {
        message: e.to_string(),
    })
}
