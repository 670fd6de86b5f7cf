//! Statement, declaration and program nodes
//!
//! A [`Program`] owns its declarations, nested subprograms and a compound
//! body. Subprograms nest the same way, mirroring Pascal's lexical structure.

use super::expressions::Expression;
use gpc_common::LineNumber;
use serde::{Deserialize, Serialize};

/// Syntax tree statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: LineNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `target := value`
    Assign {
        target: Expression,
        value: Expression,
    },

    /// Procedure call, including the `read`/`write` builtins
    ProcedureCall {
        id: String,
        args: Vec<Expression>,
    },

    /// `begin ... end`
    Compound(Vec<Statement>),

    If {
        condition: Expression,
        then_stmt: Box<Statement>,
        else_stmt: Option<Box<Statement>>,
    },

    While {
        condition: Expression,
        body: Box<Statement>,
    },

    /// `for init to limit do body`
    For {
        init: ForInit,
        to: Expression,
        body: Box<Statement>,
    },
}

/// The two forms a `for` header can take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForInit {
    /// `for v := start to ...`
    Assign { var: Expression, value: Expression },
    /// `for v to ...`, no initialization
    Var(Expression),
}

impl ForInit {
    /// The loop control variable
    pub fn var(&self) -> &Expression {
        match self {
            ForInit::Assign { var, .. } => var,
            ForInit::Var(var) => var,
        }
    }
}

impl Statement {
    pub fn new(kind: StatementKind, line: LineNumber) -> Self {
        Self { kind, line }
    }

    /// Short name of the statement kind, used in emitted comments and logs
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            StatementKind::Assign { .. } => "assign",
            StatementKind::ProcedureCall { .. } => "call",
            StatementKind::Compound(_) => "compound",
            StatementKind::If { .. } => "if",
            StatementKind::While { .. } => "while",
            StatementKind::For { .. } => "for",
        }
    }
}

/// Declared scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    Integer,
    Real,
}

/// Variable or array declaration, also used for subprogram parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub line: LineNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclarationKind {
    Var {
        ids: Vec<String>,
        var_type: VarType,
    },
    Array {
        ids: Vec<String>,
        var_type: VarType,
        start: i32,
        end: i32,
    },
}

impl Declaration {
    pub fn ids(&self) -> &[String] {
        match &self.kind {
            DeclarationKind::Var { ids, .. } => ids,
            DeclarationKind::Array { ids, .. } => ids,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubprogramKind {
    Procedure,
    Function { return_type: VarType },
}

/// Procedure or function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subprogram {
    pub kind: SubprogramKind,
    pub name: String,
    pub params: Vec<Declaration>,
    pub declarations: Vec<Declaration>,
    pub subprograms: Vec<Subprogram>,
    pub body: Statement,
    pub line: LineNumber,
}

impl Subprogram {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SubprogramKind::Function { .. })
    }
}

/// Root of the syntax tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    /// Program header identifiers such as `input` and `output`
    pub args: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub subprograms: Vec<Subprogram>,
    pub body: Statement,
    pub line: LineNumber,
}
