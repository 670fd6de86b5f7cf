//! Convenience constructors for syntax trees
//!
//! The parser is an external collaborator, so tests and tools assemble trees
//! by hand. `TreeBuilder` stamps every node it creates with its current line.

use crate::ast::*;
use gpc_common::LineNumber;

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder {
    line: LineNumber,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { line: 1 }
    }

    /// A builder stamping nodes with `line`
    pub fn at(line: LineNumber) -> Self {
        Self { line }
    }

    pub fn line(&self) -> LineNumber {
        self.line
    }

    fn expr(&self, kind: ExpressionKind) -> Expression {
        Expression::new(kind, self.line)
    }

    fn stmt(&self, kind: StatementKind) -> Statement {
        Statement::new(kind, self.line)
    }

    // Expressions

    pub fn var(&self, name: &str) -> Expression {
        self.expr(ExpressionKind::Var(name.to_string()))
    }

    pub fn int(&self, value: i32) -> Expression {
        self.expr(ExpressionKind::Integer(value))
    }

    pub fn real(&self, value: f32) -> Expression {
        self.expr(ExpressionKind::Real(value))
    }

    pub fn add(&self, left: Expression, right: Expression) -> Expression {
        self.addop(AddOp::Plus, left, right)
    }

    pub fn sub(&self, left: Expression, right: Expression) -> Expression {
        self.addop(AddOp::Minus, left, right)
    }

    pub fn addop(&self, op: AddOp, left: Expression, right: Expression) -> Expression {
        self.expr(ExpressionKind::Add {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn mul(&self, left: Expression, right: Expression) -> Expression {
        self.mulop(MulOp::Star, left, right)
    }

    pub fn div(&self, left: Expression, right: Expression) -> Expression {
        self.mulop(MulOp::Div, left, right)
    }

    pub fn modulo(&self, left: Expression, right: Expression) -> Expression {
        self.mulop(MulOp::Mod, left, right)
    }

    pub fn mulop(&self, op: MulOp, left: Expression, right: Expression) -> Expression {
        self.expr(ExpressionKind::Mul {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn neg(&self, operand: Expression) -> Expression {
        self.expr(ExpressionKind::Sign(Box::new(operand)))
    }

    pub fn rel(&self, op: RelOp, left: Expression, right: Expression) -> Expression {
        self.expr(ExpressionKind::Relational {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn and(&self, left: Expression, right: Expression) -> Expression {
        self.logical(LogicalOp::And, left, right)
    }

    pub fn or(&self, left: Expression, right: Expression) -> Expression {
        self.logical(LogicalOp::Or, left, right)
    }

    fn logical(&self, op: LogicalOp, left: Expression, right: Expression) -> Expression {
        self.expr(ExpressionKind::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn not(&self, operand: Expression) -> Expression {
        self.expr(ExpressionKind::Not(Box::new(operand)))
    }

    pub fn call(&self, id: &str, args: Vec<Expression>) -> Expression {
        self.expr(ExpressionKind::FunctionCall {
            id: id.to_string(),
            args,
        })
    }

    pub fn index(&self, id: &str, index: Expression) -> Expression {
        self.expr(ExpressionKind::ArrayAccess {
            id: id.to_string(),
            index: Box::new(index),
        })
    }

    // Statements

    pub fn assign(&self, name: &str, value: Expression) -> Statement {
        self.assign_to(self.var(name), value)
    }

    pub fn assign_to(&self, target: Expression, value: Expression) -> Statement {
        self.stmt(StatementKind::Assign { target, value })
    }

    pub fn proc_call(&self, id: &str, args: Vec<Expression>) -> Statement {
        self.stmt(StatementKind::ProcedureCall {
            id: id.to_string(),
            args,
        })
    }

    pub fn write(&self, args: Vec<Expression>) -> Statement {
        self.proc_call("write", args)
    }

    pub fn read(&self, names: &[&str]) -> Statement {
        let args = names.iter().map(|name| self.var(name)).collect();
        self.proc_call("read", args)
    }

    pub fn block(&self, statements: Vec<Statement>) -> Statement {
        self.stmt(StatementKind::Compound(statements))
    }

    pub fn if_then(&self, condition: Expression, then_stmt: Statement) -> Statement {
        self.stmt(StatementKind::If {
            condition,
            then_stmt: Box::new(then_stmt),
            else_stmt: None,
        })
    }

    pub fn if_else(&self, condition: Expression, then_stmt: Statement, else_stmt: Statement) -> Statement {
        self.stmt(StatementKind::If {
            condition,
            then_stmt: Box::new(then_stmt),
            else_stmt: Some(Box::new(else_stmt)),
        })
    }

    pub fn while_do(&self, condition: Expression, body: Statement) -> Statement {
        self.stmt(StatementKind::While {
            condition,
            body: Box::new(body),
        })
    }

    pub fn for_assign(&self, var: &str, start: Expression, to: Expression, body: Statement) -> Statement {
        self.stmt(StatementKind::For {
            init: ForInit::Assign {
                var: self.var(var),
                value: start,
            },
            to,
            body: Box::new(body),
        })
    }

    pub fn for_var(&self, var: &str, to: Expression, body: Statement) -> Statement {
        self.stmt(StatementKind::For {
            init: ForInit::Var(self.var(var)),
            to,
            body: Box::new(body),
        })
    }

    // Declarations

    pub fn int_vars(&self, ids: &[&str]) -> Declaration {
        self.vars(ids, VarType::Integer)
    }

    pub fn vars(&self, ids: &[&str], var_type: VarType) -> Declaration {
        Declaration {
            kind: DeclarationKind::Var {
                ids: ids.iter().map(|id| id.to_string()).collect(),
                var_type,
            },
            line: self.line,
        }
    }

    pub fn array(&self, ids: &[&str], var_type: VarType, start: i32, end: i32) -> Declaration {
        Declaration {
            kind: DeclarationKind::Array {
                ids: ids.iter().map(|id| id.to_string()).collect(),
                var_type,
                start,
                end,
            },
            line: self.line,
        }
    }

    pub fn procedure(
        &self,
        name: &str,
        params: Vec<Declaration>,
        declarations: Vec<Declaration>,
        body: Statement,
    ) -> Subprogram {
        Subprogram {
            kind: SubprogramKind::Procedure,
            name: name.to_string(),
            params,
            declarations,
            subprograms: Vec::new(),
            body,
            line: self.line,
        }
    }

    pub fn function(
        &self,
        name: &str,
        params: Vec<Declaration>,
        declarations: Vec<Declaration>,
        body: Statement,
    ) -> Subprogram {
        Subprogram {
            kind: SubprogramKind::Function {
                return_type: VarType::Integer,
            },
            name: name.to_string(),
            params,
            declarations,
            subprograms: Vec::new(),
            body,
            line: self.line,
        }
    }

    pub fn program(
        &self,
        name: &str,
        declarations: Vec<Declaration>,
        subprograms: Vec<Subprogram>,
        body: Statement,
    ) -> Program {
        Program {
            name: name.to_string(),
            args: vec!["input".to_string(), "output".to_string()],
            declarations,
            subprograms,
            body,
            line: self.line,
        }
    }
}
