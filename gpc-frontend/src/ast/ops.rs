//! Operator definitions for Pascal expressions
//!
//! The grammar groups operators by precedence level; each level gets its own
//! enum so the code generator can match on exactly the operators it handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational operators (`=`, `<>`, `<`, `<=`, `>`, `>=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl RelOp {
    /// The operator testing the opposite condition (`<` becomes `>=`)
    pub fn negate(self) -> RelOp {
        match self {
            RelOp::Eq => RelOp::Ne,
            RelOp::Ne => RelOp::Eq,
            RelOp::Lt => RelOp::Ge,
            RelOp::Le => RelOp::Gt,
            RelOp::Gt => RelOp::Le,
            RelOp::Ge => RelOp::Lt,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            RelOp::Eq => "=",
            RelOp::Ne => "<>",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        };
        write!(f, "{}", op_str)
    }
}

/// Additive operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddOp {
    Plus,
    Minus,
}

impl fmt::Display for AddOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOp::Plus => write!(f, "+"),
            AddOp::Minus => write!(f, "-"),
        }
    }
}

/// Multiplicative operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MulOp {
    /// `*`
    Star,
    /// `/` (real division)
    Slash,
    /// `div` (integer division)
    Div,
    /// `mod`
    Mod,
}

impl fmt::Display for MulOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            MulOp::Star => "*",
            MulOp::Slash => "/",
            MulOp::Div => "div",
            MulOp::Mod => "mod",
        };
        write!(f, "{}", op_str)
    }
}

/// Boolean connectives between conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "and"),
            LogicalOp::Or => write!(f, "or"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relop_negate_is_involution() {
        for op in [RelOp::Eq, RelOp::Ne, RelOp::Lt, RelOp::Le, RelOp::Gt, RelOp::Ge] {
            assert_ne!(op.negate(), op);
            assert_eq!(op.negate().negate(), op);
        }
        assert_eq!(RelOp::Lt.negate(), RelOp::Ge);
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(RelOp::Ne.to_string(), "<>");
        assert_eq!(MulOp::Div.to_string(), "div");
        assert_eq!(LogicalOp::Or.to_string(), "or");
    }
}
