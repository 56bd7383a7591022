//! Operators for FEEL expressions

use serde::{Deserialize, Serialize};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    // Comparison operators
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,

    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Exponentiation (**)
    Pow,

    // Logical operators
    /// Logical AND (and)
    And,
    /// Logical OR (or)
    Or,
}

impl Operator {
    /// Returns true if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    /// Returns true if this is an arithmetic operator
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Pow
        )
    }

    /// Returns true if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// FEEL source symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Pow => "**",
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_is_comparison() {
        assert!(Operator::Eq.is_comparison());
        assert!(Operator::Gt.is_comparison());
        assert!(!Operator::Add.is_comparison());
        assert!(!Operator::And.is_comparison());
    }

    #[test]
    fn test_operator_is_arithmetic() {
        assert!(Operator::Pow.is_arithmetic());
        assert!(!Operator::Eq.is_arithmetic());
    }

    #[test]
    fn test_operator_is_logical() {
        assert!(Operator::And.is_logical());
        assert!(Operator::Or.is_logical());
        assert!(!Operator::Add.is_logical());
    }

    #[test]
    fn test_operator_symbol() {
        assert_eq!(Operator::Ne.symbol(), "!=");
        assert_eq!(Operator::Pow.symbol(), "**");
    }
}
