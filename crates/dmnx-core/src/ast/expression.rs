//! FEEL expression AST nodes

use super::operator::Operator;
use crate::types::Value;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Value),

    /// Variable reference (names may contain spaces, e.g. `Applicant Age`)
    Name(String),

    /// Path access (e.g., `Applicant.age`)
    Path {
        base: Box<Expression>,
        field: String,
    },

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// `value between low and high`
    Between {
        value: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },

    /// `value in (tests)`
    In {
        value: Box<Expression>,
        tests: Vec<UnaryTest>,
    },

    /// `if condition then a else b`
    If {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },

    /// `for x in list return body`
    For {
        variable: String,
        iterable: Box<Expression>,
        body: Box<Expression>,
    },

    /// `some|every x in list satisfies condition`
    Quantified {
        quantifier: Quantifier,
        variable: String,
        iterable: Box<Expression>,
        condition: Box<Expression>,
    },

    /// List literal
    List(Vec<Expression>),

    /// Range literal (`[1..10]`, `(1..10]`, ...)
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
        start_closed: bool,
        end_closed: bool,
    },

    /// Context literal (`{a: 1, b: a + 1}`)
    Context(Vec<(String, Expression)>),

    /// Filter or index (`list[item > 3]`, `list[1]`)
    Filter {
        base: Box<Expression>,
        filter: Box<Expression>,
    },

    /// Function invocation
    FunctionCall {
        callee: Box<Expression>,
        args: Arguments,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (-)
    Negate,
}

/// Quantifier of a quantified expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

/// Invocation arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Positional(Vec<Expression>),
    Named(Vec<(String, Expression)>),
}

impl Arguments {
    pub fn len(&self) -> usize {
        match self {
            Arguments::Positional(args) => args.len(),
            Arguments::Named(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the argument expressions regardless of style
    pub fn expressions(&self) -> Box<dyn Iterator<Item = &Expression> + '_> {
        match self {
            Arguments::Positional(args) => Box::new(args.iter()),
            Arguments::Named(args) => Box::new(args.iter().map(|(_, e)| e)),
        }
    }
}

/// A single unary test, as used in decision table input entries
/// and the right-hand side of `in`.
#[derive(Debug, Clone, PartialEq)]
pub enum UnaryTest {
    /// `-` matches anything
    Any,
    /// `< 10`, `>= limit`, ...
    Compare { op: Operator, value: Expression },
    /// `[1..10]`, `(1..10)`, `]1..10[`
    Interval {
        start: Expression,
        end: Expression,
        start_closed: bool,
        end_closed: bool,
    },
    /// Plain expression: equality, list membership, or a boolean
    /// expression over `?`
    Expression(Expression),
    /// `not(tests)`
    Not(Vec<UnaryTest>),
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a name reference
    pub fn name(name: impl Into<String>) -> Self {
        Expression::Name(name.into())
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a path expression
    pub fn path(base: Expression, field: impl Into<String>) -> Self {
        Expression::Path {
            base: Box::new(base),
            field: field.into(),
        }
    }

    /// Create a function call expression
    pub fn call(callee: Expression, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            callee: Box::new(callee),
            args: Arguments::Positional(args),
        }
    }

    /// Returns true if the expression refers to the implicit input `?`
    pub fn mentions_input(&self) -> bool {
        let mut found = false;
        self.visit(&mut |e| {
            if matches!(e, Expression::Name(n) if n == "?") {
                found = true;
            }
        });
        found
    }

    /// Pre-order walk over this expression and its sub-expressions.
    ///
    /// Unary tests nested under `in` are visited through their expressions.
    pub fn visit<F: FnMut(&Expression)>(&self, f: &mut F) {
        f(self);
        match self {
            Expression::Literal(_) | Expression::Name(_) => {}
            Expression::Path { base, .. } => base.visit(f),
            Expression::Binary { left, right, .. } => {
                left.visit(f);
                right.visit(f);
            }
            Expression::Unary { operand, .. } => operand.visit(f),
            Expression::Between { value, low, high } => {
                value.visit(f);
                low.visit(f);
                high.visit(f);
            }
            Expression::In { value, tests } => {
                value.visit(f);
                for test in tests {
                    test.visit(f);
                }
            }
            Expression::If {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.visit(f);
                then_branch.visit(f);
                else_branch.visit(f);
            }
            Expression::For { iterable, body, .. } => {
                iterable.visit(f);
                body.visit(f);
            }
            Expression::Quantified {
                iterable,
                condition,
                ..
            } => {
                iterable.visit(f);
                condition.visit(f);
            }
            Expression::List(items) => {
                for item in items {
                    item.visit(f);
                }
            }
            Expression::Range { start, end, .. } => {
                start.visit(f);
                end.visit(f);
            }
            Expression::Context(entries) => {
                for (_, e) in entries {
                    e.visit(f);
                }
            }
            Expression::Filter { base, filter } => {
                base.visit(f);
                filter.visit(f);
            }
            Expression::FunctionCall { callee, args } => {
                callee.visit(f);
                for arg in args.expressions() {
                    arg.visit(f);
                }
            }
        }
    }
}

impl UnaryTest {
    /// Walk the expressions inside this test
    pub fn visit<F: FnMut(&Expression)>(&self, f: &mut F) {
        match self {
            UnaryTest::Any => {}
            UnaryTest::Compare { value, .. } => value.visit(f),
            UnaryTest::Interval { start, end, .. } => {
                start.visit(f);
                end.visit(f);
            }
            UnaryTest::Expression(e) => e.visit(f),
            UnaryTest::Not(tests) => {
                for test in tests {
                    test.visit(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_input() {
        let expr = Expression::binary(Expression::name("?"), Operator::Gt, Expression::literal(3.0));
        assert!(expr.mentions_input());

        let expr = Expression::binary(Expression::name("age"), Operator::Gt, Expression::literal(3.0));
        assert!(!expr.mentions_input());
    }

    #[test]
    fn test_visit_reaches_call_arguments() {
        let expr = Expression::call(
            Expression::name("sum"),
            vec![Expression::path(Expression::name("Order"), "lines")],
        );
        let mut names = Vec::new();
        expr.visit(&mut |e| {
            if let Expression::Name(n) = e {
                names.push(n.clone());
            }
        });
        assert_eq!(names, vec!["sum".to_string(), "Order".to_string()]);
    }

    #[test]
    fn test_arguments_len() {
        let args = Arguments::Named(vec![("a".to_string(), Expression::literal(1.0))]);
        assert_eq!(args.len(), 1);
        assert!(!args.is_empty());
        assert!(Arguments::Positional(vec![]).is_empty());
    }
}
