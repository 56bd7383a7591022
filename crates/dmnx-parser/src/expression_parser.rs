//! FEEL expression parser
//!
//! Parses FEEL text into Expression AST nodes.
//!
//! Supported syntax:
//! - Literals: `42`, `3.14`, `"string"`, `true`, `false`, `null`
//! - Names with spaces: `Applicant Age`, path access: `Applicant.monthly income`
//! - Arithmetic: `+`, `-`, `*`, `/`, `**`, unary `-`
//! - Comparisons: `=`, `!=`, `<`, `<=`, `>`, `>=`, `between .. and ..`, `in`
//! - Logic: `and`, `or`, `if .. then .. else ..`
//! - Iteration: `for x in list return ..`, `some|every x in list satisfies ..`
//! - Lists `[1, 2]`, ranges `[1..10]`, contexts `{a: 1}`, filters `list[item > 1]`
//! - Function calls with positional or named arguments: `f(1, 2)`, `f(a: 1)`
//!
//! Unary tests (decision table input entries) are parsed with
//! [`ExpressionParser::parse_unary_tests`].

use crate::error::{ParseError, Result};
use dmnx_core::ast::{Arguments, Expression, Operator, Quantifier, UnaryOperator, UnaryTest};
use dmnx_core::types::number::parse_number;
use dmnx_core::{BigDecimal, Value};

/// Words that end a multi-word name
const RESERVED: &[&str] = &[
    "and", "or", "if", "then", "else", "for", "in", "return", "some", "every", "satisfies",
    "between", "true", "false", "null",
];

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> Result<Expression> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ParseError::InvalidExpression("Empty expression".to_string()));
        }

        let mut parser = Parser::new(input)?;
        let expr = parser.parse_expression()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Parse comma-separated unary tests (decision table input entry)
    pub fn parse_unary_tests(input: &str) -> Result<Vec<UnaryTest>> {
        let input = input.trim();

        if input.is_empty() || input == "-" {
            return Ok(vec![UnaryTest::Any]);
        }

        let mut parser = Parser::new(input)?;
        let tests = parser.parse_unary_tests()?;
        parser.expect_end()?;
        Ok(tests)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigDecimal),
    Str(String),
    Word(String),
    Sym(&'static str),
}

const SYMBOLS: &[&str] = &[
    "**", "..", "<=", ">=", "!=", "=", "<", ">", "+", "-", "*", "/", "(", ")", "[", "]", "{",
    "}", ",", ":", ".", "?",
];

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '"' {
            let mut s = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => {
                        return Err(ParseError::InvalidExpression(format!(
                            "Unterminated string literal in: {}",
                            input
                        )))
                    }
                    Some('"') => {
                        i += 1;
                        break;
                    }
                    Some('\\') => {
                        let escaped = chars.get(i + 1).copied().unwrap_or('\\');
                        s.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                        i += 2;
                    }
                    Some(&ch) => {
                        s.push(ch);
                        i += 1;
                    }
                }
            }
            tokens.push(Token::Str(s));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            // A single dot followed by a digit is a fraction; `..` is a range
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let n = parse_number(&text)
                .map_err(|e| ParseError::InvalidExpression(e.to_string()))?;
            tokens.push(Token::Number(n));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '\'') {
                i += 1;
            }
            tokens.push(Token::Word(chars[start..i].iter().collect()));
            continue;
        }

        let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
        match SYMBOLS.iter().find(|sym| rest.starts_with(**sym)) {
            Some(sym) => {
                tokens.push(Token::Sym(sym));
                i += sym.chars().count();
            }
            None => {
                return Err(ParseError::InvalidExpression(format!(
                    "Unexpected character '{}' in: {}",
                    c, input
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn is_sym(&self, sym: &str) -> bool {
        matches!(self.peek(), Some(Token::Sym(s)) if *s == sym)
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w == word)
    }

    fn eat_sym(&mut self, sym: &str) -> bool {
        if self.is_sym(sym) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.is_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, what: &str) -> ParseError {
        let found = match self.peek() {
            Some(Token::Number(n)) => n.to_string(),
            Some(Token::Str(s)) => format!("\"{}\"", s),
            Some(Token::Word(w)) => w.clone(),
            Some(Token::Sym(s)) => s.to_string(),
            None => "end of input".to_string(),
        };
        ParseError::InvalidExpression(format!("{} (found {}) in: {}", what, found, self.source))
    }

    fn expect_sym(&mut self, sym: &str) -> Result<()> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected '{}'", sym)))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.error(&format!("Expected '{}'", word)))
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos < self.tokens.len() {
            Err(self.error("Unexpected trailing input"))
        } else {
            Ok(())
        }
    }

    /// Join consecutive non-reserved words into one name
    fn parse_name(&mut self) -> Result<String> {
        let mut parts: Vec<String> = Vec::new();
        while let Some(Token::Word(w)) = self.peek() {
            if RESERVED.contains(&w.as_str()) {
                break;
            }
            parts.push(w.clone());
            self.pos += 1;
        }
        if parts.is_empty() {
            return Err(self.error("Expected a name"));
        }
        Ok(parts.join(" "))
    }

    /// Number of tokens a name would occupy at the current position
    fn name_len(&self) -> usize {
        let mut n = 0;
        while let Some(Token::Word(w)) = self.peek_at(n) {
            if RESERVED.contains(&w.as_str()) {
                break;
            }
            n += 1;
        }
        n
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        if self.eat_word("if") {
            let condition = self.parse_expression()?;
            self.expect_word("then")?;
            let then_branch = self.parse_expression()?;
            self.expect_word("else")?;
            let else_branch = self.parse_expression()?;
            return Ok(Expression::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }

        if self.eat_word("for") {
            let variable = self.parse_name()?;
            self.expect_word("in")?;
            let iterable = self.parse_expression()?;
            self.expect_word("return")?;
            let body = self.parse_expression()?;
            return Ok(Expression::For {
                variable,
                iterable: Box::new(iterable),
                body: Box::new(body),
            });
        }

        let quantifier = if self.eat_word("some") {
            Some(Quantifier::Some)
        } else if self.eat_word("every") {
            Some(Quantifier::Every)
        } else {
            None
        };
        if let Some(quantifier) = quantifier {
            let variable = self.parse_name()?;
            self.expect_word("in")?;
            let iterable = self.parse_expression()?;
            self.expect_word("satisfies")?;
            let condition = self.parse_expression()?;
            return Ok(Expression::Quantified {
                quantifier,
                variable,
                iterable: Box::new(iterable),
                condition: Box::new(condition),
            });
        }

        self.parse_disjunction()
    }

    fn parse_disjunction(&mut self) -> Result<Expression> {
        let mut left = self.parse_conjunction()?;
        while self.eat_word("or") {
            let right = self.parse_conjunction()?;
            left = Expression::binary(left, Operator::Or, right);
        }
        Ok(left)
    }

    fn parse_conjunction(&mut self) -> Result<Expression> {
        let mut left = self.parse_comparison()?;
        while self.eat_word("and") {
            let right = self.parse_comparison()?;
            left = Expression::binary(left, Operator::And, right);
        }
        Ok(left)
    }

    fn comparison_operator(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token::Sym("=")) => Some(Operator::Eq),
            Some(Token::Sym("!=")) => Some(Operator::Ne),
            Some(Token::Sym("<")) => Some(Operator::Lt),
            Some(Token::Sym("<=")) => Some(Operator::Le),
            Some(Token::Sym(">")) => Some(Operator::Gt),
            Some(Token::Sym(">=")) => Some(Operator::Ge),
            _ => None,
        }
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_additive()?;

        if let Some(op) = self.comparison_operator() {
            self.pos += 1;
            let right = self.parse_additive()?;
            return Ok(Expression::binary(left, op, right));
        }

        if self.eat_word("between") {
            let low = self.parse_additive()?;
            self.expect_word("and")?;
            let high = self.parse_additive()?;
            return Ok(Expression::Between {
                value: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            });
        }

        if self.eat_word("in") {
            let tests = if self.is_sym("(") {
                let save = self.pos;
                self.pos += 1;
                match self.parse_unary_tests() {
                    Ok(tests) if self.eat_sym(")") => tests,
                    _ => {
                        self.pos = save;
                        vec![self.parse_unary_test()?]
                    }
                }
            } else {
                vec![self.parse_unary_test()?]
            };
            return Ok(Expression::In {
                value: Box::new(left),
                tests,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.eat_sym("+") {
                Operator::Add
            } else if self.eat_sym("-") {
                Operator::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression> {
        let mut left = self.parse_exponent()?;
        loop {
            let op = if self.eat_sym("*") {
                Operator::Mul
            } else if self.eat_sym("/") {
                Operator::Div
            } else {
                break;
            };
            let right = self.parse_exponent()?;
            left = Expression::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;
        while self.eat_sym("**") {
            let right = self.parse_unary()?;
            left = Expression::binary(left, Operator::Pow, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression> {
        if self.eat_sym("-") {
            return Ok(match self.parse_unary()? {
                Expression::Literal(Value::Number(n)) => Expression::literal(-n),
                operand => Expression::Unary {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                },
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_sym(".") {
                let field = self.parse_name()?;
                expr = Expression::path(expr, field);
            } else if self.eat_sym("[") {
                let filter = self.parse_expression()?;
                self.expect_sym("]")?;
                expr = Expression::Filter {
                    base: Box::new(expr),
                    filter: Box::new(filter),
                };
            } else if self.eat_sym("(") {
                let args = self.parse_arguments()?;
                expr = Expression::FunctionCall {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Arguments> {
        if self.eat_sym(")") {
            return Ok(Arguments::Positional(Vec::new()));
        }

        let named = {
            let len = self.name_len();
            len > 0 && matches!(self.peek_at(len), Some(Token::Sym(":")))
        };

        if named {
            let mut args = Vec::new();
            loop {
                let name = self.parse_name()?;
                self.expect_sym(":")?;
                args.push((name, self.parse_expression()?));
                if !self.eat_sym(",") {
                    break;
                }
            }
            self.expect_sym(")")?;
            Ok(Arguments::Named(args))
        } else {
            let mut args = vec![self.parse_expression()?];
            while self.eat_sym(",") {
                args.push(self.parse_expression()?);
            }
            self.expect_sym(")")?;
            Ok(Arguments::Positional(args))
        }
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        match self.peek().cloned() {
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expression::literal(n))
            }
            Some(Token::Str(s)) => {
                self.pos += 1;
                Ok(Expression::literal(s))
            }
            Some(Token::Word(w)) if w == "true" || w == "false" => {
                self.pos += 1;
                Ok(Expression::literal(w == "true"))
            }
            Some(Token::Word(w)) if w == "null" => {
                self.pos += 1;
                Ok(Expression::Literal(Value::Null))
            }
            Some(Token::Word(_)) => Ok(Expression::Name(self.parse_name()?)),
            Some(Token::Sym("?")) => {
                self.pos += 1;
                Ok(Expression::name("?"))
            }
            Some(Token::Sym("(")) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect_sym(")")?;
                Ok(expr)
            }
            Some(Token::Sym("[")) => {
                self.pos += 1;
                self.parse_list_or_range()
            }
            Some(Token::Sym("{")) => {
                self.pos += 1;
                self.parse_context()
            }
            _ => Err(self.error("Unexpected token")),
        }
    }

    /// After `[`: list literal or closed-start range
    fn parse_list_or_range(&mut self) -> Result<Expression> {
        if self.eat_sym("]") {
            return Ok(Expression::List(Vec::new()));
        }

        let first = self.parse_expression()?;
        if self.eat_sym("..") {
            let end = self.parse_expression()?;
            let end_closed = if self.eat_sym("]") {
                true
            } else if self.eat_sym(")") || self.eat_sym("[") {
                false
            } else {
                return Err(self.error("Expected end of range"));
            };
            return Ok(Expression::Range {
                start: Box::new(first),
                end: Box::new(end),
                start_closed: true,
                end_closed,
            });
        }

        let mut items = vec![first];
        while self.eat_sym(",") {
            items.push(self.parse_expression()?);
        }
        self.expect_sym("]")?;
        Ok(Expression::List(items))
    }

    fn parse_context(&mut self) -> Result<Expression> {
        let mut entries = Vec::new();
        if self.eat_sym("}") {
            return Ok(Expression::Context(entries));
        }
        loop {
            let key = match self.peek().cloned() {
                Some(Token::Str(s)) => {
                    self.pos += 1;
                    s
                }
                _ => self.parse_name()?,
            };
            self.expect_sym(":")?;
            entries.push((key, self.parse_expression()?));
            if !self.eat_sym(",") {
                break;
            }
        }
        self.expect_sym("}")?;
        Ok(Expression::Context(entries))
    }

    fn parse_unary_tests(&mut self) -> Result<Vec<UnaryTest>> {
        if self.is_sym("-") && self.peek_at(1).is_none() {
            self.pos += 1;
            return Ok(vec![UnaryTest::Any]);
        }

        if self.is_word("not") && matches!(self.peek_at(1), Some(Token::Sym("("))) {
            let save = self.pos;
            self.pos += 2;
            if let Ok(inner) = self.parse_unary_tests() {
                if self.eat_sym(")") && !self.is_sym(",") {
                    return Ok(vec![UnaryTest::Not(inner)]);
                }
            }
            self.pos = save;
        }

        let mut tests = vec![self.parse_unary_test()?];
        while self.eat_sym(",") {
            tests.push(self.parse_unary_test()?);
        }
        Ok(tests)
    }

    fn parse_unary_test(&mut self) -> Result<UnaryTest> {
        if let Some(op) = self.comparison_operator() {
            self.pos += 1;
            let value = self.parse_additive()?;
            return Ok(UnaryTest::Compare { op, value });
        }

        if self.is_sym("[") || self.is_sym("(") || self.is_sym("]") {
            let save = self.pos;
            if let Some(interval) = self.try_parse_interval() {
                return Ok(interval);
            }
            self.pos = save;
        }

        Ok(UnaryTest::Expression(self.parse_expression()?))
    }

    fn try_parse_interval(&mut self) -> Option<UnaryTest> {
        let start_closed = match self.advance()? {
            Token::Sym("[") => true,
            Token::Sym("(") | Token::Sym("]") => false,
            _ => return None,
        };
        let start = self.parse_additive().ok()?;
        if !self.eat_sym("..") {
            return None;
        }
        let end = self.parse_additive().ok()?;
        let end_closed = match self.advance()? {
            Token::Sym("]") => true,
            Token::Sym(")") | Token::Sym("[") => false,
            _ => return None,
        };
        Some(UnaryTest::Interval {
            start,
            end,
            start_closed,
            end_closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_literal() {
        let expr = ExpressionParser::parse("42").unwrap();
        assert_eq!(expr, Expression::literal(42.0));

        let expr = ExpressionParser::parse("3.14").unwrap();
        assert_eq!(expr, Expression::literal(3.14));

        let expr = ExpressionParser::parse("-2").unwrap();
        assert_eq!(expr, Expression::literal(-2.0));
    }

    #[test]
    fn test_parse_string_literal() {
        let expr = ExpressionParser::parse(r#""hello \"world\"""#).unwrap();
        assert_eq!(expr, Expression::literal("hello \"world\""));
    }

    #[test]
    fn test_parse_boolean_and_null_literal() {
        assert_eq!(ExpressionParser::parse("true").unwrap(), Expression::literal(true));
        assert_eq!(ExpressionParser::parse("false").unwrap(), Expression::literal(false));
        assert_eq!(ExpressionParser::parse("null").unwrap(), Expression::Literal(Value::Null));
    }

    #[test]
    fn test_parse_name_with_spaces() {
        let expr = ExpressionParser::parse("Applicant Age >= 18").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                Expression::name("Applicant Age"),
                Operator::Ge,
                Expression::literal(18.0)
            )
        );
    }

    #[test]
    fn test_parse_path_access() {
        let expr = ExpressionParser::parse("Applicant.monthly income").unwrap();
        assert_eq!(
            expr,
            Expression::path(Expression::name("Applicant"), "monthly income")
        );
    }

    #[test]
    fn test_parse_precedence() {
        let expr = ExpressionParser::parse("a + b * c").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                Expression::name("a"),
                Operator::Add,
                Expression::binary(Expression::name("b"), Operator::Mul, Expression::name("c"))
            )
        );

        let expr = ExpressionParser::parse("a > 1 and b < 2 or c").unwrap();
        assert!(matches!(expr, Expression::Binary { op: Operator::Or, .. }));
    }

    #[test]
    fn test_parse_if_then_else() {
        let expr = ExpressionParser::parse(r#"if age >= 18 then "adult" else "minor""#).unwrap();
        assert!(matches!(expr, Expression::If { .. }));
    }

    #[test]
    fn test_parse_between() {
        let expr = ExpressionParser::parse("score between 1 and 10").unwrap();
        assert!(matches!(expr, Expression::Between { .. }));
    }

    #[test]
    fn test_parse_in_with_tests() {
        let expr = ExpressionParser::parse(r#"grade in ("A", "B")"#).unwrap();
        if let Expression::In { tests, .. } = expr {
            assert_eq!(tests.len(), 2);
        } else {
            panic!("Expected in expression");
        }

        let expr = ExpressionParser::parse("x in [1..5]").unwrap();
        if let Expression::In { tests, .. } = expr {
            assert!(matches!(tests[0], UnaryTest::Interval { start_closed: true, end_closed: true, .. }));
        } else {
            panic!("Expected in expression");
        }
    }

    #[test]
    fn test_parse_for_and_quantified() {
        let expr = ExpressionParser::parse("for x in items return x * 2").unwrap();
        assert!(matches!(expr, Expression::For { .. }));

        let expr = ExpressionParser::parse("some x in items satisfies x > 3").unwrap();
        assert!(matches!(
            expr,
            Expression::Quantified { quantifier: Quantifier::Some, .. }
        ));
    }

    #[test]
    fn test_parse_list_range_context() {
        let expr = ExpressionParser::parse("[1, 2, 3]").unwrap();
        assert!(matches!(expr, Expression::List(ref items) if items.len() == 3));

        let expr = ExpressionParser::parse("[1..10)").unwrap();
        assert!(matches!(expr, Expression::Range { end_closed: false, .. }));

        let expr = ExpressionParser::parse(r#"{name: "x", "full name": "y", total: 1 + 2}"#).unwrap();
        if let Expression::Context(entries) = expr {
            let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["name", "full name", "total"]);
        } else {
            panic!("Expected context");
        }
    }

    #[test]
    fn test_parse_filter() {
        let expr = ExpressionParser::parse("items[item > 2]").unwrap();
        assert!(matches!(expr, Expression::Filter { .. }));
    }

    #[test]
    fn test_parse_function_call() {
        let expr = ExpressionParser::parse("string length(name)").unwrap();
        if let Expression::FunctionCall { callee, args } = expr {
            assert_eq!(*callee, Expression::name("string length"));
            assert_eq!(args.len(), 1);
        } else {
            panic!("Expected function call");
        }
    }

    #[test]
    fn test_parse_named_arguments() {
        let expr = ExpressionParser::parse("Discount(order total: 100, rate: 0.1)").unwrap();
        if let Expression::FunctionCall { args: Arguments::Named(args), .. } = expr {
            assert_eq!(args[0].0, "order total");
            assert_eq!(args[1].0, "rate");
        } else {
            panic!("Expected named call");
        }
    }

    #[test]
    fn test_parse_unary_tests() {
        assert_eq!(ExpressionParser::parse_unary_tests("-").unwrap(), vec![UnaryTest::Any]);
        assert_eq!(ExpressionParser::parse_unary_tests("").unwrap(), vec![UnaryTest::Any]);

        let tests = ExpressionParser::parse_unary_tests("< 18").unwrap();
        assert!(matches!(tests[0], UnaryTest::Compare { op: Operator::Lt, .. }));

        let tests = ExpressionParser::parse_unary_tests("[18..65)").unwrap();
        assert!(matches!(
            tests[0],
            UnaryTest::Interval { start_closed: true, end_closed: false, .. }
        ));

        let tests = ExpressionParser::parse_unary_tests(r#""Gold", "Silver""#).unwrap();
        assert_eq!(tests.len(), 2);

        let tests = ExpressionParser::parse_unary_tests(r#"not("Gold", "Silver")"#).unwrap();
        assert!(matches!(tests[0], UnaryTest::Not(ref inner) if inner.len() == 2));

        let tests = ExpressionParser::parse_unary_tests("? > 5").unwrap();
        assert!(matches!(tests[0], UnaryTest::Expression(ref e) if e.mentions_input()));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(ExpressionParser::parse("").is_err());
        assert!(ExpressionParser::parse("@#$").is_err());
        assert!(ExpressionParser::parse("if a then b").is_err());
        assert!(ExpressionParser::parse("(1 + 2").is_err());
        assert!(ExpressionParser::parse("\"open").is_err());
    }
}
