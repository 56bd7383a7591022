//! Semantic analyzer
//!
//! Checks that every free name in compiled logic is bound: a requirement,
//! an import alias, a built-in function, or a local (context entry,
//! parameter, iteration variable, `?` inside unary tests).

use dmnx_core::ast::{Arguments, Expression, UnaryTest};
use dmnx_core::builtins::is_builtin_function;
use dmnx_core::ir::{CompiledDecisionTable, FunctionLogic, Logic};
use std::collections::HashSet;

/// Semantic analyzer
pub struct SemanticAnalyzer {
    /// Names visible everywhere in the node being analyzed
    defined_variables: HashSet<String>,
    /// Local scopes, innermost last
    scopes: Vec<HashSet<String>>,
    /// Unknown names in first-seen order
    unknown: Vec<String>,
}

impl SemanticAnalyzer {
    /// Create a new semantic analyzer with the given names in scope
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            defined_variables: names.into_iter().map(Into::into).collect(),
            scopes: Vec::new(),
            unknown: Vec::new(),
        }
    }

    /// Analyze a logic tree, returning the names that are not in scope
    pub fn analyze_logic(mut self, logic: &Logic) -> Vec<String> {
        self.logic(logic);
        self.unknown
    }

    /// Analyze a function body, with its parameters in scope
    pub fn analyze_function(mut self, function: &FunctionLogic) -> Vec<String> {
        self.function(function);
        self.unknown
    }

    fn is_defined(&self, name: &str) -> bool {
        self.defined_variables.contains(name)
            || self.scopes.iter().any(|scope| scope.contains(name))
            || is_builtin_function(name)
    }

    fn with_scope<F: FnOnce(&mut Self)>(&mut self, names: HashSet<String>, f: F) {
        self.scopes.push(names);
        f(self);
        self.scopes.pop();
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn report(&mut self, name: &str) {
        if !self.unknown.iter().any(|n| n == name) {
            self.unknown.push(name.to_string());
        }
    }

    fn function(&mut self, function: &FunctionLogic) {
        let params = function.parameters.iter().map(|p| p.name.clone()).collect();
        self.with_scope(params, |this| this.logic(&function.body));
    }

    fn logic(&mut self, logic: &Logic) {
        match logic {
            Logic::Literal(expr) => self.expression(expr),
            Logic::DecisionTable(table) => self.decision_table(table),
            Logic::Context(entries) => {
                self.with_scope(HashSet::new(), |this| {
                    for (variable, value) in entries {
                        this.logic(value);
                        if let Some(variable) = variable {
                            this.bind(variable);
                        }
                    }
                });
            }
            Logic::Invocation { callee, bindings } => {
                self.expression(callee);
                for value in bindings.iter().filter_map(|(_, v)| v.as_ref()) {
                    self.logic(value);
                }
            }
            Logic::List(items) => {
                for item in items {
                    self.logic(item);
                }
            }
            Logic::Relation { rows, .. } => {
                for cell in rows.iter().flatten() {
                    self.logic(cell);
                }
            }
            Logic::Function(function) => self.function(function),
        }
    }

    fn decision_table(&mut self, table: &CompiledDecisionTable) {
        for input in &table.inputs {
            self.expression(input);
        }
        let implicit: HashSet<String> = std::iter::once("?".to_string()).collect();
        self.with_scope(implicit, |this| {
            for tests in table.input_values.iter().flatten() {
                this.unary_tests(tests);
            }
            for output in &table.outputs {
                if let Some(priorities) = &output.priorities {
                    this.unary_tests(priorities);
                }
            }
            for rule in &table.rules {
                for tests in &rule.inputs {
                    this.unary_tests(tests);
                }
            }
        });
        for output in &table.outputs {
            if let Some(default) = &output.default {
                self.expression(default);
            }
        }
        for rule in &table.rules {
            for output in &rule.outputs {
                self.expression(output);
            }
        }
    }

    fn unary_tests(&mut self, tests: &[UnaryTest]) {
        for test in tests {
            match test {
                UnaryTest::Any => {}
                UnaryTest::Compare { value, .. } => self.expression(value),
                UnaryTest::Interval { start, end, .. } => {
                    self.expression(start);
                    self.expression(end);
                }
                UnaryTest::Expression(expr) => self.expression(expr),
                UnaryTest::Not(inner) => self.unary_tests(inner),
            }
        }
    }

    fn expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Literal(_) => {}
            Expression::Name(name) => {
                if !self.is_defined(name) {
                    self.report(name);
                }
            }
            Expression::Path { base, .. } => self.expression(base),
            Expression::Binary { left, right, .. } => {
                self.expression(left);
                self.expression(right);
            }
            Expression::Unary { operand, .. } => self.expression(operand),
            Expression::Between { value, low, high } => {
                self.expression(value);
                self.expression(low);
                self.expression(high);
            }
            Expression::In { value, tests } => {
                self.expression(value);
                let implicit = std::iter::once("?".to_string()).collect();
                self.with_scope(implicit, |this| this.unary_tests(tests));
            }
            Expression::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expression(condition);
                self.expression(then_branch);
                self.expression(else_branch);
            }
            Expression::For {
                variable,
                iterable,
                body,
            } => {
                self.expression(iterable);
                let bound = std::iter::once(variable.clone()).collect();
                self.with_scope(bound, |this| this.expression(body));
            }
            Expression::Quantified {
                variable,
                iterable,
                condition,
                ..
            } => {
                self.expression(iterable);
                let bound = std::iter::once(variable.clone()).collect();
                self.with_scope(bound, |this| this.expression(condition));
            }
            Expression::List(items) => {
                for item in items {
                    self.expression(item);
                }
            }
            Expression::Range { start, end, .. } => {
                self.expression(start);
                self.expression(end);
            }
            Expression::Context(entries) => {
                self.with_scope(HashSet::new(), |this| {
                    for (key, value) in entries {
                        this.expression(value);
                        this.bind(key);
                    }
                });
            }
            // Filter predicates see the item's own entries, which are only
            // known at run time.
            Expression::Filter { base, .. } => self.expression(base),
            Expression::FunctionCall { callee, args } => {
                self.expression(callee);
                match args {
                    Arguments::Positional(args) => {
                        for arg in args {
                            self.expression(arg);
                        }
                    }
                    Arguments::Named(args) => {
                        for (_, arg) in args {
                            self.expression(arg);
                        }
                    }
                }
            }
        }
    }
}
