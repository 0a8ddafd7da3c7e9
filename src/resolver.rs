use std::collections::HashMap;

use crate::error::ErrorReporter;
use crate::expr::{Expr, ExprId, ExprKind};
use crate::stmt::{FunctionDecl, Stmt};
use crate::token::Token;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    None,
    Loop,
}

/// `false` means "declared but its initializer hasn't finished resolving
/// yet" — reading the name in that state is a compile error (`spec.md`
/// §4.2).
type Scope = HashMap<String, bool>;

/// Static resolution pass, run once over the whole program between parsing
/// and interpretation. Produces the depth map the interpreter uses for
/// constant-time environment access; never mutated again after `resolve`
/// returns (`spec.md` §5 "the resolver writes its depth map once").
pub struct Resolver<'a> {
    reporter: &'a ErrorReporter,
    scopes: Vec<Scope>,
    locals: HashMap<ExprId, usize>,
    current_function: FunctionKind,
    current_class: ClassKind,
    current_loop: LoopKind,
}

impl<'a> Resolver<'a> {
    pub fn new(reporter: &'a ErrorReporter) -> Self {
        Resolver {
            reporter,
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            current_loop: LoopKind::None,
        }
    }

    pub fn resolve(mut self, statements: &[Stmt]) -> HashMap<ExprId, usize> {
        self.resolve_stmts(statements);
        log::debug!("resolver recorded {} local bindings", self.locals.len());
        self.locals
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Function(decl) => {
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function);
            }
            Stmt::Class { name, superclass, methods } => {
                let enclosing_class = self.current_class;
                self.current_class = ClassKind::Class;

                self.declare(name);
                self.define(name);

                let mut pushed_super_scope = false;
                if let Some(superclass) = superclass {
                    if let ExprKind::Variable { name: super_name } = &superclass.kind {
                        if super_name.lexeme == name.lexeme {
                            self.reporter.error_at(super_name, "A class can't inherit from itself.");
                        }
                    }
                    self.current_class = ClassKind::Subclass;
                    self.resolve_expr(superclass);

                    self.begin_scope();
                    self.scopes.last_mut().unwrap().insert("super".to_string(), true);
                    pushed_super_scope = true;
                }

                self.begin_scope();
                self.scopes.last_mut().unwrap().insert("this".to_string(), true);
                for method in methods {
                    let kind =
                        if method.name.lexeme == "init" { FunctionKind::Initializer } else { FunctionKind::Method };
                    self.resolve_function(method, kind);
                }
                self.end_scope();

                if pushed_super_scope {
                    self.end_scope();
                }

                self.current_class = enclosing_class;
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::If { condition, then_branch, else_branch } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.reporter.error_at(keyword, "Can't use 'return' in top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.reporter.error_at(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::While { condition, body, increment } => {
                let enclosing_loop = self.current_loop;
                self.current_loop = LoopKind::Loop;
                self.resolve_expr(condition);
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.resolve_stmt(body);
                self.current_loop = enclosing_loop;
            }
            Stmt::AbortLoop { keyword } => {
                if self.current_loop != LoopKind::Loop {
                    self.reporter.error_at(keyword, &format!("Can't use '{}' outside of loop.", keyword.lexeme));
                }
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Variable { name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.reporter.error_at(name, "Can't read local variable in its own initializer.");
                    }
                }
                self.resolve_local(expr.id, name);
            }
            ExprKind::Assign { name, value } => {
                self.resolve_expr(value);
                self.resolve_local(expr.id, name);
            }
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Call { callee, arguments, .. } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::Get { object, .. } => self.resolve_expr(object),
            ExprKind::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            ExprKind::Super { keyword, .. } => {
                match self.current_class {
                    ClassKind::None => self.reporter.error_at(keyword, "Can't use 'super' outside of a class."),
                    ClassKind::Class => {
                        self.reporter.error_at(keyword, "Can't use 'super' in a class with no superclass.")
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(expr.id, keyword);
            }
            ExprKind::This { keyword } => {
                if self.current_class == ClassKind::None {
                    self.reporter.error_at(keyword, "Can't use 'this' outside of a class.");
                }
                self.resolve_local(expr.id, keyword);
            }
            ExprKind::Grouping(inner) | ExprKind::Unary { right: inner, .. } => self.resolve_expr(inner),
            ExprKind::Literal(_) => {}
        }
    }

    /// Walks scopes innermost to outermost; the first one containing the
    /// name gives the depth. No entry recorded means "treat as global"
    /// (`spec.md` §4.2).
    fn resolve_local(&mut self, expr_id: ExprId, name: &Token) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.locals.insert(expr_id, distance);
                return;
            }
        }
    }

    /// Also resets the loop context to `None` while resolving the function
    /// body: `break`/`continue` must not cross a function boundary even
    /// when the function is declared lexically inside a loop.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        let enclosing_loop = self.current_loop;
        self.current_function = kind;
        self.current_loop = LoopKind::None;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.current_loop = enclosing_loop;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::new());
        log::trace!("resolver entered scope, depth now {}", self.scopes.len());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
        log::trace!("resolver exited scope, depth now {}", self.scopes.len());
    }

    /// Global scope is exempt by design: `declare`/`define` are no-ops when
    /// the scope stack is empty, so duplicate top-level `var` is never
    /// rejected here (`spec.md` §4.1 "deliberately distinct from duplicate
    /// detection in non-global scopes").
    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.reporter.error_at(name, "A variable with the same name is already present in the same scope.");
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorReporter;
    use crate::parser::Parser;
    use crate::scanner::Scanner;

    fn resolve(source: &str) -> bool {
        let reporter = ErrorReporter::new();
        let tokens = Scanner::new(source, &reporter).scan_tokens();
        let statements = Parser::new(tokens, &reporter).parse();
        assert!(!reporter.had_error(), "program failed to parse");
        Resolver::new(&reporter).resolve(&statements);
        reporter.had_error()
    }

    #[test]
    fn well_formed_program_resolves_without_error() {
        assert!(!resolve("var a = 1; { var b = a + 1; print b; }"));
    }

    #[test]
    fn reading_a_local_in_its_own_initializer_is_an_error() {
        assert!(resolve("var a = 1; { var a = a; }"));
    }

    #[test]
    fn break_outside_a_loop_is_an_error() {
        assert!(resolve("break;"));
    }

    #[test]
    fn break_inside_a_loop_is_fine() {
        assert!(!resolve("while (true) { break; }"));
    }

    #[test]
    fn break_inside_a_function_declared_in_a_loop_is_an_error() {
        assert!(resolve("while (true) { fun f() { break; } }"));
    }

    #[test]
    fn this_outside_a_class_is_an_error() {
        assert!(resolve("print this;"));
    }

    #[test]
    fn super_without_a_superclass_is_an_error() {
        assert!(resolve("class A { m() { super.m(); } }"));
    }

    #[test]
    fn returning_a_value_from_an_initializer_is_an_error() {
        assert!(resolve("class A { init() { return 1; } }"));
    }

    #[test]
    fn class_inheriting_from_itself_is_an_error() {
        assert!(resolve("class A < A {}"));
    }
}
