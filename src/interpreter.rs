use std::collections::HashMap;
use std::rc::Rc;

use crate::environment::{Environment, SharedEnvironment};
use crate::error::{self, Error};
use crate::expr::{Expr, ExprId, ExprKind};
use crate::stmt::Stmt;
use crate::token::{Token, TokenKind};
use crate::value::class::Class;
use crate::value::function::{Function, NativeFunction};
use crate::value::instance::Instance;
use crate::value::Value;

/// Tree-walking evaluator (`spec.md` §4.3). Owns the current-environment
/// pointer, which is temporarily re-pointed on block/call entry and
/// restored on exit along every path, including non-local transfers.
pub struct Interpreter {
    globals: SharedEnvironment,
    environment: SharedEnvironment,
    locals: HashMap<ExprId, usize>,
}

impl Interpreter {
    pub fn new(locals: HashMap<ExprId, usize>) -> Self {
        let globals = Environment::new_global();
        globals.borrow_mut().define("clock", Value::Native(Rc::new(NativeFunction::clock())));
        Interpreter { environment: globals.clone(), globals, locals }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), Error> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    /// Folds in another resolver pass's depth map. Used by the REPL, which
    /// resolves each line independently against a persistent interpreter;
    /// safe because `ExprId`s are never reused across parses.
    pub fn add_locals(&mut self, locals: HashMap<ExprId, usize>) {
        self.locals.extend(locals);
    }

    pub fn evaluate_standalone(&mut self, expr: &Expr) -> Result<Value, Error> {
        self.evaluate(expr)
    }

    /// Runs `statements` against `env`, restoring the previous environment
    /// on every exit path (`spec.md` §5 "must guarantee this on every exit
    /// path, not only successful completion").
    pub fn execute_block(&mut self, statements: &[Stmt], env: SharedEnvironment) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.environment, env);
        let mut result = Ok(());
        for stmt in statements {
            result = self.execute(stmt);
            if result.is_err() {
                break;
            }
        }
        self.environment = previous;
        result
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.borrow_mut().define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let scope = Environment::new_enclosed(self.environment.clone());
                self.execute_block(statements, scope)
            }
            Stmt::If { condition, then_branch, else_branch } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body, increment } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body) {
                        Err(Error::Break) => break,
                        Err(Error::Continue) => {}
                        Err(other) => return Err(other),
                        Ok(()) => {}
                    }
                    if let Some(inc) = increment {
                        self.evaluate(inc)?;
                    }
                }
                Ok(())
            }
            Stmt::AbortLoop { keyword } => {
                if keyword.kind == TokenKind::Break { Err(Error::Break) } else { Err(Error::Continue) }
            }
            Stmt::Function(decl) => {
                let function = Function::new(decl.clone(), self.environment.clone(), false);
                self.environment.borrow_mut().define(decl.name.lexeme.clone(), Value::Function(Rc::new(function)));
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Err(Error::Return(value))
            }
            Stmt::Class { name, superclass, methods } => self.execute_class(name, superclass, methods),
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass_expr: &Option<Expr>,
        methods: &[Rc<crate::stmt::FunctionDecl>],
    ) -> Result<(), Error> {
        let superclass = match superclass_expr {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token = superclass_token(expr);
                    return Err(Error::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme.clone(), Value::Nil);

        let method_env = match &superclass {
            Some(superclass) => {
                let env = Environment::new_enclosed(self.environment.clone());
                env.borrow_mut().define("super", Value::Class(superclass.clone()));
                env
            }
            None => self.environment.clone(),
        };

        let mut class_methods = HashMap::new();
        for decl in methods {
            let is_initializer = decl.name.lexeme == "init";
            let function = Function::new(decl.clone(), method_env.clone(), is_initializer);
            class_methods.insert(decl.name.lexeme.clone(), Rc::new(function));
        }

        let class = Value::Class(Rc::new(Class::new(name.lexeme.clone(), superclass, class_methods)));
        self.environment.borrow_mut().assign(name, class)?;
        Ok(())
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, Error> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),
            ExprKind::Grouping(inner) => self.evaluate(inner),
            ExprKind::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(Error::runtime(operator, "Operand must be a number.")),
                    },
                    TokenKind::Bang => Ok(Value::Boolean(!right.is_truthy())),
                    _ => unreachable!("parser only emits Minus/Bang as unary operators"),
                }
            }
            ExprKind::Binary { left, operator, right } => self.evaluate_binary(left, operator, right),
            ExprKind::Logical { left, operator, right } => {
                let left = self.evaluate(left)?;
                let short_circuits = if operator.kind == TokenKind::Or { left.is_truthy() } else { !left.is_truthy() };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            ExprKind::Variable { name } => self.lookup_variable(expr.id, name),
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(&expr.id) {
                    Some(&distance) => Environment::assign_at(&self.environment, distance, name, value.clone()),
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                Ok(value)
            }
            ExprKind::Call { callee, paren, arguments } => {
                let callee = self.evaluate(callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }
                if !callee.is_callable() {
                    return Err(Error::runtime(paren, "Can only call functions and classes."));
                }
                callee.call(self, paren, args)
            }
            ExprKind::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => Instance::get(&instance, name),
                _ => Err(Error::runtime(name, "Only class instances have properties callable by '.'.")),
            },
            ExprKind::Set { object, name, value } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;
                    instance.borrow_mut().set(name, value.clone());
                    Ok(value)
                }
                _ => Err(Error::runtime(name, "Only class instances have fields.")),
            },
            ExprKind::This { keyword } => self.lookup_variable(expr.id, keyword),
            ExprKind::Super { keyword, method } => self.evaluate_super(expr.id, keyword, method),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value, Error> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        use TokenKind::*;
        match (operator.kind, &left, &right) {
            (Minus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (Slash, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            (Star, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            (Plus, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Plus, Value::String(a), Value::String(b)) => Ok(Value::string(format!("{a}{b}"))),
            (Plus, _, _) => Err(Error::runtime(operator, "Operands must be two numbers or two strings.")),
            (Greater, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a > b)),
            (GreaterEqual, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a >= b)),
            (Less, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a < b)),
            (LessEqual, Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(a <= b)),
            (Greater | GreaterEqual | Less | LessEqual, _, _) => {
                Err(Error::runtime(operator, "Operands must be numbers."))
            }
            (BangEqual, a, b) => Ok(Value::Boolean(!a.is_equal(b))),
            (EqualEqual, a, b) => Ok(Value::Boolean(a.is_equal(b))),
            (Minus | Slash | Star, _, _) => Err(Error::runtime(operator, "Operands must be numbers.")),
            _ => unreachable!("parser only emits arithmetic/comparison/equality operators as Binary"),
        }
    }

    /// `distance` locates the environment holding `super`; `distance - 1`
    /// (the next inner synthetic scope, pushed by `bind`) holds `this`
    /// (`spec.md` §4.3 "Super").
    fn evaluate_super(&mut self, expr_id: ExprId, keyword: &Token, method: &Token) -> Result<Value, Error> {
        let distance = *self.locals.get(&expr_id).expect("resolver always records a distance for 'super'");
        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Value::Class(class) => class,
            _ => unreachable!("resolver only ever binds 'super' to a class value"),
        };
        let instance = Environment::get_at(&self.environment, distance - 1, "this");

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(Error::runtime(method, format!("Undefined property '{}'.", method.lexeme))),
        }
    }

    fn lookup_variable(&self, expr_id: ExprId, name: &Token) -> Result<Value, Error> {
        match self.locals.get(&expr_id) {
            Some(&distance) => {
                log::trace!("resolved lookup of '{}' at distance {distance}", name.lexeme);
                Ok(Environment::get_at(&self.environment, distance, &name.lexeme))
            }
            None => {
                log::trace!("global lookup of '{}'", name.lexeme);
                self.globals.borrow().get(name)
            }
        }
    }
}

/// `Super`/`Get` targets that turn out not to be classes are reported at
/// the superclass name's token, matching the book's error siting.
fn superclass_token(expr: &Expr) -> &Token {
    match &expr.kind {
        ExprKind::Variable { name } => name,
        _ => unreachable!("the parser only ever parses a superclass clause as a Variable expression"),
    }
}

pub fn report_top_level_error(error: &Error) {
    error::report_runtime_error(error);
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorReporter;
    use crate::interpreter::Interpreter;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;
    use crate::value::Value;

    fn eval(source: &str) -> Result<Value, crate::error::Error> {
        let reporter = ErrorReporter::new();
        let mut parser = Parser::new(Scanner::new(source, &reporter).scan_tokens(), &reporter);
        let expr = parser.parse_expression().expect("expression should parse");
        assert!(!reporter.had_error());
        Interpreter::new(Default::default()).evaluate_standalone(&expr)
    }

    fn run(source: &str) -> Result<(), crate::error::Error> {
        let reporter = ErrorReporter::new();
        let tokens = Scanner::new(source, &reporter).scan_tokens();
        let statements = Parser::new(tokens, &reporter).parse();
        assert!(!reporter.had_error());
        let locals = Resolver::new(&reporter).resolve(&statements);
        assert!(!reporter.had_error());
        Interpreter::new(locals).interpret(&statements)
    }

    #[test]
    fn arithmetic_and_string_concatenation() {
        assert!(matches!(eval("1 + 2 * 3").unwrap(), Value::Number(n) if n == 7.0));
        assert!(matches!(eval("\"a\" + \"b\"").unwrap(), Value::String(s) if &*s == "ab"));
    }

    #[test]
    fn adding_a_number_to_a_string_is_a_runtime_error() {
        let err = eval("1 + \"a\"").unwrap_err();
        assert_eq!(err.to_string(), "Operands must be two numbers or two strings.");
    }

    #[test]
    fn closures_see_the_environment_from_definition_time() {
        let source = "var out; { var x = \"captured\"; fun f() { out = x; } f(); } ";
        assert!(run(source).is_ok());
    }

    #[test]
    fn recursive_function_terminates_via_return() {
        let source = r#"
            fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
            var result = fib(10);
        "#;
        assert!(run(source).is_ok());
    }

    #[test]
    fn break_unwinds_only_to_the_nearest_loop() {
        let source = "for (var i = 0; i < 10; i = i + 1) { if (i == 2) break; }";
        assert!(run(source).is_ok());
    }
}
