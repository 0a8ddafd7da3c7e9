use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::{Environment, SharedEnvironment};
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::stmt::FunctionDecl;
use crate::value::callable::Callable;
use crate::value::Value;

/// A host-implemented callable exposed in the global environment
/// (`spec.md` §4.3 "native callables implement directly"). A function
/// pointer is enough since none of the built-ins need to capture state; a
/// boxed closure would be the next step if that changes.
#[derive(Debug)]
pub struct NativeFunction {
    name: &'static str,
    arity: usize,
    func: fn(&mut Interpreter, &[Value]) -> Result<Value, Error>,
}

impl NativeFunction {
    pub fn clock() -> Self {
        NativeFunction {
            name: "clock",
            arity: 0,
            func: |_, _| {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock is before the Unix epoch")
                    .as_secs_f64();
                Ok(Value::Number(secs))
            },
        }
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, Error> {
        (self.func)(interpreter, &args)
    }
}

/// The runtime representation of a `fun` (or method) declaration: the AST
/// plus the environment that was active at declaration time, which is what
/// makes closures work (`spec.md` §3 "Functions").
#[derive(Clone, Debug)]
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: SharedEnvironment,
    is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: SharedEnvironment, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a new function whose closure nests the original one and adds
    /// a single `this -> instance` binding. The receiver is unchanged
    /// (`spec.md` §4.3 "Binding").
    pub fn bind(&self, instance: Value) -> Function {
        let env = Environment::new_enclosed(self.closure.clone());
        env.borrow_mut().define("this", instance);
        Function { declaration: self.declaration.clone(), closure: env, is_initializer: self.is_initializer }
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, Error> {
        log::debug!("calling function '{}' with {} argument(s)", self.name(), args.len());
        let call_env = Environment::new_enclosed(self.closure.clone());
        for (param, arg) in self.declaration.params.iter().zip(args) {
            call_env.borrow_mut().define(param.lexeme.clone(), arg);
        }

        match interpreter.execute_block(&self.declaration.body, call_env) {
            Err(Error::Return(value)) => {
                if self.is_initializer {
                    Ok(Environment::get_at(&self.closure, 0, "this"))
                } else {
                    Ok(value)
                }
            }
            Err(other) => Err(other),
            Ok(()) if self.is_initializer => Ok(Environment::get_at(&self.closure, 0, "this")),
            Ok(()) => Ok(Value::Nil),
        }
    }
}
