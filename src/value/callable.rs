use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Shared capability for anything invocable with `(...)`. `spec.md` §4.3
/// "Callable protocol": native functions, user functions, and classes all
/// implement this directly rather than sharing an inheritance hierarchy.
pub trait Callable {
    fn arity(&self) -> usize;
    fn name(&self) -> &str;
    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, Error>;
}
