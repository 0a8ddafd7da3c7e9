use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::token::Token;
use crate::value::Value;

/// Shared-ownership handle to a scope frame. Closures keep an environment
/// alive past the block/call that created it by holding a clone of this
/// handle, so `Rc<RefCell<_>>` rather than a plain owned tree (`spec.md`
/// §9 "Closures and cyclic environment graphs").
pub type SharedEnvironment = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<SharedEnvironment>,
}

impl Environment {
    pub fn new_global() -> SharedEnvironment {
        Rc::new(RefCell::new(Environment { values: HashMap::new(), enclosing: None }))
    }

    pub fn new_enclosed(enclosing: SharedEnvironment) -> SharedEnvironment {
        Rc::new(RefCell::new(Environment { values: HashMap::new(), enclosing: Some(enclosing) }))
    }

    /// Unconditional insert into the current scope. A second `var x` in the
    /// same (global) scope silently rebinds; non-global re-declaration is
    /// rejected statically by the resolver, not here.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, Error> {
        if let Some(value) = self.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow().get(name),
            None => Err(Error::runtime(name, format!("Undefined variable '{}'.", name.lexeme))),
        }
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), Error> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &self.enclosing {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(Error::runtime(name, format!("Undefined variable '{}'.", name.lexeme))),
        }
    }

    /// Follows `enclosing` exactly `distance` times; `distance == 0` means
    /// the environment itself.
    pub fn ancestor(this: &SharedEnvironment, distance: usize) -> SharedEnvironment {
        let mut env = this.clone();
        for _ in 0..distance {
            let parent = env
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-recorded distance must not exceed the chain length");
            env = parent;
        }
        env
    }

    /// Constant-time access using resolver output; never falls back to the
    /// walking `get`/`assign` form (`spec.md` §4.1 contract).
    pub fn get_at(this: &SharedEnvironment, distance: usize, name: &str) -> Value {
        Environment::ancestor(this, distance)
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or(Value::Nil)
    }

    pub fn assign_at(this: &SharedEnvironment, distance: usize, name: &Token, value: Value) {
        Environment::ancestor(this, distance)
            .borrow_mut()
            .values
            .insert(name.lexeme.clone(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn token(lexeme: &str) -> Token {
        Token::new(TokenKind::Identifier, lexeme, crate::token::Literal::None, 1)
    }

    #[test]
    fn define_then_get_round_trips() {
        let env = Environment::new_global();
        env.borrow_mut().define("x", Value::Number(1.0));
        let got = env.borrow().get(&token("x")).unwrap();
        assert!(matches!(got, Value::Number(n) if n == 1.0));
    }

    #[test]
    fn get_walks_enclosing_chain() {
        let global = Environment::new_global();
        global.borrow_mut().define("x", Value::Number(7.0));
        let local = Environment::new_enclosed(global);
        let got = local.borrow().get(&token("x")).unwrap();
        assert!(matches!(got, Value::Number(n) if n == 7.0));
    }

    #[test]
    fn assign_to_undefined_name_errors() {
        let env = Environment::new_global();
        assert!(env.borrow_mut().assign(&token("missing"), Value::Nil).is_err());
    }

    #[test]
    fn get_at_bypasses_the_walk() {
        let global = Environment::new_global();
        let local = Environment::new_enclosed(global);
        local.borrow_mut().define("x", Value::Number(3.0));
        let got = Environment::get_at(&local, 0, "x");
        assert!(matches!(got, Value::Number(n) if n == 3.0));
    }

    #[test]
    fn assign_at_rebinds_the_named_ancestor() {
        let global = Environment::new_global();
        global.borrow_mut().define("x", Value::Number(1.0));
        let local = Environment::new_enclosed(global.clone());
        Environment::assign_at(&local, 1, &token("x"), Value::Number(2.0));
        let got = global.borrow().get(&token("x")).unwrap();
        assert!(matches!(got, Value::Number(n) if n == 2.0));
    }
}
