use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::value::callable::Callable;
use crate::value::function::Function;
use crate::value::instance::Instance;
use crate::value::Value;

/// The runtime representation of a `class` declaration. `superclass` is
/// enriched beyond the flat version: single inheritance with recursive
/// method lookup (`spec.md` §3 "Classes and instances").
#[derive(Clone, Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Rc<Function>>) -> Self {
        Class { name, superclass, methods }
    }

    /// Looked up in this class first, then recursively in the superclass
    /// chain (`spec.md` §3 "methods are looked up in the class, then
    /// recursively in the superclass").
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods
            .get(name)
            .cloned()
            .or_else(|| self.superclass.as_ref().and_then(|s| s.find_method(name)))
    }
}

impl Callable for Class {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, interpreter: &mut Interpreter, args: Vec<Value>) -> Result<Value, Error> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::new(self.clone()))));
        if let Some(initializer) = self.find_method("init") {
            initializer.bind(Value::Instance(instance.clone())).call(interpreter, args)?;
        }
        Ok(Value::Instance(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::FunctionDecl;
    use crate::token::{Literal, Token, TokenKind};

    fn method(name: &str) -> Rc<Function> {
        let decl = Rc::new(FunctionDecl {
            name: Token::new(TokenKind::Identifier, name, Literal::None, 1),
            params: Vec::new(),
            body: Vec::new(),
        });
        Rc::new(Function::new(decl, crate::environment::Environment::new_global(), false))
    }

    #[test]
    fn find_method_checks_the_class_before_the_superclass() {
        let mut base_methods = HashMap::new();
        base_methods.insert("greet".to_string(), method("greet"));
        let base = Rc::new(Class::new("Base".to_string(), None, base_methods));

        let overriding = method("greet");
        let mut derived_methods = HashMap::new();
        derived_methods.insert("greet".to_string(), overriding.clone());
        let derived = Class::new("Derived".to_string(), Some(base), derived_methods);

        assert!(Rc::ptr_eq(&derived.find_method("greet").unwrap(), &overriding));
    }

    #[test]
    fn find_method_falls_back_to_the_superclass_chain() {
        let mut base_methods = HashMap::new();
        base_methods.insert("onlyOnBase".to_string(), method("onlyOnBase"));
        let base = Rc::new(Class::new("Base".to_string(), None, base_methods));
        let derived = Class::new("Derived".to_string(), Some(base), HashMap::new());

        assert!(derived.find_method("onlyOnBase").is_some());
        assert!(derived.find_method("missing").is_none());
    }
}
