use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::token::Token;
use crate::value::class::Class;
use crate::value::Value;

/// The runtime representation of an instance of a Lox class. Fields are
/// created on first assignment (`spec.md` §3).
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Fields shadow methods. A method found on the class is bound to this
    /// instance before being handed back (`spec.md` §4.3 "Get").
    pub fn get(this: &Rc<RefCell<Instance>>, name: &Token) -> Result<Value, Error> {
        if let Some(value) = this.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(method) = this.borrow().class.find_method(&name.lexeme) {
            return Ok(Value::Function(Rc::new(method.bind(Value::Instance(this.clone())))));
        }
        Err(Error::runtime(name, format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
