use std::{fmt::Display, rc::Rc};

use crate::{
    error::RuntimeError,
    object::{Array, Object},
};

/// Native functions, resolved by name when an identifier is not bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Len,
    Type,
    First,
    Last,
    Rest,
    Push,
    Puts,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "len" => Some(Builtin::Len),
            "type" => Some(Builtin::Type),
            "first" => Some(Builtin::First),
            "last" => Some(Builtin::Last),
            "rest" => Some(Builtin::Rest),
            "push" => Some(Builtin::Push),
            "puts" => Some(Builtin::Puts),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Type => "type",
            Builtin::First => "first",
            Builtin::Last => "last",
            Builtin::Rest => "rest",
            Builtin::Push => "push",
            Builtin::Puts => "puts",
        }
    }

    pub fn apply(&self, args: Vec<Rc<Object>>) -> Result<Rc<Object>, RuntimeError> {
        match self {
            Builtin::Len => {
                let arg = self.single_argument(&args)?;
                match arg.as_ref() {
                    Object::String(str) => Ok(Rc::new(Object::Integer(str.len() as i64))),
                    Object::Array(arr) => Ok(Rc::new(Object::Integer(arr.elements.len() as i64))),
                    _ => Err(self.invalid_argument(arg)),
                }
            }
            Builtin::Type => {
                let arg = self.single_argument(&args)?;
                Ok(Rc::new(Object::String(arg.typename().to_string())))
            }
            Builtin::First => {
                let elements = self.array_argument(&args)?;
                Ok(elements.first().map_or_else(Object::null, Rc::clone))
            }
            Builtin::Last => {
                let elements = self.array_argument(&args)?;
                Ok(elements.last().map_or_else(Object::null, Rc::clone))
            }
            Builtin::Rest => {
                let elements = self.array_argument(&args)?;
                if elements.is_empty() {
                    return Ok(Object::null());
                }
                Ok(Rc::new(Object::Array(Array {
                    elements: elements[1..].to_vec(),
                })))
            }
            Builtin::Push => {
                check_arity(2, &args)?;
                match args[0].as_ref() {
                    Object::Array(arr) => {
                        let mut elements = arr.elements.clone();
                        elements.push(Rc::clone(&args[1]));
                        Ok(Rc::new(Object::Array(Array { elements })))
                    }
                    _ => Err(self.invalid_argument(&args[0])),
                }
            }
            Builtin::Puts => {
                for arg in &args {
                    println!("{}", arg);
                }
                Ok(Object::null())
            }
        }
    }

    fn single_argument<'a>(&self, args: &'a [Rc<Object>]) -> Result<&'a Rc<Object>, RuntimeError> {
        check_arity(1, args)?;
        Ok(&args[0])
    }

    fn array_argument<'a>(&self, args: &'a [Rc<Object>]) -> Result<&'a [Rc<Object>], RuntimeError> {
        let arg = self.single_argument(args)?;
        match arg.as_ref() {
            Object::Array(arr) => Ok(arr.elements.as_slice()),
            _ => Err(self.invalid_argument(arg)),
        }
    }

    fn invalid_argument(&self, arg: &Rc<Object>) -> RuntimeError {
        RuntimeError::InvalidArgumentType {
            builtin: *self,
            got: arg.typename(),
        }
    }
}

fn check_arity(expected: usize, args: &[Rc<Object>]) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::BadArity {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

impl Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "builtin function {}", self.name())
    }
}
