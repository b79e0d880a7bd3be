use std::{cell::RefCell, rc::Rc};

use monke_parser::ast::Program;

pub mod builtin;
pub mod environment;
pub mod error;
mod evaluator;
pub mod object;

pub use environment::Environment;
pub use error::RuntimeError;
pub use evaluator::Evaluator;

use object::Object;

/// Evaluate `program` against `env`, keeping whatever it binds at the top level.
pub fn evaluate(program: &Program, env: Rc<RefCell<Environment>>) -> Option<Rc<Object>> {
    Evaluator::new_with_env(env).eval(program)
}
