use thiserror::Error;

use crate::{builtin::Builtin, object::ObjectType};

use monke_parser::token::TokenKind;

/// Everything that can go wrong while evaluating.
///
/// These never unwind the host: the evaluator wraps them in
/// [`Object::Error`](crate::object::Object::Error), which then stops every
/// enclosing statement sequence on its way to the top.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// When attempting a prefix operation on an invalid type (e.g. `-true`)
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: TokenKind,
        right: ObjectType,
    },
    /// When both operands have the same type but it does not support the operator (e.g. `"a" - "b"`)
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: TokenKind,
        right: ObjectType,
    },
    /// When the operands of an infix operation are of different types (e.g. `1 + true`)
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: TokenKind,
        right: ObjectType,
    },
    /// When referencing an identifier that is neither bound nor a builtin
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),
    /// When an object that is not a function is used with function call syntax
    #[error("not a function: {0}")]
    NotAFunction(ObjectType),
    /// When a call's argument count does not match the expected parameter count
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    BadArity { expected: usize, got: usize },
    /// When a builtin receives an argument of an unsupported type
    #[error("argument to `{}` not supported, got {got}", .builtin.name())]
    InvalidArgumentType { builtin: Builtin, got: ObjectType },
    /// When indexing a value that does not support it (e.g. `1[0]`)
    #[error("index operator not supported: {left}[{index}]")]
    IndexNotSupported { left: ObjectType, index: ObjectType },
    /// When a map key cannot be hashed (e.g. `{fn() {}: 1}`)
    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),
    #[error("division by zero")]
    DivisionByZero,
}
