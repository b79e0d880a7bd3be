use std::{
    cell::RefCell,
    fmt::{self, Display},
    hash::Hasher,
    rc::Rc,
};

use rustc_hash::{FxHashMap, FxHasher};

use crate::{builtin::Builtin, environment::Environment, error::RuntimeError};

use monke_parser::ast::{escape, BlockStatement, IdentifierLiteral};

thread_local! {
    // The interpreter is built on `Rc`, so the sentinels live per thread.
    // Nothing else may construct `Boolean` or `Null` objects.
    static TRUE: Rc<Object> = Rc::new(Object::Boolean(true));
    static FALSE: Rc<Object> = Rc::new(Object::Boolean(false));
    static NULL: Rc<Object> = Rc::new(Object::Null);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Integer,
    String,
    Boolean,
    Null,
    ReturnValue,
    Error,
    Function,
    Builtin,
    Array,
    Map,
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ObjectType::*;

        let name = match self {
            Integer => "INTEGER",
            String => "STRING",
            Boolean => "BOOLEAN",
            Null => "NULL",
            ReturnValue => "RETURN_VALUE",
            Error => "ERROR",
            Function => "FUNCTION",
            Builtin => "BUILTIN",
            Array => "ARRAY",
            Map => "MAP",
        };

        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub enum Object {
    Integer(i64),
    String(String),
    /// Only ever built for the two sentinels, see [`Object::native_bool`]
    Boolean(bool),
    /// Only ever built for the sentinel, see [`Object::null`]
    Null,
    /// Special object to encapsulate a return-ed value while it goes up scopes.
    /// This is never seen by the user.
    ReturnValue(Rc<Object>),
    Error(RuntimeError),
    Function(Function),
    Builtin(Builtin),
    Array(Array),
    Map(Map),
}

impl Object {
    /// The shared `true` or `false` instance.
    pub fn native_bool(value: bool) -> Rc<Object> {
        if value {
            TRUE.with(Rc::clone)
        } else {
            FALSE.with(Rc::clone)
        }
    }

    /// The shared `null` instance.
    pub fn null() -> Rc<Object> {
        NULL.with(Rc::clone)
    }

    pub fn error(err: RuntimeError) -> Rc<Object> {
        Rc::new(Object::Error(err))
    }

    /// Identity comparison, the semantics of `==` for anything but integers.
    pub fn is_same(left: &Rc<Object>, right: &Rc<Object>) -> bool {
        Rc::ptr_eq(left, right)
    }

    pub fn typename(&self) -> ObjectType {
        use Object::*;

        match self {
            Integer(_) => ObjectType::Integer,
            String(_) => ObjectType::String,
            Boolean(_) => ObjectType::Boolean,
            Null => ObjectType::Null,
            ReturnValue(_) => ObjectType::ReturnValue,
            Error(_) => ObjectType::Error,
            Function(_) => ObjectType::Function,
            Builtin(_) => ObjectType::Builtin,
            Array(_) => ObjectType::Array,
            Map(_) => ObjectType::Map,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Whether this value has to stop the enclosing evaluation and travel up.
    pub fn is_return_or_error(&self) -> bool {
        matches!(self, Self::ReturnValue(_) | Self::Error(_))
    }

    /// Everything except `false` and `null` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false) | Self::Null)
    }

    /// Derive the map slot for this object, if its type can be used as a key.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(value) => *value as u64,
            Object::Boolean(value) => u64::from(*value),
            Object::String(value) => {
                let mut hasher = FxHasher::default();
                hasher.write(value.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };

        Some(HashKey {
            object_type: self.typename(),
            value,
        })
    }

    /// Converts the given value to a string (in the format of a code object).
    ///
    /// Use this anywhere a programmer expects to see the code-version of an object (e.g. in the REPL).
    /// # Examples
    /// ```rust
    /// use monke_interpreter::object::Object;
    ///
    /// let obj = Object::String("hello world".to_string());
    ///
    /// assert_eq!(obj.to_code_string(), "\"hello world\"");
    /// ```
    pub fn to_code_string(&self) -> String {
        use Object::*;

        match self {
            String(value) => format!("\"{}\"", escape(value)),
            value => value.to_string(),
        }
    }
}

impl Display for Object {
    /// toString() form at runtime
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Object::*;

        match self {
            Integer(value) => write!(f, "{}", value),
            String(value) => write!(f, "{}", value),
            Boolean(value) => write!(f, "{}", value),
            Null => write!(f, "null"),
            ReturnValue(obj) => write!(f, "{}", obj),
            Error(err) => write!(f, "Error: {}", err),
            Function(func) => write!(f, "{}", func),
            Builtin(builtin) => write!(f, "{}", builtin),
            Array(array) => write!(f, "{}", array),
            Map(map) => write!(f, "{}", map),
        }
    }
}

/// Identity of a map slot: the key's type tag plus a 64-bit digest of its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashKey {
    pub object_type: ObjectType,
    pub value: u64,
}

#[derive(Debug)]
pub struct Array {
    pub elements: Vec<Rc<Object>>,
}

impl Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements: Vec<String> = self
            .elements
            .iter()
            .map(|e| e.to_code_string())
            .collect();
        write!(f, "[{}]", elements.join(", "))
    }
}

/// The original key object is kept next to the value so the map can be printed.
#[derive(Debug)]
pub struct MapPair {
    pub key: Rc<Object>,
    pub value: Rc<Object>,
}

#[derive(Debug, Default)]
pub struct Map {
    pub pairs: FxHashMap<HashKey, MapPair>,
}

impl Map {
    pub fn get(&self, key: &HashKey) -> Option<Rc<Object>> {
        self.pairs.get(key).map(|pair| Rc::clone(&pair.value))
    }

    /// Store a pair, replacing whatever occupied the same slot.
    pub fn insert(&mut self, hash: HashKey, key: Rc<Object>, value: Rc<Object>) {
        self.pairs.insert(hash, MapPair { key, value });
    }
}

impl Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<(&HashKey, &MapPair)> = self.pairs.iter().collect();
        slots.sort_by_key(|(hash, _)| **hash);

        let pairs: Vec<String> = slots
            .into_iter()
            .map(|(_, pair)| {
                format!(
                    "{}: {}",
                    pair.key.to_code_string(),
                    pair.value.to_code_string()
                )
            })
            .collect();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}

pub struct Function {
    pub parameters: Vec<IdentifierLiteral>,
    pub body: Rc<BlockStatement>,
    /// The defining scope, shared with every call of this function
    pub env: Rc<RefCell<Environment>>,
}

impl fmt::Debug for Function {
    // The captured environment may contain this very function
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();

        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}
