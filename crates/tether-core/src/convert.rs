//! Literal argument conversion
//!
//! Indexer and method-call syntax carry their arguments as literal text
//! (`Item[2]`, `Clamp(0, 'max')`). The [`ValueConverter`] turns a raw
//! argument into a [`Value`] against the parameter's declared type. It is an
//! explicit context object owned by the resolution pipeline and threaded
//! through provider calls.
//!
//! Conversion failure is not an error: a candidate whose arguments do not
//! convert simply does not apply.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::registry::TypeRegistry;
use crate::value::{Value, ValueType};

/// Custom parser for object-typed literal arguments
pub type LiteralParser = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Converts raw literal text to values against declared parameter types
#[derive(Default)]
pub struct ValueConverter {
    parsers: RwLock<FxHashMap<Arc<str>, LiteralParser>>,
}

impl ValueConverter {
    /// Create a converter with the default scalar rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser for literals targeting the named object type
    pub fn register_parser(&self, type_name: impl Into<Arc<str>>, parser: LiteralParser) {
        self.parsers.write().insert(type_name.into(), parser);
    }

    /// Convert `raw` against `target`; `None` when the literal does not fit
    pub fn convert(&self, raw: &str, target: &ValueType, registry: &TypeRegistry) -> Option<Value> {
        let raw = raw.trim();
        match target {
            ValueType::Any => Self::infer(raw),
            ValueType::Bool => match raw {
                "true" => Some(Value::bool(true)),
                "false" => Some(Value::bool(false)),
                _ => None,
            },
            ValueType::Int => raw.parse::<i64>().ok().map(Value::int),
            ValueType::Float => raw.parse::<f64>().ok().map(Value::float),
            ValueType::Str => Some(match Self::unquote(raw) {
                Some(inner) => Value::str(inner),
                None => Value::str(raw),
            }),
            ValueType::List => None,
            ValueType::Object(id) => {
                if raw == "null" {
                    return Some(Value::Null);
                }
                let name = registry.type_name(*id);
                let parser = self.parsers.read().get(name.as_ref()).cloned()?;
                parser(raw)
            }
        }
    }

    /// Infer a value for an untyped target: `null`, booleans, numbers, and
    /// quoted strings; bare words do not infer
    fn infer(raw: &str) -> Option<Value> {
        match raw {
            "null" => return Some(Value::Null),
            "true" => return Some(Value::bool(true)),
            "false" => return Some(Value::bool(false)),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Value::int(i));
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Some(Value::float(f));
        }
        Self::unquote(raw).map(Value::str)
    }

    fn unquote(raw: &str) -> Option<&str> {
        let bytes = raw.as_bytes();
        if bytes.len() >= 2 {
            let first = bytes[0];
            if (first == b'\'' || first == b'"') && bytes[bytes.len() - 1] == first {
                return Some(&raw[1..raw.len() - 1]);
            }
        }
        None
    }
}

impl std::fmt::Debug for ValueConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueConverter")
            .field("parsers", &self.parsers.read().len())
            .finish()
    }
}
