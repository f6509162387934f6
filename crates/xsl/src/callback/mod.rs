//! Native callback functions.
//!
//! Functions the 1.0 evaluator lacks can be implemented in Rust and reached
//! from the transpiled stylesheet through `ext:call('name', args...)`. The
//! evaluator routes those calls to [`dispatch`], which forwards them to the
//! registry activated for the current thread by a [`CallbackScope`].

mod builtins;
mod scope;

pub use scope::{CallbackScope, dispatch, is_active};

use crate::error::XslError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A value passed to or returned from a native callback.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl CallbackValue {
    /// Coerces the value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            CallbackValue::String(s) => !s.is_empty(),
            CallbackValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CallbackValue::Boolean(b) => *b,
        }
    }

    /// Coerces the value to a number as per XPath 1.0 rules.
    pub fn to_number(&self) -> f64 {
        match self {
            CallbackValue::Number(n) => *n,
            CallbackValue::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            CallbackValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for CallbackValue {
    /// Coerces the value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackValue::String(s) => write!(f, "{}", s),
            CallbackValue::Number(n) if n.is_nan() => write!(f, "NaN"),
            CallbackValue::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            CallbackValue::Number(n) => write!(f, "{}", n),
            CallbackValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for CallbackValue {
    fn from(value: String) -> Self {
        CallbackValue::String(value)
    }
}

impl From<&str> for CallbackValue {
    fn from(value: &str) -> Self {
        CallbackValue::String(value.to_string())
    }
}

impl From<f64> for CallbackValue {
    fn from(value: f64) -> Self {
        CallbackValue::Number(value)
    }
}

impl From<bool> for CallbackValue {
    fn from(value: bool) -> Self {
        CallbackValue::Boolean(value)
    }
}

/// Signature of a native callback.
pub type CallbackFn = dyn Fn(&[CallbackValue]) -> Result<CallbackValue, XslError> + Send + Sync;

/// Named native callbacks.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    functions: HashMap<String, Arc<CallbackFn>>,
}

impl CallbackRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in string, numeric and regex functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register(&mut registry);
        registry
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[CallbackValue]) -> Result<CallbackValue, XslError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invokes the callback registered under `name`.
    pub fn call(&self, name: &str, args: &[CallbackValue]) -> Result<CallbackValue, XslError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| XslError::UnknownFunction(name.to_string()))?;
        log::trace!("Calling native callback '{}' with {} args", name, args.len());
        function(args)
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Fails unless `args` has between `min` and `max` entries.
pub(crate) fn check_arity(
    function: &str,
    args: &[CallbackValue],
    min: usize,
    max: usize,
) -> Result<(), XslError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(XslError::invalid_argument(
            function,
            format!("Expected {} arguments, got {}", expected, args.len()),
        ));
    }
    Ok(())
}
