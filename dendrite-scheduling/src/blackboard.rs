//! Typed key/value store shared by a task tree.
//!
//! A blackboard is owned by one scheduler run and dropped when the root task
//! tree terminates. Values are tagged; readers ask for a concrete type and get
//! `None` on a tag mismatch. The write rate is low, so a single mutex guards
//! the map.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Key of the cooperative cancellation flag.
pub const CANCELED_KEY: &str = "canceled";

/// Tagged value stored on a blackboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Conversion between Rust types and tagged blackboard values.
pub trait BlackboardValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
    fn to_value(&self) -> Value;
}

impl BlackboardValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl BlackboardValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl BlackboardValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl BlackboardValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Thread-safe typed key/value store scoped to one scheduler run.
#[derive(Debug, Default)]
pub struct Blackboard {
    values: Mutex<HashMap<String, Value>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the value stored under `key`, `None` if absent or of another type.
    pub fn get<T: BlackboardValue>(&self, key: &str) -> Option<T> {
        self.values.lock().get(key).and_then(T::from_value)
    }

    pub fn set<T: BlackboardValue>(&self, key: &str, value: T) {
        self.values.lock().insert(key.to_string(), value.to_value());
    }

    /// Atomically read, transform and write the value under `key`. The closure
    /// receives `None` when the key is absent or holds another type.
    pub fn update<T: BlackboardValue>(&self, key: &str, f: impl FnOnce(Option<T>) -> T) {
        let mut values = self.values.lock();
        let current = values.get(key).and_then(T::from_value);
        values.insert(key.to_string(), f(current).to_value());
    }

    /// Set the cooperative cancellation flag.
    pub fn cancel(&self) {
        self.set(CANCELED_KEY, true);
    }

    /// Whether the cancellation flag is set.
    pub fn is_canceled(&self) -> bool {
        self.get::<bool>(CANCELED_KEY).unwrap_or(false)
    }
}
