//! Runtime values.
//!
//! Values are what predicates read (record slots), what folding produces
//! (constants) and what native members take and return.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use crate::ast::{Lambda, Param};
use crate::types::{Primitive, Type, TypeInfo, TypeKind};

/// Self-contained runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(u8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    String(String),
    DateTime(NaiveDateTime),
    /// Contents of `Array<T>` and `List<T>`.
    Array(Vec<Value>),
    Record(Record),
    Function(Closure),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Record(_) => "record",
            Value::Array(_) => "array",
            Value::Function(_) => "function",
            other => other.primitive().map_or("value", Primitive::name),
        }
    }

    /// Primitive type of a scalar value.
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Value::Boolean(_) => Primitive::Boolean,
            Value::Byte(_) => Primitive::Byte,
            Value::Int16(_) => Primitive::Int16,
            Value::Int32(_) => Primitive::Int32,
            Value::Int64(_) => Primitive::Int64,
            Value::Single(_) => Primitive::Single,
            Value::Double(_) => Primitive::Double,
            Value::String(_) => Primitive::String,
            Value::DateTime(_) => Primitive::DateTime,
            Value::Null | Value::Array(_) | Value::Record(_) | Value::Function(_) => return None,
        })
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral values widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Int16(v) => Some(i64::from(*v)),
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Single(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Integral value narrowed (wrapping) to `target`.
    pub fn from_i64(target: Primitive, v: i64) -> Option<Value> {
        Some(match target {
            Primitive::Byte => Value::Byte(v as u8),
            Primitive::Int16 => Value::Int16(v as i16),
            Primitive::Int32 => Value::Int32(v as i32),
            Primitive::Int64 => Value::Int64(v),
            Primitive::Single => Value::Single(v as f32),
            Primitive::Double => Value::Double(v as f64),
            _ => return None,
        })
    }

    /// Floating value converted (truncating) to `target`.
    pub fn from_f64(target: Primitive, v: f64) -> Option<Value> {
        Some(match target {
            Primitive::Single => Value::Single(v as f32),
            Primitive::Double => Value::Double(v),
            p if p.is_integral() => return Value::from_i64(p, v as i64),
            _ => return None,
        })
    }

    /// Convert to `target`, as a `Convert` node would. `None` if no conversion exists.
    pub fn convert_to(&self, target: Primitive) -> Option<Value> {
        if target == Primitive::Object {
            return Some(self.clone());
        }
        if self.primitive() == Some(target) {
            return Some(self.clone());
        }
        match self {
            Value::Single(_) | Value::Double(_) => Value::from_f64(target, self.as_f64()?),
            _ => Value::from_i64(target, self.as_i64()?),
        }
    }

    /// Equality with numeric promotion: `Int32(1)` equals `Int64(1)` and `Double(1.0)`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => self == other,
                },
            },
        }
    }

    /// Ordering for relational operators. `None` if the values are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return Some(a.cmp(&b));
        }
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Default value of a type: zero for numbers, `false`, `0001-01-01`, else `null`.
    pub fn default_for(ty: &TypeInfo) -> Value {
        let TypeKind::Primitive(p) = ty.kind() else {
            return Value::Null;
        };
        match p {
            Primitive::Boolean => Value::Boolean(false),
            Primitive::DateTime => NaiveDate::from_ymd_opt(1, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map_or(Value::Null, Value::DateTime),
            p if p.is_numeric() => Value::from_i64(*p, 0).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Single(a), Value::Single(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Single(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(r) => write!(f, "{} {{..}}", r.ty),
            Value::Function(_) => f.write_str("<function>"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Instance of a record type. Slots are keyed by member name.
#[derive(Clone, Debug)]
pub struct Record {
    ty: Type,
    slots: IndexMap<String, Value>,
}

impl Record {
    pub fn new(ty: &Type) -> Self {
        Self {
            ty: ty.clone(),
            slots: IndexMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.slots.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    pub fn record_type(&self) -> &Type {
        &self.ty
    }

    pub fn slots(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ty.descriptor() == other.ty.descriptor() && self.slots == other.slots
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

/// A lambda value together with the bindings visible where it was created.
#[derive(Clone)]
pub struct Closure {
    pub lambda: Arc<Lambda>,
    pub captured: Vec<(Param, Value)>,
}

impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lambda, &other.lambda)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("parameters", &self.lambda.parameters.len())
            .field("captured", &self.captured.len())
            .finish()
    }
}

/// Failure raised by a native member body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvokeError(pub String);

impl InvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn null_reference() -> Self {
        Self::new("null reference")
    }

    pub fn unexpected(expected: &str, got: &Value) -> Self {
        Self(format!("expected {expected}, got {}", got.kind_name()))
    }
}
