//! JSON form of constant values.
//!
//! Scalars map to JSON scalars, date-times to ISO-8601 strings, arrays to
//! arrays and records to objects keyed by slot name. Non-finite floats are
//! written as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.

use chrono::NaiveDateTime;
use courier_core::{
    MemberKind, Primitive, Record, SymbolCatalog, SymbolError, Type, TypeKind, Value,
};
use serde_json::{Number, Value as Json};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstantError {
    #[error("{0} values cannot be written as constants")]
    Unsupported(&'static str),

    #[error("expected {expected}, found `{found}`")]
    Mismatch { expected: String, found: String },

    #[error("record `{ty}` has no slot `{name}`")]
    UnknownSlot { ty: String, name: String },

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

type Result<T> = std::result::Result<T, ConstantError>;

/// Write a runtime value as JSON.
pub fn to_json(value: &Value) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Byte(v) => Json::from(*v),
        Value::Int16(v) => Json::from(*v),
        Value::Int32(v) => Json::from(*v),
        Value::Int64(v) => Json::from(*v),
        Value::Single(v) => float_to_json(f64::from(*v)),
        Value::Double(v) => float_to_json(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::DateTime(dt) => Json::String(dt.format(DATE_TIME_FORMAT).to_string()),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect::<Result<_>>()?),
        Value::Record(record) => {
            let mut map = serde_json::Map::new();
            for (name, slot) in record.slots() {
                map.insert(name.to_owned(), to_json(slot)?);
            }
            Json::Object(map)
        }
        Value::Function(_) => return Err(ConstantError::Unsupported("function")),
    })
}

fn float_to_json(v: f64) -> Json {
    match Number::from_f64(v) {
        Some(n) => Json::Number(n),
        None if v.is_nan() => Json::String("NaN".into()),
        None if v > 0.0 => Json::String("Infinity".into()),
        None => Json::String("-Infinity".into()),
    }
}

/// Read a JSON value as a value of type `ty`.
///
/// Element and slot types are resolved through `catalog`, scoped to the
/// module that declares `ty`.
pub fn from_json(json: &Json, ty: &Type, catalog: &dyn SymbolCatalog) -> Result<Value> {
    if json.is_null() {
        if !ty.admits_null() {
            return Err(mismatch(ty, json));
        }
        return Ok(Value::Null);
    }

    match ty.kind() {
        TypeKind::Primitive(p) => primitive_from_json(json, *p).ok_or_else(|| mismatch(ty, json)),
        TypeKind::Nullable => {
            let inner = element_type(ty, catalog)?;
            from_json(json, &inner, catalog)
        }
        TypeKind::Array | TypeKind::List => {
            let Json::Array(items) = json else {
                return Err(mismatch(ty, json));
            };
            let element = element_type(ty, catalog)?;
            let values = items
                .iter()
                .map(|item| from_json(item, &element, catalog))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }
        TypeKind::Record => {
            let Json::Object(map) = json else {
                return Err(mismatch(ty, json));
            };
            let mut record = Record::new(ty);
            for (name, slot) in map {
                let member = ty
                    .members_named(name, MemberKind::Property)
                    .chain(ty.members_named(name, MemberKind::Field))
                    .find(|m| !m.is_static() && m.parameters().is_empty())
                    .ok_or_else(|| ConstantError::UnknownSlot {
                        ty: ty.to_string(),
                        name: name.clone(),
                    })?;
                let slot_ty = catalog.resolve_type(member.value_type(), Some(ty.module()))?;
                record.set(name.clone(), from_json(slot, &slot_ty, catalog)?);
            }
            Ok(Value::Record(record))
        }
        TypeKind::Function => Err(ConstantError::Unsupported("function")),
        TypeKind::Static => Err(ConstantError::Unsupported("static type")),
    }
}

fn element_type(ty: &Type, catalog: &dyn SymbolCatalog) -> Result<Type> {
    let element = ty.element().ok_or_else(|| ConstantError::Mismatch {
        expected: "a constructed generic type".into(),
        found: ty.to_string(),
    })?;
    Ok(catalog.resolve_type(element, Some(ty.module()))?)
}

fn primitive_from_json(json: &Json, p: Primitive) -> Option<Value> {
    Some(match p {
        Primitive::Boolean => Value::Boolean(json.as_bool()?),
        Primitive::Byte => Value::Byte(u8::try_from(json.as_i64()?).ok()?),
        Primitive::Int16 => Value::Int16(i16::try_from(json.as_i64()?).ok()?),
        Primitive::Int32 => Value::Int32(i32::try_from(json.as_i64()?).ok()?),
        Primitive::Int64 => Value::Int64(json.as_i64()?),
        Primitive::Single => Value::Single(float_from_json(json)? as f32),
        Primitive::Double => Value::Double(float_from_json(json)?),
        Primitive::String => Value::String(json.as_str()?.to_owned()),
        Primitive::DateTime => Value::DateTime(json.as_str()?.parse::<NaiveDateTime>().ok()?),
        Primitive::Object => object_from_json(json)?,
        Primitive::Void => return None,
    })
}

fn float_from_json(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

/// Untyped (`Object`) constants keep the natural JSON kind.
///
/// The encoder writes the runtime type of boxed scalars and records in place
/// of `Object`, so this only applies to arrays and hand-written documents:
/// integers come back as `Int32` or `Int64` and date-times as strings.
fn object_from_json(json: &Json) -> Option<Value> {
    Some(match json {
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Value::Int64(i), Value::Int32),
            None => Value::Double(n.as_f64()?),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(object_from_json).collect::<Option<_>>()?),
        Json::Null | Json::Object(_) => return None,
    })
}

fn mismatch(ty: &Type, json: &Json) -> ConstantError {
    ConstantError::Mismatch {
        expected: ty.to_string(),
        found: json.to_string(),
    }
}
