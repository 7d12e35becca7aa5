//! Operator semantics on runtime values.

use std::cmp::Ordering;

use courier_core::{NodeType, Primitive, Value};

use super::error::RuntimeError;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Arithmetic, bitwise and logical operators on non-null operands.
///
/// Integral operands compute in `i64` and wrap when narrowed to `target`;
/// anything involving a floating operand computes in `f64`.
pub(crate) fn arithmetic(
    op: NodeType,
    left: &Value,
    right: &Value,
    target: Option<Primitive>,
) -> Result<Value> {
    if let (Value::Boolean(a), Value::Boolean(b)) = (left, right) {
        return logical(op, *a, *b);
    }

    let target = target.ok_or_else(|| mismatch(op, left, right))?;
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64())
        && op != NodeType::Power
    {
        let v = integral(op, a, b)?;
        return narrow_int(target, v, op, left, right);
    }

    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(mismatch(op, left, right));
    };
    let v = match op {
        NodeType::Add => a + b,
        NodeType::Subtract => a - b,
        NodeType::Multiply => a * b,
        NodeType::Divide => a / b,
        NodeType::Modulo => a % b,
        NodeType::Power => a.powf(b),
        _ => return Err(mismatch(op, left, right)),
    };
    Value::from_f64(target, v).ok_or_else(|| mismatch(op, left, right))
}

fn integral(op: NodeType, a: i64, b: i64) -> Result<i64> {
    Ok(match op {
        NodeType::Add => a.wrapping_add(b),
        NodeType::Subtract => a.wrapping_sub(b),
        NodeType::Multiply => a.wrapping_mul(b),
        NodeType::Divide if b == 0 => return Err(RuntimeError::DivideByZero),
        NodeType::Divide => a.wrapping_div(b),
        NodeType::Modulo if b == 0 => return Err(RuntimeError::DivideByZero),
        NodeType::Modulo => a.wrapping_rem(b),
        NodeType::And => a & b,
        NodeType::Or => a | b,
        NodeType::ExclusiveOr => a ^ b,
        // shift counts are masked like 32-bit hardware shifts
        NodeType::LeftShift => a.wrapping_shl((b & 0x3f) as u32),
        NodeType::RightShift => a.wrapping_shr((b & 0x3f) as u32),
        other => {
            return Err(RuntimeError::type_error(format!(
                "{other} is not an integral operator"
            )));
        }
    })
}

fn narrow_int(
    target: Primitive,
    v: i64,
    op: NodeType,
    left: &Value,
    right: &Value,
) -> Result<Value> {
    Value::from_i64(target, v).ok_or_else(|| mismatch(op, left, right))
}

fn logical(op: NodeType, a: bool, b: bool) -> Result<Value> {
    let v = match op {
        NodeType::And | NodeType::AndAlso => a & b,
        NodeType::Or | NodeType::OrElse => a | b,
        NodeType::ExclusiveOr => a ^ b,
        NodeType::Equal => a == b,
        NodeType::NotEqual => a != b,
        other => {
            return Err(RuntimeError::type_error(format!(
                "{other} cannot be applied to Boolean operands"
            )));
        }
    };
    Ok(Value::Boolean(v))
}

/// Equality and relational operators.
///
/// A null operand makes the result `null` when `lift_to_null` is set;
/// otherwise equality compares nullness and relational operators are false.
pub(crate) fn compare(
    op: NodeType,
    left: &Value,
    right: &Value,
    lift_to_null: bool,
) -> Result<Value> {
    if left.is_null() || right.is_null() {
        if lift_to_null {
            return Ok(Value::Null);
        }
        let both = left.is_null() && right.is_null();
        return Ok(Value::Boolean(match op {
            NodeType::Equal => both,
            NodeType::NotEqual => !both,
            _ => false,
        }));
    }

    let v = match op {
        NodeType::Equal => left.loose_eq(right),
        NodeType::NotEqual => !left.loose_eq(right),
        _ => {
            let ord = left
                .compare(right)
                .ok_or_else(|| mismatch(op, left, right))?;
            match op {
                NodeType::LessThan => ord == Ordering::Less,
                NodeType::LessThanOrEqual => ord != Ordering::Greater,
                NodeType::GreaterThan => ord == Ordering::Greater,
                NodeType::GreaterThanOrEqual => ord != Ordering::Less,
                _ => return Err(mismatch(op, left, right)),
            }
        }
    };
    Ok(Value::Boolean(v))
}

pub(crate) fn not(operand: &Value) -> Result<Value> {
    match operand {
        Value::Null => Ok(Value::Null),
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        Value::Byte(v) => Ok(Value::Byte(!v)),
        Value::Int16(v) => Ok(Value::Int16(!v)),
        Value::Int32(v) => Ok(Value::Int32(!v)),
        Value::Int64(v) => Ok(Value::Int64(!v)),
        other => Err(RuntimeError::type_error(format!(
            "Not cannot be applied to {}",
            other.kind_name()
        ))),
    }
}

pub(crate) fn negate(operand: &Value) -> Result<Value> {
    match operand {
        Value::Null => Ok(Value::Null),
        Value::Int16(v) => Ok(Value::Int16(v.wrapping_neg())),
        Value::Int32(v) => Ok(Value::Int32(v.wrapping_neg())),
        Value::Int64(v) => Ok(Value::Int64(v.wrapping_neg())),
        Value::Single(v) => Ok(Value::Single(-v)),
        Value::Double(v) => Ok(Value::Double(-v)),
        other => Err(RuntimeError::type_error(format!(
            "Negate cannot be applied to {}",
            other.kind_name()
        ))),
    }
}

fn mismatch(op: NodeType, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "{op} cannot be applied to {} and {}",
        left.kind_name(),
        right.kind_name()
    ))
}
