//! Expression evaluator.

use std::sync::Arc;

use courier_core::{
    Closure, Expr, ExprKind, InvokeError, Lambda, Member, MemberBody, NodeType, Param, Primitive,
    TypeInfo, TypeKind, Value,
};

use super::error::RuntimeError;
use super::limits::FuelLimits;
use super::ops;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Evaluates [`Expr`] trees under a stack of parameter bindings.
///
/// Fuel is reset on every top-level [`Evaluator::evaluate`] call; the
/// recursion limit bounds tree depth plus nested lambda invocations.
pub struct Evaluator {
    limits: FuelLimits,
    exec_fuel: u32,
    depth: u32,
    bindings: Vec<(Param, Value)>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_limits(FuelLimits::default())
    }

    pub fn with_limits(limits: FuelLimits) -> Self {
        Self {
            limits,
            exec_fuel: limits.exec_fuel,
            depth: 0,
            bindings: Vec::new(),
        }
    }

    pub fn limits(&self) -> FuelLimits {
        self.limits
    }

    /// Bind `param` for subsequent evaluations. Later bindings shadow earlier ones.
    pub fn bind(&mut self, param: &Param, value: Value) {
        self.bindings.push((param.clone(), value));
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        self.exec_fuel = self.limits.exec_fuel;
        self.depth = 0;
        self.eval(expr)
    }

    /// Call a function value with `args`.
    pub fn invoke(&mut self, closure: &Closure, args: Vec<Value>) -> Result<Value> {
        let lambda = &closure.lambda;
        if lambda.parameters.len() != args.len() {
            return Err(RuntimeError::type_error(format!(
                "lambda expects {} arguments, got {}",
                lambda.parameters.len(),
                args.len()
            )));
        }

        let mark = self.bindings.len();
        self.bindings.extend(closure.captured.iter().cloned());
        self.bindings
            .extend(lambda.parameters.iter().cloned().zip(args));
        let result = self.eval(&lambda.body);
        self.bindings.truncate(mark);
        result
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        if self.exec_fuel == 0 {
            return Err(RuntimeError::ExecFuelExhausted(self.limits.exec_fuel));
        }
        self.exec_fuel -= 1;

        if self.depth >= self.limits.recursion_limit {
            return Err(RuntimeError::RecursionLimitExceeded(self.depth));
        }
        self.depth += 1;
        let result = self.eval_kind(expr);
        self.depth -= 1;
        result
    }

    fn eval_kind(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Binary {
                left,
                right,
                method,
                conversion,
                lift_to_null,
            } => self.eval_binary(
                expr,
                left,
                right,
                method.as_ref(),
                conversion.as_ref(),
                *lift_to_null,
            ),
            ExprKind::Unary { operand, method } => self.eval_unary(expr, operand, method.as_ref()),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => {
                if self.eval_bool(test)? {
                    self.eval(if_true)
                } else {
                    self.eval(if_false)
                }
            }
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Default => Ok(Value::default_for(&expr.ty)),
            ExprKind::Index {
                object,
                indexer,
                arguments,
            } => {
                let target = self.eval(object)?;
                let args = self.eval_all(arguments)?;
                match indexer {
                    Some(indexer) => self.call_member(indexer, Some(&target), &args),
                    None => match args.as_slice() {
                        [index] => element_at(&target, index),
                        _ => Err(RuntimeError::type_error("array index takes one argument")),
                    },
                }
            }
            ExprKind::Invocation {
                expression,
                arguments,
            } => {
                let target = self.eval(expression)?;
                let args = self.eval_all(arguments)?;
                match target {
                    Value::Function(closure) => self.invoke(&closure, args),
                    Value::Null => Err(RuntimeError::NullReference),
                    other => Err(RuntimeError::type_error(format!(
                        "{} is not invocable",
                        other.kind_name()
                    ))),
                }
            }
            ExprKind::Lambda(lambda) => Ok(self.closure(lambda)),
            ExprKind::MemberAccess { expression, member } => {
                let receiver = match expression {
                    Some(e) => Some(self.eval(e)?),
                    None => None,
                };
                self.read_member(member, receiver.as_ref())
            }
            ExprKind::MethodCall {
                object,
                method,
                arguments,
            } => {
                let receiver = match object {
                    Some(o) => Some(self.eval(o)?),
                    None => None,
                };
                let args = self.eval_all(arguments)?;
                self.call_member(method, receiver.as_ref(), &args)
            }
            ExprKind::NewArray {
                element_type,
                expressions,
            } => {
                let values = self.eval_all(expressions)?;
                if expr.node_type != NodeType::NewArrayBounds {
                    return Ok(Value::Array(values));
                }
                let [bound] = values.as_slice() else {
                    return Err(RuntimeError::type_error("only one-dimensional arrays are supported"));
                };
                let len = bound
                    .as_i64()
                    .filter(|n| *n >= 0)
                    .ok_or_else(|| RuntimeError::type_error(format!("invalid array size {bound}")))?;
                let limit = self.limits.max_array_len;
                let len = usize::try_from(len)
                    .ok()
                    .filter(|n| *n <= limit as usize)
                    .ok_or(RuntimeError::ArrayTooLarge { len, limit })?;
                Ok(Value::Array(vec![Value::default_for(element_type); len]))
            }
            ExprKind::NewObject {
                constructor,
                arguments,
                ..
            } => {
                let args = self.eval_all(arguments)?;
                self.call_member(constructor, None, &args)
            }
            ExprKind::Parameter(param) => self.lookup(param),
            ExprKind::RuntimeVariables(vars) => {
                let values = vars
                    .iter()
                    .map(|v| self.lookup(v))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(values))
            }
            ExprKind::TypeTest {
                expression,
                type_operand,
            } => {
                let value = self.eval(expression)?;
                let matched = is_instance(&value, type_operand)
                    && (expr.node_type != NodeType::TypeEqual || is_exact(type_operand));
                Ok(Value::Boolean(matched))
            }
            ExprKind::Block {
                variables,
                expressions,
            } => {
                let mark = self.bindings.len();
                for var in variables {
                    self.bindings
                        .push((var.clone(), Value::default_for(var.ty())));
                }
                let mut last = Ok(Value::Null);
                for e in expressions {
                    last = self.eval(e);
                    if last.is_err() {
                        break;
                    }
                }
                self.bindings.truncate(mark);
                last
            }
        }
    }

    fn eval_binary(
        &mut self,
        expr: &Expr,
        left: &Expr,
        right: &Expr,
        method: Option<&Member>,
        conversion: Option<&Arc<Lambda>>,
        lift_to_null: bool,
    ) -> Result<Value> {
        let op = expr.node_type;
        match op {
            NodeType::AndAlso => {
                if !self.eval_bool(left)? {
                    return Ok(Value::Boolean(false));
                }
                return Ok(Value::Boolean(self.eval_bool(right)?));
            }
            NodeType::OrElse => {
                if self.eval_bool(left)? {
                    return Ok(Value::Boolean(true));
                }
                return Ok(Value::Boolean(self.eval_bool(right)?));
            }
            NodeType::Coalesce => {
                let l = self.eval(left)?;
                if l.is_null() {
                    return self.eval(right);
                }
                return match conversion {
                    Some(lambda) => {
                        let closure = Closure {
                            lambda: Arc::clone(lambda),
                            captured: self.bindings.clone(),
                        };
                        self.invoke(&closure, vec![l])
                    }
                    None => Ok(l),
                };
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;
        if let Some(method) = method {
            return self.call_member(method, None, &[l, r]);
        }
        match op {
            NodeType::ArrayIndex => element_at(&l, &r),
            _ if op.is_comparison() => ops::compare(op, &l, &r, lift_to_null),
            _ if l.is_null() || r.is_null() => Ok(Value::Null),
            _ => ops::arithmetic(op, &l, &r, expr.ty.underlying_primitive()),
        }
    }

    fn eval_unary(&mut self, expr: &Expr, operand: &Expr, method: Option<&Member>) -> Result<Value> {
        if expr.node_type == NodeType::Quote {
            return self.eval(operand);
        }

        let value = self.eval(operand)?;
        if let Some(method) = method {
            return self.call_member(method, None, &[value]);
        }
        match expr.node_type {
            NodeType::Not => ops::not(&value),
            NodeType::Negate => ops::negate(&value),
            NodeType::UnaryPlus => Ok(value),
            NodeType::IsTrue => Ok(Value::Boolean(value.as_bool() == Some(true))),
            NodeType::IsFalse => Ok(Value::Boolean(value.as_bool() == Some(false))),
            NodeType::Convert => convert(value, &expr.ty),
            NodeType::TypeAs => Ok(if is_instance(&value, &expr.ty) {
                value
            } else {
                Value::Null
            }),
            NodeType::ArrayLength => match value {
                Value::Array(items) => Ok(Value::Int32(
                    i32::try_from(items.len()).unwrap_or(i32::MAX),
                )),
                Value::Null => Err(RuntimeError::NullReference),
                other => Err(RuntimeError::type_error(format!(
                    "ArrayLength cannot be applied to {}",
                    other.kind_name()
                ))),
            },
            other => Err(RuntimeError::Unsupported(other)),
        }
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool> {
        match self.eval(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(RuntimeError::type_error(format!(
                "expected Boolean, got {}",
                other.kind_name()
            ))),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn lookup(&self, param: &Param) -> Result<Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p.same(param))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                RuntimeError::UnboundParameter(param.name().unwrap_or("<unnamed>").to_owned())
            })
    }

    fn closure(&self, lambda: &Arc<Lambda>) -> Value {
        Value::Function(Closure {
            lambda: Arc::clone(lambda),
            captured: self.bindings.clone(),
        })
    }

    fn read_member(&mut self, member: &Member, receiver: Option<&Value>) -> Result<Value> {
        match member.body() {
            MemberBody::Slot(slot) => match receiver {
                Some(Value::Record(record)) => Ok(record.get(slot).cloned().unwrap_or(Value::Null)),
                None | Some(Value::Null) => Err(RuntimeError::NullReference),
                Some(other) => Err(RuntimeError::type_error(format!(
                    "`{}` cannot be read from {}",
                    member.name(),
                    other.kind_name()
                ))),
            },
            MemberBody::Native(_) => self.call_member(member, receiver, &[]),
        }
    }

    fn call_member(
        &mut self,
        member: &Member,
        receiver: Option<&Value>,
        args: &[Value],
    ) -> Result<Value> {
        match member.body() {
            MemberBody::Native(f) => f(receiver, args).map_err(|source| {
                if source == InvokeError::null_reference() {
                    RuntimeError::NullReference
                } else {
                    RuntimeError::Invocation {
                        member: member.signature().to_owned(),
                        source,
                    }
                }
            }),
            MemberBody::Slot(_) if args.is_empty() => self.read_member(member, receiver),
            MemberBody::Slot(_) => Err(RuntimeError::type_error(format!(
                "`{}` is not callable",
                member.signature()
            ))),
        }
    }
}

fn element_at(target: &Value, index: &Value) -> Result<Value> {
    let items = match target {
        Value::Array(items) => items,
        Value::Null => return Err(RuntimeError::NullReference),
        other => {
            return Err(RuntimeError::type_error(format!(
                "{} is not indexable",
                other.kind_name()
            )));
        }
    };
    let i = index
        .as_i64()
        .ok_or_else(|| RuntimeError::type_error("array index must be integral"))?;
    usize::try_from(i)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or(RuntimeError::IndexOutOfRange {
            index: i,
            len: items.len(),
        })
}

fn convert(value: Value, ty: &TypeInfo) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let Some(target) = ty.underlying_primitive() else {
        return Ok(value);
    };
    value.convert_to(target).ok_or_else(|| {
        RuntimeError::type_error(format!("cannot convert {} to {target}", value.kind_name()))
    })
}

fn is_instance(value: &Value, ty: &TypeInfo) -> bool {
    match (value, ty.kind()) {
        (Value::Null, _) => false,
        (_, TypeKind::Primitive(Primitive::Object)) => true,
        (v, TypeKind::Primitive(p)) => v.primitive() == Some(*p),
        (v, TypeKind::Nullable) => ty
            .underlying_primitive()
            .is_some_and(|p| v.primitive() == Some(p)),
        (Value::Record(r), TypeKind::Record) => r.record_type().descriptor() == ty.descriptor(),
        (Value::Array(_), TypeKind::Array | TypeKind::List) => true,
        (Value::Function(_), TypeKind::Function) => true,
        _ => false,
    }
}

/// Types a value's runtime type can be exactly equal to.
fn is_exact(ty: &TypeInfo) -> bool {
    !ty.is_nullable() && !ty.is_primitive(Primitive::Object)
}
