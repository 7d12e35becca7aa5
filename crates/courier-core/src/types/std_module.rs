//! The standard module: primitives, generic containers and static helpers.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::value::{InvokeError, Value};

use super::descriptor::TypeDescriptor;
use super::info::{MemberDef, MemberInfo, NativeFn, Primitive, TypeInfo, TypeKind};
use super::universe::{Module, ModuleBuilder};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub(crate) fn build(id: &str) -> Module {
    let mut module = ModuleBuilder::new(id);
    let t = |name: &str| TypeDescriptor::new(id, name);

    for p in Primitive::ALL {
        let info = TypeInfo::new(t(p.name()), TypeKind::Primitive(p));
        let defs = match p {
            Primitive::String => string_members(id),
            Primitive::DateTime => datetime_members(id),
            _ => Vec::new(),
        };
        module.push(with_members(info, defs));
    }

    module.push(generic(t("Nullable"), TypeKind::Nullable, nullable_members(id)));
    module.push(generic(t("Array"), TypeKind::Array, array_members(id)));
    module.push(generic(t("List"), TypeKind::List, list_members(id)));

    let mut func = TypeInfo::new(t("Func"), TypeKind::Function);
    func.variadic = true;
    module.push(func);

    module.push(with_members(
        TypeInfo::new(t("Enumerable"), TypeKind::Static),
        enumerable_members(id),
    ));
    module.push(with_members(
        TypeInfo::new(t("Math"), TypeKind::Static),
        math_members(id),
    ));

    module.build()
}

fn with_members(mut info: TypeInfo, defs: Vec<MemberDef>) -> TypeInfo {
    info.members = defs
        .into_iter()
        .map(|def| Arc::new(MemberInfo::from_def(&info.descriptor, def)))
        .collect();
    info
}

fn generic(descriptor: TypeDescriptor, kind: TypeKind, defs: Vec<MemberDef>) -> TypeInfo {
    let mut info = TypeInfo::new(descriptor, kind);
    info.generic_params = vec!["T".to_owned()];
    with_members(info, defs)
}

fn native<F>(f: F) -> NativeFn
where
    F: Fn(Option<&Value>, &[Value]) -> Result<Value, InvokeError> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn receiver(recv: Option<&Value>) -> Result<&Value, InvokeError> {
    match recv {
        None | Some(Value::Null) => Err(InvokeError::null_reference()),
        Some(v) => Ok(v),
    }
}

fn recv_str(recv: Option<&Value>) -> Result<&str, InvokeError> {
    match receiver(recv)? {
        Value::String(s) => Ok(s),
        other => Err(InvokeError::unexpected("String", other)),
    }
}

fn recv_date(recv: Option<&Value>) -> Result<NaiveDateTime, InvokeError> {
    match receiver(recv)? {
        Value::DateTime(d) => Ok(*d),
        other => Err(InvokeError::unexpected("DateTime", other)),
    }
}

fn recv_items(recv: Option<&Value>) -> Result<&[Value], InvokeError> {
    items(receiver(recv)?)
}

fn items(value: &Value) -> Result<&[Value], InvokeError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Err(InvokeError::null_reference()),
        other => Err(InvokeError::unexpected("Array", other)),
    }
}

fn arg(args: &[Value], index: usize) -> Result<&Value, InvokeError> {
    args.get(index)
        .ok_or_else(|| InvokeError::new(format!("missing argument {index}")))
}

fn str_arg(args: &[Value], index: usize) -> Result<&str, InvokeError> {
    match arg(args, index)? {
        Value::String(s) => Ok(s),
        Value::Null => Err(InvokeError::new(format!("argument {index} is null"))),
        other => Err(InvokeError::unexpected("String", other)),
    }
}

fn int_arg(args: &[Value], index: usize) -> Result<i64, InvokeError> {
    let v = arg(args, index)?;
    v.as_i64().ok_or_else(|| InvokeError::unexpected("Int32", v))
}

fn f64_arg(args: &[Value], index: usize) -> Result<f64, InvokeError> {
    let v = arg(args, index)?;
    v.as_f64().ok_or_else(|| InvokeError::unexpected("Double", v))
}

fn count(n: usize) -> Value {
    Value::Int32(i32::try_from(n).unwrap_or(i32::MAX))
}

fn midnight(year: i64, month: i64, day: i64) -> Option<NaiveDateTime> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    let day = u32::try_from(day).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn string_members(id: &str) -> Vec<MemberDef> {
    let t = |name: &str| TypeDescriptor::new(id, name);
    let (string, boolean, int32) = (t("String"), t("Boolean"), t("Int32"));

    let predicate = |name: &str, f: fn(&str, &str) -> bool| {
        MemberDef::method(
            name,
            boolean.clone(),
            vec![string.clone()],
            native(move |recv, args| Ok(Value::Boolean(f(recv_str(recv)?, str_arg(args, 0)?)))),
        )
    };
    let transform = |name: &str, f: fn(&str) -> String| {
        MemberDef::method(
            name,
            string.clone(),
            vec![],
            native(move |recv, _| Ok(Value::String(f(recv_str(recv)?)))),
        )
    };

    vec![
        MemberDef::getter(
            "Length",
            int32,
            native(|recv, _| Ok(count(recv_str(recv)?.chars().count()))),
        ),
        predicate("Contains", |s, needle| s.contains(needle)),
        predicate("StartsWith", |s, prefix| s.starts_with(prefix)),
        predicate("EndsWith", |s, suffix| s.ends_with(suffix)),
        MemberDef::method(
            "Equals",
            boolean.clone(),
            vec![string.clone()],
            native(|recv, args| {
                let s = recv_str(recv)?;
                Ok(Value::Boolean(
                    matches!(arg(args, 0)?, Value::String(other) if other == s),
                ))
            }),
        ),
        transform("ToUpper", str::to_uppercase),
        transform("ToLower", str::to_lowercase),
        transform("Trim", |s| s.trim().to_owned()),
        MemberDef::method(
            "IsNullOrEmpty",
            boolean,
            vec![string.clone()],
            native(|_, args| {
                Ok(Value::Boolean(match arg(args, 0)? {
                    Value::Null => true,
                    Value::String(s) => s.is_empty(),
                    _ => false,
                }))
            }),
        )
        .into_static(),
        MemberDef::method(
            "Concat",
            string.clone(),
            vec![string.clone(), string],
            native(|_, args| {
                let mut out = String::new();
                for i in 0..2 {
                    match arg(args, i)? {
                        Value::Null => {}
                        Value::String(s) => out.push_str(s),
                        other => return Err(InvokeError::unexpected("String", other)),
                    }
                }
                Ok(Value::String(out))
            }),
        )
        .into_static(),
    ]
}

fn datetime_members(id: &str) -> Vec<MemberDef> {
    let t = |name: &str| TypeDescriptor::new(id, name);
    let (datetime, int32, double) = (t("DateTime"), t("Int32"), t("Double"));

    let part = |name: &str, f: fn(&NaiveDateTime) -> i32| {
        MemberDef::getter(
            name,
            int32.clone(),
            native(move |recv, _| Ok(Value::Int32(f(&recv_date(recv)?)))),
        )
    };

    vec![
        part("Year", |d| d.year()),
        part("Month", |d| d.month() as i32),
        part("Day", |d| d.day() as i32),
        MemberDef::method(
            "AddDays",
            datetime.clone(),
            vec![double],
            native(|recv, args| {
                let date = recv_date(recv)?;
                let millis = (f64_arg(args, 0)? * MILLIS_PER_DAY).round();
                if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
                    return Err(InvokeError::new("AddDays argument out of range"));
                }
                date.checked_add_signed(Duration::milliseconds(millis as i64))
                    .map(Value::DateTime)
                    .ok_or_else(|| InvokeError::new("AddDays result out of range"))
            }),
        ),
        MemberDef::getter(
            "UnixEpoch",
            datetime,
            native(|_, _| {
                midnight(1970, 1, 1)
                    .map(Value::DateTime)
                    .ok_or_else(|| InvokeError::new("epoch out of range"))
            }),
        )
        .into_static(),
        MemberDef::constructor(
            vec![int32.clone(), int32.clone(), int32],
            native(|_, args| {
                let (y, m, d) = (int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?);
                midnight(y, m, d)
                    .map(Value::DateTime)
                    .ok_or_else(|| InvokeError::new(format!("invalid date {y}-{m}-{d}")))
            }),
        ),
    ]
}

fn nullable_members(id: &str) -> Vec<MemberDef> {
    let boolean = TypeDescriptor::new(id, "Boolean");
    vec![
        MemberDef::getter(
            "HasValue",
            boolean,
            native(|recv, _| Ok(Value::Boolean(!matches!(recv, None | Some(Value::Null))))),
        ),
        MemberDef::getter(
            "Value",
            TypeDescriptor::generic_param("T"),
            native(|recv, _| match recv {
                None | Some(Value::Null) => {
                    Err(InvokeError::new("nullable object must have a value"))
                }
                Some(v) => Ok(v.clone()),
            }),
        ),
        MemberDef::method(
            "GetValueOrDefault",
            TypeDescriptor::generic_param("T"),
            vec![TypeDescriptor::generic_param("T")],
            native(|recv, args| match recv {
                None | Some(Value::Null) => arg(args, 0).cloned(),
                Some(v) => Ok(v.clone()),
            }),
        ),
    ]
}

fn array_members(id: &str) -> Vec<MemberDef> {
    vec![MemberDef::getter(
        "Length",
        TypeDescriptor::new(id, "Int32"),
        native(|recv, _| Ok(count(recv_items(recv)?.len()))),
    )]
}

fn list_members(id: &str) -> Vec<MemberDef> {
    let element = TypeDescriptor::generic_param("T");
    let int32 = TypeDescriptor::new(id, "Int32");
    vec![
        MemberDef::getter(
            "Count",
            int32.clone(),
            native(|recv, _| Ok(count(recv_items(recv)?.len()))),
        ),
        MemberDef::indexer(
            element.clone(),
            vec![int32],
            native(|recv, args| {
                let items = recv_items(recv)?;
                let index = int_arg(args, 0)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .cloned()
                    .ok_or_else(|| InvokeError::new(format!("index {index} out of range")))
            }),
        ),
        MemberDef::method(
            "Contains",
            TypeDescriptor::new(id, "Boolean"),
            vec![element],
            native(|recv, args| {
                let needle = arg(args, 0)?;
                Ok(Value::Boolean(
                    recv_items(recv)?.iter().any(|v| v.loose_eq(needle)),
                ))
            }),
        ),
    ]
}

fn enumerable_members(id: &str) -> Vec<MemberDef> {
    let element = TypeDescriptor::generic_param("T");
    let source = TypeDescriptor::new(id, "Array").with_args(vec![element.clone()]);
    let t = |name: &str| TypeDescriptor::new(id, name);

    vec![
        MemberDef::method(
            "Contains",
            t("Boolean"),
            vec![source.clone(), element],
            native(|_, args| {
                let needle = arg(args, 1)?;
                Ok(Value::Boolean(
                    items(arg(args, 0)?)?.iter().any(|v| v.loose_eq(needle)),
                ))
            }),
        )
        .into_static()
        .generic(&["T"]),
        MemberDef::method(
            "Any",
            t("Boolean"),
            vec![source.clone()],
            native(|_, args| Ok(Value::Boolean(!items(arg(args, 0)?)?.is_empty()))),
        )
        .into_static()
        .generic(&["T"]),
        MemberDef::method(
            "Count",
            t("Int32"),
            vec![source],
            native(|_, args| Ok(count(items(arg(args, 0)?)?.len()))),
        )
        .into_static()
        .generic(&["T"]),
    ]
}

fn math_members(id: &str) -> Vec<MemberDef> {
    let t = |name: &str| TypeDescriptor::new(id, name);
    let (int32, double) = (t("Int32"), t("Double"));

    let pick = |name: &str, f: fn(i64, i64) -> i64| {
        MemberDef::method(
            name,
            int32.clone(),
            vec![int32.clone(), int32.clone()],
            native(move |_, args| {
                let picked = f(int_arg(args, 0)?, int_arg(args, 1)?);
                i32::try_from(picked)
                    .map(Value::Int32)
                    .map_err(|_| InvokeError::new("Int32 overflow"))
            }),
        )
        .into_static()
    };

    vec![
        MemberDef::method(
            "Abs",
            double.clone(),
            vec![double],
            native(|_, args| Ok(Value::Double(f64_arg(args, 0)?.abs()))),
        )
        .into_static(),
        pick("Max", i64::max),
        pick("Min", i64::min),
    ]
}
