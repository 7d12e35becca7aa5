//! Sample universe shared by tests across the workspace.
//!
//! Two record modules mirror a client and a server:
//! - `contracts`: `Sample.PersonView`, `Sample.AddressView`, `Sample.Capture`
//! - `server`: `Sample.Person`, `Sample.Address`, `Sample.Ledger`, `Sample.Pet`
//!
//! `Sample.Capture` plays the role of a compiler-generated closure record:
//! its fields hold the values a predicate closes over.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::catalog::Catalog;
use crate::types::{Flavor, ModuleBuilder, RecordBuilder, Type, TypeDescriptor, Universe};
use crate::value::{Record, Value};

pub const CONTRACTS: &str = "contracts, Version=1.2.0";
pub const SERVER: &str = "server";

fn std(name: &str) -> TypeDescriptor {
    TypeDescriptor::std(name)
}

fn person_shape(name: &str, module: &str, address: &str) -> RecordBuilder {
    RecordBuilder::new(name)
        .property("Age", std("Int32"))
        .property("Birthday", TypeDescriptor::nullable(std("DateTime")))
        .property("Name", std("String"))
        .property("Score", std("Double"))
        .property("Tags", TypeDescriptor::array(std("String")))
        .property("Address", TypeDescriptor::new(module, address))
}

pub fn universe_with(flavor: Flavor) -> Universe {
    let contracts = ModuleBuilder::new(CONTRACTS)
        .record(person_shape(
            "Sample.PersonView",
            CONTRACTS,
            "Sample.AddressView",
        ))
        .record(RecordBuilder::new("Sample.AddressView").property("City", std("String")))
        .record(
            RecordBuilder::new("Sample.Capture")
                .field("name", std("String"))
                .field("names", TypeDescriptor::array(std("String")))
                .field("limit", std("Int32")),
        )
        .build();

    let server = ModuleBuilder::new(SERVER)
        .record(person_shape("Sample.Person", SERVER, "Sample.Address"))
        .record(RecordBuilder::new("Sample.Address").property("City", std("String")))
        .record(
            RecordBuilder::new("Sample.Ledger")
                .field("Age", std("Int32"))
                .property("Name", std("String")),
        )
        .record(RecordBuilder::new("Sample.Pet").property("Name", std("String")))
        .build();

    Universe::with_flavor(flavor)
        .with_module(contracts)
        .and_then(|u| u.with_module(server))
        .expect("fixture modules are distinct")
}

pub fn universe() -> Universe {
    universe_with(Flavor::Current)
}

/// Fresh catalog over the sample universe.
pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(Arc::new(universe())))
}

pub fn legacy_catalog() -> Arc<Catalog> {
    Arc::new(Catalog::new(Arc::new(universe_with(Flavor::Legacy))))
}

fn sample_type(catalog: &Catalog, module: &str, name: &str) -> Type {
    catalog
        .type_named(module, name)
        .expect("fixture type is registered")
}

pub fn person_view(catalog: &Catalog) -> Type {
    sample_type(catalog, CONTRACTS, "Sample.PersonView")
}

pub fn person(catalog: &Catalog) -> Type {
    sample_type(catalog, SERVER, "Sample.Person")
}

pub fn capture(catalog: &Catalog) -> Type {
    sample_type(catalog, CONTRACTS, "Sample.Capture")
}

pub fn ledger(catalog: &Catalog) -> Type {
    sample_type(catalog, SERVER, "Sample.Ledger")
}

pub fn pet(catalog: &Catalog) -> Type {
    sample_type(catalog, SERVER, "Sample.Pet")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid fixture date")
}

/// Person-shaped record of type `ty`; the remaining slots get fixed sample values.
pub fn person_record(ty: &Type, age: i32, birthday: Option<NaiveDateTime>) -> Value {
    Record::new(ty)
        .with("Age", age)
        .with("Birthday", birthday)
        .with("Name", "Ada Lovelace")
        .with("Score", 1.5)
        .with("Tags", Value::Array(vec!["math".into(), "poetry".into()]))
        .with("Address", Value::Null)
        .into()
}

/// Closure record holding `name`, `names` and `limit`.
pub fn capture_record(catalog: &Catalog, name: &str, names: &[&str], limit: i32) -> Value {
    let names = names.iter().map(|n| Value::from(*n)).collect();
    Record::new(&capture(catalog))
        .with("name", name)
        .with("names", Value::Array(names))
        .with("limit", limit)
        .into()
}
