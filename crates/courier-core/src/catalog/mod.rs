//! Symbol Catalog: descriptors to live handles and back.
//!
//! Resolution results are memoized for the catalog's lifetime. Callers
//! control that lifetime by owning the [`Catalog`], usually behind an `Arc`.

mod alias;
mod error;
mod resolver;


pub use alias::AliasTable;
pub use error::SymbolError;
pub use resolver::{Catalog, SymbolCatalog};
