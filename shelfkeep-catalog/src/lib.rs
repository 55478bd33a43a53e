//! Collection data model: record kinds, field values, flat records, the
//! field-coercion table, and typed per-kind item views.
//!
//! This crate has no I/O. Persistence lives in `shelfkeep-store` and the
//! import pipeline in `shelfkeep-import`; both pass these types around.

pub mod coercion;
pub mod items;
pub mod types;

pub use coercion::{Coerced, CoercionRule, CoercionTable};
pub use items::{CollectionItem, CustomItem, FigureItem, WishlistItem};
pub use types::*;
