//! Filtered collection query resolution.
//!
//! Query-string values are parsed into typed filters first; malformed input
//! is rejected before any entity is inspected. Resolution then narrows the
//! collection, scopes it to the requesting owner, orders it and removes
//! duplicate rows.

mod params;
mod resolver;

pub use params::{parse_assigned_only, parse_id_list, AttributeFilter, RecipeFilter};
pub use resolver::{resolve_attributes, resolve_recipes};
