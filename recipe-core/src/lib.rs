//! Recipe Core - owner-scoped query resolution for the recipe API
//!
//! This crate holds the request-independent rules of the recipe service:
//!
//! - Parsing of `tags`, `ingredients` and `assigned_only` query values
//! - Resolution of recipe and attribute listings (filter, owner scope,
//!   ordering, de-duplication)
//! - Ownership stamping and owner-checked detail lookups
//! - The enumerated operations per resource and their representations
//! - Validation of write payloads
//!
//! Nothing here performs I/O; every function is deterministic in its inputs.
//!
//! # Example
//!
//! ```
//! use recipe_core::{resolve_recipes, OwnerId, Price, Recipe, RecipeFilter};
//!
//! let recipe = Recipe {
//!     id: 1,
//!     owner: OwnerId(1),
//!     title: "Pad Thai".into(),
//!     description: String::new(),
//!     time_minutes: 20,
//!     price: Price::from_cents(850),
//!     link: String::new(),
//!     image: None,
//!     tag_ids: [9, 10].into(),
//!     ingredient_ids: Default::default(),
//! };
//!
//! let filter = RecipeFilter::from_query(Some("8,9"), None)?;
//! let visible = resolve_recipes(vec![recipe], &filter, OwnerId(1));
//! assert_eq!(visible.len(), 1);
//! # Ok::<(), recipe_core::CoreError>(())
//! ```

pub mod action;
pub mod error;
pub mod filter;
pub mod model;
pub mod ownership;
pub mod payload;

pub use action::{AttributeAction, RecipeAction, Representation, WriteMode};
pub use error::{CoreError, FieldErrors, Result};
pub use filter::{
    parse_assigned_only, parse_id_list, resolve_attributes, resolve_recipes, AttributeFilter,
    RecipeFilter,
};
pub use model::{Attribute, AttributeKind, EntityId, OwnerId, Price, Recipe};
pub use ownership::{require_owned, scope_to_owner, stamp_owner, Owned};
pub use payload::{
    AttributeName, AttributePayload, AttributeUpdate, NewRecipe, PriceInput, RecipePayload,
    RecipeUpdate, MAX_TEXT_LENGTH,
};
