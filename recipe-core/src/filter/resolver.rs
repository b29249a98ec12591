use std::cmp::Reverse;

use tracing::debug;

use super::params::{AttributeFilter, RecipeFilter};
use crate::model::{Attribute, OwnerId, Recipe};
use crate::ownership::scope_to_owner;

/// Resolve the recipes visible to `owner` that satisfy `filter`.
///
/// The result is ordered by identifier, newest first, and holds each recipe
/// at most once even if the input snapshot repeats rows.
pub fn resolve_recipes(
    recipes: impl IntoIterator<Item = Recipe>,
    filter: &RecipeFilter,
    owner: OwnerId,
) -> Vec<Recipe> {
    let matching = recipes.into_iter().filter(|r| filter.matches(r));
    let mut resolved: Vec<Recipe> = scope_to_owner(matching, owner).collect();

    resolved.sort_by_key(|r| Reverse(r.id));
    resolved.dedup_by_key(|r| r.id);

    debug!(
        owner = %owner,
        tags = ?filter.tag_ids,
        ingredients = ?filter.ingredient_ids,
        count = resolved.len(),
        "Resolved recipe collection"
    );
    resolved
}

/// Resolve the tags or ingredients visible to `owner` that satisfy `filter`.
///
/// Ordered by name descending; equal names fall back to identifier descending
/// so the order is total.
pub fn resolve_attributes(
    attributes: impl IntoIterator<Item = Attribute>,
    filter: AttributeFilter,
    owner: OwnerId,
) -> Vec<Attribute> {
    let matching = attributes.into_iter().filter(|a| filter.matches(a));
    let mut resolved: Vec<Attribute> = scope_to_owner(matching, owner).collect();

    resolved.sort_by(|a, b| b.name.cmp(&a.name).then_with(|| b.id.cmp(&a.id)));
    resolved.dedup_by_key(|a| a.id);

    debug!(
        owner = %owner,
        assigned_only = filter.assigned_only,
        count = resolved.len(),
        "Resolved attribute collection"
    );
    resolved
}
