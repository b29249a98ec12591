use std::collections::BTreeSet;

use crate::error::{CoreError, Result};
use crate::model::{Attribute, EntityId, Recipe};

/// Parse a comma-separated list of identifiers such as `"8,9"`.
///
/// An absent or empty value means "no filter" and yields `Ok(None)`.
/// Any token that is not an integer rejects the whole value.
pub fn parse_id_list(param: &'static str, raw: Option<&str>) -> Result<Option<Vec<EntityId>>> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    raw.split(',')
        .map(|token| token.trim().parse::<EntityId>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Some)
        .map_err(|_| CoreError::InvalidFilterFormat {
            param,
            value: raw.to_string(),
        })
}

/// Parse the `assigned_only` flag. Absent means `false`; only `0` and `1` are accepted.
pub fn parse_assigned_only(raw: Option<&str>) -> Result<bool> {
    match raw.map(str::trim) {
        None | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) => Err(CoreError::InvalidFilterFormat {
            param: "assigned_only",
            value: other.to_string(),
        }),
    }
}

/// Optional tag and ingredient constraints for a recipe listing.
///
/// Each present list matches when the recipe shares at least one identifier
/// with it; both lists must match when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Option<Vec<EntityId>>,
    pub ingredient_ids: Option<Vec<EntityId>>,
}

impl RecipeFilter {
    /// Build a filter from raw `tags` and `ingredients` query values.
    pub fn from_query(tags: Option<&str>, ingredients: Option<&str>) -> Result<Self> {
        Ok(Self {
            tag_ids: parse_id_list("tags", tags)?,
            ingredient_ids: parse_id_list("ingredients", ingredients)?,
        })
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        intersects(self.tag_ids.as_deref(), &recipe.tag_ids)
            && intersects(self.ingredient_ids.as_deref(), &recipe.ingredient_ids)
    }
}

fn intersects(wanted: Option<&[EntityId]>, have: &BTreeSet<EntityId>) -> bool {
    wanted.is_none_or(|ids| ids.iter().any(|id| have.contains(id)))
}

/// Constraints for a tag or ingredient listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Keep only attributes referenced by at least one recipe
    pub assigned_only: bool,
}

impl AttributeFilter {
    pub fn from_query(assigned_only: Option<&str>) -> Result<Self> {
        Ok(Self {
            assigned_only: parse_assigned_only(assigned_only)?,
        })
    }

    pub fn matches(&self, attribute: &Attribute) -> bool {
        !self.assigned_only || attribute.is_assigned()
    }
}
