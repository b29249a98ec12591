//! Recipe, tag and ingredient entities.
//!
//! Every entity is owned by exactly one [`OwnerId`]. Associations between
//! recipes and attributes are stored on the recipe side as identifier sets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Database identifier shared by recipes, tags and ingredients.
pub type EntityId = i64;

/// Authenticated identity that scopes visibility and mutation rights.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Price stored as whole cents and rendered with two decimal places.
///
/// Accepts at most 5 significant digits, 2 of them after the decimal point,
/// so the largest representable value is `999.99`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

/// Maximum number of digits before the decimal point.
pub const PRICE_MAX_WHOLE_DIGITS: usize = 3;
/// Maximum number of digits after the decimal point.
pub const PRICE_DECIMAL_PLACES: usize = 2;

impl Price {
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(&self) -> i64 {
        self.cents
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for Price {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (s, ""),
        };

        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !digits_only(whole)
            || !digits_only(fraction)
        {
            return Err("A valid number is required.".to_string());
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > PRICE_MAX_WHOLE_DIGITS {
            return Err(format!(
                "Ensure that there are no more than {} digits before the decimal point.",
                PRICE_MAX_WHOLE_DIGITS
            ));
        }
        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > PRICE_DECIMAL_PLACES {
            return Err(format!(
                "Ensure that there are no more than {} decimal places.",
                PRICE_DECIMAL_PLACES
            ));
        }

        let invalid = |_: std::num::ParseIntError| "A valid number is required.".to_string();
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(invalid)?
        };
        let fraction: i64 = format!("{:0<2}", fraction).parse().map_err(invalid)?;

        Ok(Self::from_cents(whole * 100 + fraction))
    }
}

impl Serialize for Price {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A recipe owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: EntityId,
    pub owner: OwnerId,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    /// Path of the uploaded image relative to the media root
    pub image: Option<String>,
    pub tag_ids: BTreeSet<EntityId>,
    pub ingredient_ids: BTreeSet<EntityId>,
}

impl Recipe {
    /// Identifiers of the attributes of `kind` attached to this recipe.
    pub fn attribute_ids(&self, kind: AttributeKind) -> &BTreeSet<EntityId> {
        match kind {
            AttributeKind::Tag => &self.tag_ids,
            AttributeKind::Ingredient => &self.ingredient_ids,
        }
    }
}

/// The two attribute families a recipe can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Singular, human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "Tag",
            AttributeKind::Ingredient => "Ingredient",
        }
    }

    /// Name of the payload field that carries this kind on a recipe.
    pub fn recipe_field(&self) -> &'static str {
        match self {
            AttributeKind::Tag => "tags",
            AttributeKind::Ingredient => "ingredients",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tag or ingredient owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: EntityId,
    pub owner: OwnerId,
    pub kind: AttributeKind,
    pub name: String,
    /// Number of recipes referencing this attribute
    pub recipe_count: u32,
}

impl Attribute {
    pub fn is_assigned(&self) -> bool {
        self.recipe_count > 0
    }
}
