//! Write payloads for recipes and attributes.
//!
//! Payloads are deserialized loosely (every field optional) and then
//! validated against a [`WriteMode`], collecting every failing field before
//! reporting. Validation also stamps the authenticated owner onto the result.

use serde::Deserialize;

use crate::action::WriteMode;
use crate::error::{FieldErrors, Result};
use crate::model::{OwnerId, Price, Recipe};
use crate::ownership::stamp_owner;

/// Maximum length of titles, links and attribute names.
pub const MAX_TEXT_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";

/// Reference to a tag or ingredient by name, created on demand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeName {
    pub name: String,
}

/// Price as sent by clients: either `"5.50"` or `5.5`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(f64),
}

impl PriceInput {
    fn parse(&self) -> std::result::Result<Price, String> {
        match self {
            PriceInput::Text(text) => text.parse(),
            PriceInput::Number(number) => number.to_string().parse(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    /// Client-claimed owner; never persisted
    #[serde(default, alias = "owner")]
    pub user: Option<OwnerId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_minutes: Option<i64>,
    #[serde(default)]
    pub price: Option<PriceInput>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<AttributeName>>,
    #[serde(default)]
    pub ingredients: Option<Vec<AttributeName>>,
}

/// A validated recipe ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub owner: OwnerId,
    pub title: String,
    pub description: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
}

/// A validated set of changes for an existing recipe.
///
/// `None` leaves the stored value untouched; `Some` for `tags` or
/// `ingredients` replaces the whole association set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeUpdate {
    pub owner: OwnerId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Price>,
    pub link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl RecipeUpdate {
    /// Apply the scalar changes to `recipe`. Associations are resolved by the store.
    pub fn apply_fields(&self, recipe: &mut Recipe) {
        recipe.owner = self.owner;
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &self.description {
            recipe.description = description.clone();
        }
        if let Some(time_minutes) = self.time_minutes {
            recipe.time_minutes = time_minutes;
        }
        if let Some(price) = self.price {
            recipe.price = price;
        }
        if let Some(link) = &self.link {
            recipe.link = link.clone();
        }
    }
}

impl RecipePayload {
    /// Validate for creation and stamp `owner`.
    pub fn into_new(self, owner: OwnerId) -> Result<NewRecipe> {
        let update = self.into_update(WriteMode::Full, owner)?;
        Ok(NewRecipe {
            owner: update.owner,
            title: update.title.unwrap_or_default(),
            description: update.description.unwrap_or_default(),
            time_minutes: update.time_minutes.unwrap_or_default(),
            price: update.price.unwrap_or_default(),
            link: update.link.unwrap_or_default(),
            tags: update.tags.unwrap_or_default(),
            ingredients: update.ingredients.unwrap_or_default(),
        })
    }

    /// Validate for an update in `mode` and stamp `owner`.
    pub fn into_update(self, mode: WriteMode, owner: OwnerId) -> Result<RecipeUpdate> {
        let mut errors = FieldErrors::new();

        let title = required_text(&mut errors, "title", self.title, mode);
        let description = self.description;
        let link = self
            .link
            .map(|link| link.trim().to_string())
            .filter(|link| check_length(&mut errors, "link", link));

        let time_minutes = match self.time_minutes {
            Some(minutes) if minutes < 0 => {
                errors.add(
                    "time_minutes",
                    "Ensure this value is greater than or equal to 0.",
                );
                None
            }
            Some(minutes) => match i32::try_from(minutes) {
                Ok(minutes) => Some(minutes),
                Err(_) => {
                    errors.add(
                        "time_minutes",
                        format!("Ensure this value is less than or equal to {}.", i32::MAX),
                    );
                    None
                }
            },
            None => {
                require(&mut errors, "time_minutes", mode);
                None
            }
        };

        let price = match self.price {
            Some(raw) => match raw.parse() {
                Ok(price) => Some(price),
                Err(message) => {
                    errors.add("price", message);
                    None
                }
            },
            None => {
                require(&mut errors, "price", mode);
                None
            }
        };

        let tags = self.tags.map(|names| attribute_names(&mut errors, "tags", names));
        let ingredients = self
            .ingredients
            .map(|names| attribute_names(&mut errors, "ingredients", names));

        errors.into_result(RecipeUpdate {
            owner: stamp_owner(self.user, owner),
            title,
            description,
            time_minutes,
            price,
            link,
            tags,
            ingredients,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributePayload {
    /// Client-claimed owner; never persisted
    #[serde(default, alias = "owner")]
    pub user: Option<OwnerId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A validated rename of a tag or ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUpdate {
    pub owner: OwnerId,
    pub name: Option<String>,
}

impl AttributePayload {
    pub fn into_update(self, mode: WriteMode, owner: OwnerId) -> Result<AttributeUpdate> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", self.name, mode);
        errors.into_result(AttributeUpdate {
            owner: stamp_owner(self.user, owner),
            name,
        })
    }
}

fn require(errors: &mut FieldErrors, field: &str, mode: WriteMode) {
    if mode == WriteMode::Full {
        errors.add(field, REQUIRED);
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_TEXT_LENGTH
            ),
        );
        false
    } else {
        true
    }
}

/// Trimmed, non-blank text no longer than [`MAX_TEXT_LENGTH`].
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    mode: WriteMode,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(value) if value.is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(value) => check_length(errors, field, &value).then_some(value),
        None => {
            require(errors, field, mode);
            None
        }
    }
}

/// Validate attribute names, dropping repeats while keeping first-seen order.
fn attribute_names(
    errors: &mut FieldErrors,
    field: &str,
    names: Vec<AttributeName>,
) -> Vec<String> {
    let mut accepted: Vec<String> = Vec::with_capacity(names.len());
    for (index, AttributeName { name }) in names.into_iter().enumerate() {
        let name = name.trim().to_string();
        if name.is_empty() {
            errors.add(field, format!("Item {}: {}", index, BLANK));
        } else if name.chars().count() > MAX_TEXT_LENGTH {
            errors.add(
                field,
                format!(
                    "Item {}: Ensure this field has no more than {} characters.",
                    index, MAX_TEXT_LENGTH
                ),
            );
        } else if !accepted.contains(&name) {
            accepted.push(name);
        }
    }
    accepted
}
