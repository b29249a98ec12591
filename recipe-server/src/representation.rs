//! Response bodies for recipes and attributes
//!
//! Each operation renders one representation, chosen by the action's static
//! mapping in `recipe_core::action`.

use std::collections::{BTreeSet, HashMap};

use recipe_core::{
    Attribute, AttributeKind, EntityId, Price, Recipe, RecipeAction, Representation,
};
use serde::Serialize;

use crate::media::media_url;

/// Tag or ingredient as rendered in responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRecord {
    pub id: EntityId,
    pub name: String,
}

impl From<&Attribute> for AttributeRecord {
    fn from(attribute: &Attribute) -> Self {
        Self {
            id: attribute.id,
            name: attribute.name.clone(),
        }
    }
}

/// Names of an owner's tags and ingredients, for rendering nested references
#[derive(Debug, Default)]
pub struct AttributeIndex {
    tags: HashMap<EntityId, String>,
    ingredients: HashMap<EntityId, String>,
}

impl AttributeIndex {
    pub fn new(
        tags: impl IntoIterator<Item = Attribute>,
        ingredients: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        Self {
            tags: tags.into_iter().map(|a| (a.id, a.name)).collect(),
            ingredients: ingredients.into_iter().map(|a| (a.id, a.name)).collect(),
        }
    }

    fn names(&self, kind: AttributeKind) -> &HashMap<EntityId, String> {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    /// Records for `ids`, in id order; ids without a known name are skipped
    fn records(&self, kind: AttributeKind, ids: &BTreeSet<EntityId>) -> Vec<AttributeRecord> {
        let names = self.names(kind);
        ids.iter()
            .filter_map(|id| {
                names.get(id).map(|name| AttributeRecord {
                    id: *id,
                    name: name.clone(),
                })
            })
            .collect()
    }
}

/// Recipe fields shown in listings
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: EntityId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<AttributeRecord>,
    pub ingredients: Vec<AttributeRecord>,
}

/// Recipe fields shown for a single recipe
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
    /// URL path of the uploaded image
    pub image: Option<String>,
}

/// Response of an image upload
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImage {
    pub id: EntityId,
    pub image: Option<String>,
}

/// A recipe rendered for a particular action
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecipeBody {
    Summary(RecipeSummary),
    Detail(RecipeDetail),
    Image(RecipeImage),
}

impl RecipeBody {
    pub fn render(action: RecipeAction, recipe: &Recipe, index: &AttributeIndex) -> Self {
        match action.representation() {
            Representation::Summary => Self::Summary(summary(recipe, index)),
            Representation::Image => Self::Image(RecipeImage {
                id: recipe.id,
                image: image_url(recipe),
            }),
            Representation::Detail => Self::Detail(RecipeDetail {
                summary: summary(recipe, index),
                description: recipe.description.clone(),
                image: image_url(recipe),
            }),
        }
    }
}

fn summary(recipe: &Recipe, index: &AttributeIndex) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        title: recipe.title.clone(),
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link.clone(),
        tags: index.records(AttributeKind::Tag, &recipe.tag_ids),
        ingredients: index.records(AttributeKind::Ingredient, &recipe.ingredient_ids),
    }
}

fn image_url(recipe: &Recipe) -> Option<String> {
    recipe.image.as_deref().map(media_url)
}
