//! In-memory recipe storage
//!
//! Keeps every table behind a single lock so that get-or-create of attributes
//! and association updates are atomic with the recipe write.

use std::collections::BTreeMap;

use recipe_core::{
    Attribute, AttributeKind, AttributeUpdate, EntityId, NewRecipe, OwnerId, Recipe, RecipeUpdate,
};
use tokio::sync::RwLock;

use super::StoreError;

/// Rows of one table with its identifier sequence
struct Table<T> {
    next_id: EntityId,
    rows: BTreeMap<EntityId, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Stored tag or ingredient row
struct AttributeRow {
    owner: OwnerId,
    name: String,
}

#[derive(Default)]
struct Tables {
    recipes: Table<Recipe>,
    tags: Table<AttributeRow>,
    ingredients: Table<AttributeRow>,
}

impl Tables {
    fn attributes(&self, kind: AttributeKind) -> &Table<AttributeRow> {
        match kind {
            AttributeKind::Tag => &self.tags,
            AttributeKind::Ingredient => &self.ingredients,
        }
    }

    fn attributes_mut(&mut self, kind: AttributeKind) -> &mut Table<AttributeRow> {
        match kind {
            AttributeKind::Tag => &mut self.tags,
            AttributeKind::Ingredient => &mut self.ingredients,
        }
    }

    fn recipe_count(&self, kind: AttributeKind, id: EntityId) -> u32 {
        let count = self
            .recipes
            .rows
            .values()
            .filter(|r| r.attribute_ids(kind).contains(&id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn to_attribute(&self, kind: AttributeKind, id: EntityId, row: &AttributeRow) -> Attribute {
        Attribute {
            id,
            owner: row.owner,
            kind,
            name: row.name.clone(),
            recipe_count: self.recipe_count(kind, id),
        }
    }

    /// Look up each name among `owner`'s attributes, inserting the missing ones.
    fn get_or_create(
        &mut self,
        kind: AttributeKind,
        owner: OwnerId,
        names: &[String],
    ) -> Vec<EntityId> {
        let table = self.attributes_mut(kind);
        names
            .iter()
            .map(|name| {
                let existing = table
                    .rows
                    .iter()
                    .find(|(_, row)| row.owner == owner && &row.name == name)
                    .map(|(id, _)| *id);
                existing.unwrap_or_else(|| {
                    let id = table.allocate_id();
                    table.rows.insert(
                        id,
                        AttributeRow {
                            owner,
                            name: name.clone(),
                        },
                    );
                    id
                })
            })
            .collect()
    }
}

/// In-memory storage backend
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch_recipes(&self, owner: OwnerId) -> Vec<Recipe> {
        let tables = self.tables.read().await;
        tables
            .recipes
            .rows
            .values()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect()
    }

    pub async fn find_recipe(&self, id: EntityId) -> Option<Recipe> {
        self.tables.read().await.recipes.rows.get(&id).cloned()
    }

    pub async fn create_recipe(&self, new: &NewRecipe) -> Recipe {
        let mut tables = self.tables.write().await;
        let tag_ids = tables.get_or_create(AttributeKind::Tag, new.owner, &new.tags);
        let ingredient_ids =
            tables.get_or_create(AttributeKind::Ingredient, new.owner, &new.ingredients);

        let id = tables.recipes.allocate_id();
        let recipe = Recipe {
            id,
            owner: new.owner,
            title: new.title.clone(),
            description: new.description.clone(),
            time_minutes: new.time_minutes,
            price: new.price,
            link: new.link.clone(),
            image: None,
            tag_ids: tag_ids.into_iter().collect(),
            ingredient_ids: ingredient_ids.into_iter().collect(),
        };
        tables.recipes.rows.insert(id, recipe.clone());
        recipe
    }

    pub async fn update_recipe(
        &self,
        id: EntityId,
        update: &RecipeUpdate,
    ) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.recipes.rows.contains_key(&id) {
            return Err(StoreError::NotFound { kind: "Recipe", id });
        }

        let tag_ids = update
            .tags
            .as_ref()
            .map(|names| tables.get_or_create(AttributeKind::Tag, update.owner, names));
        let ingredient_ids = update
            .ingredients
            .as_ref()
            .map(|names| tables.get_or_create(AttributeKind::Ingredient, update.owner, names));

        let recipe = tables
            .recipes
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "Recipe", id })?;
        update.apply_fields(recipe);
        if let Some(tag_ids) = tag_ids {
            recipe.tag_ids = tag_ids.into_iter().collect();
        }
        if let Some(ingredient_ids) = ingredient_ids {
            recipe.ingredient_ids = ingredient_ids.into_iter().collect();
        }
        Ok(recipe.clone())
    }

    pub async fn delete_recipe(&self, id: EntityId) -> bool {
        self.tables.write().await.recipes.rows.remove(&id).is_some()
    }

    pub async fn set_recipe_image(&self, id: EntityId, path: &str) -> Result<Recipe, StoreError> {
        let mut tables = self.tables.write().await;
        let recipe = tables
            .recipes
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: "Recipe", id })?;
        recipe.image = Some(path.to_string());
        Ok(recipe.clone())
    }

    pub async fn fetch_attributes(&self, kind: AttributeKind, owner: OwnerId) -> Vec<Attribute> {
        let tables = self.tables.read().await;
        tables
            .attributes(kind)
            .rows
            .iter()
            .filter(|(_, row)| row.owner == owner)
            .map(|(id, row)| tables.to_attribute(kind, *id, row))
            .collect()
    }

    pub async fn find_attribute(&self, kind: AttributeKind, id: EntityId) -> Option<Attribute> {
        let tables = self.tables.read().await;
        tables
            .attributes(kind)
            .rows
            .get(&id)
            .map(|row| tables.to_attribute(kind, id, row))
    }

    pub async fn update_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
        update: &AttributeUpdate,
    ) -> Result<Attribute, StoreError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .attributes_mut(kind)
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                kind: kind.label(),
                id,
            })?;
        row.owner = update.owner;
        if let Some(name) = &update.name {
            row.name = name.clone();
        }

        let tables = &*tables;
        let row = &tables.attributes(kind).rows[&id];
        Ok(tables.to_attribute(kind, id, row))
    }

    pub async fn delete_attribute(&self, kind: AttributeKind, id: EntityId) -> bool {
        let mut tables = self.tables.write().await;
        if tables.attributes_mut(kind).rows.remove(&id).is_none() {
            return false;
        }
        for recipe in tables.recipes.rows.values_mut() {
            match kind {
                AttributeKind::Tag => recipe.tag_ids.remove(&id),
                AttributeKind::Ingredient => recipe.ingredient_ids.remove(&id),
            };
        }
        true
    }
}
