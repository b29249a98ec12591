//! PostgreSQL recipe storage
//!
//! Tags and ingredients live in separate tables with identical shape; each
//! has a join table linking it to recipes.

use recipe_core::{
    Attribute, AttributeKind, AttributeUpdate, EntityId, NewRecipe, OwnerId, Price, Recipe,
    RecipeUpdate,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgConnection, PgPool};

use super::StoreError;

/// Recipe columns plus the attached attribute ids, aggregated per row
const RECIPE_SELECT: &str = r#"
    SELECT r.id, r.user_id, r.title, r.description, r.time_minutes, r.price_cents, r.link, r.image,
           ARRAY(SELECT rt.tag_id FROM recipe_tags rt
                 WHERE rt.recipe_id = r.id ORDER BY rt.tag_id) AS tag_ids,
           ARRAY(SELECT ri.ingredient_id FROM recipe_ingredients ri
                 WHERE ri.recipe_id = r.id ORDER BY ri.ingredient_id) AS ingredient_ids
    FROM recipes r
"#;

/// Table layout for one attribute kind
struct AttributeTables {
    table: &'static str,
    join_table: &'static str,
    join_column: &'static str,
}

fn tables_for(kind: AttributeKind) -> AttributeTables {
    match kind {
        AttributeKind::Tag => AttributeTables {
            table: "tags",
            join_table: "recipe_tags",
            join_column: "tag_id",
        },
        AttributeKind::Ingredient => AttributeTables {
            table: "ingredients",
            join_table: "recipe_ingredients",
            join_column: "ingredient_id",
        },
    }
}

#[derive(FromRow)]
struct RecipeRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    time_minutes: i32,
    price_cents: i64,
    link: String,
    image: Option<String>,
    tag_ids: Vec<i64>,
    ingredient_ids: Vec<i64>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            owner: OwnerId(row.user_id),
            title: row.title,
            description: row.description,
            time_minutes: row.time_minutes,
            price: Price::from_cents(row.price_cents),
            link: row.link,
            image: row.image,
            tag_ids: row.tag_ids.into_iter().collect(),
            ingredient_ids: row.ingredient_ids.into_iter().collect(),
        }
    }
}

#[derive(FromRow)]
struct AttributeRow {
    id: i64,
    user_id: i64,
    name: String,
    recipe_count: i64,
}

impl AttributeRow {
    fn into_attribute(self, kind: AttributeKind) -> Attribute {
        Attribute {
            id: self.id,
            owner: OwnerId(self.user_id),
            kind,
            name: self.name,
            recipe_count: u32::try_from(self.recipe_count).unwrap_or(u32::MAX),
        }
    }
}

/// PostgreSQL-backed recipe storage
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tracing::info!(max_connections, "Connected to PostgreSQL database");
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Check database connection health
    pub async fn check_health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(())
    }

    pub async fn fetch_recipes(&self, owner: OwnerId) -> Result<Vec<Recipe>, StoreError> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!("{RECIPE_SELECT} WHERE r.user_id = $1"))
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(owner = %owner, count = rows.len(), "Fetched recipes");
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    pub async fn find_recipe(&self, id: EntityId) -> Result<Option<Recipe>, StoreError> {
        let row = sqlx::query_as::<_, RecipeRow>(&format!("{RECIPE_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Recipe::from))
    }

    pub async fn create_recipe(&self, new: &NewRecipe) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO recipes (user_id, title, description, time_minutes, price_cents, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(new.owner.0)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.time_minutes)
        .bind(new.price.cents())
        .bind(&new.link)
        .fetch_one(&mut *tx)
        .await?;

        replace_associations(&mut tx, id, AttributeKind::Tag, new.owner, &new.tags).await?;
        replace_associations(&mut tx, id, AttributeKind::Ingredient, new.owner, &new.ingredients)
            .await?;

        tx.commit().await?;
        self.require_recipe(id).await
    }

    pub async fn update_recipe(
        &self,
        id: EntityId,
        update: &RecipeUpdate,
    ) -> Result<Recipe, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes
            SET user_id = $2,
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                time_minutes = COALESCE($5, time_minutes),
                price_cents = COALESCE($6, price_cents),
                link = COALESCE($7, link)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.owner.0)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.time_minutes)
        .bind(update.price.map(|p| p.cents()))
        .bind(&update.link)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: "Recipe", id });
        }

        if let Some(tags) = &update.tags {
            replace_associations(&mut tx, id, AttributeKind::Tag, update.owner, tags).await?;
        }
        if let Some(ingredients) = &update.ingredients {
            replace_associations(&mut tx, id, AttributeKind::Ingredient, update.owner, ingredients)
                .await?;
        }

        tx.commit().await?;
        self.require_recipe(id).await
    }

    pub async fn delete_recipe(&self, id: EntityId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_recipe_image(&self, id: EntityId, path: &str) -> Result<Recipe, StoreError> {
        let result = sqlx::query("UPDATE recipes SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(path)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: "Recipe", id });
        }
        self.require_recipe(id).await
    }

    pub async fn fetch_attributes(
        &self,
        kind: AttributeKind,
        owner: OwnerId,
    ) -> Result<Vec<Attribute>, StoreError> {
        let sql = format!("{} WHERE t.user_id = $1", attribute_select(kind));
        let rows = sqlx::query_as::<_, AttributeRow>(&sql)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(kind = %kind, owner = %owner, count = rows.len(), "Fetched attributes");
        Ok(rows.into_iter().map(|row| row.into_attribute(kind)).collect())
    }

    pub async fn find_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
    ) -> Result<Option<Attribute>, StoreError> {
        let sql = format!("{} WHERE t.id = $1", attribute_select(kind));
        let row = sqlx::query_as::<_, AttributeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.into_attribute(kind)))
    }

    pub async fn update_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
        update: &AttributeUpdate,
    ) -> Result<Attribute, StoreError> {
        let tables = tables_for(kind);
        let sql = format!(
            "UPDATE {} SET user_id = $2, name = COALESCE($3, name) WHERE id = $1",
            tables.table
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(update.owner.0)
            .bind(&update.name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: kind.label(),
                id,
            });
        }
        self.find_attribute(kind, id)
            .await?
            .ok_or(StoreError::NotFound {
                kind: kind.label(),
                id,
            })
    }

    pub async fn delete_attribute(
        &self,
        kind: AttributeKind,
        id: EntityId,
    ) -> Result<bool, StoreError> {
        // Join rows go with it via ON DELETE CASCADE
        let sql = format!("DELETE FROM {} WHERE id = $1", tables_for(kind).table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn require_recipe(&self, id: EntityId) -> Result<Recipe, StoreError> {
        self.find_recipe(id)
            .await?
            .ok_or(StoreError::NotFound { kind: "Recipe", id })
    }
}

fn attribute_select(kind: AttributeKind) -> String {
    let tables = tables_for(kind);
    format!(
        "SELECT t.id, t.user_id, t.name, \
                (SELECT COUNT(*) FROM {join} j WHERE j.{column} = t.id) AS recipe_count \
         FROM {table} t",
        join = tables.join_table,
        column = tables.join_column,
        table = tables.table,
    )
}

/// Replace the recipe's attributes of `kind` with `names`, creating missing
/// ones among `owner`'s attributes.
async fn replace_associations(
    conn: &mut PgConnection,
    recipe_id: EntityId,
    kind: AttributeKind,
    owner: OwnerId,
    names: &[String],
) -> Result<(), StoreError> {
    let tables = tables_for(kind);

    sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        tables.join_table
    ))
    .bind(recipe_id)
    .execute(&mut *conn)
    .await?;

    for name in names {
        let attribute_id = get_or_create_attribute(&mut *conn, kind, owner, name).await?;
        sqlx::query(&format!(
            "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            tables.join_table, tables.join_column
        ))
        .bind(recipe_id)
        .bind(attribute_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn get_or_create_attribute(
    conn: &mut PgConnection,
    kind: AttributeKind,
    owner: OwnerId,
    name: &str,
) -> Result<EntityId, StoreError> {
    let table = tables_for(kind).table;

    let existing: Option<(i64,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE user_id = $1 AND name = $2 ORDER BY id LIMIT 1",
        table
    ))
    .bind(owner.0)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i64,) = sqlx::query_as(&format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING id",
        table
    ))
    .bind(owner.0)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(kind = %kind, id, owner = %owner, "Created attribute");
    Ok(id)
}
