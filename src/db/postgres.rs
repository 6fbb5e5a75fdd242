use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    db::WardrobeStore,
    error::AppResult,
    models::{ClothingItem, ColorFamily, ItemId, NewClothingItem, UserId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Row of the `clothing_items` table
#[derive(Debug, FromRow)]
struct ClothingItemRow {
    id: i64,
    item_name: String,
    item_type: String,
    style: String,
    color: String,
    color_family: String,
    pattern: String,
    min_temp: i32,
    max_temp: i32,
    condition_type: String,
    image_path: Option<String>,
}

impl ClothingItemRow {
    /// Converts a row into a wardrobe item. Rows with an unknown color family
    /// are malformed and yield `None`.
    fn into_item(self) -> Option<ClothingItem> {
        let color_family = match self.color_family.parse::<ColorFamily>() {
            Ok(family) => family,
            Err(e) => {
                tracing::warn!(item_id = self.id, error = %e, "Skipping malformed wardrobe item");
                return None;
            }
        };

        Some(ClothingItem {
            id: self.id,
            name: self.item_name,
            item_type: self.item_type,
            style: self.style,
            color: self.color,
            color_family,
            pattern: self.pattern,
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            condition: self.condition_type,
            image_path: self.image_path,
        })
    }
}

/// Wardrobe storage backed by PostgreSQL
#[derive(Clone)]
pub struct PgWardrobeStore {
    db_pool: PgPool,
}

impl PgWardrobeStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait::async_trait]
impl WardrobeStore for PgWardrobeStore {
    async fn get_wardrobe(&self, user_id: UserId) -> AppResult<Vec<ClothingItem>> {
        let rows = sqlx::query_as::<_, ClothingItemRow>(
            r#"
            SELECT id, item_name, item_type, style, color, color_family, pattern,
                   min_temp, max_temp, condition_type, image_path
            FROM clothing_items
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        let items: Vec<ClothingItem> = rows.into_iter().filter_map(ClothingItemRow::into_item).collect();

        tracing::debug!(user_id, items = items.len(), "Loaded wardrobe");

        Ok(items)
    }

    async fn add_item(&self, user_id: UserId, item: NewClothingItem) -> AppResult<ClothingItem> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO clothing_items
                (user_id, item_name, item_type, style, color, color_family, pattern,
                 min_temp, max_temp, condition_type, image_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&item.name)
        .bind(&item.item_type)
        .bind(&item.style)
        .bind(&item.color)
        .bind(item.color_family.as_str())
        .bind(&item.pattern)
        .bind(item.min_temp)
        .bind(item.max_temp)
        .bind(&item.condition)
        .bind(&item.image_path)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(item.into_item(id))
    }

    async fn delete_item(&self, user_id: UserId, item_id: ItemId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clothing_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.db_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
