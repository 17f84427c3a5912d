//! Items repository for database operations.
//!
//! Item `status` is deliberately absent from every write here: the only
//! mutation path for availability is the transactions repository, inside the
//! same SQL transaction as the borrow-state change it reflects.

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, ItemStatus},
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// List items, optionally filtered by owner and/or status
    pub async fn list(
        &self,
        owner_id: Option<Uuid>,
        status: Option<ItemStatus>,
    ) -> AppResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at
            "#,
        )
        .bind(owner_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Create a new listing (always starts out available)
    pub async fn create(&self, item: &CreateItem) -> AppResult<Item> {
        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, owner_id, status)
            VALUES ($1, $2, $3, 'available')
            RETURNING *
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update name/description of an existing listing
    pub async fn update_details(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }
}
