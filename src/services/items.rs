//! Item listing management.
//!
//! Listings carry everything about an item except its availability: the
//! `status` column belongs to the transaction flows and is not writable
//! through this service.

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, ItemStatus, UpdateItem},
    repository::Repository,
};

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
}

impl ItemsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new listing for an existing owner
    pub async fn create_item(&self, payload: CreateItem) -> AppResult<Item> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Verify owner exists
        self.repository.users.get_by_id(payload.owner_id).await?;

        self.repository.items.create(&payload).await
    }

    /// Get an item by ID
    pub async fn get_item(&self, id: Uuid) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    /// List items, optionally filtered by owner and/or status
    pub async fn list_items(
        &self,
        owner_id: Option<Uuid>,
        status: Option<ItemStatus>,
    ) -> AppResult<Vec<Item>> {
        self.repository.items.list(owner_id, status).await
    }

    /// Update a listing's name/description; only the owner may edit
    pub async fn update_item(&self, id: Uuid, payload: UpdateItem) -> AppResult<Item> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let item = self.repository.items.get_by_id(id).await?;

        if item.owner_id != payload.owner_id {
            return Err(AppError::Forbidden(
                "Only the owner can edit a listing".to_string(),
            ));
        }

        self.repository
            .items
            .update_details(id, payload.name.as_deref(), payload.description.as_deref())
            .await
    }
}
