//! Item listing endpoints.
//!
//! There is intentionally no way to set an item's availability here:
//! `status` transitions happen only through the transaction endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::item::{CreateItem, Item, ItemStatus, UpdateItem},
};

/// Listing filters
#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    /// Filter by owner
    pub owner_id: Option<Uuid>,
    /// Filter by availability
    pub status: Option<ItemStatus>,
}

/// List items
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    params(ItemsQuery),
    responses(
        (status = 200, description = "List of items", body = Vec<Item>)
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    Query(query): Query<ItemsQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state
        .services
        .items
        .list_items(query.owner_id, query.status)
        .await?;

    Ok(Json(items))
}

/// Get item details by ID
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = Item),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    let item = state.services.items.get_item(id).await?;
    Ok(Json(item))
}

/// Create a new listing
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Owner not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let created = state.services.items.create_item(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a listing's name/description (owner only)
#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let updated = state.services.items.update_item(id, payload).await?;
    Ok(Json(updated))
}
