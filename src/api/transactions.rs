//! Borrow transaction endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        item::Item,
        transaction::{Transaction, TransactionDetails, TransactionStatus},
    },
};

/// Borrow request body
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    /// Item to borrow
    pub item_id: Uuid,
    /// Requesting user
    pub borrower_id: Uuid,
}

/// Decision body for a pending request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideTransactionRequest {
    /// Target status: approved or rejected
    pub status: TransactionStatus,
    /// Deciding user (must be the lender)
    pub user_id: Uuid,
}

/// Cancel/return request body
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelTransactionRequest {
    /// Item whose active transaction is being cancelled/returned
    pub item_id: Uuid,
    /// Borrower on that transaction
    pub borrower_id: Uuid,
}

/// Cancel/return response: the cancelled transaction and the item back in
/// circulation
#[derive(Serialize, ToSchema)]
pub struct CancelTransactionResponse {
    pub transaction: Transaction,
    pub item: Item,
}

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Borrow request created", body = Transaction),
        (status = 400, description = "Self-borrow or item already claimed"),
        (status = 404, description = "Item or borrower not found")
    )
)]
pub async fn create_transaction(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let transaction = state
        .services
        .transactions
        .request_borrow(request.item_id, request.borrower_id)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Approve or reject a pending borrow request
#[utoipa::path(
    put,
    path = "/transactions/{id}",
    tag = "transactions",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = DecideTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = Transaction),
        (status = 400, description = "Invalid status or transition"),
        (status = 403, description = "Caller is not the lender"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn decide_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecideTransactionRequest>,
) -> AppResult<Json<Transaction>> {
    let transaction = state
        .services
        .transactions
        .decide(id, request.user_id, request.status)
        .await?;

    Ok(Json(transaction))
}

/// Cancel a pending request or return a borrowed item
#[utoipa::path(
    post,
    path = "/transactions/cancel",
    tag = "transactions",
    request_body = CancelTransactionRequest,
    responses(
        (status = 200, description = "Transaction cancelled, item available", body = CancelTransactionResponse),
        (status = 404, description = "Item or active transaction not found")
    )
)]
pub async fn cancel_transaction(
    State(state): State<crate::AppState>,
    Json(request): Json<CancelTransactionRequest>,
) -> AppResult<Json<CancelTransactionResponse>> {
    let (transaction, item) = state
        .services
        .transactions
        .cancel_or_return(request.item_id, request.borrower_id)
        .await?;

    Ok(Json(CancelTransactionResponse { transaction, item }))
}

/// List all transactions
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    responses(
        (status = 200, description = "All transactions", body = Vec<Transaction>)
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Transaction>>> {
    let transactions = state.services.transactions.list_all().await?;
    Ok(Json(transactions))
}

/// Active transactions involving a user (as borrower or lender)
#[utoipa::path(
    get,
    path = "/transactions/user/{user_id}",
    tag = "transactions",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's active transactions", body = Vec<TransactionDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_transactions(
    State(state): State<crate::AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    let transactions = state
        .services
        .transactions
        .list_for_user(user_id)
        .await?;

    Ok(Json(transactions))
}
