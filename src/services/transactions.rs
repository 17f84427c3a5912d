//! Borrow transaction coordination.
//!
//! Entry point for the three lifecycle operations: requesting a borrow,
//! deciding a pending request, and cancelling/returning. The atomic
//! check-and-write flows live in the transactions repository; this layer
//! verifies referenced users exist and keeps handlers thin.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        item::Item,
        transaction::{Transaction, TransactionDetails, TransactionStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct TransactionsService {
    repository: Repository,
}

impl TransactionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Submit a borrow request for an item
    pub async fn request_borrow(
        &self,
        item_id: Uuid,
        borrower_id: Uuid,
    ) -> AppResult<Transaction> {
        // Verify borrower exists
        self.repository.users.get_by_id(borrower_id).await?;

        self.repository
            .transactions
            .create_request(item_id, borrower_id)
            .await
    }

    /// Approve or reject a pending request (lender only)
    pub async fn decide(
        &self,
        transaction_id: Uuid,
        decider_id: Uuid,
        decision: TransactionStatus,
    ) -> AppResult<Transaction> {
        self.repository
            .transactions
            .decide(transaction_id, decider_id, decision)
            .await
    }

    /// Cancel a pending request or return a borrowed item
    pub async fn cancel_or_return(
        &self,
        item_id: Uuid,
        borrower_id: Uuid,
    ) -> AppResult<(Transaction, Item)> {
        self.repository
            .transactions
            .cancel_active(item_id, borrower_id)
            .await
    }

    /// List all transactions
    pub async fn list_all(&self) -> AppResult<Vec<Transaction>> {
        self.repository.transactions.list_all().await
    }

    /// Active transactions involving a user, enriched for display
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TransactionDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        self.repository.transactions.list_for_user(user_id).await
    }
}
