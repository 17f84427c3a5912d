//! Transactions repository: the storage side of the borrow lifecycle.
//!
//! Every mutating flow here runs as a single SQL transaction so that the
//! transaction row and the item's availability can never disagree, whatever
//! interleaving concurrent requests arrive in. The schema backs this up with
//! a partial unique index on `transactions(item_id)` over the active
//! statuses: when two borrow requests race past the existence check, the
//! second INSERT fails with a unique violation instead of creating a
//! duplicate claim.

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        item::{Item, ItemShort},
        transaction::{Transaction, TransactionDetails, TransactionStatus},
        user::UserShort,
    },
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all transactions, oldest first
    pub async fn list_all(&self) -> AppResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions ORDER BY start_date",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Create a borrow request for an item.
    ///
    /// Runs the full precondition chain and the insert inside one SQL
    /// transaction: item must exist, the borrower must not be the owner,
    /// and the item must not already carry an active claim. The lender is
    /// snapshotted from the item's owner at this point and never updated.
    pub async fn create_request(
        &self,
        item_id: Uuid,
        borrower_id: Uuid,
    ) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))?;

        if borrower_id == item.owner_id {
            return Err(AppError::SelfBorrow);
        }

        // Check for an existing active claim
        let has_active_claim: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactions
                WHERE item_id = $1 AND status IN ('pending', 'approved')
            )
            "#,
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        if has_active_claim {
            return Err(AppError::ActiveClaimExists);
        }

        // The partial unique index closes the window between the check above
        // and this insert: a racing request surfaces here as a constraint
        // violation and reports the same conflict.
        let created = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (item_id, lender_id, borrower_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(item.owner_id)
        .bind(borrower_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error().and_then(|d| d.constraint()) {
            Some("uq_transactions_one_active_per_item") => AppError::ActiveClaimExists,
            Some("ck_transactions_no_self_borrow") => AppError::SelfBorrow,
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;

        Ok(created)
    }

    /// Approve or reject a pending request.
    ///
    /// Preconditions are checked in order (existence, pending status, lender
    /// authorization, allowed decision value) so the first failure wins. The
    /// status write is a compare-and-swap on `status = 'pending'`: when two
    /// deciders race, exactly one update matches and the loser gets an
    /// invalid-transition error instead of silently overwriting.
    pub async fn decide(
        &self,
        transaction_id: Uuid,
        decider_id: Uuid,
        decision: TransactionStatus,
    ) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE id = $1",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Transaction with id {} not found", transaction_id))
        })?;

        if existing.status != TransactionStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Transaction is {}, only pending requests can be decided",
                existing.status
            )));
        }

        if !existing.can_be_decided_by(decider_id) {
            return Err(AppError::Forbidden(
                "Only the lender can approve or reject a borrow request".to_string(),
            ));
        }

        if !matches!(
            decision,
            TransactionStatus::Approved | TransactionStatus::Rejected
        ) {
            return Err(AppError::BadRequest(
                "status must be 'approved' or 'rejected'".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2,
                borrow_date = CASE WHEN $2 = 'approved' THEN now() ELSE borrow_date END,
                updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(decision)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::InvalidTransition("Transaction was decided concurrently".to_string())
        })?;

        // Approval is the only path that takes an item out of circulation
        if updated.status == TransactionStatus::Approved {
            sqlx::query("UPDATE items SET status = 'borrowed', updated_at = now() WHERE id = $1")
                .bind(updated.item_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Cancel a pending request or return a borrowed item.
    ///
    /// The borrower's active transaction is cancelled, any other active
    /// claim on the item is swept up in the same SQL transaction, and the
    /// item goes back to available. Either everything commits or nothing
    /// does.
    pub async fn cancel_active(
        &self,
        item_id: Uuid,
        borrower_id: Uuid,
    ) -> AppResult<(Transaction, Item)> {
        let mut tx = self.pool.begin().await?;

        let item_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
                .bind(item_id)
                .fetch_one(&mut *tx)
                .await?;

        if !item_exists {
            return Err(AppError::NotFound(format!(
                "Item with id {} not found",
                item_id
            )));
        }

        // The UPDATE doubles as the existence check: zero rows means there
        // is no active transaction for this item/borrower pair.
        let cancelled = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'cancelled', updated_at = now()
            WHERE item_id = $1 AND borrower_id = $2 AND status IN ('pending', 'approved')
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(borrower_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No active transaction for item {} and borrower {}",
                item_id, borrower_id
            ))
        })?;

        // Sweep any other active claim on the item. Under the unique index
        // there should never be one; if one ever arose it must not survive
        // the item going back to available.
        sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'cancelled', updated_at = now()
            WHERE item_id = $1 AND id <> $2 AND status IN ('pending', 'approved')
            "#,
        )
        .bind(item_id)
        .bind(cancelled.id)
        .execute(&mut *tx)
        .await?;

        let item = sqlx::query_as::<_, Item>(
            "UPDATE items SET status = 'available', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((cancelled, item))
    }

    /// Active transactions where the user is borrower or lender, enriched
    /// with item and party summaries for display
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.item_id, t.lender_id, t.borrower_id, t.status,
                   t.start_date, t.borrow_date, t.end_date, t.updated_at,
                   i.name AS item_name, i.status AS item_status,
                   b.name AS borrower_name, b.email AS borrower_email,
                   l.name AS lender_name, l.email AS lender_email
            FROM transactions t
            JOIN items i ON t.item_id = i.id
            JOIN users b ON t.borrower_id = b.id
            JOIN users l ON t.lender_id = l.id
            WHERE (t.borrower_id = $1 OR t.lender_id = $1)
              AND t.status IN ('pending', 'approved')
            ORDER BY t.start_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::new();
        for row in rows {
            result.push(TransactionDetails {
                transaction: Transaction {
                    id: row.get("id"),
                    item_id: row.get("item_id"),
                    lender_id: row.get("lender_id"),
                    borrower_id: row.get("borrower_id"),
                    status: row.get("status"),
                    start_date: row.get("start_date"),
                    borrow_date: row.get("borrow_date"),
                    end_date: row.get("end_date"),
                    updated_at: row.get("updated_at"),
                },
                item: ItemShort {
                    id: row.get("item_id"),
                    name: row.get("item_name"),
                    status: row.get("item_status"),
                },
                borrower: UserShort {
                    id: row.get("borrower_id"),
                    name: row.get("borrower_name"),
                    email: row.get("borrower_email"),
                },
                lender: UserShort {
                    id: row.get("lender_id"),
                    name: row.get("lender_name"),
                    email: row.get("lender_email"),
                },
            });
        }

        Ok(result)
    }
}
