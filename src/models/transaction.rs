//! Borrow transaction model and state machine.
//!
//! A transaction is the record of one borrow lifecycle for one item. The
//! allowed status transitions are closed over `can_transition_to`; terminal
//! statuses (rejected, cancelled) admit no further transitions. Who may
//! drive a transition is answered by the guard predicates on [`Transaction`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use super::item::ItemShort;
use super::user::UserShort;

/// Borrow transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// An active transaction holds the item's single claim slot.
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionStatus::Pending | TransactionStatus::Approved)
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Rejected | TransactionStatus::Cancelled)
    }

    /// Allowed transitions:
    /// pending -> approved | rejected | cancelled, approved -> cancelled.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        match (self, next) {
            (TransactionStatus::Pending, TransactionStatus::Approved)
            | (TransactionStatus::Pending, TransactionStatus::Rejected)
            | (TransactionStatus::Pending, TransactionStatus::Cancelled)
            | (TransactionStatus::Approved, TransactionStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "rejected" => Ok(TransactionStatus::Rejected),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

// SQLx conversion for TransactionStatus (stored as TEXT)
impl sqlx::Type<Postgres> for TransactionStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for TransactionStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for TransactionStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Borrow transaction as stored in the database.
///
/// `lender_id` is a snapshot of the item's owner at creation time and never
/// changes afterwards. Transactions are never deleted; rejection and
/// cancellation are terminal statuses, not removals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub item_id: Uuid,
    pub lender_id: Uuid,
    pub borrower_id: Uuid,
    pub status: TransactionStatus,
    pub start_date: DateTime<Utc>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Only the lender may approve or reject a pending request.
    pub fn can_be_decided_by(&self, user_id: Uuid) -> bool {
        user_id == self.lender_id
    }

    /// The borrower withdraws/returns; the lender may also cancel.
    pub fn can_be_cancelled_by(&self, user_id: Uuid) -> bool {
        user_id == self.borrower_id || user_id == self.lender_id
    }
}

/// Transaction enriched with item and party summaries for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub item: ItemShort,
    pub borrower: UserShort,
    pub lender: UserShort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionStatus::*;

    fn transaction(lender_id: Uuid, borrower_id: Uuid) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            lender_id,
            borrower_id,
            status: Pending,
            start_date: Utc::now(),
            borrow_date: None,
            end_date: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pending_can_reach_all_outcomes() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Cancelled));
    }

    #[test]
    fn test_approved_can_only_be_cancelled() {
        assert!(Approved.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Approved));
    }

    #[test]
    fn test_terminal_statuses_admit_no_transitions() {
        for terminal in [Rejected, Cancelled] {
            for next in [Pending, Approved, Rejected, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_active_statuses() {
        assert!(Pending.is_active());
        assert!(Approved.is_active());
        assert!(!Rejected.is_active());
        assert!(!Cancelled.is_active());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!Pending.is_terminal());
        assert!(!Approved.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_only_lender_decides() {
        let lender = Uuid::new_v4();
        let borrower = Uuid::new_v4();
        let tx = transaction(lender, borrower);

        assert!(tx.can_be_decided_by(lender));
        assert!(!tx.can_be_decided_by(borrower));
        assert!(!tx.can_be_decided_by(Uuid::new_v4()));
    }

    #[test]
    fn test_borrower_and_lender_may_cancel() {
        let lender = Uuid::new_v4();
        let borrower = Uuid::new_v4();
        let tx = transaction(lender, borrower);

        assert!(tx.can_be_cancelled_by(borrower));
        assert!(tx.can_be_cancelled_by(lender));
        assert!(!tx.can_be_cancelled_by(Uuid::new_v4()));
    }
}
