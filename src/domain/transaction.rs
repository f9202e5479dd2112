use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryId, CategoryKind, Cents, UserId};

pub type TransactionId = Uuid;

/// A single income or expense entry.
/// Amounts are always positive; the kind determines the sign when
/// aggregating, so a stored row never carries a negative amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner: UserId,
    pub category_id: CategoryId,
    pub kind: CategoryKind,
    /// The day the money moved in the real world
    pub date: NaiveDate,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    /// ISO 4217 currency code ("EUR", "USD", ...)
    pub currency: String,
    pub description: Option<String>,
    /// When we recorded this entry in the system
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        owner: UserId,
        category_id: CategoryId,
        kind: CategoryKind,
        date: NaiveDate,
        amount_cents: Cents,
        currency: String,
    ) -> Self {
        assert!(amount_cents > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            owner,
            category_id,
            kind,
            date,
            amount_cents,
            currency,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The amount with the sign implied by the kind: income counts toward the
    /// balance, expense against it.
    pub fn signed_cents(&self) -> Cents {
        match self.kind {
            CategoryKind::Income => self.amount_cents,
            CategoryKind::Expense => -self.amount_cents,
        }
    }
}
