//! Bill primitives.
//!
//! A [`Bill`] is one shared expense paid by its author. Every recipient's
//! share of it is a [`BillSplit`]: the atomic ledger entry the engine
//! aggregates, nets and settles.
//!
//! `Bill::paid` is derived state: a bill is paid once every one of its splits
//! has `recipient_paid = true` (see [`crate::scan_completion`]).

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    /// The user who paid the expense and is owed by the recipients.
    pub author_id: Uuid,
    #[serde(default)]
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Bill {
    pub fn new(author_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            paid: false,
            created_at,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSplit {
    pub id: Uuid,
    pub bill_id: Uuid,
    /// Copy of the parent bill's author, kept for query convenience.
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub split_amount: Money,
    #[serde(default)]
    pub recipient_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl BillSplit {
    /// Creates the share of `bill` owed by `recipient_id`.
    ///
    /// `split_amount` must be > 0.
    pub fn new(bill: &Bill, recipient_id: Uuid, split_amount: Money) -> ResultEngine<Self> {
        if !split_amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "split_amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            bill_id: bill.id,
            author_id: bill.author_id,
            recipient_id,
            split_amount,
            recipient_paid: false,
            created_at: bill.created_at,
        })
    }

    /// `true` when the split is an obligation between two different users.
    pub fn is_between_counterparties(&self) -> bool {
        self.author_id != self.recipient_id
    }

    /// Settlement order: oldest first, ties broken by id.
    pub fn settlement_order(a: &BillSplit, b: &BillSplit) -> Ordering {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// A bill together with every split recorded on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillWithSplits {
    pub bill: Bill,
    pub splits: Vec<BillSplit>,
}
