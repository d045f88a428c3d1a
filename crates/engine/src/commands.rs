//! Command structs for engine write operations.
//!
//! These types group parameters for settlements, keeping call sites readable
//! and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Money;

/// Apply a payment from `payer_id` to `payee_id`.
#[derive(Clone, Debug)]
pub struct SettleUpCmd {
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub amount: Money,
    /// Timestamp given to the reverse obligation created on overpayment.
    /// Defaults to the time the command is applied.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl SettleUpCmd {
    #[must_use]
    pub fn new(payer_id: Uuid, payee_id: Uuid, amount: Money) -> Self {
        Self {
            payer_id,
            payee_id,
            amount,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}
