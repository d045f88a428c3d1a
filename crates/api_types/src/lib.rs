//! Response bodies printed by `settleup`.
//!
//! Amounts are decimal strings (`"12.50"`), never floats.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod balances {
    use std::collections::BTreeMap;

    use super::*;

    /// Net position of one user, keyed by counterparty username.
    #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct NetPayments {
        pub username: String,
        pub you_owe: BTreeMap<String, String>,
        pub you_are_owed: BTreeMap<String, String>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PartialSettlementView {
        pub split_id: Uuid,
        /// Still owed on the split after the payment.
        pub remaining: String,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SettlementResponse {
        pub payer: String,
        pub payee: String,
        pub amount: String,
        pub fully_settled: Vec<Uuid>,
        pub partially_settled: Option<PartialSettlementView>,
        pub overpayment: String,
        /// Bill recording the overpayment as a debt of the payee.
        ///
        /// Always `None` for a dry run.
        pub reverse_bill_id: Option<Uuid>,
        pub completed_bills: Vec<Uuid>,
        /// `true` when the ledger was left untouched.
        pub dry_run: bool,
    }
}

pub mod completion {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CompletionResponse {
        pub fully_paid: Vec<Uuid>,
        pub newly_paid: Vec<Uuid>,
    }
}
