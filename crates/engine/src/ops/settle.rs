use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BillSplit, EngineError, LedgerStore, Money, ResultEngine, SettleUpCmd};

use super::Engine;

/// A split the payment only partly covered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSettlement {
    pub split_id: Uuid,
    /// What is still owed on the split, rounded to cents.
    pub remaining: Money,
}

/// How a payment is spread over the payer's open splits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Splits covered in full, in settlement order.
    pub fully_settled: Vec<Uuid>,
    pub partially_settled: Option<PartialSettlement>,
    /// Part of the payment left once every open split is covered, rounded to
    /// cents. It becomes a debt of the payee towards the payer.
    pub overpayment: Money,
}

/// What [`Engine::settle_up`] changed in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub settlement: Settlement,
    /// Bill created for the overpayment, if any.
    pub reverse_bill_id: Option<Uuid>,
    /// Bills that became fully paid through this settlement.
    pub completed_bills: Vec<Uuid>,
}

/// Rejects a settlement amount that is zero or negative.
pub fn validate_amount(amount: Money) -> ResultEngine<()> {
    if amount.is_positive() {
        return Ok(());
    }
    Err(EngineError::InvalidAmount(format!(
        "settlement amount must be > 0, got {amount}"
    )))
}

/// Rejects settlements that can never be valid, before touching the ledger.
pub fn validate_settlement(payer_id: Uuid, payee_id: Uuid, amount: Money) -> ResultEngine<()> {
    validate_amount(amount)?;
    if payer_id == payee_id {
        return Err(EngineError::InvalidCounterparty(
            "payer and payee must be different users".to_string(),
        ));
    }
    Ok(())
}

/// Allocates `amount` over `splits`, oldest first (ties broken by id).
///
/// Each split is covered in full while the payment lasts. The first split the
/// remaining payment cannot cover is recorded as partially settled and the
/// walk stops there, even if a later, smaller split would still fit. Whatever
/// is left after every split is covered is the overpayment.
pub fn allocate_payment(amount: Money, mut splits: Vec<BillSplit>) -> ResultEngine<Settlement> {
    validate_amount(amount)?;
    splits.sort_by(BillSplit::settlement_order);

    let mut settlement = Settlement::default();
    let mut remaining = amount;
    for split in &splits {
        if !split.split_amount.is_positive() {
            return Err(EngineError::DataIntegrity(format!(
                "split {} has non-positive amount {}",
                split.id, split.split_amount
            )));
        }
        remaining = remaining.checked_sub(split.split_amount).ok_or_else(|| {
            EngineError::InvalidAmount(format!("allocating split {} overflows", split.id))
        })?;
        if remaining.is_negative() {
            settlement.partially_settled = Some(PartialSettlement {
                split_id: split.id,
                remaining: (-remaining).round_cents(),
            });
            break;
        }
        settlement.fully_settled.push(split.id);
    }

    if remaining.is_positive() {
        settlement.overpayment = remaining.round_cents();
    }
    Ok(settlement)
}

impl<S: LedgerStore> Engine<S> {
    /// Computes how a payment would be allocated without changing the ledger.
    pub fn plan_settlement(
        &self,
        payer_id: Uuid,
        payee_id: Uuid,
        amount: Money,
    ) -> ResultEngine<Settlement> {
        self.open_splits_between(payer_id, payee_id, amount)
            .and_then(|splits| allocate_payment(amount, splits))
    }

    /// Applies a payment: settled splits are flagged, a partially covered
    /// split keeps only its remaining amount, an overpayment becomes a new
    /// bill owed by the payee to the payer, and bills whose splits are now
    /// all settled are flagged paid.
    pub fn settle_up(&mut self, cmd: SettleUpCmd) -> ResultEngine<SettlementReceipt> {
        let SettleUpCmd {
            payer_id,
            payee_id,
            amount,
            occurred_at,
        } = cmd;

        let splits = self.open_splits_between(payer_id, payee_id, amount)?;
        let bill_of: HashMap<Uuid, Uuid> = splits.iter().map(|s| (s.id, s.bill_id)).collect();
        let settlement = allocate_payment(amount, splits)?;

        let mut paid_ids = settlement.fully_settled.clone();
        if let Some(partial) = settlement.partially_settled {
            if partial.remaining.is_zero() {
                // Less than half a cent left: nothing meaningful is still owed.
                paid_ids.push(partial.split_id);
            } else {
                self.store.set_split_amount(partial.split_id, partial.remaining)?;
            }
        }
        if !paid_ids.is_empty() {
            self.store.mark_splits_paid(&paid_ids)?;
        }

        let reverse_bill_id = if settlement.overpayment.is_positive() {
            let at = occurred_at.unwrap_or_else(Utc::now);
            Some(self.store.create_reverse_obligation(
                payee_id,
                payer_id,
                settlement.overpayment,
                at,
            )?)
        } else {
            None
        };

        let touched: BTreeSet<Uuid> = paid_ids
            .iter()
            .filter_map(|split_id| bill_of.get(split_id).copied())
            .collect();
        let mut completed_bills = Vec::new();
        for bill_id in touched {
            if self.refresh_bill(bill_id)? {
                completed_bills.push(bill_id);
            }
        }

        tracing::info!(
            %payer_id,
            %payee_id,
            %amount,
            settled = settlement.fully_settled.len(),
            partial = settlement.partially_settled.is_some(),
            overpayment = %settlement.overpayment,
            "applied settlement"
        );

        Ok(SettlementReceipt {
            settlement,
            reverse_bill_id,
            completed_bills,
        })
    }

    fn open_splits_between(
        &self,
        payer_id: Uuid,
        payee_id: Uuid,
        amount: Money,
    ) -> ResultEngine<Vec<BillSplit>> {
        if let Err(err) = validate_settlement(payer_id, payee_id, amount) {
            tracing::warn!(%payer_id, %payee_id, %amount, "rejected settlement: {err}");
            return Err(err);
        }
        self.store.user(payer_id)?;
        self.store.user(payee_id)?;
        self.store.unpaid_splits_between(payee_id, payer_id)
    }
}
