use std::collections::HashMap;

use uuid::Uuid;

use crate::{BillSplit, EngineError, LedgerStore, Money, ResultEngine};

use super::Engine;

/// Outstanding amount per counterparty, keyed by user id.
pub type CounterpartyTotals = HashMap<Uuid, Money>;

/// Sums what `user_id` owes, grouped by the author of each bill.
///
/// Rows are expected to be the unsettled splits `user_id` received on unpaid
/// bills; any other row is ignored. Totals are exact, never rounded.
pub fn aggregate_owed_by(
    user_id: Uuid,
    splits: &[BillSplit],
) -> ResultEngine<CounterpartyTotals> {
    let rows = splits
        .iter()
        .filter(|split| split.recipient_id == user_id && split.is_between_counterparties());
    accumulate(rows.map(|split| (split.author_id, split)))
}

/// Sums what others owe `user_id`, grouped by the recipient of each split.
///
/// Rows are expected to be the unsettled splits on unpaid bills authored by
/// `user_id`; any other row is ignored.
pub fn aggregate_owed_to(
    user_id: Uuid,
    splits: &[BillSplit],
) -> ResultEngine<CounterpartyTotals> {
    let rows = splits
        .iter()
        .filter(|split| split.author_id == user_id && split.is_between_counterparties());
    accumulate(rows.map(|split| (split.recipient_id, split)))
}

fn accumulate<'a>(
    rows: impl Iterator<Item = (Uuid, &'a BillSplit)>,
) -> ResultEngine<CounterpartyTotals> {
    let mut totals = CounterpartyTotals::new();
    for (counterparty, split) in rows {
        if !split.split_amount.is_positive() {
            return Err(EngineError::DataIntegrity(format!(
                "split {} has non-positive amount {}",
                split.id, split.split_amount
            )));
        }
        let total = totals.entry(counterparty).or_default();
        *total = total.checked_add(split.split_amount).ok_or_else(|| {
            EngineError::InvalidAmount(format!("total owed with {counterparty} overflows"))
        })?;
    }
    Ok(totals)
}

impl<S: LedgerStore> Engine<S> {
    /// What `user_id` still owes, per counterparty.
    pub fn debts_owed_by(&self, user_id: Uuid) -> ResultEngine<CounterpartyTotals> {
        self.store.user(user_id)?;
        let rows = self.store.unpaid_splits_for_recipient(user_id)?;
        let totals = aggregate_owed_by(user_id, &rows)?;
        tracing::debug!(%user_id, counterparties = totals.len(), "aggregated debts owed by user");
        Ok(totals)
    }

    /// What each counterparty still owes `user_id`.
    pub fn debts_owed_to(&self, user_id: Uuid) -> ResultEngine<CounterpartyTotals> {
        self.store.user(user_id)?;
        let rows = self.store.unpaid_splits_for_author(user_id)?;
        let totals = aggregate_owed_to(user_id, &rows)?;
        tracing::debug!(%user_id, counterparties = totals.len(), "aggregated debts owed to user");
        Ok(totals)
    }
}
