use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BillWithSplits, LedgerStore, ResultEngine};

use super::Engine;

/// Result of checking bills for completion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionScan {
    /// Every bill whose splits are all settled, whatever its stored flag.
    pub fully_paid: BTreeSet<Uuid>,
    /// Fully paid bills still stored as unpaid: the diff to apply.
    pub newly_paid: Vec<Uuid>,
}

/// A bill is complete once every split is settled. A bill without splits is
/// complete.
pub fn is_bill_complete(record: &BillWithSplits) -> bool {
    record.splits.iter().all(|split| split.recipient_paid)
}

/// Recomputes completion from scratch for the given bills.
///
/// Idempotent: applying `newly_paid` and scanning again yields an empty diff.
/// A bill already flagged paid is never reported for demotion.
pub fn scan_completion(bills: &[BillWithSplits]) -> CompletionScan {
    let mut scan = CompletionScan::default();
    for record in bills.iter().filter(|record| is_bill_complete(record)) {
        scan.fully_paid.insert(record.bill.id);
        if !record.bill.paid {
            scan.newly_paid.push(record.bill.id);
        }
    }
    scan
}

impl<S: LedgerStore> Engine<S> {
    /// Scans every bill without changing the ledger.
    pub fn scan_bill_completion(&self) -> ResultEngine<CompletionScan> {
        let bills = self.store.bills_with_splits()?;
        Ok(scan_completion(&bills))
    }

    /// Scans every bill and flags the newly completed ones as paid.
    pub fn complete_bills(&mut self) -> ResultEngine<CompletionScan> {
        let scan = self.scan_bill_completion()?;
        if !scan.newly_paid.is_empty() {
            self.store.mark_bills_paid(&scan.newly_paid)?;
        }
        tracing::info!(
            fully_paid = scan.fully_paid.len(),
            newly_paid = scan.newly_paid.len(),
            "bill completion scan applied"
        );
        Ok(scan)
    }

    /// Re-checks a single bill, e.g. after one of its splits changed.
    ///
    /// Returns `true` if the bill was just flagged paid.
    pub fn refresh_bill(&mut self, bill_id: Uuid) -> ResultEngine<bool> {
        let record = self.store.bill_with_splits(bill_id)?;
        if record.bill.paid || !is_bill_complete(&record) {
            return Ok(false);
        }
        self.store.mark_bills_paid(&[bill_id])?;
        tracing::debug!(%bill_id, "bill fully paid");
        Ok(true)
    }
}
