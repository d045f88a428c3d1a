//! In-memory [`LedgerStore`].
//!
//! Rows live in ordered maps so reads are deterministic. The ledger can be
//! loaded from and dumped to a [`LedgerSnapshot`], which is what the CLI keeps
//! on disk as JSON.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Bill, BillSplit, BillWithSplits, EngineError, LedgerStore, Money, ResultEngine, User,
};

/// Flat, serializable form of a ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub splits: Vec<BillSplit>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    users: BTreeMap<Uuid, User>,
    bills: BTreeMap<Uuid, Bill>,
    splits: BTreeMap<Uuid, BillSplit>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user. Ids and usernames must both be unique.
    pub fn add_user(&mut self, user: User) -> ResultEngine<Uuid> {
        if self.users.contains_key(&user.id) {
            return Err(EngineError::ExistingKey(user.id.to_string()));
        }
        if self.users.values().any(|u| u.username == user.username) {
            return Err(EngineError::ExistingKey(user.username));
        }
        let id = user.id;
        self.users.insert(id, user);
        Ok(id)
    }

    /// Records a bill and its splits. Every referenced user must exist and
    /// every split must point at the bill and carry its author.
    pub fn insert_bill(&mut self, record: BillWithSplits) -> ResultEngine<Uuid> {
        let BillWithSplits { bill, splits } = record;
        if self.bills.contains_key(&bill.id) {
            return Err(EngineError::ExistingKey(bill.id.to_string()));
        }
        self.require_user(bill.author_id)?;
        for split in &splits {
            self.check_split(&bill, split)?;
            if self.splits.contains_key(&split.id) {
                return Err(EngineError::ExistingKey(split.id.to_string()));
            }
        }
        let mut seen = HashSet::new();
        if !splits.iter().all(|s| seen.insert(s.id)) {
            return Err(EngineError::ExistingKey("duplicate split id".to_string()));
        }

        let bill_id = bill.id;
        self.bills.insert(bill_id, bill);
        for split in splits {
            self.splits.insert(split.id, split);
        }
        Ok(bill_id)
    }

    /// Convenience for tests and tooling: records a bill authored by `author`
    /// with one split per `(recipient, amount)` share.
    pub fn record_bill(
        &mut self,
        author: Uuid,
        shares: &[(Uuid, Money)],
        created_at: DateTime<Utc>,
    ) -> ResultEngine<BillWithSplits> {
        let bill = Bill::new(author, created_at);
        let splits = shares
            .iter()
            .map(|(recipient, amount)| BillSplit::new(&bill, *recipient, *amount))
            .collect::<ResultEngine<Vec<_>>>()?;
        let record = BillWithSplits { bill, splits };
        self.insert_bill(record.clone())?;
        Ok(record)
    }

    pub fn split(&self, split_id: Uuid) -> ResultEngine<&BillSplit> {
        self.splits
            .get(&split_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("split {split_id}")))
    }

    pub fn bill(&self, bill_id: Uuid) -> ResultEngine<&Bill> {
        self.bills
            .get(&bill_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("bill {bill_id}")))
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn bills(&self) -> impl Iterator<Item = &Bill> {
        self.bills.values()
    }

    /// Dumps the ledger, rows ordered by id.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            users: self.users.values().cloned().collect(),
            bills: self.bills.values().cloned().collect(),
            splits: self.splits.values().cloned().collect(),
        }
    }

    fn require_user(&self, user_id: Uuid) -> ResultEngine<&User> {
        self.users
            .get(&user_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {user_id}")))
    }

    fn check_split(&self, bill: &Bill, split: &BillSplit) -> ResultEngine<()> {
        if split.bill_id != bill.id {
            return Err(EngineError::DataIntegrity(format!(
                "split {} does not belong to bill {}",
                split.id, bill.id
            )));
        }
        if split.author_id != bill.author_id {
            return Err(EngineError::DataIntegrity(format!(
                "split {} author differs from bill {} author",
                split.id, bill.id
            )));
        }
        if !split.split_amount.is_positive() {
            return Err(EngineError::DataIntegrity(format!(
                "split {} has non-positive amount {}",
                split.id, split.split_amount
            )));
        }
        self.require_user(split.recipient_id)?;
        Ok(())
    }

    fn parent_bill(&self, split: &BillSplit) -> ResultEngine<&Bill> {
        self.bills.get(&split.bill_id).ok_or_else(|| {
            EngineError::DataIntegrity(format!(
                "split {} references missing bill {}",
                split.id, split.bill_id
            ))
        })
    }

    fn collect_unpaid<F>(&self, filter: F) -> ResultEngine<Vec<BillSplit>>
    where
        F: Fn(&BillSplit) -> bool,
    {
        let mut rows = Vec::new();
        for split in self.splits.values() {
            if split.recipient_paid || !filter(split) {
                continue;
            }
            if self.parent_bill(split)?.paid {
                continue;
            }
            rows.push(split.clone());
        }
        Ok(rows)
    }
}

impl TryFrom<LedgerSnapshot> for MemoryLedger {
    type Error = EngineError;

    fn try_from(snapshot: LedgerSnapshot) -> Result<Self, Self::Error> {
        let mut ledger = MemoryLedger::new();
        for user in snapshot.users {
            ledger.add_user(user)?;
        }

        let mut splits_by_bill: BTreeMap<Uuid, Vec<BillSplit>> = BTreeMap::new();
        for split in snapshot.splits {
            splits_by_bill.entry(split.bill_id).or_default().push(split);
        }
        for bill in snapshot.bills {
            let splits = splits_by_bill.remove(&bill.id).unwrap_or_default();
            ledger.insert_bill(BillWithSplits { bill, splits })?;
        }
        if let Some((bill_id, _)) = splits_by_bill.into_iter().next() {
            return Err(EngineError::DataIntegrity(format!(
                "split references missing bill {bill_id}"
            )));
        }
        Ok(ledger)
    }
}

impl LedgerStore for MemoryLedger {
    fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        self.require_user(user_id).cloned()
    }

    fn user_by_name(&self, username: &str) -> ResultEngine<User> {
        self.users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(username.to_string()))
    }

    fn unpaid_splits_for_recipient(&self, user_id: Uuid) -> ResultEngine<Vec<BillSplit>> {
        self.collect_unpaid(|split| split.recipient_id == user_id)
    }

    fn unpaid_splits_for_author(&self, user_id: Uuid) -> ResultEngine<Vec<BillSplit>> {
        self.collect_unpaid(|split| split.author_id == user_id)
    }

    fn unpaid_splits_between(
        &self,
        payee_id: Uuid,
        payer_id: Uuid,
    ) -> ResultEngine<Vec<BillSplit>> {
        let mut rows = self
            .splits
            .values()
            .filter(|split| {
                !split.recipient_paid
                    && split.author_id == payee_id
                    && split.recipient_id == payer_id
            })
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(BillSplit::settlement_order);
        Ok(rows)
    }

    fn bills_with_splits(&self) -> ResultEngine<Vec<BillWithSplits>> {
        let mut grouped: BTreeMap<Uuid, BillWithSplits> = self
            .bills
            .values()
            .map(|bill| {
                (
                    bill.id,
                    BillWithSplits {
                        bill: bill.clone(),
                        splits: Vec::new(),
                    },
                )
            })
            .collect();
        for split in self.splits.values() {
            let entry = grouped.get_mut(&split.bill_id).ok_or_else(|| {
                EngineError::DataIntegrity(format!(
                    "split {} references missing bill {}",
                    split.id, split.bill_id
                ))
            })?;
            entry.splits.push(split.clone());
        }
        Ok(grouped.into_values().collect())
    }

    fn bill_with_splits(&self, bill_id: Uuid) -> ResultEngine<BillWithSplits> {
        let bill = self.bill(bill_id)?.clone();
        let splits = self
            .splits
            .values()
            .filter(|split| split.bill_id == bill_id)
            .cloned()
            .collect();
        Ok(BillWithSplits { bill, splits })
    }

    fn mark_splits_paid(&mut self, split_ids: &[Uuid]) -> ResultEngine<()> {
        // Validate first so a bad id leaves the ledger untouched.
        for id in split_ids {
            self.split(*id)?;
        }
        for id in split_ids {
            if let Some(split) = self.splits.get_mut(id) {
                split.recipient_paid = true;
            }
        }
        Ok(())
    }

    fn set_split_amount(&mut self, split_id: Uuid, amount: Money) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "split_amount must be > 0".to_string(),
            ));
        }
        let split = self
            .splits
            .get_mut(&split_id)
            .ok_or_else(|| EngineError::KeyNotFound(format!("split {split_id}")))?;
        split.split_amount = amount;
        Ok(())
    }

    fn create_reverse_obligation(
        &mut self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Money,
        at: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let record = self.record_bill(to_user, &[(from_user, amount)], at)?;
        Ok(record.bill.id)
    }

    fn mark_bills_paid(&mut self, bill_ids: &[Uuid]) -> ResultEngine<()> {
        for id in bill_ids {
            self.bill(*id)?;
        }
        for id in bill_ids {
            if let Some(bill) = self.bills.get_mut(id) {
                bill.paid = true;
            }
        }
        Ok(())
    }
}
