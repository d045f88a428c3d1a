//! Ledger collaborator contract.
//!
//! The engine never owns users, bills or splits. It reads snapshots through
//! [`LedgerStore`] and hands mutations back to it. Implementations decide how
//! rows are persisted; [`crate::MemoryLedger`] is the in-memory one.
//!
//! Nothing here is atomic. A host running settlements concurrently must
//! serialize them per (payer, payee) pair or wrap the applied mutations in a
//! single transaction keyed on the selected split ids.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{BillSplit, BillWithSplits, Money, ResultEngine, User};

pub trait LedgerStore {
    /// Looks up a user, failing with `KeyNotFound` if absent.
    fn user(&self, user_id: Uuid) -> ResultEngine<User>;

    /// Looks up a user by display name, failing with `KeyNotFound` if absent.
    fn user_by_name(&self, username: &str) -> ResultEngine<User>;

    /// Splits received by `user_id` that are unsettled on an unpaid bill.
    fn unpaid_splits_for_recipient(&self, user_id: Uuid) -> ResultEngine<Vec<BillSplit>>;

    /// Unsettled splits on unpaid bills authored by `user_id`.
    fn unpaid_splits_for_author(&self, user_id: Uuid) -> ResultEngine<Vec<BillSplit>>;

    /// Unsettled splits that `payer_id` owes on bills authored by `payee_id`.
    ///
    /// Stores should return them oldest first, but callers must not rely on
    /// it.
    fn unpaid_splits_between(
        &self,
        payee_id: Uuid,
        payer_id: Uuid,
    ) -> ResultEngine<Vec<BillSplit>>;

    /// Every bill with all of its splits.
    fn bills_with_splits(&self) -> ResultEngine<Vec<BillWithSplits>>;

    /// One bill with all of its splits, failing with `KeyNotFound` if absent.
    fn bill_with_splits(&self, bill_id: Uuid) -> ResultEngine<BillWithSplits>;

    /// Flags the given splits as settled by their recipient.
    fn mark_splits_paid(&mut self, split_ids: &[Uuid]) -> ResultEngine<()>;

    /// Rewrites the outstanding amount of a partially settled split.
    fn set_split_amount(&mut self, split_id: Uuid, amount: Money) -> ResultEngine<()>;

    /// Records that `from_user` now owes `to_user` the given amount: a new
    /// bill authored by `to_user` with a single split received by
    /// `from_user`. Returns the new bill id.
    fn create_reverse_obligation(
        &mut self,
        from_user: Uuid,
        to_user: Uuid,
        amount: Money,
        at: DateTime<Utc>,
    ) -> ResultEngine<Uuid>;

    /// Flags the given bills as fully paid.
    fn mark_bills_paid(&mut self, bill_ids: &[Uuid]) -> ResultEngine<()>;
}
