use crate::{EngineError, LedgerStore, ResultEngine};

mod balances;
mod completion;
mod net;
mod settle;

pub use balances::{CounterpartyTotals, aggregate_owed_by, aggregate_owed_to};
pub use completion::{CompletionScan, is_bill_complete, scan_completion};
pub use net::{NamedBalances, NetBalances, net_balances};
pub use settle::{
    PartialSettlement, Settlement, SettlementReceipt, allocate_payment, validate_amount,
    validate_settlement,
};

/// Runs the netting and settlement rules against a [`LedgerStore`].
///
/// Read paths borrow the store; write paths take `&mut self`, so one engine
/// never applies two settlements at the same time.
#[derive(Debug)]
pub struct Engine<S> {
    store: S,
}

impl<S: LedgerStore> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder { store: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hands the store back, e.g. to persist it.
    pub fn into_store(self) -> S {
        self.store
    }
}

/// The builder for `Engine`
#[derive(Debug)]
pub struct EngineBuilder<S> {
    store: Option<S>,
}

impl<S: LedgerStore> EngineBuilder<S> {
    /// Pass the required ledger store
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let store = self
            .store
            .ok_or_else(|| EngineError::KeyNotFound("ledger store".to_string()))?;
        Ok(Engine { store })
    }
}
