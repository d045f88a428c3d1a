//! Shared-expense ledger: who owes whom, and how payments settle it.
//!
//! Users record [`Bill`]s and split them into [`BillSplit`]s, one per
//! recipient. The engine reads those rows through a [`LedgerStore`] and
//!
//! - aggregates open splits per counterparty ([`Engine::debts_owed_by`],
//!   [`Engine::debts_owed_to`]),
//! - nets mutual debts into one balance per counterparty
//!   ([`Engine::net_payments`]),
//! - allocates a payment over the payer's open splits, oldest first
//!   ([`Engine::settle_up`]),
//! - flags bills whose splits are all settled ([`Engine::complete_bills`]).
//!
//! Each rule is also exposed as a pure function over rows
//! ([`aggregate_owed_by`], [`net_balances`], [`allocate_payment`],
//! [`scan_completion`]).
//!
//! ```rust
//! use chrono::Utc;
//! use engine::{Engine, MemoryLedger, Money, SettleUpCmd, User};
//!
//! let mut ledger = MemoryLedger::new();
//! let alice = ledger.add_user(User::new("alice").unwrap()).unwrap();
//! let bob = ledger.add_user(User::new("bob").unwrap()).unwrap();
//! ledger
//!     .record_bill(alice, &[(bob, Money::from_cents(20_00))], Utc::now())
//!     .unwrap();
//!
//! let mut engine = Engine::builder().store(ledger).build().unwrap();
//! let net = engine.net_payments(bob).unwrap();
//! assert_eq!(net.you_owe[&alice], Money::from_cents(20_00));
//!
//! let receipt = engine
//!     .settle_up(SettleUpCmd::new(bob, alice, Money::from_cents(25_00)))
//!     .unwrap();
//! assert_eq!(receipt.settlement.overpayment, Money::from_cents(5_00));
//! assert_eq!(engine.net_payments(bob).unwrap().you_are_owed[&alice], Money::from_cents(5_00));
//! ```

pub use bills::{Bill, BillSplit, BillWithSplits};
pub use commands::SettleUpCmd;
pub use error::EngineError;
pub use memory::{LedgerSnapshot, MemoryLedger};
pub use money::Money;
pub use ops::{
    CompletionScan, CounterpartyTotals, Engine, EngineBuilder, NamedBalances, NetBalances,
    PartialSettlement, Settlement, SettlementReceipt, aggregate_owed_by, aggregate_owed_to,
    allocate_payment, is_bill_complete, net_balances, scan_completion, validate_amount,
    validate_settlement,
};
pub use store::LedgerStore;
pub use users::User;

mod bills;
mod commands;
mod error;
mod memory;
mod money;
mod ops;
mod store;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
