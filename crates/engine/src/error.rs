//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when a settlement amount is not positive or a
//!   money string cannot be parsed.
//! - [`InvalidCounterparty`] thrown when a user tries to settle with
//!   themselves.
//! - [`KeyNotFound`] thrown when a user, bill or split is missing from the
//!   ledger.
//! - [`DataIntegrity`] thrown when the ledger holds rows the engine refuses to
//!   allocate against.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidCounterparty`]: EngineError::InvalidCounterparty
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`DataIntegrity`]: EngineError::DataIntegrity
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid counterparty: {0}")]
    InvalidCounterparty(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Ledger integrity violation: {0}")]
    DataIntegrity(String),
}
