//! Ledger participants.
//!
//! The engine references users by `id` everywhere; `username` is only used
//! when a report is rendered for humans.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

impl User {
    /// Creates a user with a fresh id. The display name must not be blank.
    pub fn new(username: &str) -> ResultEngine<Self> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidCounterparty(
                "username must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            username: trimmed.to_string(),
        })
    }
}
