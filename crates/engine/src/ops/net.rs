use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, LedgerStore, Money, ResultEngine};

use super::{CounterpartyTotals, Engine, aggregate_owed_by, aggregate_owed_to};

/// One signed balance per counterparty, split by direction.
///
/// A counterparty appears in at most one of the two maps, always with a
/// positive amount. Counterparties whose debts cancel out appear in neither.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetBalances {
    pub you_owe: HashMap<Uuid, Money>,
    pub you_are_owed: HashMap<Uuid, Money>,
}

/// [`NetBalances`] keyed by username, for display.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBalances {
    pub you_owe: BTreeMap<String, Money>,
    pub you_are_owed: BTreeMap<String, Money>,
}

/// Nets what a user owes against what they are owed.
///
/// One-sided totals are carried over untouched. When both directions exist
/// the difference is rounded to cents (half away from zero) and only then
/// classified; the totals themselves are never pre-rounded.
pub fn net_balances(owed_by: &CounterpartyTotals, owed_to: &CounterpartyTotals) -> NetBalances {
    let mut net = NetBalances::default();
    let counterparties: HashSet<&Uuid> = owed_by.keys().chain(owed_to.keys()).collect();

    for counterparty in counterparties {
        match (owed_by.get(counterparty), owed_to.get(counterparty)) {
            (Some(&owe), None) => {
                net.you_owe.insert(*counterparty, owe);
            }
            (None, Some(&owed)) => {
                net.you_are_owed.insert(*counterparty, owed);
            }
            (Some(&owe), Some(&owed)) => {
                let amount = (owed - owe).round_cents();
                if amount.is_positive() {
                    net.you_are_owed.insert(*counterparty, amount);
                } else if amount.is_negative() {
                    net.you_owe.insert(*counterparty, -amount);
                }
            }
            (None, None) => {}
        }
    }

    net
}

impl NetBalances {
    /// Swaps user ids for usernames.
    pub fn resolve_names<S: LedgerStore + ?Sized>(&self, store: &S) -> ResultEngine<NamedBalances> {
        let resolve = |side: &HashMap<Uuid, Money>| -> ResultEngine<BTreeMap<String, Money>> {
            let mut named = BTreeMap::new();
            for (user_id, amount) in side {
                let user = store.user(*user_id)?;
                if named.insert(user.username.clone(), *amount).is_some() {
                    return Err(EngineError::DataIntegrity(format!(
                        "username {} is shared by several users",
                        user.username
                    )));
                }
            }
            Ok(named)
        };

        Ok(NamedBalances {
            you_owe: resolve(&self.you_owe)?,
            you_are_owed: resolve(&self.you_are_owed)?,
        })
    }
}

impl<S: LedgerStore> Engine<S> {
    /// Net balance of `user_id` against every counterparty.
    pub fn net_payments(&self, user_id: Uuid) -> ResultEngine<NetBalances> {
        self.store.user(user_id)?;
        let received = self.store.unpaid_splits_for_recipient(user_id)?;
        let authored = self.store.unpaid_splits_for_author(user_id)?;
        let owed_by = aggregate_owed_by(user_id, &received)?;
        let owed_to = aggregate_owed_to(user_id, &authored)?;
        let net = net_balances(&owed_by, &owed_to);
        tracing::debug!(
            %user_id,
            you_owe = net.you_owe.len(),
            you_are_owed = net.you_are_owed.len(),
            "computed net payments"
        );
        Ok(net)
    }
}
