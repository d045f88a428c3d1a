//! Subcommand handlers. Each one takes the loaded ledger, runs the engine and
//! returns the response body plus the ledger to persist, if it changed.

use api_types::{
    balances::NetPayments,
    completion::CompletionResponse,
    settlement::{PartialSettlementView, SettlementResponse},
};
use engine::{
    Engine, EngineError, LedgerStore, MemoryLedger, Money, SettleUpCmd, SettlementReceipt, User,
    validate_amount,
};

use crate::error::Result;

pub fn balances(ledger: MemoryLedger, username: &str) -> Result<NetPayments> {
    let user = ledger.user_by_name(username)?;
    let engine = Engine::builder().store(ledger).build()?;
    let named = engine.net_payments(user.id)?.resolve_names(engine.store())?;

    Ok(NetPayments {
        username: user.username,
        you_owe: named
            .you_owe
            .into_iter()
            .map(|(name, amount)| (name, amount.to_string()))
            .collect(),
        you_are_owed: named
            .you_are_owed
            .into_iter()
            .map(|(name, amount)| (name, amount.to_string()))
            .collect(),
    })
}

pub fn plan(
    ledger: MemoryLedger,
    from: &str,
    to: &str,
    amount: Money,
) -> Result<SettlementResponse> {
    let (payer, payee) = counterparties(&ledger, from, to, amount)?;
    let engine = Engine::builder().store(ledger).build()?;
    let receipt = SettlementReceipt {
        settlement: engine.plan_settlement(payer.id, payee.id, amount)?,
        reverse_bill_id: None,
        completed_bills: Vec::new(),
    };

    Ok(settlement_response(&payer, &payee, amount, receipt, true))
}

pub fn settle(
    ledger: MemoryLedger,
    from: &str,
    to: &str,
    amount: Money,
) -> Result<(SettlementResponse, MemoryLedger)> {
    let (payer, payee) = counterparties(&ledger, from, to, amount)?;
    let mut engine = Engine::builder().store(ledger).build()?;
    let receipt = engine.settle_up(SettleUpCmd::new(payer.id, payee.id, amount))?;

    let response = settlement_response(&payer, &payee, amount, receipt, false);
    Ok((response, engine.into_store()))
}

pub fn complete(ledger: MemoryLedger) -> Result<(CompletionResponse, MemoryLedger)> {
    let mut engine = Engine::builder().store(ledger).build()?;
    let scan = engine.complete_bills()?;

    let response = CompletionResponse {
        fully_paid: scan.fully_paid.into_iter().collect(),
        newly_paid: scan.newly_paid,
    };
    Ok((response, engine.into_store()))
}

/// Rejects the request before any lookup, then resolves payer and payee.
fn counterparties(
    ledger: &MemoryLedger,
    from: &str,
    to: &str,
    amount: Money,
) -> Result<(User, User)> {
    validate_amount(amount)?;
    if from == to {
        let reason = format!("{from} cannot pay themselves");
        return Err(EngineError::InvalidCounterparty(reason).into());
    }
    Ok((ledger.user_by_name(from)?, ledger.user_by_name(to)?))
}

fn settlement_response(
    payer: &User,
    payee: &User,
    amount: Money,
    receipt: SettlementReceipt,
    dry_run: bool,
) -> SettlementResponse {
    let SettlementReceipt {
        settlement,
        reverse_bill_id,
        completed_bills,
    } = receipt;

    SettlementResponse {
        payer: payer.username.clone(),
        payee: payee.username.clone(),
        amount: amount.to_string(),
        fully_settled: settlement.fully_settled,
        partially_settled: settlement
            .partially_settled
            .map(|partial| PartialSettlementView {
                split_id: partial.split_id,
                remaining: partial.remaining.to_string(),
            }),
        overpayment: settlement.overpayment.to_string(),
        reverse_bill_id,
        completed_bills,
        dry_run,
    }
}
