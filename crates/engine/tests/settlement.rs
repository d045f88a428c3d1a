use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use engine::{
    Engine, EngineError, LedgerStore, MemoryLedger, Money, PartialSettlement, SettleUpCmd, User,
};

struct Fixture {
    engine: Engine<MemoryLedger>,
    alice: Uuid,
    bob: Uuid,
    splits: Vec<Uuid>,
    bills: Vec<Uuid>,
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

/// Bob owes Alice three entries of 10.00, 15.00 and 5.00, oldest first.
fn bob_owes_alice() -> Fixture {
    let mut ledger = MemoryLedger::new();
    let alice = ledger.add_user(User::new("alice").unwrap()).unwrap();
    let bob = ledger.add_user(User::new("bob").unwrap()).unwrap();

    let mut splits = Vec::new();
    let mut bills = Vec::new();
    for (secs, cents) in [(1, 1000), (2, 1500), (3, 500)] {
        let record = ledger
            .record_bill(alice, &[(bob, Money::from_cents(cents))], at(secs))
            .unwrap();
        splits.push(record.splits[0].id);
        bills.push(record.bill.id);
    }

    let engine = Engine::builder().store(ledger).build().unwrap();
    Fixture {
        engine,
        alice,
        bob,
        splits,
        bills,
    }
}

#[test]
fn partial_payment_settles_oldest_and_shrinks_next() {
    let Fixture {
        mut engine,
        alice,
        bob,
        splits,
        bills,
    } = bob_owes_alice();

    let receipt = engine
        .settle_up(SettleUpCmd::new(bob, alice, Money::from_cents(2000)))
        .unwrap();

    assert_eq!(receipt.settlement.fully_settled, vec![splits[0]]);
    assert_eq!(
        receipt.settlement.partially_settled,
        Some(PartialSettlement {
            split_id: splits[1],
            remaining: Money::from_cents(500),
        })
    );
    assert_eq!(receipt.settlement.overpayment, Money::ZERO);
    assert_eq!(receipt.reverse_bill_id, None);
    assert_eq!(receipt.completed_bills, vec![bills[0]]);

    let ledger = engine.store();
    assert!(ledger.split(splits[0]).unwrap().recipient_paid);
    let shrunk = ledger.split(splits[1]).unwrap();
    assert!(!shrunk.recipient_paid);
    assert_eq!(shrunk.split_amount, Money::from_cents(500));
    let untouched = ledger.split(splits[2]).unwrap();
    assert!(!untouched.recipient_paid);
    assert_eq!(untouched.split_amount, Money::from_cents(500));

    assert!(ledger.bill(bills[0]).unwrap().paid);
    assert!(!ledger.bill(bills[1]).unwrap().paid);

    let net = engine.net_payments(bob).unwrap();
    assert_eq!(net.you_owe[&alice], Money::from_cents(1000));
}

#[test]
fn overpayment_creates_reverse_obligation() {
    let Fixture {
        mut engine,
        alice,
        bob,
        splits,
        bills,
    } = bob_owes_alice();

    let receipt = engine
        .settle_up(SettleUpCmd::new(bob, alice, Money::from_cents(3500)).occurred_at(at(100)))
        .unwrap();

    assert_eq!(receipt.settlement.fully_settled, splits);
    assert_eq!(receipt.settlement.partially_settled, None);
    assert_eq!(receipt.settlement.overpayment, Money::from_cents(500));
    assert_eq!(receipt.completed_bills, bills);

    let reverse_id = receipt.reverse_bill_id.unwrap();
    let reverse = engine.store().bill_with_splits(reverse_id).unwrap();
    assert_eq!(reverse.bill.author_id, bob);
    assert_eq!(reverse.bill.created_at, at(100));
    assert_eq!(reverse.splits.len(), 1);
    assert_eq!(reverse.splits[0].recipient_id, alice);
    assert_eq!(reverse.splits[0].split_amount, Money::from_cents(500));

    let alice_view = engine.net_payments(alice).unwrap();
    assert_eq!(alice_view.you_owe[&bob], Money::from_cents(500));
    assert!(alice_view.you_are_owed.is_empty());
}

#[test]
fn exact_payment_clears_the_pair() {
    let Fixture {
        mut engine,
        alice,
        bob,
        splits,
        ..
    } = bob_owes_alice();

    let receipt = engine
        .settle_up(SettleUpCmd::new(bob, alice, Money::from_cents(3000)))
        .unwrap();

    assert_eq!(receipt.settlement.fully_settled, splits);
    assert_eq!(receipt.settlement.overpayment, Money::ZERO);
    assert_eq!(receipt.reverse_bill_id, None);

    let net = engine.net_payments(bob).unwrap();
    assert!(net.you_owe.is_empty());
    assert!(net.you_are_owed.is_empty());
    assert_eq!(engine.store().bills().count(), 3);
}

#[test]
fn paying_someone_you_owe_nothing_reverses_the_debt() {
    let Fixture {
        mut engine,
        alice,
        bob,
        ..
    } = bob_owes_alice();

    // Alice owes Bob nothing, so her whole payment becomes his debt.
    let receipt = engine
        .settle_up(SettleUpCmd::new(alice, bob, Money::from_cents(4200)))
        .unwrap();

    assert!(receipt.settlement.fully_settled.is_empty());
    assert_eq!(receipt.settlement.partially_settled, None);
    assert_eq!(receipt.settlement.overpayment, Money::from_cents(4200));
    assert!(receipt.completed_bills.is_empty());

    let reverse = engine
        .store()
        .bill_with_splits(receipt.reverse_bill_id.unwrap())
        .unwrap();
    assert_eq!(reverse.bill.author_id, alice);
    assert_eq!(reverse.splits[0].recipient_id, bob);

    // Bob already owed 30.00 and now owes the 42.00 back as well.
    let net = engine.net_payments(bob).unwrap();
    assert_eq!(net.you_owe[&alice], Money::from_cents(7200));
}

#[test]
fn plan_does_not_touch_the_ledger() {
    let Fixture {
        engine, alice, bob, ..
    } = bob_owes_alice();
    let before = engine.store().snapshot();

    let plan = engine
        .plan_settlement(bob, alice, Money::from_cents(2000))
        .unwrap();

    assert_eq!(plan.fully_settled.len(), 1);
    assert_eq!(engine.store().snapshot(), before);
}

#[test]
fn invalid_requests_are_rejected_before_any_read() {
    let Fixture {
        mut engine,
        alice,
        bob,
        ..
    } = bob_owes_alice();

    let err = engine
        .settle_up(SettleUpCmd::new(bob, alice, Money::ZERO))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .settle_up(SettleUpCmd::new(bob, bob, Money::from_cents(100)))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCounterparty(_)));

    let err = engine
        .settle_up(SettleUpCmd::new(
            Uuid::new_v4(),
            alice,
            Money::from_cents(100),
        ))
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[test]
fn sub_cent_remainder_is_treated_as_settled() {
    let mut ledger = MemoryLedger::new();
    let alice = ledger.add_user(User::new("alice").unwrap()).unwrap();
    let bob = ledger.add_user(User::new("bob").unwrap()).unwrap();
    let record = ledger
        .record_bill(alice, &[(bob, Money::new(dec!(33.334)))], at(1))
        .unwrap();
    let mut engine = Engine::builder().store(ledger).build().unwrap();

    let receipt = engine
        .settle_up(SettleUpCmd::new(bob, alice, Money::new(dec!(33.33))))
        .unwrap();

    assert_eq!(
        receipt.settlement.partially_settled.map(|p| p.remaining),
        Some(Money::ZERO)
    );
    assert!(engine.store().split(record.splits[0].id).unwrap().recipient_paid);
    assert_eq!(receipt.completed_bills, vec![record.bill.id]);
}
