use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use engine::{Engine, EngineError, LedgerStore, MemoryLedger, Money, User};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

fn money(value: rust_decimal::Decimal) -> Money {
    Money::new(value)
}

fn users(ledger: &mut MemoryLedger, names: &[&str]) -> Vec<Uuid> {
    names
        .iter()
        .map(|name| ledger.add_user(User::new(name).unwrap()).unwrap())
        .collect()
}

#[test]
fn net_payments_for_a_group_dinner() {
    let mut ledger = MemoryLedger::new();
    let ids = users(&mut ledger, &["me", "matt", "sam", "drew", "kyle"]);
    let (me, matt, sam, drew, kyle) = (ids[0], ids[1], ids[2], ids[3], ids[4]);

    // I paid dinner: everyone owes me a share.
    ledger
        .record_bill(
            me,
            &[
                (matt, money(dec!(15.0))),
                (sam, money(dec!(10.0))),
                (drew, money(dec!(10.0))),
            ],
            at(1),
        )
        .unwrap();
    // Others paid for me.
    ledger
        .record_bill(matt, &[(me, money(dec!(11.11)))], at(2))
        .unwrap();
    ledger
        .record_bill(kyle, &[(me, money(dec!(25.22)))], at(3))
        .unwrap();
    ledger
        .record_bill(drew, &[(me, money(dec!(30.22)))], at(4))
        .unwrap();

    let engine = Engine::builder().store(ledger).build().unwrap();

    let owed_by = engine.debts_owed_by(me).unwrap();
    assert_eq!(owed_by.len(), 3);
    assert_eq!(owed_by[&kyle], money(dec!(25.22)));

    let owed_to = engine.debts_owed_to(me).unwrap();
    assert_eq!(owed_to.len(), 3);
    assert_eq!(owed_to[&sam], money(dec!(10.0)));

    let net = engine.net_payments(me).unwrap();
    assert_eq!(net.you_are_owed[&matt], money(dec!(3.89)));
    assert_eq!(net.you_are_owed[&sam], money(dec!(10.0)));
    assert_eq!(net.you_owe[&kyle], money(dec!(25.22)));
    assert_eq!(net.you_owe[&drew], money(dec!(20.22)));
    assert_eq!(net.you_owe.len() + net.you_are_owed.len(), 4);

    let named = net.resolve_names(engine.store()).unwrap();
    assert_eq!(named.you_are_owed["matt"], money(dec!(3.89)));
    assert_eq!(named.you_owe["drew"], money(dec!(20.22)));
}

#[test]
fn many_small_splits_are_rounded_once() {
    let mut ledger = MemoryLedger::new();
    let ids = users(&mut ledger, &["me", "pat"]);
    let (me, pat) = (ids[0], ids[1]);

    // Three 0.335 splits owed to me sum to 1.005; rounding each one first
    // would give 1.02.
    for secs in 0..3 {
        ledger
            .record_bill(me, &[(pat, money(dec!(0.335)))], at(secs))
            .unwrap();
    }
    ledger
        .record_bill(pat, &[(me, money(dec!(0.5)))], at(10))
        .unwrap();

    let engine = Engine::builder().store(ledger).build().unwrap();
    let net = engine.net_payments(me).unwrap();

    assert_eq!(net.you_are_owed[&pat], money(dec!(0.51)));
}

#[test]
fn settled_splits_and_paid_bills_do_not_count() {
    let mut ledger = MemoryLedger::new();
    let ids = users(&mut ledger, &["alice", "bob"]);
    let (alice, bob) = (ids[0], ids[1]);

    let settled = ledger
        .record_bill(alice, &[(bob, Money::from_cents(700))], at(1))
        .unwrap();
    let closed = ledger
        .record_bill(alice, &[(bob, Money::from_cents(900))], at(2))
        .unwrap();
    ledger
        .record_bill(alice, &[(bob, Money::from_cents(100))], at(3))
        .unwrap();
    ledger.mark_splits_paid(&[settled.splits[0].id]).unwrap();
    ledger.mark_bills_paid(&[closed.bill.id]).unwrap();

    let engine = Engine::builder().store(ledger).build().unwrap();

    assert_eq!(engine.debts_owed_by(bob).unwrap()[&alice], Money::from_cents(100));
    assert_eq!(engine.debts_owed_to(alice).unwrap()[&bob], Money::from_cents(100));
}

#[test]
fn overflowing_balances_are_an_error() {
    let mut ledger = MemoryLedger::new();
    let ids = users(&mut ledger, &["alice", "bob"]);
    let (alice, bob) = (ids[0], ids[1]);
    let huge = money(dec!(50000000000000000000000000000));
    for secs in [1, 2] {
        ledger.record_bill(alice, &[(bob, huge)], at(secs)).unwrap();
    }
    let engine = Engine::builder().store(ledger).build().unwrap();

    let err = engine.net_payments(bob).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert!(engine.debts_owed_to(alice).is_err());
}

#[test]
fn unknown_user_is_not_found() {
    let engine = Engine::builder()
        .store(MemoryLedger::new())
        .build()
        .unwrap();

    let err = engine.net_payments(Uuid::new_v4()).unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[test]
fn complete_bills_applies_the_diff_once() {
    let mut ledger = MemoryLedger::new();
    let ids = users(&mut ledger, &["alice", "bob", "carol"]);
    let (alice, bob, carol) = (ids[0], ids[1], ids[2]);

    let shared = ledger
        .record_bill(
            alice,
            &[(bob, Money::from_cents(500)), (carol, Money::from_cents(500))],
            at(1),
        )
        .unwrap();
    let solo = ledger
        .record_bill(alice, &[(bob, Money::from_cents(300))], at(2))
        .unwrap();
    ledger
        .mark_splits_paid(&[shared.splits[0].id, solo.splits[0].id])
        .unwrap();

    let mut engine = Engine::builder().store(ledger).build().unwrap();

    let scan = engine.complete_bills().unwrap();
    assert_eq!(scan.newly_paid, vec![solo.bill.id]);
    assert!(engine.store().bill(solo.bill.id).unwrap().paid);
    assert!(!engine.store().bill(shared.bill.id).unwrap().paid);

    let again = engine.complete_bills().unwrap();
    assert!(again.newly_paid.is_empty());
    assert!(again.fully_paid.contains(&solo.bill.id));
}
