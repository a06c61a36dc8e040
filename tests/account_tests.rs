//! Integration tests for standalone account operations and admission
//! control.

mod common;

use std::sync::Arc;

use common::fixtures::*;
use rstest::rstest;
use teller::application::admission;
use teller::domain::entities::{Operation, OperationStatus};
use teller::domain::value_objects::Money;
use teller::infrastructure::{IsolationLevel, LedgerStore, OperationLog};
use teller::{BankError, Teller};

#[rstest]
#[tokio::test]
async fn accrual_credits_account_from_reserve() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 500).await;
    let operation = Operation::accrual(alice.id, bank.id, Money::new(1_500));

    let receipt = bench
        .teller
        .bank_account_accrual(&alice, operation)
        .await
        .unwrap();

    assert!(receipt.log_retired);
    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(2_000));
    assert_eq!(card_amount_of(&bench.store, &alice).await, Money::new(2_000));
    assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(998_500));
}

#[rstest]
#[tokio::test]
async fn withdraw_debits_account_into_reserve() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 2_000).await;
    let operation = Operation::withdraw(alice.id, bank.id, Money::new(700));

    bench
        .teller
        .bank_account_withdraw(&alice, operation)
        .await
        .unwrap();

    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(1_300));
    assert_eq!(card_amount_of(&bench.store, &alice).await, Money::new(1_300));
    assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(1_000_700));
}

#[rstest]
#[tokio::test]
async fn withdraw_beyond_balance_is_restricted() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 100).await;
    let operation = Operation::withdraw(alice.id, bank.id, Money::new(500));

    let error = bench
        .teller
        .bank_account_withdraw(&alice, operation)
        .await
        .unwrap_err();

    assert!(matches!(error, BankError::OperationRestricted { .. }));
    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(100));
}

#[rstest]
#[tokio::test]
async fn operation_for_another_user_is_rejected() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 1_000).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 1_000).await;
    let operation = Operation::accrual(bob.id, bank.id, Money::new(100));

    let error = bench
        .teller
        .bank_account_accrual(&alice, operation)
        .await
        .unwrap_err();

    assert!(matches!(error, BankError::OperationFailed(_)));
}

#[rstest]
#[tokio::test]
async fn admission_rejects_a_duplicate_operation_id() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 1_000).await;

    let mut operation = Operation::accrual(alice.id, bank.id, Money::new(100));
    let mut tx = bench
        .store
        .begin(IsolationLevel::RepeatableRead)
        .await
        .unwrap();

    let verdict = admission::admit(tx.as_mut(), &bench.log, &mut operation)
        .await
        .unwrap();
    assert_eq!(verdict, OperationStatus::Ok);

    // Same id again: rejected before any check runs, no double staging.
    let error = admission::admit(tx.as_mut(), &bench.log, &mut operation)
        .await
        .unwrap_err();
    assert!(matches!(error, BankError::OperationFailed(_)));
    assert_eq!(bench.log.staged().await.unwrap().len(), 1);

    tx.rollback().await.unwrap();
}

#[rstest]
#[tokio::test]
async fn rejected_operations_are_never_staged() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 100).await;

    let mut operation = Operation::withdraw(alice.id, bank.id, Money::new(500));
    let mut tx = bench
        .store
        .begin(IsolationLevel::RepeatableRead)
        .await
        .unwrap();

    let verdict = admission::admit(tx.as_mut(), &bench.log, &mut operation)
        .await
        .unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(verdict, OperationStatus::Restricted);
    assert_eq!(operation.status, OperationStatus::Restricted);
    assert!(bench.log.staged().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn cleanup_failure_is_surfaced_but_not_rolled_back() {
    let store = teller::infrastructure::MemoryLedgerStore::new();
    let log = FailingCleanupLog::new();
    let teller = Teller::new(Arc::new(store.clone()), Arc::new(log.clone()));

    let bank = seed_bank(&store, "First National", 1_000_000).await;
    let alice = enroll_user(&teller, &bank, "Alice", 0).await;
    let operation = Operation::accrual(alice.id, bank.id, Money::new(900));

    let receipt = teller.bank_account_accrual(&alice, operation).await.unwrap();

    // The ledger mutation stands even though the document survived.
    assert!(!receipt.log_retired);
    assert_eq!(balance_of(&store, &alice).await, Money::new(900));
    assert_eq!(log.staged().await.unwrap().len(), 1);
}
