//! Integration tests for the transfer workflow.

mod common;

use common::fixtures::*;
use proptest::prelude::*;
use rstest::rstest;
use teller::BankError;
use teller::domain::value_objects::Money;
use teller::infrastructure::OperationLog;

#[rstest]
#[tokio::test]
async fn same_bank_transfer_moves_balances_and_leaves_reserve() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 10_000).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;

    let receipt = bench
        .teller
        .transfer(&alice, &bob, Money::new(3_000))
        .await
        .unwrap();

    assert_eq!(receipt.operations.len(), 2);
    assert!(receipt.log_retired);
    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(7_000));
    assert_eq!(balance_of(&bench.store, &bob).await, Money::new(8_000));
    assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(1_000_000));
}

#[rstest]
#[tokio::test]
async fn cross_bank_transfer_adjusts_both_reserves() {
    let bench = TestBench::new();
    let bank_x = seed_bank(&bench.store, "Bank X", 500_000).await;
    let bank_y = seed_bank(&bench.store, "Bank Y", 500_000).await;
    let alice = enroll_user(&bench.teller, &bank_x, "Alice", 10_000).await;
    let bob = enroll_user(&bench.teller, &bank_y, "Bob", 0).await;

    bench
        .teller
        .transfer(&alice, &bob, Money::new(2_000))
        .await
        .unwrap();

    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(8_000));
    assert_eq!(balance_of(&bench.store, &bob).await, Money::new(2_000));
    assert_eq!(reserve_of(&bench.store, &bank_x).await, Money::new(502_000));
    assert_eq!(reserve_of(&bench.store, &bank_y).await, Money::new(498_000));
}

#[rstest]
#[tokio::test]
async fn card_mirror_matches_account_after_transfer() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 10_000).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;

    bench
        .teller
        .transfer(&alice, &bob, Money::new(1_234))
        .await
        .unwrap();

    for user in [&alice, &bob] {
        assert_eq!(
            card_amount_of(&bench.store, user).await,
            balance_of(&bench.store, user).await
        );
    }
}

#[rstest]
#[tokio::test]
async fn insufficient_funds_leaves_all_balances_unchanged() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 100).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;

    let error = bench
        .teller
        .transfer(&alice, &bob, Money::new(500))
        .await
        .unwrap_err();

    assert!(matches!(error, BankError::OperationRestricted { .. }));
    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(100));
    assert_eq!(balance_of(&bench.store, &bob).await, Money::new(5_000));
    assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(1_000_000));
    assert!(bench.log.staged().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn non_positive_amount_is_rejected_without_a_transaction() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 10_000).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;

    for amount in [Money::zero(), Money::new(-50)] {
        let error = bench
            .teller
            .transfer(&alice, &bob, amount)
            .await
            .unwrap_err();
        assert!(matches!(error, BankError::OperationFailed(_)));
    }

    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(10_000));
}

#[rstest]
#[tokio::test]
async fn transfer_to_self_executes_both_legs_and_nets_to_zero() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let alice = enroll_user(&bench.teller, &bank, "Alice", 10_000).await;

    let receipt = bench
        .teller
        .transfer(&alice, &alice, Money::new(4_000))
        .await
        .unwrap();

    assert_eq!(receipt.operations.len(), 2);
    assert_eq!(balance_of(&bench.store, &alice).await, Money::new(10_000));
    assert_eq!(
        card_amount_of(&bench.store, &alice).await,
        Money::new(10_000)
    );
    assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(1_000_000));
}

#[rstest]
#[tokio::test]
async fn unknown_sender_is_rejected() {
    let bench = TestBench::new();
    let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
    let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;
    let stranger = teller::domain::entities::User::new(
        "Mallory",
        "mallory@example.com",
        27,
        "argon2id$stub",
    );

    let error = bench
        .teller
        .transfer(&stranger, &bob, Money::new(100))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        BankError::EntityNotExist(teller::EntityKind::User)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Conservation: a same-bank transfer never creates or destroys
    /// money, whatever the amount.
    #[test]
    fn same_bank_conservation(amount in 1i64..=10_000) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let bench = TestBench::new();
            let bank = seed_bank(&bench.store, "First National", 1_000_000).await;
            let alice = enroll_user(&bench.teller, &bank, "Alice", 10_000).await;
            let bob = enroll_user(&bench.teller, &bank, "Bob", 5_000).await;

            bench
                .teller
                .transfer(&alice, &bob, Money::new(amount))
                .await
                .unwrap();

            let total = balance_of(&bench.store, &alice)
                .await
                .checked_add(balance_of(&bench.store, &bob).await)
                .unwrap();
            assert_eq!(total, Money::new(15_000));
            assert_eq!(reserve_of(&bench.store, &bank).await, Money::new(1_000_000));
        });
    }

    /// Conservation across banks: both customer balances and both
    /// reserves sum to the same total before and after.
    #[test]
    fn cross_bank_conservation(amount in 1i64..=10_000) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let bench = TestBench::new();
            let bank_x = seed_bank(&bench.store, "Bank X", 500_000).await;
            let bank_y = seed_bank(&bench.store, "Bank Y", 500_000).await;
            let alice = enroll_user(&bench.teller, &bank_x, "Alice", 10_000).await;
            let bob = enroll_user(&bench.teller, &bank_y, "Bob", 5_000).await;

            bench
                .teller
                .transfer(&alice, &bob, Money::new(amount))
                .await
                .unwrap();

            let reserve_x = reserve_of(&bench.store, &bank_x).await;
            let reserve_y = reserve_of(&bench.store, &bank_y).await;
            let total = balance_of(&bench.store, &alice)
                .await
                .checked_add(balance_of(&bench.store, &bob).await)
                .unwrap()
                .checked_add(reserve_x)
                .unwrap()
                .checked_add(reserve_y)
                .unwrap();
            assert_eq!(total, Money::new(1_015_000));
        });
    }
}
