//! End-to-end shift flows against an in-memory database.
//!
//! Each test runs the full stack: service orchestration, SQLite
//! persistence, and the ledger fold in caixa-core.

use std::sync::Arc;

use caixa_core::{CoreError, Money, PaymentCollector, TenderMethod, TerminalSession};
use caixa_db::{Database, DbConfig};
use caixa_service::{
    render_report, AllowAll, RegisterService, ServiceError, SessionService, StoreConfig,
};

async fn engine(config: StoreConfig) -> (RegisterService, SessionService) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let registers = RegisterService::new(db.clone(), Arc::new(AllowAll), config);
    let sessions = SessionService::new(db);
    (registers, sessions)
}

async fn open_with_session(
    registers: &RegisterService,
    sessions: &SessionService,
    opening_cents: i64,
) -> (String, TerminalSession) {
    let register = registers
        .open_register("op-1", Money::from_cents(opening_cents), None)
        .await
        .unwrap();
    let session = sessions
        .start_session(&register.id, "Balcão 1", "op-1")
        .await
        .unwrap();
    (register.id, session)
}

fn cash_sale(total_cents: i64, tendered_cents: i64, reference: &str) -> PaymentCollector {
    let mut collector = PaymentCollector::new(Money::from_cents(total_cents), reference).unwrap();
    collector
        .add_tender(TenderMethod::Cash, Money::from_cents(tendered_cents))
        .unwrap();
    collector
}

/// Full shift: open 100.00, sale cash 35.00, sale pix 20.00, withdrawal
/// 10.00, close counting 125.00. The drawer reconciles exactly.
#[tokio::test]
async fn full_shift_reconciles_to_zero_variance() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let outcome = registers
        .record_sale(&register_id, &session.id, cash_sale(3_500, 3_500, "order-1"))
        .await
        .unwrap();
    assert_eq!(outcome.change_cents, 0);
    assert_eq!(outcome.balances.cash_balance_cents, 13_500);

    let mut pix = PaymentCollector::new(Money::from_cents(2_000), "order-2").unwrap();
    pix.add_tender(TenderMethod::Pix, Money::from_cents(2_000))
        .unwrap();
    let outcome = registers
        .record_sale(&register_id, &session.id, pix)
        .await
        .unwrap();
    // Pix never touches the drawer
    assert_eq!(outcome.balances.cash_balance_cents, 13_500);
    assert_eq!(
        outcome.balances.method_balance_cents[&TenderMethod::Pix],
        2_000
    );

    let balances = registers
        .withdraw(&register_id, "op-1", Money::from_cents(1_000), "bank deposit run")
        .await
        .unwrap();
    assert_eq!(balances.cash_balance_cents, 12_500);

    sessions.end_session(&session.id).await.unwrap();

    let report = registers
        .close_register(&register_id, "op-1", Money::from_cents(12_500), None)
        .await
        .unwrap();
    assert_eq!(report.expected_cash_cents, 12_500);
    assert_eq!(report.variance_cents, 0);
    assert!(report.is_balanced());
    assert_eq!(report.sale_count, 2);
    assert_eq!(report.withdrawal_total_cents, 1_000);

    let text = render_report(&report, registers.config());
    assert!(text.contains("BALANCED"));
    assert!(text.contains("bank deposit run"));
}

/// Lock scenario: threshold 150.00. Cash sales push the drawer to 160.00,
/// sales lock out; a 20.00 withdrawal brings it to 140.00 and sales work
/// again.
#[tokio::test]
async fn lock_threshold_blocks_sales_until_withdrawal() {
    let config = StoreConfig {
        default_lock_threshold_cents: Some(15_000),
        ..StoreConfig::default()
    };
    let (registers, sessions) = engine(config).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let outcome = registers
        .record_sale(&register_id, &session.id, cash_sale(6_000, 6_000, "order-1"))
        .await
        .unwrap();
    assert_eq!(outcome.balances.cash_balance_cents, 16_000);
    assert!(outcome.balances.is_locked);

    // Locked: the next sale is refused before anything is written
    let err = registers
        .record_sale(&register_id, &session.id, cash_sale(1_000, 1_000, "order-2"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::RegisterLocked {
            cash_balance_cents: 16_000,
            threshold_cents: 15_000,
            ..
        })
    ));

    let balances = registers
        .withdraw(&register_id, "op-1", Money::from_cents(2_000), "clear lock")
        .await
        .unwrap();
    assert_eq!(balances.cash_balance_cents, 14_000);
    assert!(!balances.is_locked);

    // Unlocked: sales flow again
    registers
        .record_sale(&register_id, &session.id, cash_sale(1_000, 1_000, "order-2"))
        .await
        .unwrap();
}

/// Single cash overpay: tendering 50.00 against 35.50 records exactly
/// 35.50 in the drawer and returns 14.50 change.
#[tokio::test]
async fn single_cash_overpay_returns_change() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let outcome = registers
        .record_sale(&register_id, &session.id, cash_sale(3_550, 5_000, "order-1"))
        .await
        .unwrap();

    assert_eq!(outcome.change_cents, 1_450);
    // Drawer records the price of the goods, not the tendered note
    assert_eq!(outcome.balances.cash_balance_cents, 13_550);
}

/// Split tender across pix and cash: two ledger entries share one
/// reference, and the report groups them per method.
#[tokio::test]
async fn split_tender_produces_one_entry_per_method() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let mut collector = PaymentCollector::new(Money::from_cents(5_500), "order-42").unwrap();
    collector
        .add_tender(TenderMethod::Pix, Money::from_cents(3_000))
        .unwrap();
    collector
        .add_tender(TenderMethod::Cash, Money::from_cents(2_500))
        .unwrap();

    let outcome = registers
        .record_sale(&register_id, &session.id, collector)
        .await
        .unwrap();
    assert_eq!(outcome.entry_ids.len(), 2);
    assert_eq!(outcome.balances.cash_balance_cents, 12_500);

    let report = registers
        .close_register(&register_id, "op-1", Money::from_cents(12_500), None)
        .await
        .unwrap();
    assert_eq!(report.sales_total_cents, 5_500);
    assert_eq!(report.sales.len(), 2);
}

/// An incomplete collector never reaches the ledger.
#[tokio::test]
async fn incomplete_payment_is_rejected_whole() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let mut collector = PaymentCollector::new(Money::from_cents(5_000), "order-1").unwrap();
    collector
        .add_tender(TenderMethod::Pix, Money::from_cents(3_000))
        .unwrap();

    let err = registers
        .record_sale(&register_id, &session.id, collector)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::PaymentIncomplete {
            remaining_cents: 2_000
        })
    ));

    // No partial tender was appended
    let balances = registers.balances(&register_id).await.unwrap();
    assert_eq!(balances.cash_balance_cents, 10_000);
}

/// Sales recorded after close are refused; the stored report never moves.
#[tokio::test]
async fn close_freezes_the_register() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    let report = registers
        .close_register(&register_id, "op-1", Money::from_cents(10_000), None)
        .await
        .unwrap();

    let err = registers
        .record_sale(&register_id, &session.id, cash_sale(1_000, 1_000, "order-9"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::RegisterClosed { .. })
    ));

    // Repeated close: AlreadyClosed, stored report untouched
    let err = registers
        .close_register(&register_id, "op-1", Money::from_cents(99_999), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(CoreError::AlreadyClosed { .. })
    ));
    assert_eq!(registers.report(&register_id).await.unwrap(), report);

    // And the store may open a fresh register for the next shift
    registers
        .open_register("op-1", Money::from_cents(5_000), None)
        .await
        .unwrap();
}

/// Session lifecycle across a shift: resume, multi-operator occupancy,
/// idempotent end.
#[tokio::test]
async fn sessions_resume_and_end_idempotently() {
    let (registers, sessions) = engine(StoreConfig::default()).await;
    let (register_id, session) = open_with_session(&registers, &sessions, 10_000).await;

    // A reconnecting terminal resumes rather than duplicating
    let resumed = sessions
        .start_session(&register_id, "Balcão 2", "op-1")
        .await
        .unwrap();
    assert_eq!(resumed.id, session.id);

    // A second operator occupies their own session
    let other = sessions
        .start_session(&register_id, "Balcão 2", "op-2")
        .await
        .unwrap();
    assert_ne!(other.id, session.id);
    assert_eq!(sessions.active_sessions(&register_id).await.unwrap().len(), 2);

    sessions.end_session(&session.id).await.unwrap();
    sessions.end_session(&session.id).await.unwrap();
    assert_eq!(sessions.active_sessions(&register_id).await.unwrap().len(), 1);

    // An ended session can no longer record sales
    let err = registers
        .record_sale(&register_id, &session.id, cash_sale(1_000, 1_000, "order-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}
