//! Reconciliation engine tests over the in-memory store.
//!
//! 1. A pass is idempotent within a period
//! 2. Accrual settles before the threshold check in the same pass
//! 3. Only dirty contracts are written back
//! 4. Closed contracts pass through untouched
//! 5. Missing settings degrade to the documented defaults

use chrono::NaiveDate;
use rentpay_core::{
    config::Settings,
    contract::Contract,
    engine::ReconcileEngine,
    store::{ContractStore, MemoryStore},
    types::{TimestampMs, DAY_MS},
};

const T0: TimestampMs = 1_700_000_000_000;

fn contract(id: &str, daily_rate: Option<f64>, total: f64, paid: f64) -> Contract {
    Contract {
        contract_id: id.into(),
        name: "Ali".into(),
        phone: "971500000001".into(),
        car_model: "Civic".into(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: None,
        daily_rate,
        total_amount: total,
        paid_amount: paid,
        created_at: T0,
        last_rent_update: None,
        last_alert_date: None,
    }
}

fn engine_with(contracts: &[Contract]) -> ReconcileEngine<MemoryStore> {
    let store = MemoryStore::new();
    for c in contracts {
        store.upsert_contract(c).unwrap();
    }
    ReconcileEngine::new(store)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: idempotence within a period
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn second_pass_at_the_same_now_is_a_noop() {
    // 50h of accrual due, and well over the default threshold.
    let engine = engine_with(&[contract("c-1", Some(180.0), 2000.0, 0.0)]);
    let now = T0 + 50 * 60 * 60 * 1000;

    let first = engine.run_reconciliation(now);
    assert_eq!(first.alerts_sent, 1);
    assert!(first.rent_updated);

    let snapshot = engine.store().contracts().unwrap();
    let logs = engine.store().alert_logs().unwrap();

    let second = engine.run_reconciliation(now);
    assert_eq!(second.alerts_sent, 0);
    assert!(!second.rent_updated);
    assert_eq!(engine.store().contracts().unwrap(), snapshot);
    assert_eq!(engine.store().alert_logs().unwrap().len(), logs.len());
}

#[test]
fn accrual_applies_charge_and_resets_clock() {
    let engine = engine_with(&[contract("c-1", Some(180.0), 2000.0, 2000.0)]);
    let now = T0 + 50 * 60 * 60 * 1000;

    let summary = engine.run_reconciliation(now);
    assert!(summary.rent_updated);
    assert_eq!(summary.alerts_sent, 0); // fully paid, nothing outstanding... yet

    let c = engine.store().contract("c-1").unwrap().unwrap();
    assert_eq!(c.total_amount, 2360.0);
    assert_eq!(c.last_rent_update, Some(now));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: accrual settles before the threshold check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn contract_crossing_threshold_via_this_passes_accrual_is_alerted() {
    // Remaining 400 before the pass (below the 500 threshold); one elapsed
    // period adds 180 and pushes it to 580.
    let engine = engine_with(&[contract("c-1", Some(180.0), 1400.0, 1000.0)]);
    let now = T0 + DAY_MS;

    let summary = engine.run_reconciliation(now);
    assert!(summary.rent_updated);
    assert_eq!(summary.alerts_sent, 1);

    let c = engine.store().contract("c-1").unwrap().unwrap();
    assert_eq!(c.last_alert_date, Some(now));

    let logs = engine.store().alert_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].auto);
    assert_eq!(logs[0].contract_id, "c-1");
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: only dirty contracts are written back
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn untouched_contracts_are_not_rewritten() {
    let accruing = contract("c-accrues", Some(180.0), 100.0, 100.0);
    let flat = contract("c-flat", None, 100.0, 100.0);
    let engine = engine_with(&[accruing, flat]);
    let writes_before = engine.store().upsert_count();

    engine.run_reconciliation(T0 + 2 * DAY_MS);

    // One write for the accruing contract, none for the flat one.
    assert_eq!(engine.store().upsert_count() - writes_before, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: closed contracts pass through untouched
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn closed_contract_is_never_charged_regardless_of_elapsed_time() {
    let mut closed = contract("c-closed", Some(500.0), 3000.0, 3000.0);
    closed.end_date = NaiveDate::from_ymd_opt(2024, 3, 1);
    let engine = engine_with(&[closed.clone()]);

    let summary = engine.run_reconciliation(T0 + 365 * DAY_MS);
    assert!(!summary.rent_updated);

    let c = engine.store().contract("c-closed").unwrap().unwrap();
    assert_eq!(c.total_amount, closed.total_amount);
    assert_eq!(c.last_rent_update, None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: settings degrade to the documented defaults
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn pass_with_no_stored_settings_uses_defaults() {
    // Remaining 600 ≥ default threshold 500; nothing saved to the store.
    let engine = engine_with(&[contract("c-1", None, 600.0, 0.0)]);

    let summary = engine.run_reconciliation(T0);
    assert_eq!(summary.alerts_sent, 1);

    let defaults = Settings::default();
    let logs = engine.store().alert_logs().unwrap();
    assert!(logs[0].message.contains(&defaults.currency));
}

#[test]
fn disabled_alerts_still_accrue_rent() {
    let engine = engine_with(&[contract("c-1", Some(180.0), 2000.0, 0.0)]);
    engine
        .store()
        .save_settings(&Settings {
            auto_alerts_enabled: false,
            ..Settings::default()
        })
        .unwrap();

    let summary = engine.run_reconciliation(T0 + 2 * DAY_MS);
    assert!(summary.rent_updated);
    assert_eq!(summary.alerts_sent, 0);
    assert!(engine.store().alert_logs().unwrap().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Cooldown across passes
// ─────────────────────────────────────────────────────────────────────────────

// ─────────────────────────────────────────────────────────────────────────────
// Overlapping invocations serialize on the pass lock
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn concurrent_passes_never_double_alert() {
    use rentpay_core::clock::{Clock, ManualClock};
    use std::sync::Arc;

    let engine = Arc::new(engine_with(&[contract("c-1", Some(180.0), 2000.0, 0.0)]));
    let clock = Arc::new(ManualClock::new(T0 + 2 * DAY_MS));

    // Two tabs hitting the same engine at the same instant: the pass lock
    // serializes them, the second sees the first's write-back.
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let clock = Arc::clone(&clock);
            std::thread::spawn(move || engine.run_reconciliation(clock.now_ms()))
        })
        .collect();

    let total_alerts: u32 = handles
        .into_iter()
        .map(|h| h.join().unwrap().alerts_sent)
        .sum();
    assert_eq!(total_alerts, 1);
    assert_eq!(engine.store().alert_logs().unwrap().len(), 1);

    let c = engine.store().contract("c-1").unwrap().unwrap();
    assert_eq!(c.total_amount, 2360.0); // accrued exactly once
}

#[test]
fn alerted_contract_waits_out_the_cooldown_window() {
    let engine = engine_with(&[contract("c-1", None, 2000.0, 0.0)]);

    assert_eq!(engine.run_reconciliation(T0).alerts_sent, 1);
    // Exactly 24h later: still inside the window.
    assert_eq!(engine.run_reconciliation(T0 + DAY_MS).alerts_sent, 0);
    // One ms past: eligible again.
    assert_eq!(engine.run_reconciliation(T0 + DAY_MS + 1).alerts_sent, 1);

    assert_eq!(engine.store().alert_logs().unwrap().len(), 2);
}
