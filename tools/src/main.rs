//! collect-runner: headless periodic reconciliation runner.
//!
//! Replaces the original "run whenever the dashboard opens" trigger with an
//! explicit timer-driven loop over the SQLite store.
//!
//! Usage:
//!   collect-runner --db rentpay.db --interval-secs 3600
//!   collect-runner --db rentpay.db --once
//!   collect-runner --db rentpay.db --once --demo --json

use anyhow::Result;
use chrono::{TimeZone, Utc};
use rentpay_core::{
    clock::{Clock, SystemClock},
    contract::Contract,
    engine::{ReconcileEngine, ReconcileSummary},
    stats::DashboardStats,
    store::{ContractStore, SqliteStore},
};
use std::env;
use std::thread;
use std::time::Duration;

#[derive(serde::Serialize)]
struct PassReport {
    ran_at_ms: i64,
    summary: ReconcileSummary,
    stats: DashboardStats,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("rentpay.db");
    let interval_secs = parse_arg(&args, "--interval-secs", 3600u64);
    let once = args.iter().any(|a| a == "--once");
    let demo = args.iter().any(|a| a == "--demo");
    let json = args.iter().any(|a| a == "--json");

    if !json {
        println!("rentpay — collect-runner");
        println!("  db:        {db}");
        println!("  interval:  {interval_secs}s");
        println!("  once:      {once}");
        println!();
    }

    let store = SqliteStore::open(db)?;
    store.migrate()?;

    if demo {
        seed_demo_contracts(&store)?;
    }

    let clock = SystemClock;
    let engine = ReconcileEngine::new(store);

    loop {
        let now = clock.now_ms();
        let summary = engine.run_reconciliation(now);
        let stats = engine.dashboard_stats()?;

        if json {
            let report = PassReport {
                ran_at_ms: now,
                summary,
                stats,
            };
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_pass(now, &summary, &stats);
        }

        if once {
            break;
        }
        thread::sleep(Duration::from_secs(interval_secs));
    }

    Ok(())
}

fn print_pass(now: i64, summary: &ReconcileSummary, stats: &DashboardStats) {
    let when = Utc
        .timestamp_millis_opt(now)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| now.to_string());
    println!("pass @ {when}");
    println!("  alerts sent:     {}", summary.alerts_sent);
    println!("  rent updated:    {}", summary.rent_updated);
    println!("  contracts:       {}", stats.total_contracts);
    println!("  over threshold:  {}", stats.over_threshold_count);
    println!("  total debt:      {:.2}", stats.total_debt);
    println!("  collection rate: {:.1}%", stats.collection_rate);
    println!();
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

/// Seed a handful of demo contracts so a fresh database has something to
/// reconcile. Skipped for ids that already exist.
fn seed_demo_contracts(store: &SqliteStore) -> Result<()> {
    let now = SystemClock.now_ms();
    let day = rentpay_core::types::DAY_MS;
    let demo = [
        ("demo-1", "Ahmed Ali", "971500000001", "Toyota Camry", Some(180.0), 2000.0, 1200.0, now - 3 * day),
        ("demo-2", "Sara Abdullah", "971500000002", "Nissan Patrol", Some(500.0), 5000.0, 5000.0, now - 10 * day),
        ("demo-3", "Khaled Yousef", "971500000003", "Hyundai Elantra", Some(150.0), 1500.0, 500.0, now - 20 * day),
    ];

    for (id, name, phone, car, rate, total, paid, created) in demo {
        if store.contract(id)?.is_some() {
            continue;
        }
        let start_date = Utc
            .timestamp_millis_opt(created)
            .single()
            .map(|t| t.date_naive())
            .unwrap_or(chrono::NaiveDate::MIN);
        store.upsert_contract(&Contract {
            contract_id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            car_model: car.to_string(),
            start_date,
            end_date: None,
            daily_rate: rate,
            total_amount: total,
            paid_amount: paid,
            created_at: created,
            last_rent_update: None,
            last_alert_date: None,
        })?;
    }
    log::info!("demo contracts seeded");
    Ok(())
}
