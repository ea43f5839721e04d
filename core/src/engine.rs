//! The reconciliation engine — the one component with real design content.
//!
//! One pass, per contract, in order:
//!   1. Accrual (pure, `accrual::compute_accrual`)
//!   2. Alert decision (pure, `alert::decide_alert`) against the
//!      possibly-just-accrued contract
//!   3. Write-back of dirty contracts only
//!
//! RULES:
//!   - Accrual always settles before the threshold check for the same
//!     contract, so a contract that crosses the threshold because of this
//!     pass's own accrual is alerted in the same pass.
//!   - No ordering guarantee between contracts.
//!   - Passes are serialized per engine instance; overlapping callers queue
//!     on the pass lock instead of racing the 24h invariants.
//!   - `run_reconciliation` never propagates an error. Store failures degrade
//!     the affected contract (or the whole snapshot) with a warning and the
//!     pass still returns a summary.

use crate::{
    accrual::compute_accrual,
    alert::{decide_alert, render_template, AlertChannel, AlertLogEntry},
    error::{EngineError, EngineResult},
    stats::{compute_stats, DashboardStats},
    store::ContractStore,
    types::TimestampMs,
};
use serde::Serialize;
use std::sync::Mutex;

/// What one pass did. Always returned, even when everything degraded.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub alerts_sent: u32,
    pub rent_updated: bool,
}

pub struct ReconcileEngine<S: ContractStore> {
    store: S,
    pass_lock: Mutex<()>,
}

impl<S: ContractStore> ReconcileEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one full reconciliation pass at `now`.
    ///
    /// Callers invoke this opportunistically (dashboard load, periodic
    /// runner); invocations minutes or days apart are both fine. Calling it
    /// twice with the same `now` is a no-op the second time.
    pub fn run_reconciliation(&self, now: TimestampMs) -> ReconcileSummary {
        let _pass = self.pass_lock.lock().unwrap_or_else(|e| e.into_inner());

        let settings = self.store.settings().unwrap_or_else(|e| {
            log::warn!("settings unavailable, using defaults: {e}");
            Default::default()
        });
        let contracts = self.store.contracts().unwrap_or_else(|e| {
            log::warn!("contract snapshot unavailable, skipping pass: {e}");
            Vec::new()
        });

        let mut summary = ReconcileSummary::default();

        for mut contract in contracts {
            let mut dirty = false;

            let accrual = compute_accrual(&contract, now);
            if accrual.periods_elapsed > 0 {
                contract.total_amount += accrual.charge;
                contract.last_rent_update = accrual.new_last_rent_update;
                dirty = true;
                summary.rent_updated = true;
                log::debug!(
                    "contract {} accrued {} over {} period(s)",
                    contract.contract_id,
                    accrual.charge,
                    accrual.periods_elapsed
                );
            }

            if let Some(message) = decide_alert(&contract, &settings, now) {
                let entry =
                    AlertLogEntry::new(&contract, message, AlertChannel::Whatsapp, true, now);
                match self.store.append_alert_log(&entry) {
                    Ok(()) => {
                        // Must land in the same pass as the log append; a
                        // failure between the two re-alerts next pass
                        // (accepted at-least-once dispatch).
                        contract.last_alert_date = Some(now);
                        dirty = true;
                        summary.alerts_sent += 1;
                    }
                    Err(e) => {
                        log::warn!(
                            "alert log append failed for contract {}: {e}",
                            contract.contract_id
                        );
                    }
                }
            }

            if dirty {
                if let Err(e) = self.store.upsert_contract(&contract) {
                    log::warn!(
                        "write-back failed for contract {}: {e}",
                        contract.contract_id
                    );
                }
            }
        }

        log::debug!(
            "reconciliation pass at {now}: {} alert(s), rent_updated={}",
            summary.alerts_sent,
            summary.rent_updated
        );
        summary
    }

    /// Render and log a manually triggered alert for one contract.
    ///
    /// Bypasses threshold and cooldown (the operator clicked the button) and
    /// does NOT touch `last_alert_date` — manual sends never consume the
    /// automatic cooldown window.
    pub fn send_manual_alert(
        &self,
        contract_id: &str,
        channel: AlertChannel,
        now: TimestampMs,
    ) -> EngineResult<AlertLogEntry> {
        let contract = self
            .store
            .contract(contract_id)?
            .ok_or_else(|| EngineError::ContractNotFound {
                id: contract_id.to_string(),
            })?;
        let settings = self.store.settings()?;

        let message = render_template(
            &settings.alert_message_template,
            &contract,
            contract.remaining(),
            &settings.currency,
        );
        let entry = AlertLogEntry::new(&contract, message, channel, false, now);
        self.store.append_alert_log(&entry)?;
        Ok(entry)
    }

    /// Dashboard aggregates over the current contract snapshot.
    pub fn dashboard_stats(&self) -> EngineResult<DashboardStats> {
        let settings = self.store.settings()?;
        let contracts = self.store.contracts()?;
        Ok(compute_stats(&contracts, &settings))
    }
}
