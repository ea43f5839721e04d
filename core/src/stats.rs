//! Read-only dashboard aggregation over a contract snapshot.

use crate::{config::Settings, contract::Contract};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_contracts: usize,
    /// Sum of positive outstanding remainders.
    pub total_debt: f64,
    /// Contracts whose remainder meets the alert threshold.
    pub over_threshold_count: usize,
    /// Paid share of all billed amounts, in percent. 0 when nothing billed.
    pub collection_rate: f64,
}

pub fn compute_stats(contracts: &[Contract], settings: &Settings) -> DashboardStats {
    let total_debt = contracts
        .iter()
        .map(|c| c.remaining().max(0.0))
        .sum::<f64>();
    let over_threshold_count = contracts
        .iter()
        .filter(|c| c.remaining() >= settings.alert_threshold)
        .count();

    let billed: f64 = contracts.iter().map(|c| c.total_amount).sum();
    let paid: f64 = contracts.iter().map(|c| c.paid_amount).sum();
    let collection_rate = if billed > 0.0 { paid / billed * 100.0 } else { 0.0 };

    DashboardStats {
        total_contracts: contracts.len(),
        total_debt,
        over_threshold_count,
        collection_rate,
    }
}
