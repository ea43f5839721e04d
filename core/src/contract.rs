//! The contract record — one rental/collections relationship.
//!
//! Created and edited by external CRUD screens through the store; the engine
//! only mutates `total_amount`, `last_rent_update` and `last_alert_date`.

use crate::types::{ContractId, TimestampMs};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    /// Opaque unique id, immutable after creation.
    pub contract_id: ContractId,
    pub name: String,
    pub phone: String,
    pub car_model: String,

    pub start_date: NaiveDate,
    /// Present ⇒ contract closed; accrual stops permanently.
    pub end_date: Option<NaiveDate>,

    /// Daily recurring charge. Absent or zero ⇒ flat-rate contract, never accrues.
    pub daily_rate: Option<f64>,
    /// Accumulator, monotonically non-decreasing. Grown only by accrual.
    pub total_amount: f64,
    /// Non-decreasing; set only by manual payment actions outside this core.
    pub paid_amount: f64,

    pub created_at: TimestampMs,
    /// Last successful accrual. Defaults to `created_at` when absent.
    pub last_rent_update: Option<TimestampMs>,
    /// Last dispatched alert. Absent if never alerted.
    pub last_alert_date: Option<TimestampMs>,
}

impl Contract {
    /// Outstanding balance. Conceptually non-negative in normal operation;
    /// the engine only reads it and never enforces the invariant.
    pub fn remaining(&self) -> f64 {
        self.total_amount - self.paid_amount
    }

    pub fn is_closed(&self) -> bool {
        self.end_date.is_some()
    }
}
