//! Alert decision function and the alert-log record types.
//!
//! `decide_alert` is pure: it never appends to the log or mutates the
//! contract. When it returns a rendered message, the engine MUST set
//! `last_alert_date = now` in the same pass that appends the log entry —
//! that pairing is what keeps the 24-hour cooldown honest across passes.

use crate::{
    config::Settings,
    contract::Contract,
    types::{ContractId, TimestampMs, DAY_MS},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decide whether `contract` is alert-eligible at `now` and, if so, render
/// the outbound message.
///
/// Eligibility requires all of:
/// - `settings.auto_alerts_enabled`,
/// - `remaining >= settings.alert_threshold` (boundary inclusive),
/// - never alerted, or last alert strictly more than 24h ago
///   (exactly 24h does not re-trigger).
pub fn decide_alert(
    contract: &Contract,
    settings: &Settings,
    now: TimestampMs,
) -> Option<String> {
    if !settings.auto_alerts_enabled {
        return None;
    }
    let remaining = contract.remaining();
    if remaining < settings.alert_threshold {
        return None;
    }
    if let Some(last) = contract.last_alert_date {
        if now - last <= DAY_MS {
            return None;
        }
    }
    Some(render_template(
        &settings.alert_message_template,
        contract,
        remaining,
        &settings.currency,
    ))
}

/// Substitute `{name}`, `{amount}`, `{car}` and `{currency}` into `template`.
/// `{amount}` renders as plain decimal text (no grouping, no trailing zeros).
/// Unmatched placeholders are left verbatim.
pub fn render_template(
    template: &str,
    contract: &Contract,
    remaining: f64,
    currency: &str,
) -> String {
    template
        .replace("{name}", &contract.name)
        .replace("{amount}", &remaining.to_string())
        .replace("{car}", &contract.car_model)
        .replace("{currency}", currency)
}

// ── Alert log ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    Whatsapp,
    Sms,
}

impl AlertChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertChannel::Whatsapp => "whatsapp",
            AlertChannel::Sms => "sms",
        }
    }

    /// Unknown stored values fall back to the default channel rather than
    /// failing the read (malformed-record policy).
    pub fn parse(s: &str) -> Self {
        match s {
            "sms" => AlertChannel::Sms,
            _ => AlertChannel::Whatsapp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Sent,
    Failed,
    Pending,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchStatus::Sent => "sent",
            DispatchStatus::Failed => "failed",
            DispatchStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "failed" => DispatchStatus::Failed,
            "pending" => DispatchStatus::Pending,
            _ => DispatchStatus::Sent,
        }
    }
}

/// Immutable record of one dispatched alert. Name and phone are snapshots
/// taken at dispatch time so later contract edits don't rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertLogEntry {
    pub id: String,
    pub contract_id: ContractId,
    pub contract_name: String,
    pub phone: String,
    pub message: String,
    pub status: DispatchStatus,
    pub channel: AlertChannel,
    pub sent_at: TimestampMs,
    /// True when dispatched by the reconciliation engine, false for
    /// manually triggered sends.
    pub auto: bool,
}

impl AlertLogEntry {
    /// Delivery confirmation is out of scope: the engine records `Sent`
    /// as soon as the message text is produced.
    pub fn new(
        contract: &Contract,
        message: String,
        channel: AlertChannel,
        auto: bool,
        now: TimestampMs,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contract_id: contract.contract_id.clone(),
            contract_name: contract.name.clone(),
            phone: contract.phone.clone(),
            message,
            status: DispatchStatus::Sent,
            channel,
            sent_at: now,
            auto,
        }
    }
}
