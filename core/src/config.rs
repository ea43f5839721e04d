//! Process-wide settings: a single record, externally edited, read at the
//! start of every reconciliation pass.
//!
//! Every field carries a serde default so a partially malformed stored
//! payload degrades field-by-field instead of failing the pass.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Minimum outstanding remainder that makes a contract alert-eligible.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    /// Template with placeholders {name}, {amount}, {car}, {currency}.
    #[serde(default = "default_alert_message_template")]
    pub alert_message_template: String,

    /// Display currency code/label, substituted for {currency}.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Master switch for the alerting half of the engine.
    #[serde(default = "default_auto_alerts_enabled")]
    pub auto_alerts_enabled: bool,

    /// Advisory only — the engine is not clock-driven. Kept so external
    /// settings screens can round-trip it.
    #[serde(default = "default_auto_alert_time")]
    pub auto_alert_time: String,
}

fn default_alert_threshold() -> f64 {
    500.0
}

fn default_alert_message_template() -> String {
    "Dear {name}, the outstanding balance for your rental ({car}) has exceeded \
     {amount} {currency}. Please settle it as soon as possible to avoid further \
     charges."
        .to_string()
}

fn default_currency() -> String {
    "AED".to_string()
}

fn default_auto_alerts_enabled() -> bool {
    true
}

fn default_auto_alert_time() -> String {
    "10:00".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            alert_message_template: default_alert_message_template(),
            currency: default_currency(),
            auto_alerts_enabled: default_auto_alerts_enabled(),
            auto_alert_time: default_auto_alert_time(),
        }
    }
}
