//! Shared primitive types used across the entire core.

/// Epoch timestamp in milliseconds (UTC).
pub type TimestampMs = i64;

/// A stable, unique identifier for a contract.
pub type ContractId = String;

/// One billing/alert period: a fixed 24-hour duration in milliseconds.
/// Purely elapsed-time based, not calendar-day aligned.
pub const DAY_MS: TimestampMs = 24 * 60 * 60 * 1000;
