//! Accrual calculator — pure computation of elapsed billing periods and the
//! charge to add. No store access, no mutation; the engine applies the result.

use crate::{
    contract::Contract,
    types::{TimestampMs, DAY_MS},
};

/// Outcome of one accrual computation for one contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    pub periods_elapsed: i64,
    pub charge: f64,
    /// `Some(now)` when at least one period elapsed, `None` to leave the
    /// contract's accrual clock untouched.
    pub new_last_rent_update: Option<TimestampMs>,
}

impl Accrual {
    pub fn none() -> Self {
        Self {
            periods_elapsed: 0,
            charge: 0.0,
            new_last_rent_update: None,
        }
    }
}

/// Compute how many 24-hour periods have elapsed for `contract` and the
/// charge that accrues for them.
///
/// Closed contracts (`end_date` set) and contracts without a positive
/// `daily_rate` never accrue. The reference point is `last_rent_update`,
/// falling back to `created_at` for contracts that have never accrued.
///
/// When at least one full period elapsed, the accrual clock resets to `now`
/// rather than to `reference + periods * DAY_MS`: a very late invocation
/// does not compound catch-up on the next pass, at the cost of discarding
/// the fractional remainder of the current one. Accepted semantics, covered
/// by the remainder tests in `core/tests/accrual.rs`.
pub fn compute_accrual(contract: &Contract, now: TimestampMs) -> Accrual {
    let rate = match contract.daily_rate {
        Some(r) if r > 0.0 => r,
        _ => return Accrual::none(),
    };
    if contract.is_closed() {
        return Accrual::none();
    }

    let reference = contract.last_rent_update.unwrap_or(contract.created_at);
    let elapsed = now - reference;
    // Covers both "not yet a full period" and a reference in the future.
    if elapsed < DAY_MS {
        return Accrual::none();
    }

    let periods = elapsed / DAY_MS;
    Accrual {
        periods_elapsed: periods,
        charge: rate * periods as f64,
        new_last_rent_update: Some(now),
    }
}
