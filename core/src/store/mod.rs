//! Store abstraction.
//!
//! RULE: Only this module talks to persistence. The engine and the pure
//! helpers see `ContractStore` and nothing else, so tests run against the
//! in-memory store and production swaps in SQLite without touching
//! reconciliation logic.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::{
    alert::AlertLogEntry, config::Settings, contract::Contract, error::EngineResult,
};

/// The alert log keeps only this many entries; the oldest are evicted on
/// overflow and readers always see newest first.
pub const ALERT_LOG_CAP: usize = 100;

/// Boundary contract between the core and whatever owns the records.
/// No transactions: each call is an independent durable operation.
pub trait ContractStore: Send {
    fn contracts(&self) -> EngineResult<Vec<Contract>>;
    fn contract(&self, id: &str) -> EngineResult<Option<Contract>>;
    fn upsert_contract(&self, contract: &Contract) -> EngineResult<()>;
    fn delete_contract(&self, id: &str) -> EngineResult<()>;

    /// Falls back to `Settings::default()` when nothing is stored or the
    /// stored payload is malformed. Never fails the caller for either case.
    fn settings(&self) -> EngineResult<Settings>;
    fn save_settings(&self, settings: &Settings) -> EngineResult<()>;

    /// Append one entry and evict beyond [`ALERT_LOG_CAP`]. Append and
    /// eviction are one serialized step per store instance.
    fn append_alert_log(&self, entry: &AlertLogEntry) -> EngineResult<()>;
    /// All retained entries, newest first.
    fn alert_logs(&self) -> EngineResult<Vec<AlertLogEntry>>;
}
