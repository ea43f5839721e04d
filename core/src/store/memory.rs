//! In-memory store — the test fake and the reference for store semantics.
//! Interior mutability keeps the trait surface identical to SQLite.

use super::{ContractStore, ALERT_LOG_CAP};
use crate::{
    alert::AlertLogEntry, config::Settings, contract::Contract, error::EngineResult,
};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    contracts: Vec<Contract>,
    settings: Option<Settings>,
    // Front = newest, mirrors how readers consume the log.
    logs: VecDeque<AlertLogEntry>,
    upsert_count: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking test; the data is still fine.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of `upsert_contract` calls so far. Lets tests assert that the
    /// engine writes back only dirty contracts.
    pub fn upsert_count(&self) -> usize {
        self.lock().upsert_count
    }
}

impl ContractStore for MemoryStore {
    fn contracts(&self) -> EngineResult<Vec<Contract>> {
        Ok(self.lock().contracts.clone())
    }

    fn contract(&self, id: &str) -> EngineResult<Option<Contract>> {
        Ok(self
            .lock()
            .contracts
            .iter()
            .find(|c| c.contract_id == id)
            .cloned())
    }

    fn upsert_contract(&self, contract: &Contract) -> EngineResult<()> {
        let mut inner = self.lock();
        inner.upsert_count += 1;
        match inner
            .contracts
            .iter_mut()
            .find(|c| c.contract_id == contract.contract_id)
        {
            Some(existing) => *existing = contract.clone(),
            None => inner.contracts.push(contract.clone()),
        }
        Ok(())
    }

    fn delete_contract(&self, id: &str) -> EngineResult<()> {
        self.lock().contracts.retain(|c| c.contract_id != id);
        Ok(())
    }

    fn settings(&self) -> EngineResult<Settings> {
        Ok(self.lock().settings.clone().unwrap_or_default())
    }

    fn save_settings(&self, settings: &Settings) -> EngineResult<()> {
        self.lock().settings = Some(settings.clone());
        Ok(())
    }

    fn append_alert_log(&self, entry: &AlertLogEntry) -> EngineResult<()> {
        let mut inner = self.lock();
        inner.logs.push_front(entry.clone());
        inner.logs.truncate(ALERT_LOG_CAP);
        Ok(())
    }

    fn alert_logs(&self) -> EngineResult<Vec<AlertLogEntry>> {
        Ok(self.lock().logs.iter().cloned().collect())
    }
}
