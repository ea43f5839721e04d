//! SQLite persistence.

use super::{ContractStore, ALERT_LOG_CAP};
use crate::{
    alert::{AlertChannel, AlertLogEntry, DispatchStatus},
    config::Settings,
    contract::Contract,
    error::EngineResult,
    types::TimestampMs,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (in-memory connections ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    fn row_to_contract(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contract> {
        Ok(Contract {
            contract_id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            car_model: row.get(3)?,
            start_date: parse_date(&row.get::<_, String>(4)?),
            end_date: row
                .get::<_, Option<String>>(5)?
                .map(|s| parse_date(&s)),
            daily_rate: row.get(6)?,
            total_amount: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            paid_amount: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
            created_at: row.get(9)?,
            last_rent_update: row.get(10)?,
            last_alert_date: row.get(11)?,
        })
    }
}

const CONTRACT_COLUMNS: &str = "contract_id, name, phone, car_model, start_date, end_date, \
     daily_rate, total_amount, paid_amount, created_at, last_rent_update, last_alert_date";

/// Malformed stored dates degrade to the epoch floor instead of failing the
/// read (malformed-record policy).
fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

impl ContractStore for SqliteStore {
    fn contracts(&self) -> EngineResult<Vec<Contract>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contract ORDER BY created_at ASC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_contract)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn contract(&self, id: &str) -> EngineResult<Option<Contract>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM contract WHERE contract_id = ?1"
        ))?;
        stmt.query_row(params![id], Self::row_to_contract)
            .optional()
            .map_err(Into::into)
    }

    fn upsert_contract(&self, c: &Contract) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO contract (
                contract_id, name, phone, car_model, start_date, end_date,
                daily_rate, total_amount, paid_amount, created_at,
                last_rent_update, last_alert_date
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(contract_id) DO UPDATE SET
                name = excluded.name,
                phone = excluded.phone,
                car_model = excluded.car_model,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                daily_rate = excluded.daily_rate,
                total_amount = excluded.total_amount,
                paid_amount = excluded.paid_amount,
                created_at = excluded.created_at,
                last_rent_update = excluded.last_rent_update,
                last_alert_date = excluded.last_alert_date",
            params![
                c.contract_id,
                c.name,
                c.phone,
                c.car_model,
                c.start_date.format("%Y-%m-%d").to_string(),
                c.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                c.daily_rate,
                c.total_amount,
                c.paid_amount,
                c.created_at,
                c.last_rent_update,
                c.last_alert_date,
            ],
        )?;
        Ok(())
    }

    fn delete_contract(&self, id: &str) -> EngineResult<()> {
        self.conn
            .execute("DELETE FROM contract WHERE contract_id = ?1", params![id])?;
        Ok(())
    }

    fn settings(&self) -> EngineResult<Settings> {
        let payload: Option<String> = self
            .conn
            .query_row("SELECT payload FROM settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(payload) = payload else {
            return Ok(Settings::default());
        };
        match serde_json::from_str(&payload) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                log::warn!("malformed settings payload, using defaults: {e}");
                Ok(Settings::default())
            }
        }
    }

    fn save_settings(&self, settings: &Settings) -> EngineResult<()> {
        let payload = serde_json::to_string(settings)?;
        self.conn.execute(
            "INSERT INTO settings (id, payload) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
            params![payload],
        )?;
        Ok(())
    }

    fn append_alert_log(&self, entry: &AlertLogEntry) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO alert_log (
                log_id, contract_id, contract_name, phone, message,
                status, channel, sent_at, auto
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id,
                entry.contract_id,
                entry.contract_name,
                entry.phone,
                entry.message,
                entry.status.as_str(),
                entry.channel.as_str(),
                entry.sent_at,
                entry.auto as i64,
            ],
        )?;
        // Evict everything beyond the newest ALERT_LOG_CAP entries.
        self.conn.execute(
            "DELETE FROM alert_log WHERE seq NOT IN (
                SELECT seq FROM alert_log ORDER BY seq DESC LIMIT ?1
             )",
            params![ALERT_LOG_CAP as i64],
        )?;
        Ok(())
    }

    fn alert_logs(&self) -> EngineResult<Vec<AlertLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, contract_id, contract_name, phone, message,
                    status, channel, sent_at, auto
             FROM alert_log ORDER BY seq DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AlertLogEntry {
                id: row.get(0)?,
                contract_id: row.get(1)?,
                contract_name: row.get(2)?,
                phone: row.get(3)?,
                message: row.get(4)?,
                status: DispatchStatus::parse(&row.get::<_, String>(5)?),
                channel: AlertChannel::parse(&row.get::<_, String>(6)?),
                sent_at: row.get::<_, TimestampMs>(7)?,
                auto: row.get::<_, i64>(8)? != 0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
