//! rentpay-core — rental-collections automation core.
//!
//! The surrounding application (CRUD screens, reports, exports) is an
//! external collaborator that reads and writes records through the
//! [`store::ContractStore`] trait. This crate owns the one hard part: the
//! idempotent reconciliation pass in [`engine`], built from the two pure
//! helpers in [`accrual`] and [`alert`].

pub mod accrual;
pub mod alert;
pub mod clock;
pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod stats;
pub mod store;
pub mod types;
