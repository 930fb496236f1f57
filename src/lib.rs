//! trade-atlas: supply-chain snapshot service over a retail warehouse.
//!
//! The remote warehouse (customers, orders, invoices, stock items, suppliers,
//! geography) is the system of record. A batch sync job extracts aggregated
//! supplier/customer/connection projections, exports them as JSON/CSV, and
//! loads them into an embedded SQLite snapshot. An axum facade re-serves the
//! snapshot with filter/sort/limit query parameters, and a thin Anthropic
//! client turns free-text questions into structured map filters.

pub mod ai;
#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod sync;

pub use config::AtlasConfig;
pub use database::{LocalStore, WarehouseClient};
pub use error::ApiError;
