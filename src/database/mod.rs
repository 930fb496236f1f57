//! Database services.
//!
//! `LocalStore` wraps the embedded SQLite snapshot; `WarehouseClient` wraps
//! the remote Postgres warehouse pool. Both are cheap-to-clone structs owning
//! a pool, with `anyhow` context on every query.

pub mod local_store;
pub mod warehouse;

pub use local_store::{
    ConnectionFilter, LocalStore, MapCityFilter, MapDataStats, SnapshotStats, StateRevenueRow,
    SupplierExclusivityRow,
};
pub use warehouse::{
    CustomerDetailsRow, CustomerOrderRow, CustomerProductRow, WarehouseClient,
};
