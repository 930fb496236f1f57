//! Shared data types: snapshot row structs, the Location wire format served
//! by the facade, the LLM filter schema, and map visualization helpers.

pub mod connection;
pub mod filters;
pub mod location;
pub mod viz;

pub use connection::{ConnectionRow, ConnectionSummary, TradeRouteRow};
pub use filters::{CustomerType, MapFilters, SortBy};
pub use location::{
    Coordinates, CustomerRow, Location, LocationMetrics, LocationType, MapCityRow, SupplierRow,
};
