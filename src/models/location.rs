//! Snapshot location rows and their wire transform.
//!
//! The SQLite snapshot keeps suppliers and customers in separate tables with
//! flat columns; the facade serves both through a single `Location` shape
//! (nested coordinates/metrics) so the two kinds are interchangeable for map
//! clients.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::connection::ConnectionSummary;

/// Supplier row as stored in the local snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupplierRow {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub state_name: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub revenue: Option<f64>,
    pub customers_served: Option<i64>,
    pub product_count: Option<i64>,
    pub transaction_count: Option<i64>,
    pub market_share: Option<f64>,
    pub marker_type: Option<String>,
    pub marker_size: Option<String>,
    pub marker_color: Option<String>,
    pub opacity: Option<f64>,
}

/// Customer row as stored in the local snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub state_name: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub cost: Option<f64>,
    pub profit_margin: Option<f64>,
    pub invoice_count: Option<i64>,
    pub products_ordered: Option<i64>,
    pub marker_type: Option<String>,
    pub marker_size: Option<String>,
    pub marker_color: Option<String>,
    pub opacity: Option<f64>,
}

/// City rollup row (`map_data` table).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MapCityRow {
    pub city_id: i64,
    pub city_name: String,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<i64>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    pub profit_margin: Option<f64>,
    pub customer_count: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Supplier,
    Customer,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMetrics {
    pub revenue: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub customer_count: i64,
}

/// Unified location shape served by `/api/locations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub state: Option<String>,
    pub state_name: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub coordinates: Coordinates,
    pub population: i64,
    pub metrics: LocationMetrics,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub connections: Vec<ConnectionSummary>,
}

impl From<SupplierRow> for Location {
    fn from(row: SupplierRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            state: row.state,
            state_name: row.state_name,
            country: row.country,
            city: row.city,
            coordinates: Coordinates {
                latitude: row.latitude.unwrap_or(0.0),
                longitude: row.longitude.unwrap_or(0.0),
            },
            population: 0,
            metrics: LocationMetrics {
                revenue: row.revenue.unwrap_or(0.0),
                // Profit is not tracked on the supplier side of the snapshot.
                profit: 0.0,
                profit_margin: 0.0,
                customer_count: row.customers_served.unwrap_or(0),
            },
            location_type: LocationType::Supplier,
            connections: Vec::new(),
        }
    }
}

impl From<CustomerRow> for Location {
    fn from(row: CustomerRow) -> Self {
        Location {
            id: row.id,
            name: row.name,
            state: row.state,
            state_name: row.state_name,
            country: row.country,
            city: row.city,
            coordinates: Coordinates {
                latitude: row.latitude.unwrap_or(0.0),
                longitude: row.longitude.unwrap_or(0.0),
            },
            population: 0,
            metrics: LocationMetrics {
                revenue: row.revenue.unwrap_or(0.0),
                profit: row.profit.unwrap_or(0.0),
                profit_margin: row.profit_margin.unwrap_or(0.0),
                customer_count: 1,
            },
            location_type: LocationType::Customer,
            connections: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier_row() -> SupplierRow {
        SupplierRow {
            id: 4,
            name: "Fabrikam, Inc.".to_string(),
            city: Some("Hudson".to_string()),
            state: Some("OH".to_string()),
            state_name: Some("Ohio".to_string()),
            country: Some("United States".to_string()),
            latitude: Some(41.24),
            longitude: Some(-81.44),
            revenue: Some(1_250_000.0),
            customers_served: Some(412),
            product_count: Some(61),
            transaction_count: Some(9_320),
            market_share: Some(12.5),
            marker_type: Some("star".to_string()),
            marker_size: Some("xl".to_string()),
            marker_color: Some("#ff0000".to_string()),
            opacity: Some(0.9),
        }
    }

    #[test]
    fn supplier_transform_zeroes_profit() {
        let loc = Location::from(supplier_row());
        assert_eq!(loc.location_type, LocationType::Supplier);
        assert_eq!(loc.metrics.profit, 0.0);
        assert_eq!(loc.metrics.profit_margin, 0.0);
        assert_eq!(loc.metrics.customer_count, 412);
        assert!(loc.connections.is_empty());
    }

    #[test]
    fn location_serializes_camel_case() {
        let loc = Location::from(supplier_row());
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["type"], "supplier");
        assert_eq!(json["stateName"], "Ohio");
        assert!(json["metrics"]["profitMargin"].is_number());
        assert!(json["coordinates"]["latitude"].is_number());
    }
}
