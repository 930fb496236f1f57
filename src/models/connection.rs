//! Supplier→customer connection edges and state→state trade routes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Directed supplier→customer edge with aggregate trade metrics, as stored
/// in the `connections` snapshot table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionRow {
    pub id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_id: Option<i64>,
    pub from_type: Option<String>,
    pub from_name: Option<String>,
    pub from_city: Option<String>,
    pub from_state: Option<String>,
    pub from_latitude: Option<f64>,
    pub from_longitude: Option<f64>,
    pub to_id: Option<i64>,
    pub to_type: Option<String>,
    pub to_name: Option<String>,
    pub to_city: Option<String>,
    pub to_state: Option<String>,
    pub to_latitude: Option<f64>,
    pub to_longitude: Option<f64>,
    pub volume: Option<f64>,
    pub transaction_count: Option<i64>,
    pub product_count: Option<i64>,
    pub strength: Option<f64>,
    pub line_width: Option<i64>,
    pub line_color: Option<String>,
    pub opacity: Option<f64>,
    pub label: Option<String>,
}

/// Aggregated state→state edge (`trade_routes` snapshot table).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeRouteRow {
    pub id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_code: Option<String>,
    pub from_name: Option<String>,
    pub to_code: Option<String>,
    pub to_name: Option<String>,
    pub volume: Option<f64>,
    pub transaction_count: Option<i64>,
    pub customer_count: Option<i64>,
    pub product_count: Option<i64>,
    pub strength: Option<f64>,
    pub line_width: Option<i64>,
    pub line_color: Option<String>,
    pub opacity: Option<f64>,
    pub label: Option<String>,
}

/// Compact edge attached to a single location's detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub target_id: i64,
    pub volume: f64,
    pub products: i64,
    pub invoices: i64,
}

impl From<&ConnectionRow> for ConnectionSummary {
    fn from(row: &ConnectionRow) -> Self {
        ConnectionSummary {
            target_id: row.to_id.unwrap_or(0),
            volume: row.volume.unwrap_or(0.0),
            products: row.product_count.unwrap_or(0),
            invoices: row.transaction_count.unwrap_or(0),
        }
    }
}

impl ConnectionRow {
    /// Summary pointing back at the supplier side, for customer detail views.
    pub fn incoming_summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            target_id: self.from_id.unwrap_or(0),
            volume: self.volume.unwrap_or(0.0),
            products: self.product_count.unwrap_or(0),
            invoices: self.transaction_count.unwrap_or(0),
        }
    }
}
