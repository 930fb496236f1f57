//! Warehouse extraction into snapshot records.
//!
//! Each record mirrors one row of a snapshot table, but keeps the nested
//! location/metrics/visualization shape that the JSON exports use. The
//! flattening into SQLite columns happens in [`super::load`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::database::warehouse::{
    CityRollupRow, ConnectionProjectionRow, CustomerProjectionRow, SupplierProjectionRow,
    TradeRouteProjectionRow, WarehouseClient,
};
use crate::models::viz::{self, line_visualization};
use crate::models::Coordinates;

/// Only the strongest edges are snapshotted; the full cross product is far
/// too dense to draw.
pub const CONNECTION_LIMIT: i64 = 30;
pub const TRADE_ROUTE_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySite {
    pub city: String,
    pub state: String,
    pub state_name: String,
    pub country: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerViz {
    pub marker_type: String,
    pub marker_size: String,
    pub marker_color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierMetrics {
    pub revenue: f64,
    pub customers_served: i64,
    pub product_count: i64,
    pub transaction_count: i64,
    pub market_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRecord {
    pub id: i64,
    pub name: String,
    pub location: EntitySite,
    pub metrics: SupplierMetrics,
    pub visualization: MarkerViz,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetrics {
    pub revenue: f64,
    pub profit: f64,
    pub cost: f64,
    pub profit_margin: f64,
    pub invoice_count: i64,
    pub products_ordered: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    pub location: EntitySite,
    pub metrics: CustomerMetrics,
    pub visualization: MarkerViz,
}

/// One end of a supplier→customer edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMetrics {
    pub volume: f64,
    pub transaction_count: i64,
    pub product_count: i64,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStyle {
    pub line_width: i64,
    pub line_color: String,
    pub opacity: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: Endpoint,
    pub to: Endpoint,
    pub metrics: ConnectionMetrics,
    pub visualization: LineStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateEndpoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRouteMetrics {
    pub volume: f64,
    pub transaction_count: i64,
    pub customer_count: i64,
    pub product_count: i64,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRouteRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: StateEndpoint,
    pub to: StateEndpoint,
    pub metrics: TradeRouteMetrics,
    pub visualization: LineStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapCityRecord {
    pub city_id: i64,
    pub city_name: String,
    pub state_code: String,
    pub state_name: String,
    pub country_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: i64,
    pub revenue: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub customer_count: i64,
}

/// Everything one sync run pulls out of the warehouse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extracted {
    pub suppliers: Vec<SupplierRecord>,
    pub customers: Vec<CustomerRecord>,
    pub connections: Vec<ConnectionRecord>,
    pub trade_routes: Vec<TradeRouteRecord>,
    pub map_cities: Vec<MapCityRecord>,
}

pub async fn extract(warehouse: &WarehouseClient) -> Result<Extracted> {
    tracing::info!("Extracting warehouse projections");
    let (supplier_rows, customer_rows, connection_rows, route_rows, city_rows) =
        futures::try_join!(
            warehouse.extract_suppliers(),
            warehouse.extract_customers(),
            warehouse.extract_connections(CONNECTION_LIMIT),
            warehouse.extract_trade_routes(TRADE_ROUTE_LIMIT),
            warehouse.extract_city_rollup(),
        )?;
    tracing::info!(
        suppliers = supplier_rows.len(),
        customers = customer_rows.len(),
        connections = connection_rows.len(),
        trade_routes = route_rows.len(),
        cities = city_rows.len(),
        "Warehouse extraction complete"
    );

    Ok(build_records(
        supplier_rows,
        customer_rows,
        connection_rows,
        route_rows,
        city_rows,
    ))
}

pub fn build_records(
    suppliers: Vec<SupplierProjectionRow>,
    customers: Vec<CustomerProjectionRow>,
    connections: Vec<ConnectionProjectionRow>,
    trade_routes: Vec<TradeRouteProjectionRow>,
    cities: Vec<CityRollupRow>,
) -> Extracted {
    let total_supplier_revenue: f64 = suppliers.iter().map(|s| s.revenue).sum();
    let max_connection_volume = connections.iter().map(|c| c.volume).fold(0.0_f64, f64::max);
    let max_route_volume = trade_routes.iter().map(|r| r.volume).fold(0.0_f64, f64::max);

    Extracted {
        suppliers: suppliers
            .into_iter()
            .map(|row| supplier_record(row, total_supplier_revenue))
            .collect(),
        customers: customers.into_iter().map(customer_record).collect(),
        connections: connections
            .into_iter()
            .enumerate()
            .map(|(idx, row)| connection_record(row, idx, max_connection_volume))
            .collect(),
        trade_routes: trade_routes
            .into_iter()
            .enumerate()
            .map(|(idx, row)| trade_route_record(row, idx, max_route_volume))
            .collect(),
        map_cities: cities.into_iter().map(map_city_record).collect(),
    }
}

fn supplier_record(row: SupplierProjectionRow, total_revenue: f64) -> SupplierRecord {
    let market_share = if total_revenue > 0.0 {
        row.revenue / total_revenue * 100.0
    } else {
        0.0
    };
    SupplierRecord {
        id: row.supplier_id,
        name: row.supplier_name,
        location: EntitySite {
            city: row.city_name,
            state: row.state_code,
            state_name: row.state_name,
            country: row.country_name,
            coordinates: Coordinates {
                latitude: row.latitude,
                longitude: row.longitude,
            },
        },
        metrics: SupplierMetrics {
            revenue: row.revenue,
            customers_served: row.customers_served,
            product_count: row.product_count,
            transaction_count: row.transaction_count,
            market_share,
        },
        // Suppliers are few and always prominent on the map.
        visualization: MarkerViz {
            marker_type: "star".to_string(),
            marker_size: "xl".to_string(),
            marker_color: "#ff0000".to_string(),
            opacity: 0.9,
        },
    }
}

fn customer_record(row: CustomerProjectionRow) -> CustomerRecord {
    CustomerRecord {
        id: row.customer_id,
        name: row.customer_name,
        location: EntitySite {
            city: row.city_name,
            state: row.state_code,
            state_name: row.state_name,
            country: row.country_name,
            coordinates: Coordinates {
                latitude: row.latitude,
                longitude: row.longitude,
            },
        },
        metrics: CustomerMetrics {
            revenue: row.revenue,
            profit: row.profit,
            cost: row.cost,
            profit_margin: row.profit_margin,
            invoice_count: row.invoice_count,
            products_ordered: row.products_ordered,
        },
        visualization: MarkerViz {
            marker_type: "circle".to_string(),
            marker_size: viz::marker_size(row.revenue).to_string(),
            marker_color: viz::marker_color(row.profit_margin).to_string(),
            opacity: 0.8,
        },
    }
}

fn connection_record(
    row: ConnectionProjectionRow,
    idx: usize,
    max_volume: f64,
) -> ConnectionRecord {
    let strength = viz::strength(row.volume, max_volume);
    let line = line_visualization(strength);
    let label = format!(
        "{} → {} | ${:.1}M",
        row.supplier_name,
        row.customer_name,
        row.volume / 1_000_000.0
    );
    ConnectionRecord {
        id: format!(
            "supplier-{}-customer-{}-{}",
            row.supplier_id, row.customer_id, idx
        ),
        kind: "supplier_to_customer".to_string(),
        from: Endpoint {
            kind: "supplier".to_string(),
            id: row.supplier_id,
            name: row.supplier_name,
            city: row.supplier_city,
            state: row.supplier_state,
            coordinates: Coordinates {
                latitude: row.supplier_lat,
                longitude: row.supplier_lon,
            },
        },
        to: Endpoint {
            kind: "customer".to_string(),
            id: row.customer_id,
            name: row.customer_name,
            city: row.customer_city,
            state: row.customer_state,
            coordinates: Coordinates {
                latitude: row.customer_lat,
                longitude: row.customer_lon,
            },
        },
        metrics: ConnectionMetrics {
            volume: row.volume,
            transaction_count: row.transaction_count,
            product_count: row.product_count,
            strength,
        },
        visualization: LineStyle {
            line_width: line.line_width,
            line_color: line.line_color,
            opacity: line.opacity,
            label,
        },
    }
}

fn trade_route_record(row: TradeRouteProjectionRow, idx: usize, max_volume: f64) -> TradeRouteRecord {
    let strength = viz::strength(row.volume, max_volume);
    let line = line_visualization(strength);
    let label = format!(
        "{} → {} | ${:.1}M | {} customers",
        row.from_state,
        row.to_state,
        row.volume / 1_000_000.0,
        row.customer_count
    );
    TradeRouteRecord {
        id: format!("{}-{}-{}", row.from_state, row.to_state, idx),
        kind: "state_to_state".to_string(),
        from: StateEndpoint {
            kind: "state".to_string(),
            code: row.from_state,
            name: row.from_state_name,
        },
        to: StateEndpoint {
            kind: "state".to_string(),
            code: row.to_state,
            name: row.to_state_name,
        },
        metrics: TradeRouteMetrics {
            volume: row.volume,
            transaction_count: row.transaction_count,
            customer_count: row.customer_count,
            product_count: row.product_count,
            strength,
        },
        visualization: LineStyle {
            line_width: line.line_width,
            line_color: line.line_color,
            opacity: line.opacity,
            label,
        },
    }
}

fn map_city_record(row: CityRollupRow) -> MapCityRecord {
    let profit_margin = if row.revenue > 0.0 {
        row.profit / row.revenue * 100.0
    } else {
        0.0
    };
    MapCityRecord {
        city_id: row.city_id,
        city_name: row.city_name,
        state_code: row.state_code.unwrap_or_default(),
        state_name: row.state_name.unwrap_or_default(),
        country_name: row.country_name.unwrap_or_default(),
        latitude: row.latitude.unwrap_or(0.0),
        longitude: row.longitude.unwrap_or(0.0),
        population: row.population.unwrap_or(0),
        revenue: row.revenue,
        profit: row.profit,
        profit_margin,
        customer_count: row.customer_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection_row(sid: i64, cid: i64, volume: f64) -> ConnectionProjectionRow {
        ConnectionProjectionRow {
            supplier_id: sid,
            supplier_name: format!("Supplier {sid}"),
            supplier_city: "Hudson".to_string(),
            supplier_state: "OH".to_string(),
            supplier_lat: 41.2,
            supplier_lon: -81.4,
            customer_id: cid,
            customer_name: format!("Customer {cid}"),
            customer_city: "Gasport".to_string(),
            customer_state: "NY".to_string(),
            customer_lat: 43.2,
            customer_lon: -78.5,
            transaction_count: 10,
            product_count: 3,
            volume,
        }
    }

    #[test]
    fn connection_strength_normalizes_to_batch_max() {
        let rows = vec![connection_row(1, 10, 4_000_000.0), connection_row(2, 11, 1_000_000.0)];
        let out = build_records(vec![], vec![], rows, vec![], vec![]);
        assert_eq!(out.connections[0].metrics.strength, 1.0);
        assert_eq!(out.connections[1].metrics.strength, 0.25);
        assert_eq!(out.connections[0].id, "supplier-1-customer-10-0");
        assert_eq!(out.connections[0].kind, "supplier_to_customer");
        assert_eq!(
            out.connections[0].visualization.label,
            "Supplier 1 → Customer 10 | $4.0M"
        );
    }

    #[test]
    fn market_share_sums_to_hundred() {
        let supplier = |id: i64, revenue: f64| SupplierProjectionRow {
            supplier_id: id,
            supplier_name: format!("S{id}"),
            city_name: "Hudson".to_string(),
            state_code: "OH".to_string(),
            state_name: "Ohio".to_string(),
            country_name: "United States".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            customers_served: 1,
            product_count: 1,
            transaction_count: 1,
            revenue,
        };
        let out = build_records(
            vec![supplier(1, 750_000.0), supplier(2, 250_000.0)],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        let total: f64 = out.suppliers.iter().map(|s| s.metrics.market_share).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(out.suppliers[0].metrics.market_share, 75.0);
        assert_eq!(out.suppliers[0].visualization.marker_type, "star");
    }

    #[test]
    fn city_margin_zero_when_no_revenue() {
        let row = CityRollupRow {
            city_id: 7,
            city_name: "Nowhere".to_string(),
            state_code: None,
            state_name: None,
            country_name: None,
            latitude: None,
            longitude: None,
            population: None,
            revenue: 0.0,
            profit: 0.0,
            customer_count: 0,
        };
        let record = map_city_record(row);
        assert_eq!(record.profit_margin, 0.0);
        assert_eq!(record.state_code, "");
    }
}
