//! Shared test fixtures: a seeded in-memory snapshot and a request helper.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use trade_atlas::database::warehouse::{
    CityRollupRow, ConnectionProjectionRow, CustomerProjectionRow, SupplierProjectionRow,
    TradeRouteProjectionRow,
};
use trade_atlas::sync::extract::build_records;
use trade_atlas::sync::{load, Extracted};
use trade_atlas::LocalStore;

/// In-memory SQLite. One connection, otherwise each acquire sees a fresh
/// empty database.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

fn supplier(id: i64, name: &str, state: &str, revenue: f64) -> SupplierProjectionRow {
    SupplierProjectionRow {
        supplier_id: id,
        supplier_name: name.to_string(),
        city_name: "Hudson".to_string(),
        state_code: state.to_string(),
        state_name: format!("{state} State"),
        country_name: "United States".to_string(),
        latitude: 41.24,
        longitude: -81.44,
        customers_served: 10,
        product_count: 5,
        transaction_count: 100,
        revenue,
    }
}

fn customer(id: i64, name: &str, state: &str, revenue: f64, profit: f64) -> CustomerProjectionRow {
    CustomerProjectionRow {
        customer_id: id,
        customer_name: name.to_string(),
        city_name: "Gasport".to_string(),
        state_code: state.to_string(),
        state_name: format!("{state} State"),
        country_name: "United States".to_string(),
        latitude: 43.19,
        longitude: -78.57,
        invoice_count: 12,
        products_ordered: 4,
        revenue,
        cost: revenue - profit,
        profit,
        profit_margin: if revenue > 0.0 { profit / revenue * 100.0 } else { 0.0 },
    }
}

fn connection(
    supplier_id: i64,
    customer_id: i64,
    volume: f64,
) -> ConnectionProjectionRow {
    ConnectionProjectionRow {
        supplier_id,
        supplier_name: format!("Supplier {supplier_id}"),
        supplier_city: "Hudson".to_string(),
        supplier_state: "OH".to_string(),
        supplier_lat: 41.24,
        supplier_lon: -81.44,
        customer_id,
        customer_name: format!("Customer {customer_id}"),
        customer_city: "Gasport".to_string(),
        customer_state: "NY".to_string(),
        customer_lat: 43.19,
        customer_lon: -78.57,
        transaction_count: 8,
        product_count: 3,
        volume,
    }
}

fn trade_route(from: &str, to: &str, volume: f64) -> TradeRouteProjectionRow {
    TradeRouteProjectionRow {
        from_state: from.to_string(),
        from_state_name: format!("{from} State"),
        to_state: to.to_string(),
        to_state_name: format!("{to} State"),
        customer_count: 5,
        transaction_count: 40,
        product_count: 12,
        volume,
    }
}

fn city(id: i64, name: &str, state: &str, revenue: f64, customers: i64) -> CityRollupRow {
    CityRollupRow {
        city_id: id,
        city_name: name.to_string(),
        state_code: Some(state.to_string()),
        state_name: Some(format!("{state} State")),
        country_name: Some("United States".to_string()),
        latitude: Some(40.0),
        longitude: Some(-80.0),
        population: Some(10_000),
        revenue,
        profit: revenue * 0.45,
        customer_count: customers,
    }
}

/// Two suppliers, three customers, the two-connection volume scenario
/// (1500 and 500), one trade route, and two cities (one without customers).
pub fn sample_extract() -> Extracted {
    build_records(
        vec![
            supplier(1, "Fabrikam, Inc.", "OH", 1_500_000.0),
            supplier(2, "Litware, Inc.", "WA", 500_000.0),
        ],
        vec![
            customer(101, "Tailspin Toys (Gasport, NY)", "NY", 300_000.0, 135_000.0),
            customer(102, "Wingtip Toys (Sylvanite, MT)", "CA", 200_000.0, 30_000.0),
            customer(103, "Adventure Works Cycles", "CA", 100_000.0, -5_000.0),
        ],
        vec![connection(1, 101, 1500.0), connection(2, 102, 500.0)],
        vec![trade_route("OH", "NY", 2500.0)],
        vec![city(9001, "Gasport", "NY", 600_000.0, 2), city(9002, "Emptyville", "MT", 0.0, 0)],
    )
}

pub async fn load_sample(pool: &SqlitePool) {
    let extracted = sample_extract();
    load::create_schema(pool).await.expect("schema");
    load::load_snapshot(pool, &extracted).await.expect("load");
    load::create_indexes(pool).await.expect("indexes");
}

pub async fn seeded_store() -> LocalStore {
    let pool = memory_pool().await;
    load_sample(&pool).await;
    LocalStore::new(pool)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .expect("request");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
