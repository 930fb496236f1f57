//! Snapshot load: drop and recreate the SQLite tables, then bulk insert.
//!
//! The snapshot is rebuilt from scratch on every run. Rebuilding rather than
//! upserting keeps the load idempotent: loading the same extract twice leaves
//! identical tables.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::SqlitePool;

use super::extract::Extracted;

const SCHEMA: &[&str] = &[
    "DROP TABLE IF EXISTS suppliers",
    "CREATE TABLE suppliers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        city TEXT,
        state TEXT,
        state_name TEXT,
        country TEXT,
        latitude REAL,
        longitude REAL,
        revenue REAL,
        customers_served INTEGER,
        product_count INTEGER,
        transaction_count INTEGER,
        market_share REAL,
        marker_type TEXT,
        marker_size TEXT,
        marker_color TEXT,
        opacity REAL
    )",
    "DROP TABLE IF EXISTS customers",
    "CREATE TABLE customers (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        city TEXT,
        state TEXT,
        state_name TEXT,
        country TEXT,
        latitude REAL,
        longitude REAL,
        revenue REAL,
        profit REAL,
        cost REAL,
        profit_margin REAL,
        invoice_count INTEGER,
        products_ordered INTEGER,
        marker_type TEXT,
        marker_size TEXT,
        marker_color TEXT,
        opacity REAL
    )",
    "DROP TABLE IF EXISTS connections",
    "CREATE TABLE connections (
        id TEXT PRIMARY KEY,
        type TEXT,
        from_id INTEGER,
        from_type TEXT,
        from_name TEXT,
        from_city TEXT,
        from_state TEXT,
        from_latitude REAL,
        from_longitude REAL,
        to_id INTEGER,
        to_type TEXT,
        to_name TEXT,
        to_city TEXT,
        to_state TEXT,
        to_latitude REAL,
        to_longitude REAL,
        volume REAL,
        transaction_count INTEGER,
        product_count INTEGER,
        strength REAL,
        line_width INTEGER,
        line_color TEXT,
        opacity REAL,
        label TEXT
    )",
    "DROP TABLE IF EXISTS trade_routes",
    "CREATE TABLE trade_routes (
        id TEXT PRIMARY KEY,
        type TEXT,
        from_code TEXT,
        from_name TEXT,
        to_code TEXT,
        to_name TEXT,
        volume REAL,
        transaction_count INTEGER,
        customer_count INTEGER,
        product_count INTEGER,
        strength REAL,
        line_width INTEGER,
        line_color TEXT,
        opacity REAL,
        label TEXT
    )",
    "DROP TABLE IF EXISTS map_data",
    "CREATE TABLE map_data (
        city_id INTEGER PRIMARY KEY,
        city_name TEXT NOT NULL,
        state_code TEXT,
        state_name TEXT,
        country_name TEXT,
        latitude REAL,
        longitude REAL,
        population INTEGER,
        revenue REAL,
        profit REAL,
        profit_margin REAL,
        customer_count INTEGER
    )",
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_suppliers_state ON suppliers(state)",
    "CREATE INDEX IF NOT EXISTS idx_suppliers_revenue ON suppliers(revenue DESC)",
    "CREATE INDEX IF NOT EXISTS idx_customers_state ON customers(state)",
    "CREATE INDEX IF NOT EXISTS idx_customers_revenue ON customers(revenue DESC)",
    "CREATE INDEX IF NOT EXISTS idx_customers_profit_margin ON customers(profit_margin)",
    "CREATE INDEX IF NOT EXISTS idx_connections_from ON connections(from_id)",
    "CREATE INDEX IF NOT EXISTS idx_connections_to ON connections(to_id)",
    "CREATE INDEX IF NOT EXISTS idx_connections_volume ON connections(volume DESC)",
    "CREATE INDEX IF NOT EXISTS idx_trade_routes_from ON trade_routes(from_code)",
    "CREATE INDEX IF NOT EXISTS idx_trade_routes_to ON trade_routes(to_code)",
    "CREATE INDEX IF NOT EXISTS idx_trade_routes_volume ON trade_routes(volume DESC)",
    "CREATE INDEX IF NOT EXISTS idx_map_data_state ON map_data(state_code)",
    "CREATE INDEX IF NOT EXISTS idx_map_data_country ON map_data(country_name)",
    "CREATE INDEX IF NOT EXISTS idx_map_data_revenue ON map_data(revenue)",
    "CREATE INDEX IF NOT EXISTS idx_map_data_profit ON map_data(profit)",
];

/// Row counts and revenue totals after a load, for the sync report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub suppliers: i64,
    pub customers: i64,
    pub connections: i64,
    pub trade_routes: i64,
    pub map_cities: i64,
    pub supplier_revenue: f64,
    pub customer_revenue: f64,
    pub trade_volume: f64,
}

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to create snapshot schema")?;
    }
    tracing::info!("Snapshot schema created");
    Ok(())
}

pub async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    for statement in INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to create snapshot indexes")?;
    }
    tracing::info!("Snapshot indexes created");
    Ok(())
}

/// Insert every extracted record in a single transaction.
pub async fn load_snapshot(pool: &SqlitePool, extracted: &Extracted) -> Result<()> {
    let mut tx = pool.begin().await.context("Failed to begin load transaction")?;

    for supplier in &extracted.suppliers {
        sqlx::query(
            "INSERT INTO suppliers (
                id, name, city, state, state_name, country, latitude, longitude,
                revenue, customers_served, product_count, transaction_count, market_share,
                marker_type, marker_size, marker_color, opacity
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.location.city)
        .bind(&supplier.location.state)
        .bind(&supplier.location.state_name)
        .bind(&supplier.location.country)
        .bind(supplier.location.coordinates.latitude)
        .bind(supplier.location.coordinates.longitude)
        .bind(supplier.metrics.revenue)
        .bind(supplier.metrics.customers_served)
        .bind(supplier.metrics.product_count)
        .bind(supplier.metrics.transaction_count)
        .bind(supplier.metrics.market_share)
        .bind(&supplier.visualization.marker_type)
        .bind(&supplier.visualization.marker_size)
        .bind(&supplier.visualization.marker_color)
        .bind(supplier.visualization.opacity)
        .execute(&mut *tx)
        .await
        .context("Failed to insert supplier")?;
    }

    for customer in &extracted.customers {
        sqlx::query(
            "INSERT INTO customers (
                id, name, city, state, state_name, country, latitude, longitude,
                revenue, profit, cost, profit_margin, invoice_count, products_ordered,
                marker_type, marker_size, marker_color, opacity
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        )
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.location.city)
        .bind(&customer.location.state)
        .bind(&customer.location.state_name)
        .bind(&customer.location.country)
        .bind(customer.location.coordinates.latitude)
        .bind(customer.location.coordinates.longitude)
        .bind(customer.metrics.revenue)
        .bind(customer.metrics.profit)
        .bind(customer.metrics.cost)
        .bind(customer.metrics.profit_margin)
        .bind(customer.metrics.invoice_count)
        .bind(customer.metrics.products_ordered)
        .bind(&customer.visualization.marker_type)
        .bind(&customer.visualization.marker_size)
        .bind(&customer.visualization.marker_color)
        .bind(customer.visualization.opacity)
        .execute(&mut *tx)
        .await
        .context("Failed to insert customer")?;
    }

    for conn in &extracted.connections {
        sqlx::query(
            "INSERT INTO connections (
                id, type, from_id, from_type, from_name, from_city, from_state,
                from_latitude, from_longitude, to_id, to_type, to_name, to_city, to_state,
                to_latitude, to_longitude, volume, transaction_count, product_count, strength,
                line_width, line_color, opacity, label
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                       ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
        )
        .bind(&conn.id)
        .bind(&conn.kind)
        .bind(conn.from.id)
        .bind(&conn.from.kind)
        .bind(&conn.from.name)
        .bind(&conn.from.city)
        .bind(&conn.from.state)
        .bind(conn.from.coordinates.latitude)
        .bind(conn.from.coordinates.longitude)
        .bind(conn.to.id)
        .bind(&conn.to.kind)
        .bind(&conn.to.name)
        .bind(&conn.to.city)
        .bind(&conn.to.state)
        .bind(conn.to.coordinates.latitude)
        .bind(conn.to.coordinates.longitude)
        .bind(conn.metrics.volume)
        .bind(conn.metrics.transaction_count)
        .bind(conn.metrics.product_count)
        .bind(conn.metrics.strength)
        .bind(conn.visualization.line_width)
        .bind(&conn.visualization.line_color)
        .bind(conn.visualization.opacity)
        .bind(&conn.visualization.label)
        .execute(&mut *tx)
        .await
        .context("Failed to insert connection")?;
    }

    for route in &extracted.trade_routes {
        sqlx::query(
            "INSERT INTO trade_routes (
                id, type, from_code, from_name, to_code, to_name,
                volume, transaction_count, customer_count, product_count, strength,
                line_width, line_color, opacity, label
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(&route.id)
        .bind(&route.kind)
        .bind(&route.from.code)
        .bind(&route.from.name)
        .bind(&route.to.code)
        .bind(&route.to.name)
        .bind(route.metrics.volume)
        .bind(route.metrics.transaction_count)
        .bind(route.metrics.customer_count)
        .bind(route.metrics.product_count)
        .bind(route.metrics.strength)
        .bind(route.visualization.line_width)
        .bind(&route.visualization.line_color)
        .bind(route.visualization.opacity)
        .bind(&route.visualization.label)
        .execute(&mut *tx)
        .await
        .context("Failed to insert trade route")?;
    }

    for city in &extracted.map_cities {
        sqlx::query(
            "INSERT INTO map_data (
                city_id, city_name, state_code, state_name, country_name,
                latitude, longitude, population, revenue, profit, profit_margin, customer_count
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(city.city_id)
        .bind(&city.city_name)
        .bind(&city.state_code)
        .bind(&city.state_name)
        .bind(&city.country_name)
        .bind(city.latitude)
        .bind(city.longitude)
        .bind(city.population)
        .bind(city.revenue)
        .bind(city.profit)
        .bind(city.profit_margin)
        .bind(city.customer_count)
        .execute(&mut *tx)
        .await
        .context("Failed to insert map city")?;
    }

    tx.commit().await.context("Failed to commit load transaction")?;
    tracing::info!(
        suppliers = extracted.suppliers.len(),
        customers = extracted.customers.len(),
        connections = extracted.connections.len(),
        trade_routes = extracted.trade_routes.len(),
        map_cities = extracted.map_cities.len(),
        "Snapshot loaded"
    );
    Ok(())
}

pub async fn summary(pool: &SqlitePool) -> Result<LoadSummary> {
    let (suppliers, supplier_revenue): (i64, f64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(revenue), 0) FROM suppliers")
            .fetch_one(pool)
            .await
            .context("Failed to summarize suppliers")?;
    let (customers, customer_revenue): (i64, f64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(revenue), 0) FROM customers")
            .fetch_one(pool)
            .await
            .context("Failed to summarize customers")?;
    let (connections,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM connections")
        .fetch_one(pool)
        .await
        .context("Failed to summarize connections")?;
    let (trade_routes, trade_volume): (i64, f64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(volume), 0) FROM trade_routes")
            .fetch_one(pool)
            .await
            .context("Failed to summarize trade routes")?;
    let (map_cities,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM map_data")
        .fetch_one(pool)
        .await
        .context("Failed to summarize map data")?;

    Ok(LoadSummary {
        suppliers,
        customers,
        connections,
        trade_routes,
        map_cities,
        supplier_revenue,
        customer_revenue,
        trade_volume,
    })
}
