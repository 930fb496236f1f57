//! Read path over the embedded SQLite snapshot.
//!
//! The snapshot is write-once: `atlas_sync` drops and recreates every table,
//! and the facade only ever reads. All filters are bound parameters; the one
//! piece of SQL assembled at runtime is the `map_data` sort column, which is
//! resolved against a whitelist first.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::models::{ConnectionRow, CustomerRow, MapCityRow, SupplierRow, TradeRouteRow};

/// Conjunctive filters for `/api/connections`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionFilter {
    pub supplier_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub min_volume: Option<f64>,
    pub limit: i64,
}

/// Filters for the `map_data` city rollup.
#[derive(Debug, Clone, Default)]
pub struct MapCityFilter {
    pub state: Option<String>,
    pub country: Option<String>,
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
}

/// Aggregates across the three entity tables, for `/api/stats`.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub total_suppliers: i64,
    pub total_customers: i64,
    pub supplier_revenue: f64,
    pub customer_revenue: f64,
    pub total_trade_volume: f64,
    pub total_locations: i64,
}

/// Per-customer supplier diversity, for `/api/supplier-exclusivity`.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SupplierExclusivityRow {
    pub customer_id: i64,
    pub customer_name: String,
    pub supplier_count: i64,
    pub max_supplier_volume: f64,
}

/// Per-state revenue rollup over `map_data`.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StateRevenueRow {
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub total_revenue: f64,
}

/// Snapshot-wide `map_data` aggregates.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MapDataStats {
    pub total_cities: i64,
    pub cities_with_customers: i64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub avg_revenue: f64,
    pub max_revenue: f64,
    pub avg_profit_margin: f64,
}

#[derive(Clone, Debug)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open an existing snapshot file. Fails if the file does not exist,
    /// since an empty snapshot means `atlas_sync` has never run.
    pub async fn open(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open local snapshot at {path}"))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Suppliers / customers
    // ------------------------------------------------------------------

    /// All suppliers, revenue descending. No limit: the supplier table is
    /// small by construction.
    pub async fn list_suppliers(&self, state: Option<&str>) -> Result<Vec<SupplierRow>> {
        sqlx::query_as::<_, SupplierRow>(
            "SELECT * FROM suppliers WHERE (?1 IS NULL OR state = ?1) ORDER BY revenue DESC",
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list suppliers")
    }

    pub async fn list_customers(
        &self,
        state: Option<&str>,
        limit: i64,
    ) -> Result<Vec<CustomerRow>> {
        sqlx::query_as::<_, CustomerRow>(
            "SELECT * FROM customers WHERE (?1 IS NULL OR state = ?1) \
             ORDER BY revenue DESC LIMIT ?2",
        )
        .bind(state)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list customers")
    }

    pub async fn supplier_by_id(&self, id: i64) -> Result<Option<SupplierRow>> {
        sqlx::query_as::<_, SupplierRow>("SELECT * FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get supplier by id")
    }

    pub async fn customer_by_id(&self, id: i64) -> Result<Option<CustomerRow>> {
        sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get customer by id")
    }

    // ------------------------------------------------------------------
    // Connections / trade routes
    // ------------------------------------------------------------------

    pub async fn filter_connections(&self, filter: &ConnectionFilter) -> Result<Vec<ConnectionRow>> {
        sqlx::query_as::<_, ConnectionRow>(
            "SELECT * FROM connections \
             WHERE (?1 IS NULL OR from_id = ?1) \
               AND (?2 IS NULL OR to_id = ?2) \
               AND (?3 IS NULL OR volume >= ?3) \
             ORDER BY volume DESC LIMIT ?4",
        )
        .bind(filter.supplier_id)
        .bind(filter.customer_id)
        .bind(filter.min_volume)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to filter connections")
    }

    /// Outgoing edges for a supplier.
    pub async fn connections_from(&self, supplier_id: i64) -> Result<Vec<ConnectionRow>> {
        sqlx::query_as::<_, ConnectionRow>(
            "SELECT * FROM connections WHERE from_id = ?1 ORDER BY volume DESC",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get outgoing connections")
    }

    /// Incoming edges for a customer.
    pub async fn connections_to(&self, customer_id: i64) -> Result<Vec<ConnectionRow>> {
        sqlx::query_as::<_, ConnectionRow>(
            "SELECT * FROM connections WHERE to_id = ?1 ORDER BY volume DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get incoming connections")
    }

    pub async fn trade_routes(
        &self,
        min_volume: Option<f64>,
        limit: i64,
    ) -> Result<Vec<TradeRouteRow>> {
        sqlx::query_as::<_, TradeRouteRow>(
            "SELECT * FROM trade_routes WHERE (?1 IS NULL OR volume >= ?1) \
             ORDER BY volume DESC LIMIT ?2",
        )
        .bind(min_volume)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list trade routes")
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    pub async fn stats(&self) -> Result<SnapshotStats> {
        let (total_suppliers, supplier_revenue): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(revenue), 0) FROM suppliers",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate suppliers")?;

        let (total_customers, customer_revenue): (i64, f64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(revenue), 0) FROM customers",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate customers")?;

        let (total_trade_volume,): (f64,) =
            sqlx::query_as("SELECT COALESCE(SUM(volume), 0) FROM trade_routes")
                .fetch_one(&self.pool)
                .await
                .context("Failed to aggregate trade routes")?;

        Ok(SnapshotStats {
            total_suppliers,
            total_customers,
            supplier_revenue,
            customer_revenue,
            total_trade_volume,
            total_locations: total_suppliers + total_customers,
        })
    }

    /// Distinct supplying suppliers and the single largest supplier volume
    /// per customer. Fewer suppliers means more concentration risk, so the
    /// most exclusive customers sort first.
    pub async fn supplier_exclusivity(&self) -> Result<Vec<SupplierExclusivityRow>> {
        sqlx::query_as::<_, SupplierExclusivityRow>(
            "SELECT to_id AS customer_id, \
                    COALESCE(to_name, '') AS customer_name, \
                    COUNT(DISTINCT from_id) AS supplier_count, \
                    COALESCE(MAX(volume), 0) AS max_supplier_volume \
             FROM connections \
             WHERE to_id IS NOT NULL \
             GROUP BY to_id, to_name \
             ORDER BY supplier_count ASC, max_supplier_volume DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute supplier exclusivity")
    }

    // ------------------------------------------------------------------
    // City rollup (map_data)
    // ------------------------------------------------------------------

    pub async fn map_cities(&self, filter: &MapCityFilter) -> Result<Vec<MapCityRow>> {
        // Sort column is interpolated, so resolve it against a whitelist.
        let sort_field = match filter.sort_by.as_deref() {
            Some("profit") => "profit",
            Some("population") => "population",
            _ => "revenue",
        };
        let sql = format!(
            "SELECT * FROM map_data \
             WHERE customer_count > 0 \
               AND (?1 IS NULL OR state_code = ?1) \
               AND (?2 IS NULL OR country_name = ?2) \
               AND (?3 IS NULL OR revenue >= ?3) \
               AND (?4 IS NULL OR revenue <= ?4) \
             ORDER BY {sort_field} DESC LIMIT ?5",
        );
        sqlx::query_as::<_, MapCityRow>(&sql)
            .bind(filter.state.as_deref())
            .bind(filter.country.as_deref())
            .bind(filter.min_revenue)
            .bind(filter.max_revenue)
            .bind(filter.limit.unwrap_or(-1))
            .fetch_all(&self.pool)
            .await
            .context("Failed to query map cities")
    }

    /// Substring match on city name. LIKE metacharacters in the query are
    /// escaped so they match literally.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<MapCityRow>> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        sqlx::query_as::<_, MapCityRow>(
            "SELECT * FROM map_data \
             WHERE city_name LIKE ?1 ESCAPE '\\' AND customer_count > 0 \
             ORDER BY revenue DESC LIMIT 20",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .context("Failed to search cities")
    }

    pub async fn cities_by_state(&self, state_code: &str) -> Result<Vec<MapCityRow>> {
        sqlx::query_as::<_, MapCityRow>(
            "SELECT * FROM map_data \
             WHERE state_code = ?1 AND customer_count > 0 \
             ORDER BY revenue DESC",
        )
        .bind(state_code)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query cities by state")
    }

    pub async fn top_state_by_revenue(&self) -> Result<Option<StateRevenueRow>> {
        sqlx::query_as::<_, StateRevenueRow>(
            "SELECT state_code, state_name, COALESCE(SUM(revenue), 0) AS total_revenue \
             FROM map_data GROUP BY state_code, state_name \
             ORDER BY total_revenue DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find top state by revenue")
    }

    pub async fn map_stats(&self) -> Result<MapDataStats> {
        sqlx::query_as::<_, MapDataStats>(
            "SELECT COUNT(*) AS total_cities, \
                    COUNT(CASE WHEN customer_count > 0 THEN 1 END) AS cities_with_customers, \
                    COALESCE(SUM(revenue), 0) AS total_revenue, \
                    COALESCE(SUM(profit), 0) AS total_profit, \
                    COALESCE(AVG(revenue), 0) AS avg_revenue, \
                    COALESCE(MAX(revenue), 0) AS max_revenue, \
                    COALESCE(AVG(profit_margin), 0) AS avg_profit_margin \
             FROM map_data",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate map data")
    }
}
