//! Remote warehouse client (Postgres).
//!
//! The warehouse is the system of record: a WideWorldImporters-shaped retail
//! schema (`sales`, `purchasing`, `warehouse`, `application`). The pool is
//! bounded and read-only; queries run once and propagate failures.
//!
//! Costing policy: the source schema has no true cost column. A stock item's
//! unit cost is the average purchase-order expected unit price divided by
//! quantity per outer; items with no purchase history fall back to 30% of
//! list price. The `unit_costs` CTE below is the single place this policy
//! lives.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};

const UNIT_COSTS_CTE: &str = "\
    WITH unit_costs AS ( \
        SELECT si.stock_item_id, \
               COALESCE(pol.avg_outer_price / NULLIF(si.quantity_per_outer, 0), \
                        si.unit_price * 0.3) AS unit_cost \
        FROM warehouse.stock_items si \
        LEFT JOIN ( \
            SELECT stock_item_id, AVG(expected_unit_price_per_outer) AS avg_outer_price \
            FROM purchasing.purchase_order_lines \
            WHERE expected_unit_price_per_outer > 0 \
            GROUP BY stock_item_id \
        ) pol ON pol.stock_item_id = si.stock_item_id \
    )";

#[derive(Debug, Clone, FromRow)]
pub struct CustomerOrderRow {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub product_count: i64,
    pub order_total: Decimal,
    pub order_profit: Decimal,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerProductRow {
    pub stock_item_name: String,
    pub order_count: i64,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub profitability: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerDetailsRow {
    pub customer_id: i64,
    pub customer_name: String,
    pub city_name: Option<String>,
    pub state_name: Option<String>,
    pub total_revenue: Option<Decimal>,
    pub total_profit: Option<Decimal>,
    pub total_orders: i64,
}

// Extraction projections for the sync job. Money is cast to float8 at the
// SQL boundary: the snapshot stores REAL and the viz math is all f64.

#[derive(Debug, Clone, FromRow)]
pub struct CityRollupRow {
    pub city_id: i64,
    pub city_name: String,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<i64>,
    pub revenue: f64,
    pub profit: f64,
    pub customer_count: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SupplierProjectionRow {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub city_name: String,
    pub state_code: String,
    pub state_name: String,
    pub country_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub customers_served: i64,
    pub product_count: i64,
    pub transaction_count: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerProjectionRow {
    pub customer_id: i64,
    pub customer_name: String,
    pub city_name: String,
    pub state_code: String,
    pub state_name: String,
    pub country_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub invoice_count: i64,
    pub products_ordered: i64,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub profit_margin: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ConnectionProjectionRow {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub supplier_city: String,
    pub supplier_state: String,
    pub supplier_lat: f64,
    pub supplier_lon: f64,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_city: String,
    pub customer_state: String,
    pub customer_lat: f64,
    pub customer_lon: f64,
    pub transaction_count: i64,
    pub product_count: i64,
    pub volume: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct TradeRouteProjectionRow {
    pub from_state: String,
    pub from_state_name: String,
    pub to_state: String,
    pub to_state_name: String,
    pub customer_count: i64,
    pub transaction_count: i64,
    pub product_count: i64,
    pub volume: f64,
}

#[derive(Clone, Debug)]
pub struct WarehouseClient {
    pool: PgPool,
}

impl WarehouseClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .context("Failed to connect to warehouse")?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// One-row probe used by the health surface.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Warehouse ping failed")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Per-customer queries (served live by the facade)
    // ------------------------------------------------------------------

    /// Last 50 orders for a customer with per-order totals.
    pub async fn customer_orders(&self, customer_id: i64) -> Result<Vec<CustomerOrderRow>> {
        let sql = format!(
            "{UNIT_COSTS_CTE} \
             SELECT o.order_id::bigint AS order_id, \
                    o.order_date, \
                    COUNT(DISTINCT ol.stock_item_id)::bigint AS product_count, \
                    SUM(ol.quantity * ol.unit_price) AS order_total, \
                    SUM(ol.quantity * (ol.unit_price - uc.unit_cost)) AS order_profit \
             FROM sales.orders o \
             JOIN sales.order_lines ol ON ol.order_id = o.order_id \
             JOIN unit_costs uc ON uc.stock_item_id = ol.stock_item_id \
             WHERE o.customer_id = $1 \
             GROUP BY o.order_id, o.order_date \
             ORDER BY o.order_date DESC \
             LIMIT 50"
        );
        sqlx::query_as::<_, CustomerOrderRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch customer orders")
    }

    /// Top 20 stock items by profit for a customer.
    pub async fn customer_products(&self, customer_id: i64) -> Result<Vec<CustomerProductRow>> {
        let sql = format!(
            "{UNIT_COSTS_CTE} \
             SELECT si.stock_item_name, \
                    COUNT(DISTINCT ol.order_id)::bigint AS order_count, \
                    SUM(ol.quantity)::bigint AS total_quantity, \
                    SUM(ol.quantity * ol.unit_price) AS total_revenue, \
                    SUM(ol.quantity * (ol.unit_price - uc.unit_cost)) AS total_profit, \
                    CASE WHEN SUM(ol.quantity * (ol.unit_price - uc.unit_cost)) > 0 \
                         THEN 'profitable' ELSE 'loss' END AS profitability \
             FROM sales.order_lines ol \
             JOIN sales.orders o ON o.order_id = ol.order_id \
             JOIN warehouse.stock_items si ON si.stock_item_id = ol.stock_item_id \
             JOIN unit_costs uc ON uc.stock_item_id = ol.stock_item_id \
             WHERE o.customer_id = $1 \
             GROUP BY si.stock_item_name \
             ORDER BY total_profit DESC \
             LIMIT 20"
        );
        sqlx::query_as::<_, CustomerProductRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch customer products")
    }

    pub async fn customer_details(&self, customer_id: i64) -> Result<Option<CustomerDetailsRow>> {
        let sql = format!(
            "{UNIT_COSTS_CTE} \
             SELECT c.customer_id::bigint AS customer_id, \
                    c.customer_name, \
                    ct.city_name, \
                    sp.state_province_name AS state_name, \
                    SUM(ol.quantity * ol.unit_price) AS total_revenue, \
                    SUM(ol.quantity * (ol.unit_price - uc.unit_cost)) AS total_profit, \
                    COUNT(DISTINCT o.order_id)::bigint AS total_orders \
             FROM sales.customers c \
             LEFT JOIN application.cities ct ON ct.city_id = c.delivery_city_id \
             LEFT JOIN application.state_provinces sp ON sp.state_province_id = ct.state_province_id \
             LEFT JOIN sales.orders o ON o.customer_id = c.customer_id \
             LEFT JOIN sales.order_lines ol ON ol.order_id = o.order_id \
             LEFT JOIN unit_costs uc ON uc.stock_item_id = ol.stock_item_id \
             WHERE c.customer_id = $1 \
             GROUP BY c.customer_id, c.customer_name, ct.city_name, sp.state_province_name"
        );
        sqlx::query_as::<_, CustomerDetailsRow>(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch customer details")
    }

    // ------------------------------------------------------------------
    // Extraction projections (sync job)
    // ------------------------------------------------------------------

    /// City × revenue/profit/customer-count rollup for the map layer.
    pub async fn extract_city_rollup(&self) -> Result<Vec<CityRollupRow>> {
        sqlx::query_as::<_, CityRollupRow>(
            "SELECT c.city_id::bigint AS city_id, \
                    c.city_name, \
                    sp.state_province_code AS state_code, \
                    sp.state_province_name AS state_name, \
                    co.country_name, \
                    c.latitude::float8 AS latitude, \
                    c.longitude::float8 AS longitude, \
                    c.latest_recorded_population::bigint AS population, \
                    COALESCE(SUM(il.extended_price), 0)::float8 AS revenue, \
                    COALESCE(SUM(il.line_profit), 0)::float8 AS profit, \
                    COUNT(DISTINCT cust.customer_id)::bigint AS customer_count \
             FROM application.cities c \
             LEFT JOIN application.state_provinces sp ON sp.state_province_id = c.state_province_id \
             LEFT JOIN application.countries co ON co.country_id = sp.country_id \
             LEFT JOIN sales.customers cust \
                    ON c.city_id = cust.delivery_city_id OR c.city_id = cust.postal_city_id \
             LEFT JOIN sales.invoices inv ON inv.customer_id = cust.customer_id \
             LEFT JOIN sales.invoice_lines il ON il.invoice_id = inv.invoice_id \
             GROUP BY c.city_id, c.city_name, sp.state_province_code, sp.state_province_name, \
                      co.country_name, c.latitude, c.longitude, c.latest_recorded_population",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to extract city rollup")
    }

    /// Suppliers with delivered-revenue metrics, revenue descending.
    pub async fn extract_suppliers(&self) -> Result<Vec<SupplierProjectionRow>> {
        sqlx::query_as::<_, SupplierProjectionRow>(
            "SELECT s.supplier_id::bigint AS supplier_id, \
                    s.supplier_name, \
                    c.city_name, \
                    sp.state_province_code AS state_code, \
                    sp.state_province_name AS state_name, \
                    co.country_name, \
                    c.latitude::float8 AS latitude, \
                    c.longitude::float8 AS longitude, \
                    COUNT(DISTINCT cust.customer_id)::bigint AS customers_served, \
                    COUNT(DISTINCT si.stock_item_id)::bigint AS product_count, \
                    COUNT(DISTINCT inv.invoice_id)::bigint AS transaction_count, \
                    COALESCE(SUM(il.extended_price), 0)::float8 AS revenue \
             FROM purchasing.suppliers s \
             JOIN application.cities c ON c.city_id = s.delivery_city_id \
             JOIN application.state_provinces sp ON sp.state_province_id = c.state_province_id \
             JOIN application.countries co ON co.country_id = sp.country_id \
             JOIN warehouse.stock_items si ON si.supplier_id = s.supplier_id \
             JOIN sales.invoice_lines il ON il.stock_item_id = si.stock_item_id \
             JOIN sales.invoices inv ON inv.invoice_id = il.invoice_id \
             JOIN sales.customers cust ON cust.customer_id = inv.customer_id \
             GROUP BY s.supplier_id, s.supplier_name, c.city_name, sp.state_province_code, \
                      sp.state_province_name, co.country_name, c.latitude, c.longitude \
             ORDER BY revenue DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to extract suppliers")
    }

    pub async fn extract_customers(&self) -> Result<Vec<CustomerProjectionRow>> {
        sqlx::query_as::<_, CustomerProjectionRow>(
            "SELECT cust.customer_id::bigint AS customer_id, \
                    cust.customer_name, \
                    c.city_name, \
                    sp.state_province_code AS state_code, \
                    sp.state_province_name AS state_name, \
                    co.country_name, \
                    c.latitude::float8 AS latitude, \
                    c.longitude::float8 AS longitude, \
                    COUNT(DISTINCT inv.invoice_id)::bigint AS invoice_count, \
                    COUNT(DISTINCT il.stock_item_id)::bigint AS products_ordered, \
                    COALESCE(SUM(il.extended_price), 0)::float8 AS revenue, \
                    COALESCE(SUM(il.extended_price) - SUM(il.line_profit), 0)::float8 AS cost, \
                    COALESCE(SUM(il.line_profit), 0)::float8 AS profit, \
                    CASE WHEN SUM(il.extended_price) > 0 \
                         THEN (SUM(il.line_profit) / SUM(il.extended_price) * 100)::float8 \
                         ELSE 0 END AS profit_margin \
             FROM sales.customers cust \
             JOIN application.cities c ON c.city_id = cust.delivery_city_id \
             JOIN application.state_provinces sp ON sp.state_province_id = c.state_province_id \
             JOIN application.countries co ON co.country_id = sp.country_id \
             JOIN sales.invoices inv ON inv.customer_id = cust.customer_id \
             JOIN sales.invoice_lines il ON il.invoice_id = inv.invoice_id \
             GROUP BY cust.customer_id, cust.customer_name, c.city_name, \
                      sp.state_province_code, sp.state_province_name, co.country_name, \
                      c.latitude, c.longitude \
             ORDER BY revenue DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to extract customers")
    }

    /// Top supplier→customer edges by delivered invoice value.
    pub async fn extract_connections(&self, limit: i64) -> Result<Vec<ConnectionProjectionRow>> {
        sqlx::query_as::<_, ConnectionProjectionRow>(
            "SELECT s.supplier_id::bigint AS supplier_id, \
                    s.supplier_name, \
                    cs.city_name AS supplier_city, \
                    sps.state_province_code AS supplier_state, \
                    cs.latitude::float8 AS supplier_lat, \
                    cs.longitude::float8 AS supplier_lon, \
                    cust.customer_id::bigint AS customer_id, \
                    cust.customer_name, \
                    cc.city_name AS customer_city, \
                    spc.state_province_code AS customer_state, \
                    cc.latitude::float8 AS customer_lat, \
                    cc.longitude::float8 AS customer_lon, \
                    COUNT(DISTINCT inv.invoice_id)::bigint AS transaction_count, \
                    COUNT(DISTINCT il.stock_item_id)::bigint AS product_count, \
                    COALESCE(SUM(il.extended_price), 0)::float8 AS volume \
             FROM purchasing.suppliers s \
             JOIN application.cities cs ON cs.city_id = s.delivery_city_id \
             JOIN application.state_provinces sps ON sps.state_province_id = cs.state_province_id \
             JOIN warehouse.stock_items si ON si.supplier_id = s.supplier_id \
             JOIN sales.invoice_lines il ON il.stock_item_id = si.stock_item_id \
             JOIN sales.invoices inv ON inv.invoice_id = il.invoice_id \
             JOIN sales.customers cust ON cust.customer_id = inv.customer_id \
             JOIN application.cities cc ON cc.city_id = cust.delivery_city_id \
             JOIN application.state_provinces spc ON spc.state_province_id = cc.state_province_id \
             GROUP BY s.supplier_id, s.supplier_name, cs.city_name, sps.state_province_code, \
                      cs.latitude, cs.longitude, cust.customer_id, cust.customer_name, \
                      cc.city_name, spc.state_province_code, cc.latitude, cc.longitude \
             ORDER BY volume DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to extract connections")
    }

    /// Top cross-state trade routes by delivered invoice value.
    pub async fn extract_trade_routes(&self, limit: i64) -> Result<Vec<TradeRouteProjectionRow>> {
        sqlx::query_as::<_, TradeRouteProjectionRow>(
            "SELECT sps.state_province_code AS from_state, \
                    sps.state_province_name AS from_state_name, \
                    spc.state_province_code AS to_state, \
                    spc.state_province_name AS to_state_name, \
                    COUNT(DISTINCT cust.customer_id)::bigint AS customer_count, \
                    COUNT(DISTINCT inv.invoice_id)::bigint AS transaction_count, \
                    COUNT(DISTINCT il.stock_item_id)::bigint AS product_count, \
                    COALESCE(SUM(il.extended_price), 0)::float8 AS volume \
             FROM warehouse.stock_items si \
             JOIN purchasing.suppliers s ON s.supplier_id = si.supplier_id \
             JOIN application.cities cs ON cs.city_id = s.delivery_city_id \
             JOIN application.state_provinces sps ON sps.state_province_id = cs.state_province_id \
             JOIN sales.invoice_lines il ON il.stock_item_id = si.stock_item_id \
             JOIN sales.invoices inv ON inv.invoice_id = il.invoice_id \
             JOIN sales.customers cust ON cust.customer_id = inv.customer_id \
             JOIN application.cities cc ON cc.city_id = cust.delivery_city_id \
             JOIN application.state_provinces spc ON spc.state_province_id = cc.state_province_id \
             WHERE sps.state_province_id != spc.state_province_id \
             GROUP BY sps.state_province_code, sps.state_province_name, \
                      spc.state_province_code, spc.state_province_name \
             ORDER BY volume DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to extract trade routes")
    }
}
