//! Warehouse-backed per-customer routes.
//!
//! Orders and product profitability come from the remote warehouse. When no
//! warehouse pool is configured the routes degrade to the local snapshot:
//! the customer's aggregate metrics plus its incoming supplier connections,
//! tagged `source: "local"` so clients can tell the two apart.

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::api::state::AppState;
use crate::database::{CustomerOrderRow, CustomerProductRow};
use crate::error::ApiError;
use crate::models::{ConnectionSummary, CustomerRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: i64,
    pub order_date: NaiveDate,
    pub product_count: i64,
    pub order_total: f64,
    pub order_profit: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub stock_item_name: String,
    pub order_count: i64,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub profitability: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersResponse {
    pub customer_id: i64,
    pub source: &'static str,
    pub orders: Vec<OrderView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub customer_id: i64,
    pub source: &'static str,
    pub products: Vec<ProductView>,
    pub count: usize,
}

/// Snapshot-derived stand-in served when the warehouse is unavailable.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCustomerResponse {
    pub customer_id: i64,
    pub source: &'static str,
    pub customer: LocalCustomerSummary,
    pub suppliers: Vec<ConnectionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCustomerSummary {
    pub name: String,
    pub revenue: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub invoice_count: i64,
    pub products_ordered: i64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CustomerDataResponse {
    Orders(OrdersResponse),
    Products(ProductsResponse),
    Local(LocalCustomerResponse),
}

pub fn create_customer_router(state: AppState) -> Router {
    Router::new()
        .route("/api/customers/:id/orders", get(customer_orders))
        .route("/api/customers/:id/products", get(customer_products))
        .with_state(state)
}

fn order_view(row: CustomerOrderRow) -> OrderView {
    OrderView {
        order_id: row.order_id,
        order_date: row.order_date,
        product_count: row.product_count,
        order_total: row.order_total.to_f64().unwrap_or(0.0),
        order_profit: row.order_profit.to_f64().unwrap_or(0.0),
    }
}

fn product_view(row: CustomerProductRow) -> ProductView {
    ProductView {
        stock_item_name: row.stock_item_name,
        order_count: row.order_count,
        total_quantity: row.total_quantity,
        total_revenue: row.total_revenue.to_f64().unwrap_or(0.0),
        total_profit: row.total_profit.to_f64().unwrap_or(0.0),
        profitability: row.profitability,
    }
}

fn local_response(
    customer: CustomerRow,
    suppliers: Vec<ConnectionSummary>,
) -> LocalCustomerResponse {
    LocalCustomerResponse {
        customer_id: customer.id,
        source: "local",
        customer: LocalCustomerSummary {
            name: customer.name,
            revenue: customer.revenue.unwrap_or(0.0),
            profit: customer.profit.unwrap_or(0.0),
            profit_margin: customer.profit_margin.unwrap_or(0.0),
            invoice_count: customer.invoice_count.unwrap_or(0),
            products_ordered: customer.products_ordered.unwrap_or(0),
        },
        suppliers,
    }
}

async fn local_fallback(state: &AppState, id: i64) -> Result<LocalCustomerResponse, ApiError> {
    let Some(customer) = state.local.customer_by_id(id).await? else {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    };
    let suppliers = state
        .local
        .connections_to(id)
        .await?
        .iter()
        .map(|row| row.incoming_summary())
        .collect();
    Ok(local_response(customer, suppliers))
}

async fn customer_orders(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDataResponse>, ApiError> {
    let Some(warehouse) = &state.warehouse else {
        tracing::warn!(customer_id = id, "Warehouse unavailable, serving snapshot data");
        return Ok(Json(CustomerDataResponse::Local(
            local_fallback(&state, id).await?,
        )));
    };

    let orders: Vec<OrderView> = warehouse
        .customer_orders(id)
        .await?
        .into_iter()
        .map(order_view)
        .collect();
    if orders.is_empty() && warehouse.customer_details(id).await?.is_none() {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }
    let count = orders.len();
    Ok(Json(CustomerDataResponse::Orders(OrdersResponse {
        customer_id: id,
        source: "warehouse",
        orders,
        count,
    })))
}

async fn customer_products(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDataResponse>, ApiError> {
    let Some(warehouse) = &state.warehouse else {
        tracing::warn!(customer_id = id, "Warehouse unavailable, serving snapshot data");
        return Ok(Json(CustomerDataResponse::Local(
            local_fallback(&state, id).await?,
        )));
    };

    let products: Vec<ProductView> = warehouse
        .customer_products(id)
        .await?
        .into_iter()
        .map(product_view)
        .collect();
    if products.is_empty() && warehouse.customer_details(id).await?.is_none() {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }
    let count = products.len();
    Ok(Json(CustomerDataResponse::Products(ProductsResponse {
        customer_id: id,
        source: "warehouse",
        products,
        count,
    })))
}
