//! Location, stats, exclusivity, and health routes.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::database::{SnapshotStats, SupplierExclusivityRow};
use crate::error::ApiError;
use crate::models::{ConnectionSummary, Location};

const DEFAULT_CUSTOMER_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub state: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: Location,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: SnapshotStats,
}

#[derive(Debug, Serialize)]
pub struct ExclusivityResponse {
    pub customers: Vec<SupplierExclusivityRow>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub llm_enabled: bool,
    pub warehouse_connected: bool,
}

pub fn create_location_router(state: AppState) -> Router {
    Router::new()
        .route("/api/locations", get(list_locations))
        .route("/api/locations/:id", get(get_location))
        .route("/api/stats", get(get_stats))
        .route("/api/supplier-exclusivity", get(get_supplier_exclusivity))
        .route("/api/health", get(health))
        .with_state(state)
}

/// `type=supplier` returns every supplier; customers are capped by `limit`.
async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_CUSTOMER_LIMIT);
    let state_filter = query.state.as_deref();

    let locations: Vec<Location> = match query.kind.as_deref() {
        Some("supplier") => state
            .local
            .list_suppliers(state_filter)
            .await?
            .into_iter()
            .map(Location::from)
            .collect(),
        Some("customer") => state
            .local
            .list_customers(state_filter, limit)
            .await?
            .into_iter()
            .map(Location::from)
            .collect(),
        _ => {
            let suppliers = state.local.list_suppliers(None).await?;
            let customers = state.local.list_customers(None, limit).await?;
            suppliers
                .into_iter()
                .map(Location::from)
                .chain(customers.into_iter().map(Location::from))
                .collect()
        }
    };

    let count = locations.len();
    Ok(Json(LocationsResponse { locations, count }))
}

/// Suppliers are checked first; an id present in both tables resolves to the
/// supplier.
async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LocationResponse>, ApiError> {
    if let Some(supplier) = state.local.supplier_by_id(id).await? {
        let mut location = Location::from(supplier);
        location.connections = state
            .local
            .connections_from(id)
            .await?
            .iter()
            .map(ConnectionSummary::from)
            .collect();
        return Ok(Json(LocationResponse { location }));
    }

    if let Some(customer) = state.local.customer_by_id(id).await? {
        let mut location = Location::from(customer);
        location.connections = state
            .local
            .connections_to(id)
            .await?
            .iter()
            .map(|row| row.incoming_summary())
            .collect();
        return Ok(Json(LocationResponse { location }));
    }

    Err(ApiError::NotFound("Location not found".to_string()))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.local.stats().await?;
    Ok(Json(StatsResponse { stats }))
}

async fn get_supplier_exclusivity(
    State(state): State<AppState>,
) -> Result<Json<ExclusivityResponse>, ApiError> {
    let customers = state.local.supplier_exclusivity().await?;
    let count = customers.len();
    Ok(Json(ExclusivityResponse { customers, count }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let warehouse_connected = match &state.warehouse {
        Some(warehouse) => warehouse.ping().await.is_ok(),
        None => false,
    };
    Json(HealthResponse {
        status: "ok",
        llm_enabled: state.llm.is_some(),
        warehouse_connected,
    })
}
