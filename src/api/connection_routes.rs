//! Connection and trade-route listing.
//!
//! One endpoint serves both edge tables: `type=state_to_state` selects the
//! aggregated trade routes (only `minVolume` applies there), anything else
//! selects supplier→customer connections with the full filter set.

use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::database::ConnectionFilter;
use crate::error::ApiError;
use crate::models::{ConnectionRow, TradeRouteRow};

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub supplier_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub min_volume: Option<f64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConnectionsResponse {
    Edges {
        connections: Vec<ConnectionRow>,
        count: usize,
    },
    Routes {
        connections: Vec<TradeRouteRow>,
        count: usize,
    },
}

pub fn create_connection_router(state: AppState) -> Router {
    Router::new()
        .route("/api/connections", get(list_connections))
        .with_state(state)
}

async fn list_connections(
    State(state): State<AppState>,
    Query(query): Query<ConnectionQuery>,
) -> Result<Json<ConnectionsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if query.kind.as_deref() == Some("state_to_state") {
        let routes = state.local.trade_routes(query.min_volume, limit).await?;
        let count = routes.len();
        return Ok(Json(ConnectionsResponse::Routes {
            connections: routes,
            count,
        }));
    }

    let filter = ConnectionFilter {
        supplier_id: query.supplier_id,
        customer_id: query.customer_id,
        min_volume: query.min_volume,
        limit,
    };
    let connections = state.local.filter_connections(&filter).await?;
    let count = connections.len();
    Ok(Json(ConnectionsResponse::Edges { connections, count }))
}
