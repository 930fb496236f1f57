//! City rollup (map) routes.
//!
//! These serve the `map_data` table with the `{success, count, data}` envelope
//! the map frontend consumes. Marker visualization fields are derived on the
//! fly from the revenue and margin bands.

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::database::MapCityFilter;
use crate::error::ApiError;
use crate::models::viz;
use crate::models::{Coordinates, MapCityRow};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesQuery {
    pub state: Option<String>,
    pub country: Option<String>,
    pub min_revenue: Option<f64>,
    pub max_revenue: Option<f64>,
    pub sort_by: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMetrics {
    pub revenue: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub customer_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMarker {
    pub marker_size: &'static str,
    pub marker_color: &'static str,
    pub opacity: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityView {
    pub id: i64,
    pub name: String,
    pub state: Option<String>,
    pub state_name: Option<String>,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub population: i64,
    pub metrics: CityMetrics,
    pub visualization: CityMarker,
}

#[derive(Debug, Serialize)]
pub struct CitiesResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<CityView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: i64,
    pub name: String,
    pub coordinates: Coordinates,
    pub metrics: SearchMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetrics {
    pub revenue: f64,
    pub customer_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMetrics {
    pub total_revenue: f64,
    pub total_customers: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub success: bool,
    pub state: StateSummary,
    pub cities_count: usize,
    pub cities: Vec<MapCityRow>,
    pub metrics: StateMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStatsData {
    pub total_cities: i64,
    pub cities_with_customers: i64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub average_revenue: f64,
    pub max_revenue: f64,
    pub average_profit_margin: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_state: Option<TopState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_city: Option<TopCity>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopState {
    pub name: Option<String>,
    pub code: Option<String>,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCity {
    pub name: String,
    pub state: Option<String>,
    pub revenue: f64,
}

#[derive(Debug, Serialize)]
pub struct MapStatsResponse {
    pub success: bool,
    pub data: MapStatsData,
}

pub fn create_map_router(state: AppState) -> Router {
    Router::new()
        .route("/api/map/cities", get(list_cities))
        .route("/api/map/search", get(search_cities))
        .route("/api/map/states/:state_code", get(state_details))
        .route("/api/map/stats", get(map_stats))
        .with_state(state)
}

fn city_view(row: MapCityRow) -> CityView {
    let revenue = row.revenue.unwrap_or(0.0);
    let profit_margin = row.profit_margin.unwrap_or(0.0);
    CityView {
        id: row.city_id,
        name: row.city_name,
        state: row.state_code,
        state_name: row.state_name,
        country: row.country_name,
        coordinates: Coordinates {
            latitude: row.latitude.unwrap_or(0.0),
            longitude: row.longitude.unwrap_or(0.0),
        },
        population: row.population.unwrap_or(0),
        metrics: CityMetrics {
            revenue,
            profit: row.profit.unwrap_or(0.0),
            profit_margin,
            customer_count: row.customer_count.unwrap_or(0),
        },
        visualization: CityMarker {
            marker_size: viz::marker_size(revenue),
            marker_color: viz::marker_color(profit_margin),
            opacity: 0.8,
        },
    }
}

async fn list_cities(
    State(state): State<AppState>,
    Query(query): Query<CitiesQuery>,
) -> Result<Json<CitiesResponse>, ApiError> {
    let filter = MapCityFilter {
        state: query.state,
        country: query.country,
        min_revenue: query.min_revenue,
        max_revenue: query.max_revenue,
        sort_by: query.sort_by,
        limit: query.limit,
    };
    let data: Vec<CityView> = state
        .local
        .map_cities(&filter)
        .await?
        .into_iter()
        .map(city_view)
        .collect();
    Ok(Json(CitiesResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

async fn search_cities(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(q) = query.q.filter(|q| !q.is_empty()) else {
        return Ok(Json(SearchResponse {
            success: false,
            error: Some("Query parameter required".to_string()),
            results: None,
        }));
    };

    let results = state
        .local
        .search_cities(&q)
        .await?
        .into_iter()
        .map(|row| SearchResult {
            kind: "city",
            id: row.city_id,
            name: match row.state_code.as_deref() {
                Some(code) => format!("{}, {code}", row.city_name),
                None => row.city_name,
            },
            coordinates: Coordinates {
                latitude: row.latitude.unwrap_or(0.0),
                longitude: row.longitude.unwrap_or(0.0),
            },
            metrics: SearchMetrics {
                revenue: row.revenue.unwrap_or(0.0),
                customer_count: row.customer_count.unwrap_or(0),
            },
        })
        .collect();

    Ok(Json(SearchResponse {
        success: true,
        error: None,
        results: Some(results),
    }))
}

async fn state_details(
    State(state): State<AppState>,
    Path(state_code): Path<String>,
) -> Result<Json<StateResponse>, ApiError> {
    let cities = state.local.cities_by_state(&state_code).await?;

    let total_revenue: f64 = cities.iter().map(|c| c.revenue.unwrap_or(0.0)).sum();
    let total_customers: i64 = cities.iter().map(|c| c.customer_count.unwrap_or(0)).sum();
    let name = cities
        .first()
        .and_then(|c| c.state_name.clone())
        .unwrap_or_else(|| state_code.clone());
    let cities_count = cities.len();

    Ok(Json(StateResponse {
        success: true,
        state: StateSummary {
            code: state_code,
            name,
        },
        cities_count,
        cities: cities.into_iter().take(20).collect(),
        metrics: StateMetrics {
            total_revenue,
            total_customers,
        },
    }))
}

async fn map_stats(State(state): State<AppState>) -> Result<Json<MapStatsResponse>, ApiError> {
    let stats = state.local.map_stats().await?;
    let top_state = state.local.top_state_by_revenue().await?;
    let top_city_filter = MapCityFilter {
        limit: Some(1),
        ..Default::default()
    };
    let top_city = state.local.map_cities(&top_city_filter).await?.into_iter().next();

    Ok(Json(MapStatsResponse {
        success: true,
        data: MapStatsData {
            total_cities: stats.total_cities,
            cities_with_customers: stats.cities_with_customers,
            total_revenue: stats.total_revenue,
            total_profit: stats.total_profit,
            average_revenue: stats.avg_revenue,
            max_revenue: stats.max_revenue,
            average_profit_margin: stats.avg_profit_margin,
            top_state: top_state.map(|s| TopState {
                name: s.state_name,
                code: s.state_code,
                revenue: s.total_revenue,
            }),
            top_city: top_city.map(|c| TopCity {
                name: c.city_name,
                state: c.state_code,
                revenue: c.revenue.unwrap_or(0.0),
            }),
        },
    }))
}
