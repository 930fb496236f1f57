//! Natural-language insight routes.
//!
//! All three routes require a configured Anthropic key; without one they
//! return 503 before any network activity. Product data is supplied by the
//! caller so these routes work with or without a warehouse connection.

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::ai::{DiscountAdvice, FilterParse, ProductOverview, ProductSale};
use crate::api::state::AppState;
use crate::error::ApiError;

const DISABLED_MESSAGE: &str = "LLM features disabled: ANTHROPIC_API_KEY not configured";

#[derive(Debug, Deserialize)]
pub struct ParseQueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOverviewRequest {
    pub customer_name: String,
    pub products: Vec<ProductSale>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountStrategyRequest {
    pub customer_name: String,
    pub products: Vec<ProductSale>,
    #[serde(default)]
    pub current_profit: f64,
}

pub fn create_llm_router(state: AppState) -> Router {
    Router::new()
        .route("/api/llm/parse-query", post(parse_query))
        .route("/api/llm/product-overview", post(product_overview))
        .route("/api/llm/discount-strategy", post(discount_strategy))
        .with_state(state)
}

async fn parse_query(
    State(state): State<AppState>,
    Json(request): Json<ParseQueryRequest>,
) -> Result<Json<FilterParse>, ApiError> {
    let Some(llm) = &state.llm else {
        return Err(ApiError::ServiceUnavailable(DISABLED_MESSAGE.to_string()));
    };
    let stats = state.local.stats().await?;
    let parse = llm.parse_query_filters(&request.query, &stats).await?;
    Ok(Json(parse))
}

async fn product_overview(
    State(state): State<AppState>,
    Json(request): Json<ProductOverviewRequest>,
) -> Result<Json<ProductOverview>, ApiError> {
    let Some(llm) = &state.llm else {
        return Err(ApiError::ServiceUnavailable(DISABLED_MESSAGE.to_string()));
    };
    let overview = llm
        .product_overview(&request.customer_name, &request.products)
        .await?;
    Ok(Json(overview))
}

async fn discount_strategy(
    State(state): State<AppState>,
    Json(request): Json<DiscountStrategyRequest>,
) -> Result<Json<DiscountAdvice>, ApiError> {
    let Some(llm) = &state.llm else {
        return Err(ApiError::ServiceUnavailable(DISABLED_MESSAGE.to_string()));
    };
    let advice = llm
        .discount_strategy(
            &request.customer_name,
            &request.products,
            request.current_profit,
        )
        .await?;
    Ok(Json(advice))
}
