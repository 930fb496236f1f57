//! LLM route tests: disabled-service behavior and stubbed parsing.

#[path = "helpers/snapshot.rs"]
mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;

use trade_atlas::ai::{
    DiscountAdvice, FilterParse, InsightResult, InsightService, ProductOverview, ProductSale,
};
use trade_atlas::api::{create_llm_router, AppState};
use trade_atlas::database::SnapshotStats;
use trade_atlas::models::MapFilters;

use snapshot::{post_json, seeded_store};

struct StubInsight;

#[async_trait]
impl InsightService for StubInsight {
    async fn parse_query_filters(
        &self,
        _query: &str,
        _stats: &SnapshotStats,
    ) -> InsightResult<FilterParse> {
        Ok(FilterParse {
            filters: MapFilters {
                top_n: Some(5),
                show_customers: Some(true),
                ..Default::default()
            },
            fallback: false,
        })
    }

    async fn product_overview(
        &self,
        customer_name: &str,
        products: &[ProductSale],
    ) -> InsightResult<ProductOverview> {
        Ok(ProductOverview {
            main_products: format!("{customer_name} buys confectionery"),
            top_profit_products: products.iter().map(|p| p.name.clone()).collect(),
            key_insight: "Margins are healthy".to_string(),
            fallback: false,
        })
    }

    async fn discount_strategy(
        &self,
        _customer_name: &str,
        products: &[ProductSale],
        _current_profit: f64,
    ) -> InsightResult<DiscountAdvice> {
        Ok(DiscountAdvice::fallback_from(products))
    }
}

async fn disabled_app() -> axum::Router {
    create_llm_router(AppState::new(seeded_store().await))
}

async fn stubbed_app() -> axum::Router {
    create_llm_router(AppState::new(seeded_store().await).with_llm(Arc::new(StubInsight)))
}

#[tokio::test]
async fn parse_query_without_key_is_503() {
    let (status, body) = post_json(
        disabled_app().await,
        "/api/llm/parse-query",
        json!({"query": "top 5 customers"}),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("ANTHROPIC_API_KEY"));
}

#[tokio::test]
async fn overview_and_discount_without_key_are_503() {
    let request = json!({"customerName": "Tailspin Toys", "products": []});
    let (status, _) = post_json(disabled_app().await, "/api/llm/product-overview", request.clone()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = post_json(disabled_app().await, "/api/llm/discount-strategy", request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn parse_query_returns_filters_from_service() {
    let (status, body) = post_json(
        stubbed_app().await,
        "/api/llm/parse-query",
        json!({"query": "top 5 customers"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], false);
    assert_eq!(body["filters"]["topN"], 5);
    assert_eq!(body["filters"]["showCustomers"], true);
    // Unset filters are omitted from the body.
    assert!(body["filters"].get("minRevenue").is_none());
}

#[tokio::test]
async fn product_overview_round_trips_products() {
    let (status, body) = post_json(
        stubbed_app().await,
        "/api/llm/product-overview",
        json!({
            "customerName": "Tailspin Toys",
            "products": [
                {"name": "Chocolate frogs 250g", "revenue": 90000.0, "profit": 40000.0}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mainProducts"], "Tailspin Toys buys confectionery");
    assert_eq!(body["topProfitProducts"][0], "Chocolate frogs 250g");
}

#[tokio::test]
async fn discount_strategy_flags_fallback_advice() {
    let (status, body) = post_json(
        stubbed_app().await,
        "/api/llm/discount-strategy",
        json!({
            "customerName": "Tailspin Toys",
            "products": [
                {"name": "Chocolate frogs 250g", "revenue": 90000.0, "profit": 40000.0},
                {"name": "Tape dispenser (Black)", "revenue": 10000.0, "profit": 1000.0}
            ],
            "currentProfit": 41000.0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fallback"], true);
    assert_eq!(body["suggestions"][0]["suggestedDiscount"], "5%");
    assert_eq!(body["suggestions"][1]["suggestedDiscount"], "7%");
}
