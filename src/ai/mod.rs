//! LLM insight layer.
//!
//! Three operations sit behind the [`InsightService`] trait: natural-language
//! query parsing into [`MapFilters`], a per-customer product overview, and a
//! discount strategy suggestion. The trait keeps routes testable with a stub
//! service; [`InsightClient`] is the Anthropic-backed implementation.
//!
//! Overview and discount responses carry a `fallback` flag. When the model
//! answers with text that does not parse, the layer substitutes a
//! deterministic answer derived from the product data and flags it, so
//! callers can tell synthesized insight from model insight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::SnapshotStats;
use crate::models::MapFilters;

mod anthropic;

pub use anthropic::{InsightClient, InsightConfig};

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Missing API key")]
    MissingKey,
}

pub type InsightResult<T> = Result<T, InsightError>;

/// Per-product sales summary fed into the prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSale {
    pub name: String,
    pub revenue: f64,
    pub profit: f64,
}

/// Result of parsing a natural-language query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParse {
    pub filters: MapFilters,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOverview {
    pub main_products: String,
    pub top_profit_products: Vec<String>,
    pub key_insight: String,
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSuggestion {
    pub product: String,
    pub current_profit: f64,
    pub suggested_discount: String,
    pub estimated_profit_after_discount: f64,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountAdvice {
    pub suggestions: Vec<DiscountSuggestion>,
    pub fallback: bool,
}

#[async_trait]
pub trait InsightService: Send + Sync {
    /// Parse a natural-language query into map filters. Returns the
    /// show-everything default, flagged, when the model answers without
    /// calling the filter tool.
    async fn parse_query_filters(
        &self,
        query: &str,
        stats: &SnapshotStats,
    ) -> InsightResult<FilterParse>;

    async fn product_overview(
        &self,
        customer_name: &str,
        products: &[ProductSale],
    ) -> InsightResult<ProductOverview>;

    async fn discount_strategy(
        &self,
        customer_name: &str,
        products: &[ProductSale],
        current_profit: f64,
    ) -> InsightResult<DiscountAdvice>;
}

impl ProductOverview {
    /// Deterministic stand-in when the model's answer does not parse.
    pub fn fallback_from(products: &[ProductSale], key_insight: impl Into<String>) -> Self {
        ProductOverview {
            main_products: "Based on purchase history".to_string(),
            top_profit_products: products.iter().take(3).map(|p| p.name.clone()).collect(),
            key_insight: key_insight.into(),
            fallback: true,
        }
    }
}

impl DiscountAdvice {
    /// Deterministic discount ladder over the top three products.
    pub fn fallback_from(products: &[ProductSale]) -> Self {
        let suggestions = products
            .iter()
            .take(3)
            .enumerate()
            .map(|(idx, p)| DiscountSuggestion {
                product: p.name.clone(),
                current_profit: p.profit,
                suggested_discount: format!("{}%", 5 + idx * 2),
                estimated_profit_after_discount: p.profit * (1.0 + (idx as f64 + 1.0) * 0.15),
                rationale: format!(
                    "High-margin product, discount could drive volume increase of {}%",
                    15 + idx * 10
                ),
            })
            .collect();
        DiscountAdvice {
            suggestions,
            fallback: true,
        }
    }
}
