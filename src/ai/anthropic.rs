//! Anthropic Messages API client.
//!
//! Filter parsing is done through tool use: the model is given a single
//! `apply_filters` tool whose input schema matches [`MapFilters`], so the
//! output is schema-constrained rather than free text. The overview and
//! discount operations ask for JSON in plain text and fall back to
//! deterministic answers when the text does not parse.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{
    DiscountAdvice, DiscountSuggestion, FilterParse, InsightError, InsightResult, InsightService,
    ProductOverview, ProductSale,
};
use crate::database::SnapshotStats;
use crate::models::MapFilters;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl InsightConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 4096,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightClient {
    config: InsightConfig,
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl InsightClient {
    pub fn new(config: InsightConfig) -> InsightResult<Self> {
        if config.api_key.is_empty() {
            return Err(InsightError::MissingKey);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            config,
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn send(
        &self,
        system: String,
        user: String,
        tools: Option<Vec<Tool>>,
    ) -> InsightResult<MessagesResponse> {
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: user,
            }],
            tools,
        };

        debug!(model = %self.config.model, "Sending Anthropic request");
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| InsightError::InvalidResponse(format!("Bad response body: {e}")))
    }
}

fn apply_filters_tool() -> Tool {
    Tool {
        name: "apply_filters",
        description: "Apply filters to supply chain data based on natural language query",
        input_schema: json!({
            "type": "object",
            "properties": {
                "topN": {
                    "type": "number",
                    "description": "Limit to top N results (e.g., top 5, top 10)"
                },
                "sortBy": {
                    "type": "string",
                    "enum": ["profit", "revenue", "volume"],
                    "description": "Sort results by this metric"
                },
                "selectedStates": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Filter by state codes (e.g., [\"CA\", \"TX\", \"NY\"])"
                },
                "minProfit": { "type": "number", "description": "Minimum profit threshold" },
                "maxProfit": { "type": "number", "description": "Maximum profit threshold" },
                "minRevenue": { "type": "number", "description": "Minimum revenue threshold" },
                "maxRevenue": { "type": "number", "description": "Maximum revenue threshold" },
                "showSuppliers": {
                    "type": "boolean",
                    "description": "Include suppliers in results"
                },
                "showCustomers": {
                    "type": "boolean",
                    "description": "Include customers in results"
                },
                "customerType": {
                    "type": "string",
                    "enum": ["profitable", "loss-making", "all"],
                    "description": "Filter by customer profitability"
                }
            },
            "required": []
        }),
    }
}

fn parse_query_system_prompt(stats: &SnapshotStats) -> String {
    format!(
        "You are an expert supply chain analyst. Parse natural language queries about \
         warehouse, supplier, and customer data.\n\n\
         Available data context:\n\
         - Total Suppliers: {}\n\
         - Total Customers: {}\n\
         - Total Supplier Revenue: ${:.2}\n\
         - Total Customer Revenue: ${:.2}\n\n\
         When a user asks a query, determine the appropriate filters to apply. Return ONLY \
         the filters that are explicitly or implicitly requested.\n\n\
         Examples:\n\
         - \"Show me the top 5 most profitable customers\" -> topN: 5, sortBy: \"profit\", showCustomers: true\n\
         - \"Customers in California and Texas\" -> selectedStates: [\"CA\", \"TX\"], showCustomers: true\n\
         - \"Lowest 3 customers that provide profit\" -> topN: 3, sortBy: \"profit\", customerType: \"profitable\", showCustomers: true\n\
         - \"Suppliers by revenue\" -> showSuppliers: true, sortBy: \"revenue\"",
        stats.total_suppliers,
        stats.total_customers,
        stats.supplier_revenue,
        stats.customer_revenue,
    )
}

fn product_lines(products: &[ProductSale]) -> String {
    products
        .iter()
        .take(10)
        .map(|p| format!("- {}: ${:.2} revenue, ${:.2} profit", p.name, p.revenue, p.profit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn margin_lines(products: &[ProductSale]) -> String {
    products
        .iter()
        .take(10)
        .map(|p| {
            let margin = if p.revenue > 0.0 {
                format!("{:.1}%", p.profit / p.revenue * 100.0)
            } else {
                "N/A".to_string()
            };
            format!("- {}: Current profit: ${:.2}, Margin: {margin}", p.name, p.profit)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip a Markdown code fence, if present, so the inner JSON can be parsed.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverviewBody {
    main_products: String,
    top_profit_products: Vec<String>,
    key_insight: String,
}

fn parse_overview_text(text: &str, products: &[ProductSale]) -> ProductOverview {
    match serde_json::from_str::<OverviewBody>(strip_code_fences(text)) {
        Ok(body) => ProductOverview {
            main_products: body.main_products,
            top_profit_products: body.top_profit_products,
            key_insight: body.key_insight,
            fallback: false,
        },
        Err(e) => {
            warn!("Product overview response did not parse as JSON: {e}");
            // Keep the model's prose as the insight rather than dropping it.
            ProductOverview::fallback_from(products, text.trim())
        }
    }
}

fn parse_discount_text(text: &str, products: &[ProductSale]) -> DiscountAdvice {
    match serde_json::from_str::<Vec<DiscountSuggestion>>(strip_code_fences(text)) {
        Ok(suggestions) => DiscountAdvice {
            suggestions,
            fallback: false,
        },
        Err(e) => {
            warn!("Discount strategy response did not parse as JSON: {e}");
            DiscountAdvice::fallback_from(products)
        }
    }
}

fn first_text(response: &MessagesResponse) -> Option<&str> {
    response.content.iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text.as_str()),
        _ => None,
    })
}

#[async_trait]
impl InsightService for InsightClient {
    async fn parse_query_filters(
        &self,
        query: &str,
        stats: &SnapshotStats,
    ) -> InsightResult<FilterParse> {
        let response = self
            .send(
                parse_query_system_prompt(stats),
                query.to_string(),
                Some(vec![apply_filters_tool()]),
            )
            .await?;

        for block in &response.content {
            if let ContentBlock::ToolUse { name, input } = block {
                if name == "apply_filters" {
                    match serde_json::from_value::<MapFilters>(input.clone()) {
                        Ok(filters) => {
                            return Ok(FilterParse {
                                filters,
                                fallback: false,
                            })
                        }
                        Err(e) => {
                            warn!("apply_filters tool input did not match schema: {e}");
                            break;
                        }
                    }
                }
            }
        }

        warn!(%query, "Model answered without usable filters, defaulting to show-everything");
        Ok(FilterParse {
            filters: MapFilters::show_everything(),
            fallback: true,
        })
    }

    async fn product_overview(
        &self,
        customer_name: &str,
        products: &[ProductSale],
    ) -> InsightResult<ProductOverview> {
        let system = "You are a supply chain business analyst. Analyze a customer's purchase \
                      patterns and provide insights."
            .to_string();
        let user = format!(
            "Analyze the following customer's product purchases and provide a brief summary of:\n\
             1. What they mainly buy (product categories/patterns)\n\
             2. Their highest profit products (sorted)\n\n\
             Customer: {customer_name}\n\n\
             Product Data:\n{}\n\n\
             Provide the response in JSON format:\n\
             {{\n\
               \"mainProducts\": \"Brief description of what they mainly buy\",\n\
               \"topProfitProducts\": [\"Product 1\", \"Product 2\", \"Product 3\"],\n\
               \"keyInsight\": \"One key business insight\"\n\
             }}",
            product_lines(products)
        );

        let response = self.send(system, user, None).await?;
        let text = first_text(&response)
            .ok_or_else(|| InsightError::InvalidResponse("No text content".to_string()))?;
        Ok(parse_overview_text(text, products))
    }

    async fn discount_strategy(
        &self,
        customer_name: &str,
        products: &[ProductSale],
        current_profit: f64,
    ) -> InsightResult<DiscountAdvice> {
        let system = "You are a pricing strategy expert for supply chain businesses. Your goal \
                      is to suggest strategic discounts that will:\n\
                      1. Increase customer purchases\n\
                      2. Maintain or increase overall profit\n\
                      3. Be realistic and actionable"
            .to_string();
        let user = format!(
            "Suggest a discount strategy for {customer_name} to increase purchases while \
             maintaining profitability:\n\n\
             Current Profit: ${current_profit:.2}\n\n\
             Top Products:\n{}\n\n\
             Provide suggestions in JSON format as an array:\n\
             [\n\
               {{\n\
                 \"product\": \"Product Name\",\n\
                 \"currentProfit\": number,\n\
                 \"suggestedDiscount\": \"5-10%\",\n\
                 \"estimatedProfitAfterDiscount\": number,\n\
                 \"rationale\": \"Why this discount works\"\n\
               }}\n\
             ]\n\n\
             Focus on products with good margins where a discount could drive volume. Ensure \
             the total profit remains competitive.",
            margin_lines(products)
        );

        let response = self.send(system, user, None).await?;
        let text = first_text(&response)
            .ok_or_else(|| InsightError::InvalidResponse("No text content".to_string()))?;
        Ok(parse_discount_text(text, products))
    }
}
