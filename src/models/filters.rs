//! The constrained filter schema the LLM is allowed to populate.
//!
//! `MapFilters` doubles as the tool-call output type for the `apply_filters`
//! tool and the response body of `POST /api/llm/parse-query`. Every field is
//! optional: the model returns only the filters a query explicitly or
//! implicitly requests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Profit,
    Revenue,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    #[serde(rename = "profitable")]
    Profitable,
    #[serde(rename = "loss-making")]
    LossMaking,
    #[serde(rename = "all")]
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_suppliers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_customers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_type: Option<CustomerType>,
}

impl MapFilters {
    /// Default returned when the model answers without calling the tool.
    pub fn show_everything() -> Self {
        MapFilters {
            show_suppliers: Some(true),
            show_customers: Some(true),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_input() {
        let input = serde_json::json!({
            "topN": 5,
            "sortBy": "profit",
            "selectedStates": ["CA", "TX"],
            "showCustomers": true,
            "customerType": "loss-making"
        });
        let filters: MapFilters = serde_json::from_value(input).unwrap();
        assert_eq!(filters.top_n, Some(5));
        assert_eq!(filters.sort_by, Some(SortBy::Profit));
        assert_eq!(
            filters.selected_states.as_deref(),
            Some(["CA".to_string(), "TX".to_string()].as_slice())
        );
        assert_eq!(filters.customer_type, Some(CustomerType::LossMaking));
        assert_eq!(filters.show_suppliers, None);
    }

    #[test]
    fn empty_input_is_all_none() {
        let filters: MapFilters = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(filters, MapFilters::default());
    }

    #[test]
    fn skips_absent_fields_on_serialize() {
        let json = serde_json::to_value(MapFilters::show_everything()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["showSuppliers"], true);
        assert_eq!(json["showCustomers"], true);
    }
}
