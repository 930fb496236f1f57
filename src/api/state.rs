//! Shared state for all route groups.

use std::sync::Arc;

use crate::ai::InsightService;
use crate::database::{LocalStore, WarehouseClient};

/// The snapshot store is always present; the warehouse pool and the LLM
/// client are optional and the routes that need them degrade when absent.
#[derive(Clone)]
pub struct AppState {
    pub local: LocalStore,
    pub warehouse: Option<WarehouseClient>,
    pub llm: Option<Arc<dyn InsightService>>,
}

impl AppState {
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            warehouse: None,
            llm: None,
        }
    }

    pub fn with_warehouse(mut self, warehouse: WarehouseClient) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn InsightService>) -> Self {
        self.llm = Some(llm);
        self
    }
}
