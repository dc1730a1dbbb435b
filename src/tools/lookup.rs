//! Search-backed lookup handlers
//!
//! Each lookup formats one query from its arguments, sends it to the
//! [`SearchGateway`] unchanged and returns the raw text.

use std::sync::Arc;

use async_trait::async_trait;

use super::registry::{ERROR_PREFIX, ToolArgs, ToolHandler};
use crate::search::SearchGateway;

/// Builds a query or label from validated arguments
pub type ArgFormatter = fn(&ToolArgs) -> String;

/// A handler that forwards one formatted query to the search gateway
pub struct SearchLookup {
    gateway: Arc<dyn SearchGateway>,
    query: ArgFormatter,
    label: ArgFormatter,
    failure: &'static str,
}

impl SearchLookup {
    /// `failure` is the phrase placed after `Error: ` when the search fails
    pub fn new(
        gateway: Arc<dyn SearchGateway>,
        query: ArgFormatter,
        label: ArgFormatter,
        failure: &'static str,
    ) -> Self {
        Self {
            gateway,
            query,
            label,
            failure,
        }
    }

    /// The query this lookup would send for `args`
    pub fn query(&self, args: &ToolArgs) -> String {
        (self.query)(args)
    }
}

#[async_trait]
impl ToolHandler for SearchLookup {
    fn label(&self, args: &ToolArgs) -> String {
        (self.label)(args)
    }

    async fn call(&self, args: &ToolArgs) -> String {
        let query = self.query(args);
        match self.gateway.search(&query).await {
            Ok(text) => text,
            Err(e) => format!("{}{}: {}", ERROR_PREFIX, self.failure, e),
        }
    }
}
