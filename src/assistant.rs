use std::time::Duration;

use tracing::debug;

use crate::capabilities::CapabilityRegistry;
use crate::completion::build_request;
use crate::config::Config;
use crate::dispatch::dispatch;
use crate::error::QueryError;
use crate::model_gateway::ModelGateway;
use crate::providers::http_errors::timeout_error;
use crate::providers::openai::chat_url;

/// Everything a query needs, built once before the loop starts.
///
/// Holds no conversation state: each query is sent on its own.
pub struct Assistant<G> {
    gateway: G,
    registry: CapabilityRegistry,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl<G: ModelGateway> Assistant<G> {
    pub fn new(gateway: G, registry: CapabilityRegistry, cfg: &Config) -> Self {
        Self {
            gateway,
            registry,
            model: cfg.model.clone(),
            endpoint: chat_url(&cfg.api_base),
            timeout: Duration::from_secs(cfg.model_timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one query and resolves the reply, bounded by the query deadline.
    pub async fn process_query(&self, user_input: &str) -> Result<String, QueryError> {
        let request = build_request(&self.model, &self.registry, user_input);
        debug!(model = %self.model, input_len = user_input.len(), "processing query");

        let response = tokio::time::timeout(self.timeout, self.gateway.complete(&request))
            .await
            .map_err(|_| timeout_error(&self.endpoint, self.timeout.as_secs()))??;

        dispatch(&self.registry, &response)
    }
}

#[cfg(test)]
impl Assistant<crate::model_gateway::testing::StubGateway> {
    pub(crate) fn gateway_calls(&self) -> usize {
        self.gateway.call_count()
    }
}
