use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::completion::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::Config;
use crate::providers::http_errors::{model_api_request_error, model_api_status_error};

pub(crate) fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// HTTP client whose per-request timeout matches the query deadline.
pub fn http_client(cfg: &Config) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")
}

pub async fn chat(
    client: &Client,
    cfg: &Config,
    request: &ChatCompletionRequest,
) -> Result<ChatCompletionResponse> {
    let api_url = chat_url(&cfg.api_base);
    debug!(
        api_url = %api_url,
        model = %request.model,
        capability_count = request.capabilities.len(),
        "sending chat completion request"
    );

    let response = client
        .post(&api_url)
        .bearer_auth(&cfg.api_key)
        .json(request)
        .send()
        .await
        .map_err(|err| {
            warn!(
                api_url = %api_url,
                model = %request.model,
                error = %err,
                "chat completion request failed"
            );
            model_api_request_error(err, &api_url, cfg.model_timeout_secs)
        })?;

    let status = response.status();
    if !status.is_success() {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %request.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat completion returned non-success status"
        );
        return Err(model_api_status_error(status, &response_body));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")?;
    debug!(
        model = %request.model,
        choice_count = parsed.choices.len(),
        "received chat completion response"
    );
    Ok(parsed)
}
