use anyhow::anyhow;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::config::{API_BASE_VAR, MODEL_TIMEOUT_VAR};

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn timeout_error(target: &str, timeout_secs: u64) -> anyhow::Error {
    anyhow!(
        "Model request timed out after {}s while calling '{}'. \
         Increase {} or check model responsiveness.",
        timeout_secs,
        target,
        MODEL_TIMEOUT_VAR
    )
}

pub(crate) fn model_api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_matches(&err, ErrorKind::TimedOut, "timed out") {
        return timeout_error(api_url, timeout_secs);
    }

    if err.is_connect() {
        if error_chain_matches(&err, ErrorKind::ConnectionRefused, "connection refused") {
            return anyhow!(
                "Connection refused by model API at '{}'. \
                 Ensure the service is reachable and {} is correct.",
                api_url,
                API_BASE_VAR
            );
        }

        return anyhow!(
            "Failed to connect to model API at '{}'. \
             Check {} and network connectivity.",
            api_url,
            API_BASE_VAR
        );
    }

    anyhow!("Failed to call model API at '{}': {}", api_url, err)
}

pub(crate) fn model_api_status_error(status: StatusCode, body: &str) -> anyhow::Error {
    let hint = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => " (check OPENAI_API_KEY)",
        StatusCode::NOT_FOUND => " (check OPENAI_API_BASE and OPENAI_API_MODEL)",
        _ => "",
    };
    anyhow!("Model request failed with status {}{}: {}", status, hint, body)
}
