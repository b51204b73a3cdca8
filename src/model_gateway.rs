use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::completion::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::Config;
use crate::providers;

pub type ModelGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChatCompletionResponse>> + 'a>>;

/// The remote completion service, seen as a single request/response call.
pub trait ModelGateway {
    fn complete<'a>(&'a self, request: &'a ChatCompletionRequest) -> ModelGatewayFuture<'a>;
}

/// Talks to an OpenAI-compatible endpoint over HTTPS.
pub struct HostModelGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostModelGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for HostModelGateway<'_> {
    fn complete<'b>(&'b self, request: &'b ChatCompletionRequest) -> ModelGatewayFuture<'b> {
        Box::pin(providers::openai::chat(self.client, self.cfg, request))
    }
}
