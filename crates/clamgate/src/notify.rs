//! Downstream completion notification.

use crate::object::ObjectRef;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion notice body sent downstream.
#[derive(Debug, Serialize)]
pub struct CompletionNotice<'a> {
    #[serde(rename = "objectKey")]
    pub object_key: &'a str,
}

/// Downstream notification port. The orchestrator treats delivery as
/// best-effort and at-most-once: no retry, no backoff.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, object: &ObjectRef) -> Result<()>;
}

/// POSTs the completion notice to `{endpoint}/lambda`; any 2xx response is
/// accepted and the body is ignored.
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build notification client")?;
        let endpoint = endpoint.into();
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, object: &ObjectRef) -> Result<()> {
        let url = format!("{}/lambda", self.endpoint);
        let notice = CompletionNotice {
            object_key: &object.key,
        };
        let resp = self
            .client
            .post(&url)
            .json(&notice)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("POST {} returned {}", url, resp.status()));
        }
        debug!("completion notice for {} accepted by {}", object, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_serializes_with_the_object_key_field() {
        let notice = CompletionNotice {
            object_key: "incoming/report.pdf",
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert_eq!(json, r#"{"objectKey":"incoming/report.pdf"}"#);
    }

    #[test]
    fn trailing_slash_on_the_endpoint_is_normalized() {
        let notifier = HttpNotifier::new("https://api.example.com/").unwrap();
        assert_eq!(notifier.endpoint, "https://api.example.com");
    }
}
