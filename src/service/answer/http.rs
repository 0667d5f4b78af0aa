//! HTTP implementation of the answer service client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{AnswerResult, Res},
};

use super::{AnswerClient, GenericAnswerClient};

// Extra methods on `AnswerClient` applied by the http implementation.

impl AnswerClient {
    /// Creates a new HTTP answer client from the configured endpoint.
    pub fn http(config: &Config) -> Self {
        let client = HttpAnswerClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// Request body for the answer service.
#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
    history: &'a [String],
}

/// Answer client speaking JSON over HTTP.
#[derive(Clone)]
pub struct HttpAnswerClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAnswerClient {
    /// Create a new HTTP answer client.
    #[instrument(name = "HttpAnswerClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.answer_endpoint.clone(),
            api_key: config.answer_api_key.clone(),
        }
    }
}

#[async_trait]
impl GenericAnswerClient for HttpAnswerClient {
    #[instrument(skip_all)]
    async fn answer(&self, question: &str, transcript: &[String]) -> Res<AnswerResult> {
        let body = AnswerRequest {
            question,
            history: transcript,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to reach answer service: {}", e))?
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("Answer service returned an error status: {}", e))?;

        let result = response.json::<AnswerResult>().await?;

        info!("Answer service returned {} source documents.", result.source_documents.len());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::base::types::AnswerResult;

    #[test]
    fn deserializes_answer_payload() {
        let payload = r#"{
            "text": "X is...",
            "sourceDocuments": [
                {"metadata": {"title": "Doc A", "url": "u1", "score": 0.92}},
                {"metadata": {"url": "u2"}}
            ]
        }"#;

        let result: AnswerResult = serde_json::from_str(payload).unwrap();

        assert_eq!(result.text, "X is...");
        assert_eq!(result.source_documents.len(), 2);
        assert_eq!(result.source_documents[0].metadata.title.as_deref(), Some("Doc A"));
        assert!(result.source_documents[0].metadata.extra.contains_key("score"));
        assert_eq!(result.source_documents[1].metadata.title, None);
    }

    #[test]
    fn missing_source_documents_defaults_to_empty() {
        let result: AnswerResult = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(result.source_documents.is_empty());
    }
}
