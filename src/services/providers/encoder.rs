/// HTTP style encoder
///
/// Talks to any OpenAI-compatible `/embeddings` endpoint. Item descriptions are
/// sent in as few requests as the endpoint's batch limit allows, and results
/// are re-ordered by the returned index since the API may answer out of order.
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::providers::{EncoderError, StyleEmbedding, StyleEncoder};

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f64>,
}

#[derive(Clone)]
pub struct HttpStyleEncoder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    dimensions: usize,
    max_batch: usize,
}

impl HttpStyleEncoder {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        dimensions: usize,
        max_batch: usize,
        timeout: Duration,
    ) -> Result<Self, EncoderError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EncoderError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
            dimensions,
            max_batch: max_batch.max(1),
        })
    }

    /// Sends one chunk of descriptions to the embeddings endpoint
    async fn call_api(&self, inputs: &[String]) -> Result<Vec<StyleEmbedding>, EncoderError> {
        let url = format!("{}/embeddings", self.api_url.trim_end_matches('/'));
        let body = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
            encoding_format: "float",
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EncoderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Encoder request failed"
            );
            return Err(EncoderError::Api(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EncoderError::Api(e.to_string()))?;

        self.collect_ordered(parsed, inputs.len())
    }

    /// Places each returned embedding at its input index and checks completeness
    fn collect_ordered(
        &self,
        response: EmbeddingResponse,
        batch_size: usize,
    ) -> Result<Vec<StyleEmbedding>, EncoderError> {
        let mut slots: Vec<Option<StyleEmbedding>> = vec![None; batch_size];

        for item in response.data {
            if item.index >= batch_size {
                return Err(EncoderError::UnexpectedIndex {
                    index: item.index,
                    batch_size,
                });
            }
            if item.embedding.len() != self.dimensions {
                return Err(EncoderError::DimensionMismatch {
                    expected: self.dimensions,
                    got: item.embedding.len(),
                });
            }
            slots[item.index] = Some(item.embedding.iter().map(|&v| v as f32).collect());
        }

        let got = slots.iter().filter(|s| s.is_some()).count();
        if got != batch_size {
            return Err(EncoderError::CountMismatch {
                expected: batch_size,
                got,
            });
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

#[async_trait::async_trait]
impl StyleEncoder for HttpStyleEncoder {
    async fn encode(&self, inputs: &[String]) -> Result<Vec<StyleEmbedding>, EncoderError> {
        let mut embeddings = Vec::with_capacity(inputs.len());

        for chunk in inputs.chunks(self.max_batch) {
            tracing::debug!(batch_size = chunk.len(), model = %self.model, "Encoding batch");
            embeddings.extend(self.call_api(chunk).await?);
        }

        Ok(embeddings)
    }

    fn name(&self) -> &'static str {
        "http-embeddings"
    }
}
