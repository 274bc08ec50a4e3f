//! HTTP adapter for the ingestion boundary

use async_trait::async_trait;
use gazette_domain::traits::{EpisodeSink, SinkFailure};
use gazette_domain::{AcceptedEpisode, Episode};
use serde::Deserialize;
use tracing::debug;

/// Response body expected from the ingestion service on accept
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    storage_key: String,
}

/// Episode sink over HTTP
///
/// POSTs each episode as JSON to the configured endpoint. Connection
/// errors, timeouts, 429 and 5xx responses classify as transient;
/// other non-success statuses as permanent rejections.
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    /// Create a sink posting to the given endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl EpisodeSink for HttpSink {
    async fn submit(&self, episode: &Episode) -> Result<AcceptedEpisode, SinkFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(episode)
            .send()
            .await
            .map_err(|e| SinkFailure::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: SubmitResponse = response
                .json()
                .await
                .map_err(|e| SinkFailure::Transient(format!("malformed accept body: {}", e)))?;
            debug!(episode = %episode.id, storage_key = %body.storage_key, "episode accepted");
            return Ok(AcceptedEpisode {
                episode_id: episode.id.clone(),
                storage_key: body.storage_key,
            });
        }

        let cause = format!("service returned {}", status);
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(SinkFailure::Transient(cause))
        } else {
            Err(SinkFailure::Rejected(cause))
        }
    }
}
