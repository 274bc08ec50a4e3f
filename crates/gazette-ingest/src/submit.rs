//! Bounded, retrying submission of episodes to the ingestion boundary

use crate::config::IngestConfig;
use crate::error::IngestError;
use gazette_domain::traits::{EpisodeSink, SinkFailure};
use gazette_domain::{ContentHash, Episode, EpisodeId};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// A submission the service accepted
#[derive(Debug, Clone)]
pub struct AcceptedSubmission {
    /// The accepted episode
    pub episode_id: EpisodeId,

    /// Its content hash, for ledger appends
    pub content_hash: ContentHash,

    /// Storage key assigned by the service
    pub storage_key: String,
}

/// A submission that failed permanently or exhausted its retries
#[derive(Debug)]
pub struct FailedSubmission {
    /// The failed episode
    pub episode_id: EpisodeId,

    /// Its human-readable name
    pub name: String,

    /// Why it failed
    pub error: IngestError,
}

/// Outcome of one `submit_all` call
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Accepted submissions, in completion order
    pub accepted: Vec<AcceptedSubmission>,

    /// Failed submissions, in completion order
    pub failures: Vec<FailedSubmission>,
}

impl IngestReport {
    /// Whether every episode was accepted
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives episode submission with backpressure and retries
///
/// In-flight submissions are capped by a semaphore; each attempt runs
/// under a timeout; transient failures retry with exponential backoff
/// up to the configured budget. Permanent rejections are surfaced
/// immediately and never retried. No episode is silently dropped —
/// every one lands in the report as accepted or failed.
pub struct SubmissionDriver<K> {
    sink: Arc<K>,
    config: IngestConfig,
}

impl<K> SubmissionDriver<K>
where
    K: EpisodeSink + 'static,
{
    /// Create a driver over a sink
    pub fn new(sink: K, config: IngestConfig) -> Self {
        Self {
            sink: Arc::new(sink),
            config,
        }
    }

    /// Submit a batch of episodes
    pub async fn submit_all(&self, episodes: Vec<Episode>) -> IngestReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_in_flight));
        let mut handles = Vec::with_capacity(episodes.len());

        for episode in episodes {
            let sink = Arc::clone(&self.sink);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let episode_id = episode.id.clone();
            let name = episode.name.clone();
            handles.push((
                episode_id,
                name,
                tokio::spawn(async move {
                    let permit = semaphore.acquire_owned().await;
                    let outcome = match permit {
                        Ok(_permit) => submit_with_retry(sink.as_ref(), &config, &episode).await,
                        Err(e) => Err(IngestError::Internal(format!("semaphore closed: {}", e))),
                    };
                    (episode.content_hash, outcome)
                }),
            ));
        }

        let mut report = IngestReport::default();
        for (episode_id, name, handle) in handles {
            match handle.await {
                Ok((content_hash, Ok(storage_key))) => report.accepted.push(AcceptedSubmission {
                    episode_id,
                    content_hash,
                    storage_key,
                }),
                Ok((_, Err(error))) => {
                    warn!(episode = %episode_id, error = %error, "episode submission failed");
                    report.failures.push(FailedSubmission { episode_id, name, error });
                }
                Err(join_error) => report.failures.push(FailedSubmission {
                    episode_id,
                    name,
                    error: IngestError::Internal(join_error.to_string()),
                }),
            }
        }

        info!(
            accepted = report.accepted.len(),
            failed = report.failures.len(),
            "submission batch complete"
        );
        report
    }
}

/// One episode through the timeout/retry envelope
async fn submit_with_retry<K: EpisodeSink>(
    sink: &K,
    config: &IngestConfig,
    episode: &Episode,
) -> Result<String, IngestError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let cause = match timeout(config.submit_timeout(), sink.submit(episode)).await {
            Ok(Ok(accepted)) => return Ok(accepted.storage_key),
            Ok(Err(SinkFailure::Rejected(cause))) => return Err(IngestError::Rejected(cause)),
            Ok(Err(SinkFailure::Transient(cause))) => cause,
            Err(_) => "submission timed out".to_string(),
        };

        if attempt > config.max_retries {
            return Err(IngestError::RetriesExhausted { attempts: attempt, cause });
        }
        let delay = config.backoff_delay(attempt);
        warn!(
            episode = %episode.id,
            attempt,
            max_retries = config.max_retries,
            delay_ms = delay.as_millis() as u64,
            cause = %cause,
            "transient submission failure, backing off"
        );
        sleep(delay).await;
    }
}
