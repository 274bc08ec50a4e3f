//! In-memory doubles for deterministic testing
//!
//! A sink that accepts every submission unless scripted otherwise and
//! a ledger that forgets on drop, neither touching the network or
//! disk. Useful for tests and dry development runs.

use async_trait::async_trait;
use gazette_domain::traits::{DedupLedger, EpisodeSink, SinkFailure};
use gazette_domain::{AcceptedEpisode, ContentHash, Episode};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// In-memory dedup ledger
///
/// Holds content hashes for the lifetime of the value only; use the
/// store crate's file ledger for cross-run persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    hashes: HashSet<ContentHash>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of hashes recorded
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the ledger holds no hashes
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl DedupLedger for MemoryLedger {
    type Error = String;

    fn contains(&self, hash: &ContentHash) -> bool {
        self.hashes.contains(hash)
    }

    fn append(&mut self, hash: &ContentHash) -> Result<(), Self::Error> {
        self.hashes.insert(hash.clone());
        Ok(())
    }
}

/// Mock ingestion sink
///
/// # Examples
///
/// ```
/// use gazette_ingest::mock::MockSink;
/// use gazette_domain::traits::SinkFailure;
///
/// let sink = MockSink::new();
/// sink.fail_next(SinkFailure::Transient("rate limited".to_string()));
/// // The next submit returns the scripted failure; later ones accept.
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    queued_failures: Arc<Mutex<VecDeque<SinkFailure>>>,
    failures_by_name: Arc<Mutex<HashMap<String, SinkFailure>>>,
    failures_by_payload: Arc<Mutex<Vec<(String, SinkFailure)>>>,
    submissions: Arc<Mutex<usize>>,
    accepted_names: Arc<Mutex<Vec<String>>>,
}

impl MockSink {
    /// Create a sink that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next submission (any episode) to fail
    pub fn fail_next(&self, failure: SinkFailure) {
        self.queued_failures.lock().unwrap().push_back(failure);
    }

    /// Script every submission of the named episode to fail
    pub fn reject_name(&self, name: impl Into<String>, failure: SinkFailure) {
        self.failures_by_name
            .lock()
            .unwrap()
            .insert(name.into(), failure);
    }

    /// Script every submission whose payload contains the pattern to
    /// fail (episode names embed derived ids, so payload text is the
    /// practical way to target one document)
    pub fn reject_payload_containing(&self, pattern: impl Into<String>, failure: SinkFailure) {
        self.failures_by_payload
            .lock()
            .unwrap()
            .push((pattern.into(), failure));
    }

    /// Shared counter of submit calls (including failed attempts)
    pub fn submissions(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.submissions)
    }

    /// Names of episodes accepted so far, in acceptance order
    pub fn accepted_names(&self) -> Vec<String> {
        self.accepted_names.lock().unwrap().clone()
    }
}

#[async_trait]
impl EpisodeSink for MockSink {
    async fn submit(&self, episode: &Episode) -> Result<AcceptedEpisode, SinkFailure> {
        let count = {
            let mut submissions = self.submissions.lock().unwrap();
            *submissions += 1;
            *submissions
        };

        if let Some(failure) = self.failures_by_name.lock().unwrap().get(&episode.name) {
            return Err(failure.clone());
        }
        for (pattern, failure) in self.failures_by_payload.lock().unwrap().iter() {
            if episode.payload.contains(pattern.as_str()) {
                return Err(failure.clone());
            }
        }
        if let Some(failure) = self.queued_failures.lock().unwrap().pop_front() {
            return Err(failure);
        }

        let name = episode.name.clone();
        self.accepted_names.lock().unwrap().push(name);
        Ok(AcceptedEpisode {
            episode_id: episode.id.clone(),
            storage_key: format!("key-{}", count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_domain::{CircularId, ContentHash, EpisodeId, SourceHash};

    fn episode(name: &str) -> Episode {
        let content_hash = ContentHash::of_payload(name);
        Episode {
            id: EpisodeId::derive(&content_hash),
            circular_id: CircularId::derive(&SourceHash::of_text("doc")),
            clause_ids: vec![],
            name: name.to_string(),
            payload: "{}".to_string(),
            content_hash,
        }
    }

    #[tokio::test]
    async fn test_accepts_by_default() {
        let sink = MockSink::new();
        let accepted = sink.submit(&episode("one")).await.unwrap();
        assert_eq!(accepted.storage_key, "key-1");
        assert_eq!(sink.accepted_names(), vec!["one"]);
    }

    #[tokio::test]
    async fn test_scripted_failure_fires_once() {
        let sink = MockSink::new();
        sink.fail_next(SinkFailure::Transient("hiccup".to_string()));

        assert!(sink.submit(&episode("a")).await.is_err());
        assert!(sink.submit(&episode("a")).await.is_ok());
    }

    #[tokio::test]
    async fn test_named_rejection_is_sticky() {
        let sink = MockSink::new();
        sink.reject_name("bad", SinkFailure::Rejected("no".to_string()));

        assert!(sink.submit(&episode("bad")).await.is_err());
        assert!(sink.submit(&episode("bad")).await.is_err());
        assert!(sink.submit(&episode("good")).await.is_ok());
    }
}
