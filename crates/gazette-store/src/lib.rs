//! Gazette Artifact Store
//!
//! Durable persistence for the pipeline's mapped output: one JSON
//! document per circular for the record, one for its episode payload
//! list, and an append-only ledger of submitted content hashes.
//!
//! Artifacts are keyed by circular identity, so re-mapping the same
//! source overwrites in place rather than accumulating duplicates.
//! The serialization is self-describing JSON; unknown fields are
//! ignored on read for forward compatibility.

#![warn(missing_docs)]

mod error;
mod ledger;

pub use error::StoreError;
pub use ledger::FileDedupLedger;

use gazette_domain::traits::ArtifactStore;
use gazette_domain::{CircularId, CircularRecord, Episode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-system artifact store
///
/// Layout under the root directory:
///
/// ```text
/// <root>/mapped/<circular_id>.circular.json
/// <root>/mapped/<circular_id>.episodes.json
/// <root>/ledger/content_hashes.log
/// ```
pub struct JsonArtifactStore {
    mapped_dir: PathBuf,
}

impl JsonArtifactStore {
    /// Open (creating if needed) a store rooted at the given directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mapped_dir = root.as_ref().join("mapped");
        fs::create_dir_all(&mapped_dir)?;
        Ok(Self { mapped_dir })
    }

    fn record_path(&self, id: &CircularId) -> PathBuf {
        self.mapped_dir.join(format!("{}.circular.json", id))
    }

    fn episodes_path(&self, id: &CircularId) -> PathBuf {
        self.mapped_dir.join(format!("{}.episodes.json", id))
    }
}

impl ArtifactStore for JsonArtifactStore {
    type Error = StoreError;

    fn put_record(&mut self, record: &CircularRecord) -> Result<(), Self::Error> {
        let path = self.record_path(&record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), "wrote circular record");
        Ok(())
    }

    fn get_record(&self, id: &CircularId) -> Result<Option<CircularRecord>, Self::Error> {
        let path = self.record_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn put_episodes(&mut self, id: &CircularId, episodes: &[Episode]) -> Result<(), Self::Error> {
        let path = self.episodes_path(id);
        let json = serde_json::to_string_pretty(episodes)?;
        fs::write(&path, json)?;
        debug!(path = %path.display(), count = episodes.len(), "wrote episode list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_domain::{
        CircularMetadata, ClauseId, ClauseNode, ClauseTree, ContentHash, EpisodeId, NumberPath,
        SourceHash,
    };

    fn sample_record(text: &str) -> CircularRecord {
        let source_hash = SourceHash::of_text(text);
        let path = NumberPath::parse("1").unwrap();
        let node = ClauseNode {
            id: ClauseId::derive(&source_hash, &path, 0),
            number_path: path,
            text: text.to_string(),
            order_index: 0,
            parent_id: None,
            order_anomaly: false,
        };
        CircularRecord {
            id: CircularId::derive(&source_hash),
            metadata: CircularMetadata::absent(),
            clauses: ClauseTree::new(vec![node]),
            source_hash,
            source_file: None,
            page_count: 1,
        }
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonArtifactStore::open(dir.path()).unwrap();
        let record = sample_record("clause body");

        store.put_record(&record).unwrap();
        let loaded = store.get_record(&record.id).unwrap().unwrap();
        assert_eq!(record, loaded);
    }

    #[test]
    fn test_missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let absent = CircularId::derive(&SourceHash::of_text("never stored"));
        assert!(store.get_record(&absent).unwrap().is_none());
    }

    #[test]
    fn test_rewrite_overwrites_not_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonArtifactStore::open(dir.path()).unwrap();
        let record = sample_record("same source");

        store.put_record(&record).unwrap();
        store.put_record(&record).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path().join("mapped"))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_episode_list_written_alongside_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonArtifactStore::open(dir.path()).unwrap();
        let record = sample_record("with episodes");

        let payload = "{\"text\":\"clause body\"}".to_string();
        let content_hash = ContentHash::of_payload(&payload);
        let episode = Episode {
            id: EpisodeId::derive(&content_hash),
            circular_id: record.id.clone(),
            clause_ids: vec![record.clauses.nodes()[0].id.clone()],
            name: format!("{}_clause_0", record.id),
            payload,
            content_hash,
        };

        store.put_record(&record).unwrap();
        store.put_episodes(&record.id, &[episode]).unwrap();

        let episodes_file = dir
            .path()
            .join("mapped")
            .join(format!("{}.episodes.json", record.id));
        let json = fs::read_to_string(episodes_file).unwrap();
        let loaded: Vec<Episode> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
