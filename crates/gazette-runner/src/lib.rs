//! Gazette Batch Runner
//!
//! Orchestrates the pipeline over a batch of documents.
//!
//! # Concurrency model
//!
//! Documents are independent — each pipeline run is a pure function of
//! its own pages — so they process concurrently up to the configured
//! worker count. Within one document the stages run strictly in order.
//! A cancellation token is checked between stages; a stage already in
//! progress runs to completion, so no torn artifact is ever persisted.
//!
//! # Failure isolation
//!
//! One document's mapping failure or exhausted ingestion retries never
//! aborts the batch: every document lands in the [`BatchReport`] with
//! an outcome, and failures carry a taxonomy label plus a
//! human-readable cause.

#![warn(missing_docs)]

mod config;
mod report;

pub use config::RunnerConfig;
pub use report::{BatchReport, DocumentOutcome, DocumentReport, FailureKind};

use gazette_domain::traits::{ArtifactStore, DedupLedger, EpisodeSink};
use gazette_domain::Page;
use gazette_ingest::{EpisodeBuilder, IngestConfig, IngestError, SubmissionDriver};
use gazette_normalize::{
    BoilerplateDetector, ClauseSegmenter, MetadataInferrer, NormalizeConfig, RecordMapper,
};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One document of extracted page text, as read from the input boundary
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Document name, typically the source file name
    pub name: String,

    /// Extracted pages in page order
    pub pages: Vec<Page>,
}

/// How far the pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Through the record mapper; artifacts written, nothing submitted
    DryRun,

    /// Additionally build episodes and submit them
    Ingest,
}

struct RunContext<S, K, L> {
    normalize: NormalizeConfig,
    store: Mutex<S>,
    driver: SubmissionDriver<K>,
    builder: Mutex<EpisodeBuilder>,
    ledger: Mutex<L>,
}

/// Processes batches of documents through the full pipeline
pub struct BatchRunner<S, K, L> {
    config: RunnerConfig,
    ctx: Arc<RunContext<S, K, L>>,
}

impl<S, K, L> BatchRunner<S, K, L>
where
    S: ArtifactStore + Send + 'static,
    S::Error: std::fmt::Display,
    K: EpisodeSink + 'static,
    L: DedupLedger + Send + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a runner
    pub fn new(
        config: RunnerConfig,
        normalize: NormalizeConfig,
        ingest: IngestConfig,
        store: S,
        sink: K,
        ledger: L,
    ) -> Self {
        let builder = EpisodeBuilder::new(ingest.clone());
        let driver = SubmissionDriver::new(sink, ingest);
        Self {
            config,
            ctx: Arc::new(RunContext {
                normalize,
                store: Mutex::new(store),
                driver,
                builder: Mutex::new(builder),
                ledger: Mutex::new(ledger),
            }),
        }
    }

    /// Process a batch of documents
    ///
    /// Returns one outcome per input document, in input order.
    pub async fn run(
        &self,
        documents: Vec<DocumentInput>,
        mode: RunMode,
        token: CancellationToken,
    ) -> BatchReport {
        info!(
            documents = documents.len(),
            workers = self.config.workers,
            ?mode,
            "starting batch"
        );
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut handles = Vec::with_capacity(documents.len());

        for doc in documents {
            let ctx = Arc::clone(&self.ctx);
            let semaphore = Arc::clone(&semaphore);
            let token = token.clone();
            let name = doc.name.clone();
            handles.push((
                name,
                tokio::spawn(async move {
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => process_document(&ctx, doc, mode, &token).await,
                        Err(e) => DocumentOutcome::Failed {
                            label: FailureKind::Internal,
                            cause: format!("worker pool closed: {}", e),
                        },
                    }
                }),
            ));
        }

        let mut batch = BatchReport::default();
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => DocumentOutcome::Failed {
                    label: FailureKind::Internal,
                    cause: join_error.to_string(),
                },
            };
            batch.documents.push(DocumentReport { name, outcome });
        }

        info!(
            ok = batch.succeeded(),
            failed = batch.failed(),
            skipped = batch.skipped(),
            "batch complete"
        );
        batch
    }
}

/// One document through the staged pipeline
async fn process_document<S, K, L>(
    ctx: &RunContext<S, K, L>,
    doc: DocumentInput,
    mode: RunMode,
    token: &CancellationToken,
) -> DocumentOutcome
where
    S: ArtifactStore,
    S::Error: std::fmt::Display,
    K: EpisodeSink + 'static,
    L: DedupLedger,
    L::Error: std::fmt::Display,
{
    if token.is_cancelled() {
        return skipped("cancelled before cleaning");
    }
    let cleaned = BoilerplateDetector::new(&ctx.normalize).clean(&doc.pages);
    let degraded = cleaned.is_degraded();
    if degraded {
        warn!(
            document = %doc.name,
            pages = ?cleaned.degraded_pages,
            "pages without usable text; continuing degraded"
        );
    }

    if token.is_cancelled() {
        return skipped("cancelled before inference");
    }
    let metadata = MetadataInferrer::new(&ctx.normalize).infer(&cleaned);
    let segmentation = ClauseSegmenter::new().segment(&cleaned.full_text());

    if token.is_cancelled() {
        return skipped("cancelled before mapping");
    }
    let record = {
        let mut store = match ctx.store.lock() {
            Ok(guard) => guard,
            Err(e) => return internal(format!("store lock poisoned: {}", e)),
        };
        match RecordMapper::new().map_and_store(
            Some(doc.name.as_str()),
            &cleaned,
            metadata,
            segmentation,
            &mut *store,
        ) {
            Ok(record) => record,
            Err(e) => {
                return DocumentOutcome::Failed {
                    label: FailureKind::Mapping,
                    cause: e.to_string(),
                }
            }
        }
    };

    if mode == RunMode::DryRun {
        return DocumentOutcome::Mapped {
            clauses: record.clauses.len(),
            circular_id: record.id,
            degraded,
        };
    }

    if token.is_cancelled() {
        return skipped("cancelled before ingestion");
    }
    let build = {
        let mut builder = match ctx.builder.lock() {
            Ok(guard) => guard,
            Err(e) => return internal(format!("builder lock poisoned: {}", e)),
        };
        let ledger = match ctx.ledger.lock() {
            Ok(guard) => guard,
            Err(e) => return internal(format!("ledger lock poisoned: {}", e)),
        };
        match builder.build(&record, Some(&*ledger)) {
            Ok(build) => build,
            Err(e) => return internal(format!("episode build failed: {}", e)),
        }
    };
    let built = build.episodes.len();
    let deduped = build.skipped;

    // A fully-deduped re-run built nothing; keep the prior episode
    // artifact instead of overwriting it with an empty list.
    if built > 0 || deduped == 0 {
        let mut store = match ctx.store.lock() {
            Ok(guard) => guard,
            Err(e) => return internal(format!("store lock poisoned: {}", e)),
        };
        if let Err(e) = store.put_episodes(&record.id, &build.episodes) {
            return DocumentOutcome::Failed {
                label: FailureKind::Mapping,
                cause: format!("failed to persist episode list: {}", e),
            };
        }
    }

    let ingest_report = ctx.driver.submit_all(build.episodes).await;

    // Accepted hashes go to the ledger so later runs skip them; a
    // ledger write failure only weakens dedup, it does not fail the
    // document.
    match ctx.ledger.lock() {
        Ok(mut ledger) => {
            for accepted in &ingest_report.accepted {
                if let Err(e) = ledger.append(&accepted.content_hash) {
                    warn!(error = %e, "failed to record accepted hash in ledger");
                }
            }
        }
        Err(e) => warn!(error = %e, "ledger lock poisoned; skipping ledger appends"),
    }

    if ingest_report.is_clean() {
        DocumentOutcome::Ingested {
            circular_id: record.id,
            episodes: ingest_report.accepted.len(),
            skipped: deduped,
            degraded,
        }
    } else {
        let first = &ingest_report.failures[0];
        let label = match first.error {
            IngestError::RetriesExhausted { .. } => FailureKind::IngestionTransient,
            IngestError::Rejected(_) => FailureKind::IngestionRejected,
            _ => FailureKind::Internal,
        };
        DocumentOutcome::Failed {
            label,
            cause: format!(
                "{} of {} episodes failed; first: {}",
                ingest_report.failures.len(),
                built,
                first.error
            ),
        }
    }
}

fn skipped(reason: &str) -> DocumentOutcome {
    DocumentOutcome::Skipped {
        reason: reason.to_string(),
    }
}

fn internal(cause: String) -> DocumentOutcome {
    DocumentOutcome::Failed {
        label: FailureKind::Internal,
        cause,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazette_domain::traits::SinkFailure;
    use gazette_ingest::mock::{MemoryLedger, MockSink};
    use gazette_store::{FileDedupLedger, JsonArtifactStore};

    fn doc(name: &str, body: &str) -> DocumentInput {
        DocumentInput {
            name: name.to_string(),
            pages: vec![Page {
                page_number: 1,
                raw_text: body.to_string(),
            }],
        }
    }

    fn sample_docs() -> Vec<DocumentInput> {
        vec![
            doc("alpha.json", "Circular No. 1/2024\n1. First.\n2. Second."),
            doc("beta.json", "Circular No. 2/2024\n1. Only clause."),
        ]
    }

    fn runner(
        store: JsonArtifactStore,
        sink: MockSink,
        ledger: MemoryLedger,
    ) -> BatchRunner<JsonArtifactStore, MockSink, MemoryLedger> {
        BatchRunner::new(
            RunnerConfig::default(),
            NormalizeConfig::default(),
            IngestConfig::default(),
            store,
            sink,
            ledger,
        )
    }

    #[tokio::test]
    async fn test_dry_run_maps_without_submitting() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let sink = MockSink::new();
        let submissions = sink.submissions();

        let runner = runner(store, sink, MemoryLedger::new());
        let report = runner
            .run(sample_docs(), RunMode::DryRun, CancellationToken::new())
            .await;

        assert!(report.all_succeeded());
        assert_eq!(report.succeeded(), 2);
        assert!(report
            .documents
            .iter()
            .all(|d| matches!(d.outcome, DocumentOutcome::Mapped { .. })));
        assert_eq!(*submissions.lock().unwrap(), 0);
        // Mapped artifacts are on disk.
        let mapped: Vec<_> = std::fs::read_dir(dir.path().join("mapped"))
            .unwrap()
            .collect();
        assert_eq!(mapped.len(), 2);
    }

    #[tokio::test]
    async fn test_ingest_mode_submits_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let sink = MockSink::new();

        let runner = runner(store, sink, MemoryLedger::new());
        let report = runner
            .run(sample_docs(), RunMode::Ingest, CancellationToken::new())
            .await;

        assert!(report.all_succeeded());
        for document in &report.documents {
            match &document.outcome {
                DocumentOutcome::Ingested { episodes, skipped, .. } => {
                    assert!(*episodes > 0);
                    assert_eq!(*skipped, 0);
                }
                other => panic!("expected Ingested, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_second_run_is_deduped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let runner = runner(store, MockSink::new(), MemoryLedger::new());

        let first = runner
            .run(sample_docs(), RunMode::Ingest, CancellationToken::new())
            .await;
        let second = runner
            .run(sample_docs(), RunMode::Ingest, CancellationToken::new())
            .await;

        assert!(first.all_succeeded());
        assert!(second.all_succeeded());
        for document in &second.documents {
            match &document.outcome {
                DocumentOutcome::Ingested { episodes, skipped, .. } => {
                    assert_eq!(*episodes, 0);
                    assert!(*skipped > 0);
                }
                other => panic!("expected Ingested, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_persisted_ledger_dedupes_across_runs() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = JsonArtifactStore::open(dir.path()).unwrap();
            let ledger = FileDedupLedger::open(dir.path()).unwrap();
            let runner = BatchRunner::new(
                RunnerConfig::default(),
                NormalizeConfig::default(),
                IngestConfig::default(),
                store,
                MockSink::new(),
                ledger,
            );
            let report = runner
                .run(sample_docs(), RunMode::Ingest, CancellationToken::new())
                .await;
            assert!(report.all_succeeded());
        }

        // Fresh runner, fresh builder — only the reopened ledger
        // remembers the first run.
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let ledger = FileDedupLedger::open(dir.path()).unwrap();
        let runner = BatchRunner::new(
            RunnerConfig::default(),
            NormalizeConfig::default(),
            IngestConfig::default(),
            store,
            MockSink::new(),
            ledger,
        );
        let report = runner
            .run(sample_docs(), RunMode::Ingest, CancellationToken::new())
            .await;
        for document in &report.documents {
            match &document.outcome {
                DocumentOutcome::Ingested { episodes, .. } => assert_eq!(*episodes, 0),
                other => panic!("expected Ingested, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_one_rejected_document_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let sink = MockSink::new();
        sink.reject_payload_containing(
            "POISON",
            SinkFailure::Rejected("payload too large".to_string()),
        );

        let mut docs = sample_docs();
        docs.push(doc("gamma.json", "1. POISON clause."));

        let runner = runner(store, sink, MemoryLedger::new());
        let report = runner.run(docs, RunMode::Ingest, CancellationToken::new()).await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let failure = report
            .documents
            .iter()
            .find(|d| d.name == "gamma.json")
            .unwrap();
        match &failure.outcome {
            DocumentOutcome::Failed { label, cause } => {
                assert_eq!(*label, FailureKind::IngestionRejected);
                assert!(cause.contains("payload too large"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_batch_skips_documents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let runner = runner(store, MockSink::new(), MemoryLedger::new());
        let report = runner.run(sample_docs(), RunMode::Ingest, token).await;

        assert_eq!(report.skipped(), 2);
        assert!(!report.all_succeeded());
    }

    #[tokio::test]
    async fn test_degraded_page_is_flagged_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonArtifactStore::open(dir.path()).unwrap();
        let docs = vec![DocumentInput {
            name: "partial.json".to_string(),
            pages: vec![
                Page { page_number: 1, raw_text: "1. Readable clause.".to_string() },
                Page { page_number: 2, raw_text: "  ".to_string() },
            ],
        }];

        let runner = runner(store, MockSink::new(), MemoryLedger::new());
        let report = runner.run(docs, RunMode::DryRun, CancellationToken::new()).await;

        match &report.documents[0].outcome {
            DocumentOutcome::Mapped { degraded, .. } => assert!(*degraded),
            other => panic!("expected Mapped, got {:?}", other),
        }
    }
}
