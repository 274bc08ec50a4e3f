//! Gazette CLI - map circular page text into graph-ready records and
//! optionally submit ingestion episodes.

mod cli;
mod config;

use crate::cli::{Cli, Command};
use crate::config::GazetteConfig;
use anyhow::Context;
use clap::Parser;
use gazette_domain::traits::{EpisodeSink, SinkFailure};
use gazette_domain::{AcceptedEpisode, Episode, Page};
use gazette_ingest::HttpSink;
use gazette_runner::{
    BatchReport, BatchRunner, DocumentInput, DocumentOutcome, DocumentReport, FailureKind,
    RunMode,
};
use gazette_store::{FileDedupLedger, JsonArtifactStore};
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    let config = GazetteConfig::load(cli.config.as_deref())?;

    let store = JsonArtifactStore::open(&cli.out_dir)
        .with_context(|| format!("failed to open artifact store at {}", cli.out_dir))?;
    let ledger = FileDedupLedger::open(&cli.out_dir)
        .with_context(|| format!("failed to open dedup ledger at {}", cli.out_dir))?;

    // Cancel between stages on Ctrl+C; stages already running finish,
    // so no torn artifact is written.
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling between stages");
            signal_token.cancel();
        }
    });

    match cli.command {
        Command::Map(args) => {
            let (documents, load_failures) = read_documents(&args.input_dir)?;
            let runner = BatchRunner::new(
                config.runner,
                config.normalize,
                config.ingest,
                store,
                NullSink,
                ledger,
            );
            finish(runner, documents, load_failures, RunMode::DryRun, token).await
        }
        Command::Ingest(args) => {
            let endpoint = args
                .endpoint
                .context("--endpoint (or GAZETTE_ENDPOINT) is required for ingest")?;
            let (documents, load_failures) = read_documents(&args.input_dir)?;
            let runner = BatchRunner::new(
                config.runner,
                config.normalize,
                config.ingest,
                store,
                HttpSink::new(endpoint),
                ledger,
            );
            finish(runner, documents, load_failures, RunMode::Ingest, token).await
        }
    }
}

/// Run the batch, merge in load failures, print the report.
async fn finish<S, K, L>(
    runner: BatchRunner<S, K, L>,
    documents: Vec<DocumentInput>,
    load_failures: Vec<DocumentReport>,
    mode: RunMode,
    token: CancellationToken,
) -> anyhow::Result<bool>
where
    S: gazette_domain::traits::ArtifactStore + Send + 'static,
    S::Error: std::fmt::Display,
    K: EpisodeSink + 'static,
    L: gazette_domain::traits::DedupLedger + Send + 'static,
    L::Error: std::fmt::Display,
{
    let mut report: BatchReport = runner.run(documents, mode, token).await;
    report.documents.extend(load_failures);

    println!("{}", report.summary());
    Ok(report.all_succeeded())
}

/// Read one pages-file per document from the input directory.
///
/// A file that cannot be read or parsed fails that document only; the
/// rest of the batch proceeds.
fn read_documents(dir: &str) -> anyhow::Result<(Vec<DocumentInput>, Vec<DocumentReport>)> {
    let mut entries: Vec<_> = fs::read_dir(Path::new(dir))
        .with_context(|| format!("failed to read input directory {}", dir))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to list input directory {}", dir))?;
    entries.sort_by_key(|e| e.file_name());

    let mut documents = Vec::new();
    let mut failures = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match load_pages(&path) {
            Ok(pages) => documents.push(DocumentInput { name, pages }),
            Err(e) => {
                warn!(document = %name, error = %e, "skipping unreadable pages file");
                failures.push(DocumentReport {
                    name,
                    outcome: DocumentOutcome::Failed {
                        label: FailureKind::Internal,
                        cause: format!("unreadable pages file: {}", e),
                    },
                });
            }
        }
    }

    if documents.is_empty() && failures.is_empty() {
        anyhow::bail!("no .json page files found in {}", dir);
    }
    Ok((documents, failures))
}

fn load_pages(path: &Path) -> anyhow::Result<Vec<Page>> {
    let contents = fs::read_to_string(path)?;
    let pages: Vec<Page> = serde_json::from_str(&contents)?;
    Ok(pages)
}

/// Sink for map mode; a dry run never submits, so every call rejects.
struct NullSink;

#[async_trait::async_trait]
impl EpisodeSink for NullSink {
    async fn submit(&self, _episode: &Episode) -> Result<AcceptedEpisode, SinkFailure> {
        Err(SinkFailure::Rejected(
            "ingestion is disabled in map mode".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_documents_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let page_json = r#"[{"page_number": 1, "raw_text": "1. Clause."}]"#;
        fs::write(dir.path().join("b.json"), page_json).unwrap();
        fs::write(dir.path().join("a.json"), page_json).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (documents, failures) = read_documents(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(failures.len(), 0);
        let names: Vec<_> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_malformed_file_fails_only_that_document() {
        let dir = tempfile::tempdir().unwrap();
        let page_json = r#"[{"page_number": 1, "raw_text": "1. Clause."}]"#;
        fs::write(dir.path().join("good.json"), page_json).unwrap();
        let mut bad = fs::File::create(dir.path().join("bad.json")).unwrap();
        write!(bad, "not json").unwrap();

        let (documents, failures) = read_documents(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "bad.json");
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_documents(dir.path().to_str().unwrap()).is_err());
    }
}
