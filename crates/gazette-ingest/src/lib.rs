//! Gazette Ingestion Layer
//!
//! Translates canonical circular records into graph-ingestion episode
//! payloads and drives their submission to the external knowledge-graph
//! boundary.
//!
//! # Architecture
//!
//! ```text
//! CircularRecord → EpisodeBuilder → [dedup guard] → SubmissionDriver → EpisodeSink
//! ```
//!
//! # Key behaviors
//!
//! - **Deterministic payloads**: episode content and identity are pure
//!   functions of the record, so a re-run produces identical episodes
//! - **Dedup guard**: content hashes already built this run (or found
//!   in a persisted ledger) are skipped, not re-submitted
//! - **Bounded submission**: a semaphore caps in-flight submissions; a
//!   per-submission timeout and exponential-backoff retries handle
//!   transient failures; permanent rejections surface immediately

#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod http;
pub mod mock;
mod submit;

pub use builder::{BuildResult, EpisodeBuilder};
pub use config::{Granularity, IngestConfig};
pub use error::IngestError;
pub use http::HttpSink;
pub use submit::{AcceptedSubmission, FailedSubmission, IngestReport, SubmissionDriver};
