//! Gazette Normalizer
//!
//! Turns raw per-page circular text into a canonical `CircularRecord`.
//!
//! # Overview
//!
//! The normalizer is the first half of the pipeline. It removes
//! repeated header/footer boilerplate, infers document metadata with
//! per-field confidence tiers, segments the body into a hierarchy of
//! numbered clauses, and joins everything into a record with
//! deterministic identifiers.
//!
//! # Architecture
//!
//! ```text
//! Pages → BoilerplateDetector → MetadataInferrer ┐
//!                             → ClauseSegmenter  ┴→ RecordMapper → ArtifactStore
//! ```
//!
//! All four stages are pure functions of their input: cleaning,
//! inference, and segmentation never consult a clock, an RNG, or any
//! state outside the document, so re-running the pipeline over an
//! identical source reproduces an identical record.

#![warn(missing_docs)]

mod boilerplate;
mod config;
mod error;
mod mapper;
mod metadata;
mod segmenter;


pub use boilerplate::BoilerplateDetector;
pub use config::NormalizeConfig;
pub use error::NormalizeError;
pub use mapper::RecordMapper;
pub use metadata::MetadataInferrer;
pub use segmenter::{ClauseSegmenter, Segmentation, SegmentedClause};
