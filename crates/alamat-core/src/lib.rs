//! # Alamat Core
//!
//! The heart of the Alamat address engine. Turns the tag sequence of a
//! token-classification model into a structured Indonesian address and
//! reconciles it against an authoritative region directory.
//!
//! ## Quick Start
//!
//! ```rust
//! use alamat_core::parser::{AddressPipeline, KeywordTagger, PipelineConfig};
//! use alamat_core::reconcile::NoDirectory;
//!
//! let pipeline = AddressPipeline::new(
//!     PipelineConfig::default(),
//!     KeywordTagger::new().unwrap(),
//!     NoDirectory,
//! );
//! let record = pipeline.extract("Jl. Braga No. 10, Kota Bandung 40115").unwrap();
//!
//! assert_eq!(record.street.as_deref(), Some("Jl Braga No 10"));
//! assert_eq!(record.city.as_deref(), Some("Bandung"));
//! assert_eq!(record.postal_code.as_deref(), Some("40115"));
//! ```
pub mod error;
pub mod parser;
pub mod reconcile;
pub mod types;

// Re-export primary API
pub use error::{AlamatError, DirectoryError, Result};
pub use parser::{
    AddressPipeline, Aggregator, AggregatorConfig, EntityType, KeywordTagger, LabelOverrides,
    PipelineConfig, Tag, TagPredictor, Token, Tokenizer, TokenizerConfig,
};
pub use reconcile::{
    DirectoryLookup, InMemoryDirectory, KeyField, MatchKind, MatchResult, NoDirectory,
    ReconcileConfig, ReconcileOutcome, Reconciler, RecordSelector,
};
pub use types::{CandidateRecord, EntityRecord};
