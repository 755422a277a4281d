pub mod directory;
pub mod engine;
pub mod selector;

pub use directory::{DirectoryLookup, InMemoryDirectory, NoDirectory};
pub use engine::{KeyField, ReconcileConfig, ReconcileOutcome, Reconciler, query_keys};
pub use selector::{
    DEFAULT_THRESHOLD, ExactField, LevenshteinRatio, MatchKind, MatchResult, RecordSelector,
    Similarity,
};
