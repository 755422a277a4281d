use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::reconcile::directory::DirectoryLookup;
use crate::reconcile::selector::{
    DEFAULT_THRESHOLD, LevenshteinRatio, MatchResult, RecordSelector, Similarity,
};
use crate::types::{CandidateRecord, EntityRecord};

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Minimum fuzzy similarity (`0..=100`) for accepting a candidate.
    pub threshold: u8,
    /// Let an exact city / sub-district / village match win before scoring.
    pub exact_precheck: bool,
    /// Upper bound on directory lookups per record, primary key included.
    /// Only a postal-code query can use more than one.
    pub max_lookups: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            exact_precheck: true,
            max_lookups: 2,
        }
    }
}

impl ReconcileConfig {
    /// Create a config with threshold 70, exact pre-check on and two lookups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acceptance threshold, clamped to `0..=100`.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold.min(100);
        self
    }

    /// Enable or disable the exact-field pre-check.
    pub fn with_exact_precheck(mut self, enabled: bool) -> Self {
        self.exact_precheck = enabled;
        self
    }

    /// Set the lookup budget; at least one lookup is always allowed.
    pub fn with_max_lookups(mut self, max_lookups: usize) -> Self {
        self.max_lookups = max_lookups.max(1);
        self
    }
}

/// Record field used as the directory query key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyField {
    PostalCode,
    City,
    SubDistrict,
    Village,
}

impl KeyField {
    /// Key priority, most specific first.
    pub const PRIORITY: [KeyField; 4] = [
        KeyField::PostalCode,
        KeyField::City,
        KeyField::SubDistrict,
        KeyField::Village,
    ];

    fn value(self, record: &EntityRecord) -> Option<&str> {
        match self {
            KeyField::PostalCode => record.postal_code.as_deref(),
            KeyField::City => record.city.as_deref(),
            KeyField::SubDistrict => record.sub_district.as_deref(),
            KeyField::Village => record.village.as_deref(),
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyField::PostalCode => write!(f, "postal_code"),
            KeyField::City => write!(f, "city"),
            KeyField::SubDistrict => write!(f, "sub_district"),
            KeyField::Village => write!(f, "village"),
        }
    }
}

/// Present query keys of a record in priority order.
pub fn query_keys(record: &EntityRecord) -> Vec<(KeyField, String)> {
    KeyField::PRIORITY
        .iter()
        .filter_map(|field| {
            field
                .value(record)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (*field, v.to_string()))
        })
        .collect()
}

/// What reconciliation did with a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// No postal code, city, sub-district or village to query with.
    EmptyQueryKey,
    /// Every attempted key returned nothing (or the directory failed).
    NoCandidates { attempted: Vec<KeyField> },
    /// Candidates existed but none was accepted.
    NoMatch { key: KeyField, best_score: u8 },
    /// Region fields were overwritten from `result.candidate`.
    Matched { key: KeyField, result: MatchResult },
}

impl ReconcileOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, ReconcileOutcome::Matched { .. })
    }
}

/// Corrects and completes records against a region directory.
///
/// The first present key in [`KeyField::PRIORITY`] is queried. When that
/// key is the postal code and it yields no candidates (or the directory
/// fails), lookups cascade through the remaining present keys until
/// `max_lookups` is spent. A city, sub-district or village key gets a
/// single lookup. Candidates that fail the threshold end the cascade.
/// Directory errors never escape; the record is returned unchanged instead.
#[derive(Debug, Clone)]
pub struct Reconciler<D, S = LevenshteinRatio> {
    directory: D,
    selector: RecordSelector<S>,
    max_lookups: usize,
}

impl<D: DirectoryLookup> Reconciler<D> {
    /// Create a reconciler with the default Levenshtein similarity.
    pub fn new(directory: D, config: &ReconcileConfig) -> Self {
        Self::with_selector(
            directory,
            RecordSelector::new(config.threshold, config.exact_precheck),
            config.max_lookups,
        )
    }
}

impl<D: DirectoryLookup, S: Similarity> Reconciler<D, S> {
    /// Create a reconciler with a custom selector.
    pub fn with_selector(directory: D, selector: RecordSelector<S>, max_lookups: usize) -> Self {
        Self {
            directory,
            selector,
            max_lookups: max_lookups.max(1),
        }
    }

    /// Get the directory backend.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Get the record selector.
    pub fn selector(&self) -> &RecordSelector<S> {
        &self.selector
    }

    /// Reconcile a record, discarding the outcome.
    pub fn reconcile(&self, record: EntityRecord) -> EntityRecord {
        self.reconcile_with_outcome(record).0
    }

    /// Reconcile a record and report what happened.
    pub fn reconcile_with_outcome(
        &self,
        mut record: EntityRecord,
    ) -> (EntityRecord, ReconcileOutcome) {
        let keys = query_keys(&record);
        if keys.is_empty() {
            debug!("no query key present, skipping reconciliation");
            return (record, ReconcileOutcome::EmptyQueryKey);
        }

        // Only a postal-code query falls back to the name fields.
        let budget = if keys[0].0 == KeyField::PostalCode {
            self.max_lookups
        } else {
            1
        };

        let mut attempted = Vec::new();
        for (field, key) in keys.into_iter().take(budget) {
            attempted.push(field);
            let candidates = self.fetch(field, &key);
            if candidates.is_empty() {
                debug!(%field, key = %key, "no candidates");
                continue;
            }

            let Some(result) = self.selector.evaluate(&record, &candidates) else {
                continue;
            };

            if !self.selector.accepts(&result) {
                debug!(%field, best_score = result.score, "no candidate met the threshold");
                return (
                    record,
                    ReconcileOutcome::NoMatch {
                        key: field,
                        best_score: result.score,
                    },
                );
            }

            info!(
                %field,
                score = result.score,
                kind = ?result.kind,
                candidate = %result.candidate,
                "reconciled against directory"
            );
            record.apply_candidate(&result.candidate);
            return (record, ReconcileOutcome::Matched { key: field, result });
        }

        (record, ReconcileOutcome::NoCandidates { attempted })
    }

    fn fetch(&self, field: KeyField, key: &str) -> Vec<CandidateRecord> {
        match self.directory.lookup(key) {
            Ok(candidates) => {
                debug!(%field, key, candidates = candidates.len(), "directory lookup");
                candidates
            }
            Err(err) => {
                warn!(%field, key, error = %err, "directory lookup failed, treating as no candidates");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::DirectoryError;
    use crate::parser::bio_tags::EntityType;
    use crate::reconcile::directory::InMemoryDirectory;
    use crate::reconcile::selector::MatchKind;

    /// Records every key and answers from a fixed table.
    struct ScriptedDirectory {
        answers: Vec<(&'static str, Result<Vec<CandidateRecord>, &'static str>)>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedDirectory {
        fn new(answers: Vec<(&'static str, Result<Vec<CandidateRecord>, &'static str>)>) -> Self {
            Self {
                answers,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl DirectoryLookup for ScriptedDirectory {
        fn lookup(&self, key: &str) -> Result<Vec<CandidateRecord>, DirectoryError> {
            self.calls.borrow_mut().push(key.to_string());
            match self.answers.iter().find(|(k, _)| *k == key) {
                Some((_, Ok(found))) => Ok(found.clone()),
                Some((_, Err(msg))) => Err(DirectoryError::Unavailable(msg.to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    struct Fixed(u8);

    impl Similarity for Fixed {
        fn score(&self, _a: &str, _b: &str) -> u8 {
            self.0
        }
    }

    fn menteng() -> CandidateRecord {
        CandidateRecord::new("10310", "Menteng", "Menteng", "Jakarta Pusat", "DKI Jakarta")
    }

    fn cikini() -> CandidateRecord {
        CandidateRecord::new("10330", "Cikini", "Menteng", "Jakarta Pusat", "DKI Jakarta")
    }

    #[test]
    fn empty_record_is_untouched() {
        let dir = ScriptedDirectory::new(vec![]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new().with(EntityType::Jalan, "Jl Melati");

        let (out, outcome) = reconciler.reconcile_with_outcome(record.clone());
        assert_eq!(out, record);
        assert_eq!(outcome, ReconcileOutcome::EmptyQueryKey);
        assert!(dir.calls().is_empty());
    }

    #[test]
    fn postal_code_is_preferred_key() {
        let dir = ScriptedDirectory::new(vec![("10330", Ok(vec![cikini()]))]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "10330")
            .with(EntityType::Kota, "Jakarta Pusat");

        let (out, outcome) = reconciler.reconcile_with_outcome(record);
        assert_eq!(dir.calls(), ["10330"]);
        assert!(outcome.is_matched());
        assert_eq!(out.village.as_deref(), Some("Cikini"));
        assert_eq!(out.postal_code.as_deref(), Some("10330"));
    }

    #[test]
    fn missing_postal_code_queries_city_directly() {
        let dir = ScriptedDirectory::new(vec![("Jakarta Pusat", Ok(vec![menteng()]))]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new().with(EntityType::Kota, "Jakarta Pusat");

        let out = reconciler.reconcile(record);
        assert_eq!(dir.calls(), ["Jakarta Pusat"]);
        assert_eq!(out.province.as_deref(), Some("DKI Jakarta"));
    }

    #[test]
    fn empty_postal_result_cascades_once() {
        let dir = ScriptedDirectory::new(vec![
            ("99999", Ok(vec![])),
            ("Menteng", Ok(vec![menteng()])),
        ]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "99999")
            .with(EntityType::Kecamatan, "Menteng")
            .with(EntityType::Kelurahan, "Menteng");

        let (out, outcome) = reconciler.reconcile_with_outcome(record);
        assert_eq!(dir.calls(), ["99999", "Menteng"]);
        assert!(matches!(
            outcome,
            ReconcileOutcome::Matched { key: KeyField::SubDistrict, .. }
        ));
        assert_eq!(out.city.as_deref(), Some("Jakarta Pusat"));
        assert_eq!(out.postal_code.as_deref(), Some("99999"));
    }

    #[test]
    fn city_miss_does_not_cascade() {
        let dir = InMemoryDirectory::from_records(vec![menteng()]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new()
            .with(EntityType::Kota, "Jakrta")
            .with(EntityType::Kecamatan, "Menteng");

        let (out, outcome) = reconciler.reconcile_with_outcome(record.clone());
        assert_eq!(
            outcome,
            ReconcileOutcome::NoCandidates {
                attempted: vec![KeyField::City]
            }
        );
        assert_eq!(out, record);
    }

    #[test]
    fn sub_district_failure_is_a_single_lookup() {
        let dir = ScriptedDirectory::new(vec![
            ("Menteng", Err("timeout")),
            ("Cikini", Ok(vec![cikini()])),
        ]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::new().with_max_lookups(4));
        let record = EntityRecord::new()
            .with(EntityType::Kecamatan, "Menteng")
            .with(EntityType::Kelurahan, "Cikini");

        let (out, outcome) = reconciler.reconcile_with_outcome(record.clone());
        assert_eq!(dir.calls(), ["Menteng"]);
        assert!(!outcome.is_matched());
        assert_eq!(out, record);
    }

    #[test]
    fn directory_failure_degrades_and_cascades() {
        let dir = ScriptedDirectory::new(vec![
            ("10310", Err("connection reset")),
            ("Jakarta Pusat", Ok(vec![menteng()])),
        ]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "10310")
            .with(EntityType::Kota, "Jakarta Pusat");

        let (out, outcome) = reconciler.reconcile_with_outcome(record);
        assert!(outcome.is_matched());
        assert_eq!(out.village.as_deref(), Some("Menteng"));
    }

    #[test]
    fn lookup_budget_bounds_the_cascade() {
        let dir = ScriptedDirectory::new(vec![]);
        let reconciler = Reconciler::new(&dir, &ReconcileConfig::default());
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "10310")
            .with(EntityType::Kota, "Jakarta Pusat")
            .with(EntityType::Kecamatan, "Menteng")
            .with(EntityType::Kelurahan, "Cikini");

        let (out, outcome) = reconciler.reconcile_with_outcome(record.clone());
        assert_eq!(dir.calls(), ["10310", "Jakarta Pusat"]);
        assert_eq!(
            outcome,
            ReconcileOutcome::NoCandidates {
                attempted: vec![KeyField::PostalCode, KeyField::City]
            }
        );
        assert_eq!(out, record);

        let wide = Reconciler::new(&dir, &ReconcileConfig::new().with_max_lookups(4));
        wide.reconcile(record);
        assert_eq!(dir.calls().len(), 6);
    }

    #[test]
    fn below_threshold_stops_without_cascading() {
        let dir = ScriptedDirectory::new(vec![("10310", Ok(vec![menteng()]))]);
        let reconciler =
            Reconciler::with_selector(&dir, RecordSelector::with_similarity(70, false, Fixed(69)), 2);
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "10310")
            .with(EntityType::Kota, "Bogor");

        let (out, outcome) = reconciler.reconcile_with_outcome(record.clone());
        assert_eq!(out, record);
        assert_eq!(
            outcome,
            ReconcileOutcome::NoMatch {
                key: KeyField::PostalCode,
                best_score: 69
            }
        );
        assert_eq!(dir.calls(), ["10310"]);
    }

    #[test]
    fn threshold_seventy_is_accepted() {
        let dir = ScriptedDirectory::new(vec![("10310", Ok(vec![menteng()]))]);
        let reconciler =
            Reconciler::with_selector(&dir, RecordSelector::with_similarity(70, false, Fixed(70)), 2);
        let record = EntityRecord::new()
            .with(EntityType::KodePos, "10310")
            .with(EntityType::Kota, "Bogor");

        let out = reconciler.reconcile(record);
        assert_eq!(out.city.as_deref(), Some("Jakarta Pusat"));
    }

    #[test]
    fn fuzzy_match_at_85_overwrites_regions() {
        let dir = InMemoryDirectory::from_records(vec![menteng()]);
        let reconciler =
            Reconciler::with_selector(dir, RecordSelector::with_similarity(70, false, Fixed(85)), 2);
        let record = EntityRecord::new()
            .with(EntityType::Jalan, "Jl Melati")
            .with(EntityType::Kecamatan, "Menteng");

        let (out, outcome) = reconciler.reconcile_with_outcome(record);
        match outcome {
            ReconcileOutcome::Matched { key, result } => {
                assert_eq!(key, KeyField::SubDistrict);
                assert_eq!(result.score, 85);
                assert_eq!(result.kind, MatchKind::Fuzzy);
            }
            other => panic!("expected a match, got {other:?}"),
        }
        assert_eq!(out.street.as_deref(), Some("Jl Melati"));
        assert_eq!(out.village.as_deref(), Some("Menteng"));
        assert_eq!(out.sub_district.as_deref(), Some("Menteng"));
        assert_eq!(out.city.as_deref(), Some("Jakarta Pusat"));
        assert_eq!(out.province.as_deref(), Some("DKI Jakarta"));
        assert_eq!(out.postal_code, None);
    }

    #[test]
    fn config_builders_clamp() {
        let config = ReconcileConfig::new()
            .with_threshold(150)
            .with_max_lookups(0)
            .with_exact_precheck(false);
        assert_eq!(config.threshold, 100);
        assert_eq!(config.max_lookups, 1);
        assert!(!config.exact_precheck);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(ReconcileOutcome::NoMatch {
            key: KeyField::City,
            best_score: 42,
        })
        .unwrap();
        assert_eq!(json["status"], "no_match");
        assert_eq!(json["key"], "city");
        assert_eq!(json["best_score"], 42);
    }
}
