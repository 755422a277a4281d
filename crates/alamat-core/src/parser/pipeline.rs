//! # Address Pipeline
//!
//! Wires tokenizer, tag predictor, override table, aggregator, RT/RW
//! cleaner and reconciliation into a single entry point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlamatError, Result};
use crate::parser::aggregator::{Aggregator, AggregatorConfig};
use crate::parser::bio_tags::Tag;
use crate::parser::overrides::LabelOverrides;
use crate::parser::predictor::TagPredictor;
use crate::parser::rtrw::clean_rt_rw;
use crate::parser::tokenizer::{Tokenizer, TokenizerConfig};
use crate::reconcile::{DirectoryLookup, ReconcileConfig, ReconcileOutcome, Reconciler};
use crate::types::EntityRecord;

/// Configuration for the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tokenizer: TokenizerConfig,
    /// Forced tags keyed by exact token text.
    pub overrides: LabelOverrides,
    pub aggregator: AggregatorConfig,
    pub reconcile: ReconcileConfig,
}

impl PipelineConfig {
    /// Create a new pipeline configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_overrides(mut self, overrides: LabelOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_aggregator(mut self, aggregator: AggregatorConfig) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn with_reconcile(mut self, reconcile: ReconcileConfig) -> Self {
        self.reconcile = reconcile;
        self
    }
}

/// Address pipeline over an injected tag predictor and directory.
///
/// Both collaborators are read-only; one pipeline can serve any number
/// of requests, each producing an independently owned record.
pub struct AddressPipeline<P, D> {
    config: PipelineConfig,
    tokenizer: Tokenizer,
    aggregator: Aggregator,
    predictor: P,
    reconciler: Reconciler<D>,
}

impl<P: TagPredictor, D: DirectoryLookup> AddressPipeline<P, D> {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: PipelineConfig, predictor: P, directory: D) -> Self {
        let tokenizer = Tokenizer::with_config(config.tokenizer.clone());
        let aggregator = Aggregator::new(config.aggregator.clone(), config.overrides.clone());
        let reconciler = Reconciler::new(directory, &config.reconcile);

        Self {
            config,
            tokenizer,
            aggregator,
            predictor,
            reconciler,
        }
    }

    /// Get the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn reconciler(&self) -> &Reconciler<D> {
        &self.reconciler
    }

    /// Tokenize, predict and post-process tags for an address.
    ///
    /// # Errors
    ///
    /// * `EmptyInput` for blank input
    /// * whatever the predictor reports (typically `ModelUnavailable`)
    /// * `TagAlignment` if the predictor returns more labels than tokens
    /// * `MalformedTag` for a label that is not `O` / `(B|I)-TYPE`
    pub fn tag(&self, text: &str) -> Result<Vec<(String, Tag)>> {
        if text.trim().is_empty() {
            return Err(AlamatError::EmptyInput);
        }

        let tokens = self.tokenizer.tokenize(text);
        let labels = self.predictor.predict(&tokens)?;

        if labels.len() > tokens.len() {
            return Err(AlamatError::TagAlignment {
                tokens: tokens.len(),
                tags: labels.len(),
            });
        }
        if labels.len() < tokens.len() {
            debug!(
                tokens = tokens.len(),
                tags = labels.len(),
                "predictor truncated input, dropping untagged tail"
            );
        }

        self.postprocess_labels(tokens.into_iter().map(|t| t.text).zip(labels))
    }

    /// Parse raw labels and apply the prediction-stage override pass.
    fn postprocess_labels<I>(&self, pairs: I) -> Result<Vec<(String, Tag)>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let parsed = pairs
            .into_iter()
            .map(|(token, label)| label.parse::<Tag>().map(|tag| (token, tag)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.aggregator.overrides().postprocess(parsed))
    }

    /// Aggregate an already-aligned tag sequence and clean RT/RW.
    pub fn aggregate_pairs<I, S>(&self, pairs: I) -> EntityRecord
    where
        I: IntoIterator<Item = (S, Tag)>,
        S: AsRef<str>,
    {
        let mut record = self.aggregator.aggregate(pairs);
        clean_rt_rw(&self.tokenizer, &mut record);
        record
    }

    /// Aggregate `(token, label)` pairs produced by an external tagger.
    ///
    /// Labels are parsed and pass through the same override step as
    /// predictor output.
    pub fn aggregate_labels<I>(&self, pairs: I) -> Result<EntityRecord>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(self.aggregate_pairs(self.postprocess_labels(pairs)?))
    }

    /// Extract the raw entity record without consulting the directory.
    pub fn extract(&self, text: &str) -> Result<EntityRecord> {
        let pairs = self.tag(text)?;
        Ok(self.aggregate_pairs(pairs))
    }

    /// Reconcile a record against the directory.
    pub fn reconcile(&self, record: EntityRecord) -> (EntityRecord, ReconcileOutcome) {
        self.reconciler.reconcile_with_outcome(record)
    }

    /// Full pipeline: extract, then reconcile.
    ///
    /// # Examples
    /// ```
    /// use alamat_core::parser::{AddressPipeline, KeywordTagger, PipelineConfig};
    /// use alamat_core::reconcile::InMemoryDirectory;
    /// use alamat_core::types::CandidateRecord;
    ///
    /// let directory = InMemoryDirectory::from_records(vec![CandidateRecord::new(
    ///     "10310", "Menteng", "Menteng", "Jakarta Pusat", "DKI Jakarta",
    /// )]);
    /// let pipeline = AddressPipeline::new(
    ///     PipelineConfig::default(),
    ///     KeywordTagger::new().unwrap(),
    ///     directory,
    /// );
    ///
    /// let record = pipeline
    ///     .process("Jl. Melati No. 5, RT 05 RW 03, Kota Jakarta Pusat 10310")
    ///     .unwrap();
    /// assert_eq!(record.village.as_deref(), Some("Menteng"));
    /// assert_eq!(record.street.as_deref(), Some("Jl Melati No 5"));
    /// assert_eq!(record.rt.as_deref(), Some("05"));
    /// assert_eq!(record.city.as_deref(), Some("Jakarta Pusat"));
    /// ```
    pub fn process(&self, text: &str) -> Result<EntityRecord> {
        Ok(self.process_with_outcome(text)?.0)
    }

    /// Full pipeline, also reporting the reconciliation outcome.
    pub fn process_with_outcome(&self, text: &str) -> Result<(EntityRecord, ReconcileOutcome)> {
        let record = self.extract(text)?;
        Ok(self.reconcile(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::bio_tags::EntityType;
    use crate::parser::keyword::KeywordTagger;
    use crate::parser::tokenizer::Token;
    use crate::reconcile::{InMemoryDirectory, NoDirectory};
    use crate::types::CandidateRecord;

    /// Returns a fixed label list regardless of input.
    struct StubPredictor(Vec<&'static str>);

    impl TagPredictor for StubPredictor {
        fn predict(&self, _tokens: &[Token]) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct OfflineModel;

    impl TagPredictor for OfflineModel {
        fn predict(&self, _tokens: &[Token]) -> Result<Vec<String>> {
            Err(AlamatError::ModelUnavailable("weights not loaded".into()))
        }
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::from_records(vec![
            CandidateRecord::new("10310", "Menteng", "Menteng", "Jakarta Pusat", "DKI Jakarta"),
            CandidateRecord::new("40115", "Cihapit", "Bandung Wetan", "Bandung", "Jawa Barat"),
        ])
    }

    #[test]
    fn test_pipeline_config() {
        let config = PipelineConfig::new()
            .with_reconcile(ReconcileConfig::new().with_threshold(80))
            .with_overrides(LabelOverrides::empty());

        assert_eq!(config.reconcile.threshold, 80);
        assert!(config.overrides.is_empty());
        assert_eq!(config.tokenizer, TokenizerConfig::default());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"reconcile":{"threshold":85}}"#).unwrap();
        assert_eq!(config.reconcile.threshold, 85);
        assert_eq!(config.reconcile.max_lookups, 2);
        assert_eq!(config.overrides, LabelOverrides::default());
    }

    #[test]
    fn test_empty_input() {
        let pipeline = AddressPipeline::new(PipelineConfig::default(), StubPredictor(vec![]), NoDirectory);
        assert!(matches!(pipeline.extract("   "), Err(AlamatError::EmptyInput)));
    }

    #[test]
    fn test_model_unavailable_is_surfaced() {
        let pipeline = AddressPipeline::new(PipelineConfig::default(), OfflineModel, NoDirectory);
        assert!(matches!(
            pipeline.process("Jl Melati"),
            Err(AlamatError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_too_many_tags() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            StubPredictor(vec!["B-JALAN", "I-JALAN", "O"]),
            NoDirectory,
        );
        assert!(matches!(
            pipeline.extract("Jl Melati"),
            Err(AlamatError::TagAlignment { tokens: 2, tags: 3 })
        ));
    }

    #[test]
    fn test_truncated_tags_drop_tail() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            StubPredictor(vec!["B-JALAN", "I-JALAN"]),
            NoDirectory,
        );
        let record = pipeline.extract("Jl Melati Bandung").unwrap();
        assert_eq!(record.street.as_deref(), Some("Jl Melati"));
        assert_eq!(record.city, None);
    }

    #[test]
    fn test_malformed_tag() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            StubPredictor(vec!["B-JALAN", "B-STREET"]),
            NoDirectory,
        );
        assert!(matches!(
            pipeline.extract("Jl Melati"),
            Err(AlamatError::MalformedTag { .. })
        ));
    }

    #[test]
    fn test_override_applies_to_model_output() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            StubPredictor(vec!["O", "I-KECAMATAN"]),
            NoDirectory,
        );
        let record = pipeline.extract("Kecamatan Menteng").unwrap();
        assert_eq!(record.sub_district.as_deref(), Some("Kecamatan Menteng"));
    }

    #[test]
    fn test_dotted_keywords_need_dot_kept_on_token() {
        let keep_dot = TokenizerConfig {
            punctuation: vec![',', '/'],
        };
        let pipeline = AddressPipeline::new(
            PipelineConfig::new().with_tokenizer(keep_dot),
            StubPredictor(vec!["O", "I-KECAMATAN"]),
            NoDirectory,
        );
        let record = pipeline.extract("Kec. Menteng").unwrap();
        assert_eq!(record.sub_district.as_deref(), Some("Menteng"));

        // Default punctuation splits "Kec." so neither table sees it.
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            StubPredictor(vec!["B-KECAMATAN", "I-KECAMATAN", "I-KECAMATAN"]),
            NoDirectory,
        );
        let record = pipeline.extract("Kec. Menteng").unwrap();
        assert_eq!(record.sub_district.as_deref(), Some("Kec . Menteng"));
    }

    #[test]
    fn test_rt_rw_are_cleaned() {
        let pipeline = AddressPipeline::new(PipelineConfig::default(), StubPredictor(vec![]), NoDirectory);
        let record = pipeline.aggregate_pairs([
            ("RT.05", Tag::Begin(EntityType::Rt)),
            ("rw", Tag::Begin(EntityType::Rw)),
            ("03", Tag::Inside(EntityType::Rw)),
        ]);
        assert_eq!(record.rt.as_deref(), Some("05"));
        assert_eq!(record.rw.as_deref(), Some("03"));
    }

    #[test]
    fn test_aggregate_labels() {
        let pipeline = AddressPipeline::new(PipelineConfig::default(), StubPredictor(vec![]), NoDirectory);
        let record = pipeline
            .aggregate_labels([
                ("Kota".to_string(), "O".to_string()),
                ("Bandung".to_string(), "I-KOTA".to_string()),
                ("401".to_string(), "B-KODEPOS".to_string()),
                ("15".to_string(), "I-KODEPOS".to_string()),
            ])
            .unwrap();
        assert_eq!(record.city.as_deref(), Some("Kota Bandung"));
        assert_eq!(record.postal_code.as_deref(), Some("40115"));
    }

    #[test]
    fn test_keyword_tagger_end_to_end() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            KeywordTagger::new().unwrap(),
            directory(),
        );

        let (record, outcome) = pipeline
            .process_with_outcome("Jl. Braga No. 10, RT 02/RW 07, Kota Bandung 40115")
            .unwrap();

        assert!(outcome.is_matched());
        assert_eq!(record.street.as_deref(), Some("Jl Braga No 10"));
        assert_eq!(record.rt.as_deref(), Some("02"));
        assert_eq!(record.rw.as_deref(), Some("07"));
        assert_eq!(record.postal_code.as_deref(), Some("40115"));
        assert_eq!(record.village.as_deref(), Some("Cihapit"));
        assert_eq!(record.sub_district.as_deref(), Some("Bandung Wetan"));
        assert_eq!(record.city.as_deref(), Some("Bandung"));
        assert_eq!(record.province.as_deref(), Some("Jawa Barat"));
    }

    #[test]
    fn test_reconcile_failure_keeps_extraction() {
        let pipeline = AddressPipeline::new(
            PipelineConfig::default(),
            KeywordTagger::new().unwrap(),
            directory(),
        );
        let (record, outcome) = pipeline.process_with_outcome("Kota Medan 20111").unwrap();
        assert_eq!(record.city.as_deref(), Some("Medan"));
        assert!(!outcome.is_matched());
    }
}
