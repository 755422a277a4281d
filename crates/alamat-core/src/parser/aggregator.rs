//! # BIO Aggregator
//!
//! Folds a `(token, tag)` sequence into an [`EntityRecord`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::parser::bio_tags::{EntityType, Tag};
use crate::parser::overrides::LabelOverrides;
use crate::types::EntityRecord;

/// Aggregator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Tokens that drive the state machine but never contribute text.
    pub skip_keywords: Vec<String>,
    /// Entity types whose spans are tracked but discarded.
    pub skipped_types: Vec<EntityType>,
}

/// Defaults to `Kec.`, `Kel.`, `RT` and `RW`.
///
/// The dotted forms only match when the tokenizer keeps `.` attached to
/// the word, i.e. when `.` is not in its punctuation set.
impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            skip_keywords: ["Kec.", "Kel.", "RT", "RW"]
                .into_iter()
                .map(String::from)
                .collect(),
            skipped_types: Vec::new(),
        }
    }
}

impl AggregatorConfig {
    /// Create a config with the default skip keywords.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the skip keyword list.
    pub fn with_skip_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Discard spans of the given entity type.
    pub fn with_skipped_type(mut self, ty: EntityType) -> Self {
        if !self.skipped_types.contains(&ty) {
            self.skipped_types.push(ty);
        }
        self
    }
}

/// Token-by-token state machine producing an [`EntityRecord`].
///
/// * `B-T` opens a span of type `T`. Region fields are overwritten;
///   street, postal code, RT and RW are extended.
/// * `I-T` extends field `T` while a span is open.
/// * `O`, or `I-T` with no open span, closes the span.
///
/// Repeated tokens are never dropped here.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
    overrides: LabelOverrides,
}

impl Aggregator {
    /// Create an aggregator applying `overrides` before each transition.
    pub fn new(config: AggregatorConfig, overrides: LabelOverrides) -> Self {
        Self { config, overrides }
    }

    /// Get the aggregator configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Get the override table.
    pub fn overrides(&self) -> &LabelOverrides {
        &self.overrides
    }

    fn is_skip_keyword(&self, token: &str) -> bool {
        self.config.skip_keywords.iter().any(|k| k == token)
    }

    fn is_skipped_type(&self, ty: EntityType) -> bool {
        self.config.skipped_types.contains(&ty)
    }

    /// Aggregate a tag sequence into a record.
    ///
    /// The override table is applied to every pair before the state
    /// transition, so callers may pass raw model output.
    pub fn aggregate<I, S>(&self, pairs: I) -> EntityRecord
    where
        I: IntoIterator<Item = (S, Tag)>,
        S: AsRef<str>,
    {
        let mut fields: [String; 8] = Default::default();
        let mut current: Option<EntityType> = None;

        for (token, predicted) in pairs {
            let token = token.as_ref();
            let tag = self.overrides.apply(token, predicted);
            let contributes = !self.is_skip_keyword(token);

            match tag {
                Tag::Begin(ty) => {
                    current = Some(ty);
                    if contributes && !self.is_skipped_type(ty) {
                        let field = &mut fields[ty as usize];
                        if ty.begin_appends() && !field.is_empty() {
                            field.push(' ');
                            field.push_str(token);
                        } else {
                            field.clear();
                            field.push_str(token);
                        }
                    }
                }
                Tag::Inside(ty) if current.is_some() => {
                    if contributes && !self.is_skipped_type(ty) {
                        let field = &mut fields[ty as usize];
                        field.push_str(ty.continuation_separator());
                        field.push_str(token);
                    }
                }
                _ => current = None,
            }

            trace!(token, %tag, ?current, "aggregated token");
        }

        let mut record = EntityRecord::new();
        for ty in EntityType::all() {
            record.set(*ty, Some(std::mem::take(&mut fields[*ty as usize])));
        }
        record
    }
}
