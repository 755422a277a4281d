//! # Label Override Table
//!
//! Structural keywords such as `Kecamatan` or `RT` are unambiguous by
//! surface form alone, yet the labeling model often mis-tags them. The
//! override table forces their tag before aggregation.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parser::bio_tags::{EntityType, Tag};

/// Case-sensitive mapping from token text to a forced tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelOverrides {
    table: BTreeMap<String, Tag>,
}

/// The dotted `Kec.` / `Kel.` keys only fire for tokenizers that keep
/// `.` attached to the word; the default tokenizer splits it off.
impl Default for LabelOverrides {
    fn default() -> Self {
        let mut overrides = Self::empty();
        for (token, ty) in [
            ("Kec.", EntityType::Kecamatan),
            ("Kecamatan", EntityType::Kecamatan),
            ("Kota", EntityType::Kota),
            ("Kabupaten", EntityType::Kota),
            ("RT", EntityType::Rt),
            ("RW", EntityType::Rw),
            ("Kel.", EntityType::Kelurahan),
            ("Kelurahan", EntityType::Kelurahan),
        ] {
            overrides.insert(token, Tag::Begin(ty));
        }
        overrides
    }
}

impl LabelOverrides {
    /// An override table with no entries.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Add or replace an override.
    pub fn insert(&mut self, token: impl Into<String>, tag: Tag) -> Option<Tag> {
        self.table.insert(token.into(), tag)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, token: impl Into<String>, tag: Tag) -> Self {
        self.insert(token, tag);
        self
    }

    /// Forced tag for `token`, if any.
    pub fn get(&self, token: &str) -> Option<Tag> {
        self.table.get(token).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the forced tag when `token` is a key, else `predicted`.
    pub fn apply(&self, token: &str, predicted: Tag) -> Tag {
        self.get(token).unwrap_or(predicted)
    }

    /// Prediction-stage pass over `(token, tag)` pairs.
    ///
    /// Applies [`apply`](Self::apply) to every pair. An overridden keyword
    /// is assigned its forced tag once: later occurrences of the same
    /// keyword are dropped. Tokens that are not override keys always pass
    /// through, repeated or not.
    pub fn postprocess<I>(&self, pairs: I) -> Vec<(String, Tag)>
    where
        I: IntoIterator<Item = (String, Tag)>,
    {
        let mut seen_keywords: HashSet<String> = HashSet::new();
        let mut fixed = Vec::new();

        for (token, predicted) in pairs {
            match self.get(&token) {
                Some(forced) => {
                    if !seen_keywords.insert(token.clone()) {
                        debug!(token = %token, "dropping repeated override keyword");
                        continue;
                    }
                    fixed.push((token, forced));
                }
                None => fixed.push((token, predicted)),
            }
        }

        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, Tag)]) -> Vec<(String, Tag)> {
        raw.iter().map(|(t, tag)| (t.to_string(), *tag)).collect()
    }

    #[test]
    fn default_table_entries() {
        let overrides = LabelOverrides::default();
        assert_eq!(overrides.len(), 8);
        assert_eq!(
            overrides.get("Kecamatan"),
            Some(Tag::Begin(EntityType::Kecamatan))
        );
        assert_eq!(overrides.get("Kabupaten"), Some(Tag::Begin(EntityType::Kota)));
        assert_eq!(overrides.get("RT"), Some(Tag::Begin(EntityType::Rt)));
        assert_eq!(overrides.get("Kel."), Some(Tag::Begin(EntityType::Kelurahan)));
    }

    #[test]
    fn override_wins_over_prediction() {
        let overrides = LabelOverrides::default();
        for predicted in [
            Tag::Outside,
            Tag::Inside(EntityType::Jalan),
            Tag::Begin(EntityType::Provinsi),
        ] {
            assert_eq!(
                overrides.apply("Kecamatan", predicted),
                Tag::Begin(EntityType::Kecamatan)
            );
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let overrides = LabelOverrides::default();
        assert_eq!(overrides.apply("kecamatan", Tag::Outside), Tag::Outside);
        assert_eq!(overrides.apply("rt", Tag::Outside), Tag::Outside);
    }

    #[test]
    fn non_keys_pass_through() {
        let overrides = LabelOverrides::default();
        let tag = Tag::Inside(EntityType::Jalan);
        assert_eq!(overrides.apply("Melati", tag), tag);
    }

    #[test]
    fn postprocess_drops_only_repeated_keywords() {
        let overrides = LabelOverrides::default();
        let fixed = overrides.postprocess(pairs(&[
            ("Kecamatan", Tag::Outside),
            ("Menteng", Tag::Inside(EntityType::Kecamatan)),
            ("Jl", Tag::Begin(EntityType::Jalan)),
            ("Menteng", Tag::Inside(EntityType::Jalan)),
            ("Kecamatan", Tag::Outside),
        ]));

        assert_eq!(
            fixed,
            pairs(&[
                ("Kecamatan", Tag::Begin(EntityType::Kecamatan)),
                ("Menteng", Tag::Inside(EntityType::Kecamatan)),
                ("Jl", Tag::Begin(EntityType::Jalan)),
                ("Menteng", Tag::Inside(EntityType::Jalan)),
            ])
        );
    }

    #[test]
    fn custom_table_serde() {
        let overrides = LabelOverrides::empty().with("Desa", Tag::Begin(EntityType::Kelurahan));
        let json = serde_json::to_string(&overrides).unwrap();
        assert_eq!(json, r#"{"Desa":"B-KELURAHAN"}"#);
        let back: LabelOverrides = serde_json::from_str(&json).unwrap();
        assert_eq!(back, overrides);
    }
}
