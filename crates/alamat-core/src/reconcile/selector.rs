use serde::{Deserialize, Serialize};

use crate::types::{CandidateRecord, EntityRecord};

/// Default minimum similarity for accepting a fuzzy match.
pub const DEFAULT_THRESHOLD: u8 = 70;

/// String similarity on a `0..=100` scale.
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// Normalized Levenshtein ratio, case-insensitive, rounded to a percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl Similarity for LevenshteinRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let ratio = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Which exact field equality decided a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExactField {
    City,
    SubDistrict,
    Village,
    /// The record's sub-district equals the candidate's village.
    SubDistrictAsVillage,
    /// The record's village equals the candidate's sub-district.
    VillageAsSubDistrict,
}

/// How the winning candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact(ExactField),
    Fuzzy,
}

/// Best candidate for a record together with its composite similarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: CandidateRecord,
    /// Composite similarity in `0..=100`.
    pub score: u8,
    pub kind: MatchKind,
}

/// `"{village} {sub_district} {city} {province}"` for a record.
///
/// Absent fields contribute nothing but keep their separator, so field
/// positions stay aligned with [`candidate_composite`].
pub fn record_composite(record: &EntityRecord) -> String {
    [
        record.village.as_deref(),
        record.sub_district.as_deref(),
        record.city.as_deref(),
        record.province.as_deref(),
    ]
    .map(Option::unwrap_or_default)
    .join(" ")
}

/// Composite comparison string for a directory row.
pub fn candidate_composite(candidate: &CandidateRecord) -> String {
    [
        candidate.village.as_str(),
        candidate.sub_district.as_str(),
        candidate.city.as_str(),
        candidate.province.as_str(),
    ]
    .join(" ")
}

fn same(field: Option<&str>, other: &str) -> bool {
    match field.map(str::trim) {
        Some(value) if !value.is_empty() => value.eq_ignore_ascii_case(other.trim()),
        _ => false,
    }
}

fn exact_field(record: &EntityRecord, candidate: &CandidateRecord) -> Option<ExactField> {
    let village = record.village.as_deref();
    let sub_district = record.sub_district.as_deref();

    if same(record.city.as_deref(), &candidate.city) {
        Some(ExactField::City)
    } else if same(sub_district, &candidate.sub_district) {
        Some(ExactField::SubDistrict)
    } else if same(village, &candidate.village) {
        Some(ExactField::Village)
    } else if same(sub_district, &candidate.village) {
        Some(ExactField::SubDistrictAsVillage)
    } else if same(village, &candidate.sub_district) {
        Some(ExactField::VillageAsSubDistrict)
    } else {
        None
    }
}

/// Scoring and threshold policy shared by every reconciliation path.
#[derive(Debug, Clone)]
pub struct RecordSelector<S = LevenshteinRatio> {
    threshold: u8,
    exact_precheck: bool,
    similarity: S,
}

impl Default for RecordSelector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, true)
    }
}

impl RecordSelector {
    pub fn new(threshold: u8, exact_precheck: bool) -> Self {
        Self::with_similarity(threshold, exact_precheck, LevenshteinRatio)
    }
}

impl<S: Similarity> RecordSelector<S> {
    /// Selector with a custom similarity measure.
    pub fn with_similarity(threshold: u8, exact_precheck: bool, similarity: S) -> Self {
        Self {
            threshold: threshold.min(100),
            exact_precheck,
            similarity,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn exact_precheck(&self) -> bool {
        self.exact_precheck
    }

    /// Best candidate regardless of threshold.
    ///
    /// With the exact pre-check enabled, the first candidate (directory
    /// order) sharing a city, sub-district or village with the record wins
    /// outright. Otherwise the highest composite score wins and ties go to
    /// the earliest candidate.
    pub fn evaluate(
        &self,
        record: &EntityRecord,
        candidates: &[CandidateRecord],
    ) -> Option<MatchResult> {
        let composite = record_composite(record);

        if self.exact_precheck {
            let exact = candidates
                .iter()
                .find_map(|c| exact_field(record, c).map(|field| (c, field)));
            if let Some((candidate, field)) = exact {
                return Some(MatchResult {
                    candidate: candidate.clone(),
                    score: self
                        .similarity
                        .score(&composite, &candidate_composite(candidate)),
                    kind: MatchKind::Exact(field),
                });
            }
        }

        let mut best: Option<(&CandidateRecord, u8)> = None;
        for candidate in candidates {
            let score = self
                .similarity
                .score(&composite, &candidate_composite(candidate));
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        best.map(|(candidate, score)| MatchResult {
            candidate: candidate.clone(),
            score,
            kind: MatchKind::Fuzzy,
        })
    }

    /// Exact matches are always accepted; fuzzy ones need `score >= threshold`.
    pub fn accepts(&self, result: &MatchResult) -> bool {
        match result.kind {
            MatchKind::Exact(_) => true,
            MatchKind::Fuzzy => result.score >= self.threshold,
        }
    }

    /// Accepted best candidate, if any.
    pub fn select(
        &self,
        record: &EntityRecord,
        candidates: &[CandidateRecord],
    ) -> Option<MatchResult> {
        self.evaluate(record, candidates)
            .filter(|result| self.accepts(result))
    }
}
