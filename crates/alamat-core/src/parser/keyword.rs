use std::collections::VecDeque;

use regex::Regex;

use crate::error::Result;
use crate::parser::bio_tags::{EntityType, Tag};
use crate::parser::predictor::TagPredictor;
use crate::parser::tokenizer::Token;

/// Keyword tagger using pre-compiled regex rules for Indonesian addresses.
///
/// This is the zero-ML counterpart of a trained labeling model: it
/// recognises administrative keywords (`Jl`, `Kel`, `Kec`, `Kota`,
/// `Kab`, `Prov`, `RT`, `RW`) and five-digit postal codes, and tags the
/// words that follow them. Region names that appear without a keyword
/// stay `O`; reconciliation is expected to fill those in.
pub struct KeywordTagger {
    re_postal_code: Regex,
    re_number: Regex,
    re_street: Regex,
    re_village: Regex,
    re_sub_district: Regex,
    re_city: Regex,
    re_province: Regex,
    re_rt: Regex,
    re_rw: Regex,
}

/// What a single token means to the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    PostalCode,
    Number,
    Street,
    Region(EntityType),
    Block(EntityType),
    Dot,
    Separator,
    Word,
}

impl KeywordTagger {
    /// Constructs a new `KeywordTagger` with pre-compiled regex patterns.
    ///
    /// # Errors
    ///
    /// Returns `AlamatError::RegexError` if any pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_postal_code: Regex::new(r"^\d{5}$")?,
            re_number: Regex::new(r"^\d{1,4}[A-Za-z]?$")?,
            re_street: Regex::new(r"(?i)^(jl|jln|jalan|gg|gang)$")?,
            re_village: Regex::new(r"(?i)^(kel|kelurahan|desa|ds)$")?,
            re_sub_district: Regex::new(r"(?i)^(kec|kecamatan)$")?,
            re_city: Regex::new(r"(?i)^(kota|kab|kabupaten)$")?,
            re_province: Regex::new(r"(?i)^(prov|provinsi|propinsi)$")?,
            re_rt: Regex::new(r"(?i)^rt$")?,
            re_rw: Regex::new(r"(?i)^rw$")?,
        })
    }

    fn classify(&self, text: &str) -> Class {
        match text {
            "." => return Class::Dot,
            "," | "/" => return Class::Separator,
            _ => {}
        }

        if self.re_postal_code.is_match(text) {
            Class::PostalCode
        } else if self.re_number.is_match(text) {
            Class::Number
        } else if self.re_street.is_match(text) {
            Class::Street
        } else if self.re_village.is_match(text) {
            Class::Region(EntityType::Kelurahan)
        } else if self.re_sub_district.is_match(text) {
            Class::Region(EntityType::Kecamatan)
        } else if self.re_city.is_match(text) {
            Class::Region(EntityType::Kota)
        } else if self.re_province.is_match(text) {
            Class::Region(EntityType::Provinsi)
        } else if self.re_rt.is_match(text) {
            Class::Block(EntityType::Rt)
        } else if self.re_rw.is_match(text) {
            Class::Block(EntityType::Rw)
        } else {
            Class::Word
        }
    }

    /// Tags a token sequence.
    pub fn tag(&self, tokens: &[Token]) -> Vec<Tag> {
        let mut tags = Vec::with_capacity(tokens.len());
        // Open span and the type the next word should begin.
        let mut span: Option<EntityType> = None;
        let mut pending: Option<EntityType> = None;
        // RT/RW keywords waiting for their numbers, e.g. "RT/RW 05/03".
        let mut blocks: VecDeque<EntityType> = VecDeque::new();

        for token in tokens {
            let tag = match self.classify(&token.text) {
                Class::PostalCode => {
                    span = None;
                    pending = None;
                    Tag::Begin(EntityType::KodePos)
                }
                Class::Street => {
                    span = Some(EntityType::Jalan);
                    pending = None;
                    blocks.clear();
                    Tag::Begin(EntityType::Jalan)
                }
                Class::Region(ty) => {
                    span = None;
                    pending = Some(ty);
                    blocks.clear();
                    Tag::Outside
                }
                Class::Block(ty) => {
                    span = None;
                    pending = None;
                    blocks.push_back(ty);
                    Tag::Begin(ty)
                }
                Class::Dot => {
                    pending = pending.or(span);
                    span = None;
                    Tag::Outside
                }
                Class::Separator => {
                    span = None;
                    pending = None;
                    Tag::Outside
                }
                Class::Number => {
                    if let Some(ty) = blocks.pop_front() {
                        Tag::Begin(ty)
                    } else if let Some(ty) = pending.take() {
                        span = Some(ty);
                        Tag::Begin(ty)
                    } else if span == Some(EntityType::Jalan) {
                        Tag::Inside(EntityType::Jalan)
                    } else {
                        Tag::Outside
                    }
                }
                Class::Word => {
                    blocks.clear();
                    if let Some(ty) = pending.take() {
                        span = Some(ty);
                        Tag::Begin(ty)
                    } else if let Some(ty) = span {
                        Tag::Inside(ty)
                    } else {
                        Tag::Outside
                    }
                }
            };
            tags.push(tag);
        }

        tags
    }
}

impl TagPredictor for KeywordTagger {
    fn predict(&self, tokens: &[Token]) -> Result<Vec<String>> {
        Ok(self.tag(tokens).iter().map(ToString::to_string).collect())
    }
}
