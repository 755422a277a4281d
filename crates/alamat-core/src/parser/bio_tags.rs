//! # BIO Tags for Address Entity Recognition
//!
//! Defines the tag set produced by the sequence-labeling model for
//! Indonesian address components. Uses the BIO (Begin-Inside-Outside)
//! tagging scheme; the textual form is exactly `O` or `(B|I)-TYPE`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlamatError;

/// Address components the labeling model can recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Street (`JALAN`).
    Jalan,
    /// Village (`KELURAHAN`).
    Kelurahan,
    /// Sub-district (`KECAMATAN`).
    Kecamatan,
    /// City or regency (`KOTA`).
    Kota,
    /// Province (`PROVINSI`).
    Provinsi,
    /// Postal code (`KODEPOS`).
    KodePos,
    /// Neighbourhood block (`RT`).
    Rt,
    /// Community unit (`RW`).
    Rw,
}

impl EntityType {
    /// All entity types in label order.
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Jalan,
            EntityType::Kelurahan,
            EntityType::Kecamatan,
            EntityType::Kota,
            EntityType::Provinsi,
            EntityType::KodePos,
            EntityType::Rt,
            EntityType::Rw,
        ]
    }

    /// The label suffix used after `B-` / `I-`.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Jalan => "JALAN",
            EntityType::Kelurahan => "KELURAHAN",
            EntityType::Kecamatan => "KECAMATAN",
            EntityType::Kota => "KOTA",
            EntityType::Provinsi => "PROVINSI",
            EntityType::KodePos => "KODEPOS",
            EntityType::Rt => "RT",
            EntityType::Rw => "RW",
        }
    }

    /// Parse a label suffix such as `KECAMATAN`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|ty| ty.label() == label)
    }

    /// Whether a `B-` tag extends the field instead of replacing it.
    ///
    /// Noisy model output often restarts a street or postal code span
    /// with a second `B-`; region names are single spans.
    pub fn begin_appends(&self) -> bool {
        matches!(
            self,
            EntityType::Jalan | EntityType::KodePos | EntityType::Rt | EntityType::Rw
        )
    }

    /// Separator placed before a continuation token.
    pub fn continuation_separator(&self) -> &'static str {
        match self {
            EntityType::KodePos => "",
            _ => " ",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// BIO tag attached to a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    /// `B-TYPE`: first token of an entity span.
    Begin(EntityType),
    /// `I-TYPE`: continuation of the current span.
    Inside(EntityType),
    /// `O`: not part of any entity.
    #[default]
    Outside,
}

impl Tag {
    /// Get the entity type for this tag.
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Tag::Begin(ty) | Tag::Inside(ty) => Some(*ty),
            Tag::Outside => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Begin(ty) => write!(f, "B-{ty}"),
            Tag::Inside(ty) => write!(f, "I-{ty}"),
            Tag::Outside => write!(f, "O"),
        }
    }
}

impl FromStr for Tag {
    type Err = AlamatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AlamatError::MalformedTag { tag: s.to_string() };

        if s == "O" {
            return Ok(Tag::Outside);
        }

        let (prefix, label) = s.split_once('-').ok_or_else(malformed)?;
        let ty = EntityType::from_label(label).ok_or_else(malformed)?;
        match prefix {
            "B" => Ok(Tag::Begin(ty)),
            "I" => Ok(Tag::Inside(ty)),
            _ => Err(malformed()),
        }
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
