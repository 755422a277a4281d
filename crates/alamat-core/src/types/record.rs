use serde::{Deserialize, Serialize};

use crate::parser::bio_tags::EntityType;
use crate::types::candidate::CandidateRecord;

/// The primary output of the Alamat pipeline.
///
/// Every field is either a trimmed, non-empty string or `None`. Field
/// names serialize to the labels downstream consumers already use
/// (`"Kota/Kabupaten"`, `"Kode Pos"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Street line, e.g. `"Jl Melati No 5"`.
    #[serde(rename = "Jalan")]
    pub street: Option<String>,

    /// Village (kelurahan / desa).
    #[serde(rename = "Kelurahan")]
    pub village: Option<String>,

    /// Sub-district (kecamatan).
    #[serde(rename = "Kecamatan")]
    pub sub_district: Option<String>,

    /// City or regency (kota / kabupaten).
    #[serde(rename = "Kota/Kabupaten")]
    pub city: Option<String>,

    /// Province.
    #[serde(rename = "Provinsi")]
    pub province: Option<String>,

    /// Five-digit postal code.
    #[serde(rename = "Kode Pos")]
    pub postal_code: Option<String>,

    /// Neighbourhood block number.
    #[serde(rename = "RT")]
    pub rt: Option<String>,

    /// Community unit number.
    #[serde(rename = "RW")]
    pub rw: Option<String>,
}

impl EntityRecord {
    /// Creates a record with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value for an entity type.
    #[must_use]
    pub fn get(&self, ty: EntityType) -> Option<&str> {
        self.slot(ty).as_deref()
    }

    /// Sets a field, normalizing blank values to `None`.
    pub fn set(&mut self, ty: EntityType, value: Option<String>) {
        *self.slot_mut(ty) = value.and_then(normalize);
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, ty: EntityType, value: impl Into<String>) -> Self {
        self.set(ty, Some(value.into()));
        self
    }

    /// Returns `true` if no field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        EntityType::all().iter().all(|ty| self.get(*ty).is_none())
    }

    /// Overwrites the four region fields with a directory candidate.
    ///
    /// Street, postal code, RT and RW are left untouched.
    pub fn apply_candidate(&mut self, candidate: &CandidateRecord) {
        self.village = normalize(candidate.village.clone());
        self.sub_district = normalize(candidate.sub_district.clone());
        self.city = normalize(candidate.city.clone());
        self.province = normalize(candidate.province.clone());
    }

    fn slot(&self, ty: EntityType) -> &Option<String> {
        match ty {
            EntityType::Jalan => &self.street,
            EntityType::Kelurahan => &self.village,
            EntityType::Kecamatan => &self.sub_district,
            EntityType::Kota => &self.city,
            EntityType::Provinsi => &self.province,
            EntityType::KodePos => &self.postal_code,
            EntityType::Rt => &self.rt,
            EntityType::Rw => &self.rw,
        }
    }

    fn slot_mut(&mut self, ty: EntityType) -> &mut Option<String> {
        match ty {
            EntityType::Jalan => &mut self.street,
            EntityType::Kelurahan => &mut self.village,
            EntityType::Kecamatan => &mut self.sub_district,
            EntityType::Kota => &mut self.city,
            EntityType::Provinsi => &mut self.province,
            EntityType::KodePos => &mut self.postal_code,
            EntityType::Rt => &mut self.rt,
            EntityType::Rw => &mut self.rw,
        }
    }
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

impl std::fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityRecord(")?;
        let mut first = true;
        for ty in EntityType::all() {
            if let Some(value) = self.get(*ty) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}={value:?}", ty.label().to_lowercase())?;
                first = false;
            }
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty() {
        let record = EntityRecord::new();
        assert!(record.is_empty());
    }

    #[test]
    fn set_trims_and_drops_blank() {
        let mut record = EntityRecord::new();
        record.set(EntityType::Kota, Some("  Bandung ".into()));
        assert_eq!(record.city.as_deref(), Some("Bandung"));

        record.set(EntityType::Kota, Some("   ".into()));
        assert_eq!(record.city, None);
    }

    #[test]
    fn get_maps_every_type() {
        let mut record = EntityRecord::new();
        for ty in EntityType::all() {
            record.set(*ty, Some(ty.label().to_string()));
        }
        for ty in EntityType::all() {
            assert_eq!(record.get(*ty), Some(ty.label()));
        }
        assert_eq!(record.postal_code.as_deref(), Some("KODEPOS"));
    }

    #[test]
    fn apply_candidate_keeps_non_region_fields() {
        let mut record = EntityRecord::new()
            .with(EntityType::Jalan, "Jl Melati")
            .with(EntityType::KodePos, "10310")
            .with(EntityType::Rt, "05")
            .with(EntityType::Kota, "Jakarta");

        record.apply_candidate(&CandidateRecord::new(
            "10350",
            "Menteng",
            "Menteng",
            "Jakarta Pusat",
            "DKI Jakarta",
        ));

        assert_eq!(record.street.as_deref(), Some("Jl Melati"));
        assert_eq!(record.postal_code.as_deref(), Some("10310"));
        assert_eq!(record.rt.as_deref(), Some("05"));
        assert_eq!(record.city.as_deref(), Some("Jakarta Pusat"));
        assert_eq!(record.province.as_deref(), Some("DKI Jakarta"));
        assert_eq!(record.village.as_deref(), Some("Menteng"));
    }

    #[test]
    fn serializes_with_legacy_keys() {
        let record = EntityRecord::new()
            .with(EntityType::Kota, "Bandung")
            .with(EntityType::KodePos, "40115");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["Kota/Kabupaten"], "Bandung");
        assert_eq!(json["Kode Pos"], "40115");
        assert!(json["Kelurahan"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 8);

        let back: EntityRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn display_lists_present_fields() {
        let record = EntityRecord::new()
            .with(EntityType::Jalan, "Jl Melati")
            .with(EntityType::Kecamatan, "Menteng");
        assert_eq!(
            record.to_string(),
            r#"EntityRecord(jalan="Jl Melati", kecamatan="Menteng")"#
        );
    }
}
