use serde::{Deserialize, Serialize};

/// One row of the administrative region directory.
///
/// A postal code can map to several village / sub-district combinations,
/// so a single lookup usually yields a list of these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// The directory's postal code for this region.
    #[serde(default)]
    pub postal_code: String,
    pub village: String,
    pub sub_district: String,
    pub city: String,
    pub province: String,
}

impl CandidateRecord {
    #[must_use]
    pub fn new(
        postal_code: impl Into<String>,
        village: impl Into<String>,
        sub_district: impl Into<String>,
        city: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            postal_code: postal_code.into(),
            village: village.into(),
            sub_district: sub_district.into(),
            city: city.into(),
            province: province.into(),
        }
    }

    /// Returns `true` if `key` equals the postal code or any region name,
    /// ignoring case and surrounding whitespace.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.trim();
        !key.is_empty()
            && [
                &self.postal_code,
                &self.village,
                &self.sub_district,
                &self.city,
                &self.province,
            ]
            .iter()
            .any(|field| field.trim().eq_ignore_ascii_case(key))
    }
}

impl std::fmt::Display for CandidateRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {}, {}, {}",
            self.postal_code, self.village, self.sub_district, self.city, self.province
        )
    }
}
