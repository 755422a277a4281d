//! Lookup against the public Pos Indonesia postal code search.
//!
//! The service answers a form POST with an HTML page; the candidates live
//! in `table#list-data`, one row per village, with the columns
//! `No | Kode Pos | Kelurahan | Kecamatan | Kota/Kabupaten | Provinsi`.

use std::time::Duration;

use alamat_core::{CandidateRecord, DirectoryError, DirectoryLookup};
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Public search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://kodepos.posindonesia.co.id/CariKodepos";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Cells per data row: row number followed by the five directory fields.
const ROW_CELLS: usize = 6;

/// Connection settings for [`PosIndonesiaDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpDirectoryConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpDirectoryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("alamat/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpDirectoryConfig {
    /// Create a config pointing at [`DEFAULT_ENDPOINT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Zero is bumped to one second.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// Set the `User-Agent` header sent with every lookup.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Directory backed by the Pos Indonesia web search.
#[derive(Debug, Clone)]
pub struct PosIndonesiaDirectory {
    client: Client,
    config: HttpDirectoryConfig,
}

impl PosIndonesiaDirectory {
    /// Builds the blocking HTTP client. No request is made until the first lookup.
    pub fn new(config: HttpDirectoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    /// Get the connection settings.
    pub fn config(&self) -> &HttpDirectoryConfig {
        &self.config
    }
}

impl DirectoryLookup for PosIndonesiaDirectory {
    fn lookup(&self, key: &str) -> std::result::Result<Vec<CandidateRecord>, DirectoryError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(Vec::new());
        }

        debug!(key, endpoint = %self.config.endpoint, "querying postal directory");
        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&[("kodepos", key)])
            .send()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(key, %status, "postal directory returned an error status");
            return Err(DirectoryError::Unavailable(format!("status {status}")));
        }

        let body = response
            .text()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;
        let candidates = parse_candidates(&body);
        debug!(key, candidates = candidates.len(), "postal directory answered");
        Ok(candidates)
    }
}

/// Extracts candidate rows from a search result page.
///
/// Returns an empty list when the page has no result table. The first row
/// of the table is the header; rows with fewer than six cells are skipped.
pub fn parse_candidates(html: &str) -> Vec<CandidateRecord> {
    let document = Html::parse_document(html);
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table#list-data"),
        Selector::parse("tr"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let Some(table) = document.select(&table_sel).next() else {
        debug!("result table not found");
        return Vec::new();
    };

    table
        .select(&row_sel)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < ROW_CELLS {
                return None;
            }
            Some(CandidateRecord::new(
                cells[1].as_str(),
                cells[2].as_str(),
                cells[3].as_str(),
                cells[4].as_str(),
                cells[5].as_str(),
            ))
        })
        .collect()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
