//! Local region directory in a SQLite file.

use std::io::Read;
use std::path::{Path, PathBuf};

use alamat_core::{CandidateRecord, DirectoryError, DirectoryLookup};
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS regions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    postal_code  TEXT NOT NULL,
    village      TEXT NOT NULL,
    sub_district TEXT NOT NULL,
    city         TEXT NOT NULL,
    province     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS regions_postal_code ON regions (postal_code);
";

const LOOKUP: &str = "
SELECT postal_code, village, sub_district, city, province
FROM regions
WHERE postal_code = ?1 COLLATE NOCASE
   OR village = ?1 COLLATE NOCASE
   OR sub_district = ?1 COLLATE NOCASE
   OR city = ?1 COLLATE NOCASE
   OR province = ?1 COLLATE NOCASE
ORDER BY id
";

/// Default store location: `<data dir>/alamat/regions.sqlite`.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alamat")
        .join("regions.sqlite")
}

/// Region directory persisted in SQLite.
///
/// Rows come back in insertion order, which keeps candidate order stable
/// for the reconciler's first-match rules.
#[derive(Debug)]
pub struct SqliteDirectory {
    conn: Connection,
}

impl SqliteDirectory {
    /// Opens (or creates) the store at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening region store");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts records in one transaction; returns how many were written.
    pub fn insert_all<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = CandidateRecord>,
    {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO regions (postal_code, village, sub_district, city, province)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.postal_code.trim(),
                    record.village.trim(),
                    record.sub_district.trim(),
                    record.city.trim(),
                    record.province.trim(),
                ])?;
                written += 1;
            }
        }
        tx.commit()?;
        info!(written, "imported region records");
        Ok(written)
    }

    /// Imports a JSON array of candidate records.
    pub fn import_json<R: Read>(&mut self, reader: R) -> Result<usize> {
        let records: Vec<CandidateRecord> = serde_json::from_reader(reader)?;
        self.insert_all(records)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM regions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn query(&self, key: &str) -> Result<Vec<CandidateRecord>> {
        let mut stmt = self.conn.prepare_cached(LOOKUP)?;
        let rows = stmt.query_map([key], |row| {
            Ok(CandidateRecord {
                postal_code: row.get(0)?,
                village: row.get(1)?,
                sub_district: row.get(2)?,
                city: row.get(3)?,
                province: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl DirectoryLookup for SqliteDirectory {
    fn lookup(&self, key: &str) -> std::result::Result<Vec<CandidateRecord>, DirectoryError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.query(key)?;
        debug!(key, candidates = found.len(), "sqlite directory lookup");
        Ok(found)
    }
}
