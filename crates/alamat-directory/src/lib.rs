//! # Alamat Directory
//!
//! Region directory backends implementing
//! [`DirectoryLookup`](alamat_core::DirectoryLookup):
//!
//! - [`PosIndonesiaDirectory`]: live lookup against the Pos Indonesia
//!   postal code search.
//! - [`SqliteDirectory`]: an offline copy of the directory in a local
//!   SQLite file.

pub mod error;
pub mod http;
pub mod sqlite;

pub use error::{Error, Result};
pub use http::{HttpDirectoryConfig, PosIndonesiaDirectory, parse_candidates};
pub use sqlite::{SqliteDirectory, default_db_path};
