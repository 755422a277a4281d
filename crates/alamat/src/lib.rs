//! # Alamat
//!
//! Indonesian address extraction: BIO tag aggregation, RT/RW cleanup and
//! reconciliation against the postal region directory.
//!
//! This crate re-exports [`alamat_core`] and [`alamat_directory`] so most
//! users only need one dependency.
//!
//! ```rust
//! use alamat::{AddressPipeline, KeywordTagger, NoDirectory, PipelineConfig};
//!
//! let pipeline = AddressPipeline::new(
//!     PipelineConfig::default(),
//!     KeywordTagger::new().unwrap(),
//!     NoDirectory,
//! );
//! let record = pipeline.process("Gg. Mawar RT 03 RW 07").unwrap();
//! assert_eq!(record.rt.as_deref(), Some("03"));
//! assert_eq!(record.rw.as_deref(), Some("07"));
//! ```

pub use alamat_core::*;

pub mod directory {
    pub use alamat_directory::*;
}
