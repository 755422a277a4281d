pub mod candidate;
pub mod record;

pub use candidate::CandidateRecord;
pub use record::EntityRecord;
