pub mod aggregator;
pub mod bio_tags;
pub mod keyword;
pub mod overrides;
pub mod pipeline;
pub mod predictor;
pub mod rtrw;
pub mod tokenizer;

pub use aggregator::{Aggregator, AggregatorConfig};
pub use bio_tags::{EntityType, Tag};
pub use keyword::KeywordTagger;
pub use overrides::LabelOverrides;
pub use pipeline::{AddressPipeline, PipelineConfig};
pub use predictor::TagPredictor;
pub use rtrw::{clean_numeric_field, clean_rt_rw};
pub use tokenizer::{Token, Tokenizer, TokenizerConfig};
