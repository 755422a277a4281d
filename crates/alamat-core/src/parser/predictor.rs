//! Seam to the sequence-labeling model.

use std::sync::Arc;

use crate::error::Result;
use crate::parser::tokenizer::Token;

/// Produces one label string (`O` or `(B|I)-TYPE`) per token.
///
/// Implementations wrap the labeling model, which is loaded once and
/// shared read-only. Returning fewer labels than tokens signals that the
/// model truncated its input; returning more is an alignment error.
/// Model failures should surface as
/// [`AlamatError::ModelUnavailable`](crate::AlamatError::ModelUnavailable).
pub trait TagPredictor {
    fn predict(&self, tokens: &[Token]) -> Result<Vec<String>>;
}

impl<T: TagPredictor + ?Sized> TagPredictor for &T {
    fn predict(&self, tokens: &[Token]) -> Result<Vec<String>> {
        (**self).predict(tokens)
    }
}

impl<T: TagPredictor + ?Sized> TagPredictor for Box<T> {
    fn predict(&self, tokens: &[Token]) -> Result<Vec<String>> {
        (**self).predict(tokens)
    }
}

impl<T: TagPredictor + ?Sized> TagPredictor for Arc<T> {
    fn predict(&self, tokens: &[Token]) -> Result<Vec<String>> {
        (**self).predict(tokens)
    }
}
