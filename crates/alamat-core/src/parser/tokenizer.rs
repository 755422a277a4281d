//! # Address Tokenizer
//!
//! Splits raw address text into the token sequence fed to the labeling
//! model. Punctuation characters become standalone tokens; everything
//! else is split on whitespace runs.

use serde::{Deserialize, Serialize};

/// A token extracted from an address with positional information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text content
    pub text: String,
    /// Start byte position in the original string
    pub start: usize,
    /// End byte position in the original string
    pub end: usize,
    /// Token index in the sequence
    pub index: usize,
}

/// Default punctuation characters split out as their own tokens.
pub const DEFAULT_PUNCTUATION: &[char] = &['.', ',', '/'];

/// Tokenizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Characters emitted as standalone tokens.
    pub punctuation: Vec<char>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            punctuation: DEFAULT_PUNCTUATION.to_vec(),
        }
    }
}

/// Tokenizer for address strings.
///
/// The predictor and the aggregator must see the output of the same
/// tokenizer, otherwise tags no longer line up with tokens.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Create a tokenizer splitting on [`DEFAULT_PUNCTUATION`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tokenizer with a custom punctuation set.
    pub fn with_config(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Tokenize an address into a sequence of tokens.
    ///
    /// # Examples
    /// ```
    /// use alamat_core::parser::tokenizer::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().tokenize("Jl. Melati No.5, RT 05/RW 03");
    /// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    /// assert_eq!(
    ///     texts,
    ///     ["Jl", ".", "Melati", "No", ".", "5", ",", "RT", "05", "/", "RW", "03"]
    /// );
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start: Option<usize> = None;

        for (idx, c) in input.char_indices() {
            let is_punct = self.config.punctuation.contains(&c);
            if is_punct || c.is_whitespace() {
                if let Some(start) = current_start.take() {
                    Self::push(&mut tokens, input, start, idx);
                }
                if is_punct {
                    Self::push(&mut tokens, input, idx, idx + c.len_utf8());
                }
            } else if current_start.is_none() {
                current_start = Some(idx);
            }
        }

        if let Some(start) = current_start {
            Self::push(&mut tokens, input, start, input.len());
        }

        tokens
    }

    /// Tokenize and keep only the token texts.
    pub fn words(&self, input: &str) -> Vec<String> {
        self.tokenize(input).into_iter().map(|t| t.text).collect()
    }

    fn push(tokens: &mut Vec<Token>, input: &str, start: usize, end: usize) {
        let index = tokens.len();
        tokens.push(Token {
            text: input[start..end].to_string(),
            start,
            end,
            index,
        });
    }
}
