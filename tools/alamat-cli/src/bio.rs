//! Reader for pre-tagged addresses in BIO format.
//!
//! One `token<TAB>label` pair per line, a blank line between addresses,
//! `#` starts a comment line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// One tagged address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedAddress {
    pub tokens: Vec<String>,
    pub labels: Vec<String>,
}

impl TaggedAddress {
    /// Tokens joined with single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.tokens.iter().cloned().zip(self.labels.iter().cloned())
    }

    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub fn load_bio_file<P: AsRef<Path>>(path: P) -> Result<Vec<TaggedAddress>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    read_bio(BufReader::new(file)).with_context(|| format!("cannot read {}", path.display()))
}

pub fn read_bio<R: BufRead>(reader: R) -> Result<Vec<TaggedAddress>> {
    let mut addresses = Vec::new();
    let mut current = TaggedAddress::default();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            if !current.is_empty() {
                addresses.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let Some((token, label)) = line.split_once('\t') else {
            bail!("line {}: expected token<TAB>label", number + 1);
        };
        current.tokens.push(token.trim().to_string());
        current.labels.push(label.trim().to_string());
    }

    if !current.is_empty() {
        addresses.push(current);
    }

    Ok(addresses)
}
