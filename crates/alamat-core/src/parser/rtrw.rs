//! RT/RW cleanup: strips label fragments so only the numeral remains.

use crate::parser::tokenizer::Tokenizer;
use crate::types::EntityRecord;

const LABEL_TOKENS: &[&str] = &["RT", "RW", "."];

/// Removes `RT`, `RW` and `.` tokens (any capitalization) from a field.
///
/// ```
/// use alamat_core::parser::rtrw::clean_numeric_field;
///
/// assert_eq!(clean_numeric_field("RT 05"), "05");
/// assert_eq!(clean_numeric_field("."), "");
/// ```
pub fn clean_numeric_field(text: &str) -> String {
    clean_with(&Tokenizer::new(), text)
}

/// Same as [`clean_numeric_field`] with an explicit tokenizer.
pub fn clean_with(tokenizer: &Tokenizer, text: &str) -> String {
    tokenizer
        .tokenize(text)
        .into_iter()
        .filter(|token| {
            !LABEL_TOKENS
                .iter()
                .any(|label| token.text.eq_ignore_ascii_case(label))
        })
        .map(|token| token.text)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleans both RT and RW in place; a field left empty becomes `None`.
pub fn clean_rt_rw(tokenizer: &Tokenizer, record: &mut EntityRecord) {
    for field in [&mut record.rt, &mut record.rw] {
        if let Some(text) = field.take() {
            let cleaned = clean_with(tokenizer, &text);
            *field = (!cleaned.is_empty()).then_some(cleaned);
        }
    }
}
