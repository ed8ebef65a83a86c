use frazeo_core::{FrazeoError, FrazeoResult};
use regex::Regex;

/// Word spans (with an optional apostrophe suffix) or single non-space symbols.
const SPAN_PATTERN: &str = r"\w+(?:'\w+)?|[^\w\s]";
/// Spans made only of punctuation or symbols.
const PUNCT_PATTERN: &str = r"^[\p{P}\p{S}]+$";

/// Lower-cases a query and reduces it to space-separated word spans.
///
/// `"Ничего, НЕ делать!"` becomes `"ничего не делать"`. The output is what the
/// subword tokenizer sees, and also the key of the embedding cache.
pub struct Normalizer {
    span: Regex,
    punct: Regex,
}

impl Normalizer {
    /// Compile the span and punctuation patterns.
    pub fn new() -> FrazeoResult<Self> {
        let span = Regex::new(SPAN_PATTERN)
            .map_err(|e| FrazeoError::Model(format!("invalid span pattern: {e}")))?;
        let punct = Regex::new(PUNCT_PATTERN)
            .map_err(|e| FrazeoError::Model(format!("invalid punctuation pattern: {e}")))?;
        Ok(Self { span, punct })
    }

    /// Normalize `text` into space-joined word spans.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.trim().to_lowercase();
        let spans: Vec<&str> = self
            .span
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|s| !self.punct.is_match(s))
            .collect();
        spans.join(" ")
    }
}
