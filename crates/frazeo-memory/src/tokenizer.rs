use frazeo_core::{FrazeoError, FrazeoResult};
use std::path::Path;

/// Splits normalized text into the subword pieces the embedding model's
/// vocabulary is keyed by.
///
/// Implementations must be safe for concurrent read-only use.
pub trait PieceTokenizer: Send + Sync {
    /// Tokenize already-normalized text into piece strings.
    fn tokenize(&self, normalized: &str) -> FrazeoResult<Vec<String>>;

    /// Short name used in log output.
    fn name(&self) -> &str;
}

/// Adapter over a Hugging Face `tokenizer.json` (for example a SentencePiece
/// unigram model exported with `tokenizers`).
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load a serialized tokenizer from disk.
    pub fn from_file(path: &Path) -> FrazeoResult<Self> {
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            FrazeoError::Tokenizer(format!(
                "Failed to load tokenizer '{}': {e}",
                path.display()
            ))
        })?;
        tracing::info!(
            path = %path.display(),
            vocab = inner.get_vocab_size(true),
            "Tokenizer loaded"
        );
        Ok(Self { inner })
    }
}

impl PieceTokenizer for HfTokenizer {
    fn tokenize(&self, normalized: &str) -> FrazeoResult<Vec<String>> {
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let encoding = self
            .inner
            .encode(normalized, false)
            .map_err(|e| FrazeoError::Tokenizer(format!("Tokenization failed: {e}")))?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

/// Whitespace splitter used when no subword model is configured, and in tests.
///
/// Every word is one piece, so a vocabulary keyed by whole words works with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl PieceTokenizer for WhitespaceTokenizer {
    fn tokenize(&self, normalized: &str) -> FrazeoResult<Vec<String>> {
        Ok(normalized.split_whitespace().map(str::to_string).collect())
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let t = WhitespaceTokenizer;
        assert_eq!(
            t.tokenize("ничего не  делать").unwrap(),
            vec!["ничего", "не", "делать"]
        );
        assert!(t.tokenize("").unwrap().is_empty());
        assert_eq!(t.name(), "whitespace");
    }

    #[test]
    fn test_hf_tokenizer_missing_file() {
        let result = HfTokenizer::from_file(Path::new("/nonexistent/tokenizer.json"));
        match result {
            Err(FrazeoError::Tokenizer(msg)) => assert!(msg.contains("Failed to load tokenizer")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
