use frazeo_core::{FrazeoError, FrazeoResult, IdiomId};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of MAC output kept in a token (hex-encoded to twice as many chars).
const TOKEN_BYTES: usize = 16;

/// Short opaque string addressing a corpus id or a navigation snapshot.
///
/// Always [`Token::LEN`] lowercase hex characters, well under the 64-byte
/// callback payload limit of chat transports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Length of every token in characters.
    pub const LEN: usize = TOKEN_BYTES * 2;

    /// Accept a string only if it has the shape of a token.
    pub fn parse(s: &str) -> Option<Self> {
        let well_formed =
            s.len() == Self::LEN && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(s.to_string()))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Process-wide secret mixed into every token.
///
/// Rotating it invalidates outstanding snapshot tokens (back buttons expire)
/// but never affects fresh queries.
#[derive(Clone)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Use the given secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// A fresh random secret, valid for this process only.
    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        Self(bytes.to_vec())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

/// What a token is derived from. The two kinds are domain-separated, so an
/// id token can never equal a snapshot token by construction of the input.
#[derive(Debug, Clone, Copy)]
pub enum TokenValue<'a> {
    /// A corpus id.
    Id(IdiomId),
    /// Serialized snapshot bytes.
    Snapshot(&'a [u8]),
}

/// Deterministic token derivation plus the reverse table for corpus ids.
///
/// Tokens are `HMAC-SHA256(salt, domain || value)` truncated to 16 bytes.
pub struct TokenRegistry {
    mac: HmacSha256,
    by_id: Vec<Token>,
    ids: HashMap<Token, IdiomId>,
}

impl TokenRegistry {
    /// Create a registry keyed by `salt` with an empty id table.
    pub fn new(salt: &Salt) -> FrazeoResult<Self> {
        let mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|e| FrazeoError::Session(format!("Invalid salt: {e}")))?;
        Ok(Self {
            mac,
            by_id: Vec::new(),
            ids: HashMap::new(),
        })
    }

    /// Create a registry and precompute tokens for ids `0..corpus_size`.
    pub fn for_corpus(salt: &Salt, corpus_size: usize) -> FrazeoResult<Self> {
        let mut registry = Self::new(salt)?;
        registry.precompute_id_space(corpus_size)?;
        Ok(registry)
    }

    /// Derive the token for a value.
    pub fn token_for(&self, value: TokenValue<'_>) -> Token {
        let mut mac = self.mac.clone();
        match value {
            TokenValue::Id(id) => {
                mac.update(b"id:");
                mac.update(id.to_string().as_bytes());
            }
            TokenValue::Snapshot(bytes) => {
                mac.update(b"snap:");
                mac.update(bytes);
            }
        }
        let digest = mac.finalize().into_bytes();
        Token(hex::encode(&digest[..TOKEN_BYTES]))
    }

    /// Build the reverse table for ids `0..corpus_size`, replacing any
    /// previous one. Fails if two ids collide.
    pub fn precompute_id_space(&mut self, corpus_size: usize) -> FrazeoResult<()> {
        let mut by_id = Vec::with_capacity(corpus_size);
        let mut ids = HashMap::with_capacity(corpus_size);
        for id in 0..corpus_size {
            let token = self.token_for(TokenValue::Id(id));
            if let Some(other) = ids.insert(token.clone(), id) {
                return Err(FrazeoError::Session(format!(
                    "Token collision between ids {other} and {id}"
                )));
            }
            by_id.push(token);
        }
        self.by_id = by_id;
        self.ids = ids;
        tracing::info!(ids = corpus_size, "Token id-space precomputed");
        Ok(())
    }

    /// The precomputed token for a corpus id.
    pub fn id_token(&self, id: IdiomId) -> Option<&Token> {
        self.by_id.get(id)
    }

    /// Reverse lookup of a corpus-id token.
    pub fn resolve_id(&self, token: &str) -> Option<IdiomId> {
        self.ids.get(token).copied()
    }

    /// Token of a uniformly random corpus id. Never expires: it lives in the
    /// static table, not the session cache.
    pub fn random_token(&self) -> Option<&Token> {
        self.random_token_with(&mut rand::thread_rng())
    }

    /// [`random_token`](Self::random_token) with a caller-supplied RNG.
    pub fn random_token_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Token> {
        if self.by_id.is_empty() {
            return None;
        }
        let id = rng.gen_range(0..self.by_id.len());
        self.by_id.get(id)
    }

    /// Size of the precomputed id-space.
    pub fn id_space(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry(salt: &str, size: usize) -> TokenRegistry {
        TokenRegistry::for_corpus(&Salt::new(salt), size).unwrap()
    }

    #[test]
    fn test_token_is_pure() {
        let r = registry("-", 0);
        let a = r.token_for(TokenValue::Id(42));
        let b = r.token_for(TokenValue::Id(42));
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), Token::LEN);
    }

    #[test]
    fn test_salt_changes_tokens() {
        let a = registry("one", 0).token_for(TokenValue::Id(1));
        let b = registry("two", 0).token_for(TokenValue::Id(1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_domains_are_separated() {
        let r = registry("-", 0);
        let id = r.token_for(TokenValue::Id(7));
        let snap = r.token_for(TokenValue::Snapshot(b"7"));
        assert_ne!(id, snap);
    }

    #[test]
    fn test_reverse_table_round_trips() {
        let r = registry("salt", 500);
        assert_eq!(r.id_space(), 500);
        for id in 0..500 {
            let token = r.id_token(id).unwrap();
            assert_eq!(r.resolve_id(token.as_str()), Some(id));
        }
        assert!(r.id_token(500).is_none());
        assert_eq!(r.resolve_id("not-a-token"), None);
    }

    #[test]
    fn test_random_token_resolves() {
        let r = registry("salt", 10);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let token = r.random_token_with(&mut rng).unwrap();
            let id = r.resolve_id(token.as_str()).unwrap();
            assert!(id < 10);
        }
        assert!(r.random_token().is_some());
    }

    #[test]
    fn test_random_token_on_empty_table() {
        assert!(registry("salt", 0).random_token().is_none());
    }

    #[test]
    fn test_token_parse() {
        let r = registry("salt", 1);
        let token = r.id_token(0).unwrap();
        assert_eq!(Token::parse(token.as_str()).as_ref(), Some(token));
        assert!(Token::parse("search").is_none());
        assert!(Token::parse(&"A".repeat(Token::LEN)).is_none());
    }

    #[test]
    fn test_salt_debug_redacted() {
        assert_eq!(format!("{:?}", Salt::new("secret")), "Salt(<redacted>)");
    }
}
