use rand::{Rng, rngs::OsRng};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Length of every generated share id.
pub const SHARE_ID_LEN: usize = 8;

/// Longest id accepted on lookup. Anything longer can't have come from a generator.
const MAX_ID_LEN: usize = 64;

const URL_SAFE_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Produces short, URL-safe identifiers for new shares.
///
/// Generators never look at storage, so uniqueness is probabilistic.
pub trait IdGenerator: Send + Sync + std::fmt::Debug + 'static {
    fn generate(&self) -> String;
}

/// SHA-256 of the current wall-clock time in nanoseconds, truncated to [`SHARE_ID_LEN`] hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockDigest;

impl IdGenerator for ClockDigest {
    fn generate(&self) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let mut hasher = Sha256::new();
        hasher.update(now.to_string().as_bytes());
        let mut id = hex::encode(hasher.finalize());
        id.truncate(SHARE_ID_LEN);
        id
    }
}

/// [`SHARE_ID_LEN`] characters drawn from the OS random source over the URL-safe base64 alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomToken;

impl IdGenerator for RandomToken {
    fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..SHARE_ID_LEN).map(|_| char::from(URL_SAFE_ALPHABET[rng.gen_range(0..URL_SAFE_ALPHABET.len())])).collect()
    }
}

/// Whether `id` is a plain token that is safe to use as a file stem.
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_digest_is_short_hex() {
        let id = ClockDigest.generate();
        assert_eq!(id.len(), SHARE_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(is_well_formed(&id));
    }

    #[test]
    fn test_random_token_is_url_safe() {
        for _ in 0..100 {
            let id = RandomToken.generate();
            assert_eq!(id.len(), SHARE_ID_LEN);
            assert!(is_well_formed(&id));
        }
    }

    #[test]
    fn test_random_tokens_differ() {
        let a = RandomToken.generate();
        let b = RandomToken.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_well_formed_rejects_paths() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("../etc/passwd"));
        assert!(!is_well_formed("a/b"));
        assert!(!is_well_formed("abc.json"));
        assert!(!is_well_formed(&"a".repeat(MAX_ID_LEN + 1)));
        assert!(is_well_formed("abc_DEF-123"));
    }
}
