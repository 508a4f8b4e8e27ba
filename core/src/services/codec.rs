//! One-time code generation and keyed digests

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, Rng};
use sha2::Sha256;

use crate::domain::entities::CODE_LENGTH;
use crate::errors::{DomainError, DomainResult};

type HmacSha256 = Hmac<Sha256>;

/// Digest length in hex characters
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Generates codes and produces/verifies their HMAC-SHA256 digests
#[derive(Clone)]
pub struct CodeCodec {
    keyed: HmacSha256,
}

impl std::fmt::Debug for CodeCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeCodec").finish_non_exhaustive()
    }
}

impl CodeCodec {
    /// Create a codec keyed with the server secret
    pub fn new(secret: impl AsRef<[u8]>) -> DomainResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(DomainError::Config {
                message: "code digest secret must not be empty".to_string(),
            });
        }
        let keyed = HmacSha256::new_from_slice(secret).map_err(|e| DomainError::Config {
            message: format!("invalid code digest secret: {}", e),
        })?;
        Ok(Self { keyed })
    }

    /// Uniform 6-digit code from the OS CSPRNG, leading zeros preserved
    pub fn generate(&self) -> String {
        let code: u32 = OsRng.gen_range(0..1_000_000);
        format!("{:0width$}", code, width = CODE_LENGTH)
    }

    /// Lowercase hex HMAC-SHA256 of the code
    pub fn digest(&self, code: &str) -> String {
        hex::encode(self.mac(code))
    }

    /// Constant-time check of `code` against a stored digest
    ///
    /// A stored value that is not a 64-char hex digest never matches.
    pub fn matches(&self, code: &str, stored_digest: &str) -> bool {
        let stored = match hex::decode(stored_digest) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };
        let computed = self.mac(code);
        if stored.len() != computed.len() {
            return false;
        }
        constant_time_eq(&computed, &stored)
    }

    fn mac(&self, code: &str) -> Vec<u8> {
        let mut mac = self.keyed.clone();
        mac.update(code.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CodeCodec {
        CodeCodec::new("test-secret-0123456789").unwrap()
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(matches!(CodeCodec::new(""), Err(DomainError::Config { .. })));
    }

    #[test]
    fn test_generate_is_six_digits() {
        let codec = codec();
        for _ in 0..200 {
            let code = codec.generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = codec().digest("012345");
        assert_eq!(digest.len(), DIGEST_HEX_LENGTH);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_digest_depends_on_secret() {
        let other = CodeCodec::new("another-secret-9876543210").unwrap();
        assert_ne!(codec().digest("123456"), other.digest("123456"));
    }

    #[test]
    fn test_matches_own_digest() {
        let codec = codec();
        for code in ["000000", "000001", "123456", "999999"] {
            assert!(codec.matches(code, &codec.digest(code)));
        }
    }

    #[test]
    fn test_single_digit_change_does_not_match() {
        let codec = codec();
        let digest = codec.digest("123456");
        for position in 0..CODE_LENGTH {
            let mut altered: Vec<u8> = b"123456".to_vec();
            altered[position] = if altered[position] == b'9' { b'0' } else { altered[position] + 1 };
            let altered = String::from_utf8(altered).unwrap();
            assert!(!codec.matches(&altered, &digest), "{} should not match", altered);
        }
    }

    #[test]
    fn test_malformed_stored_digest_never_matches() {
        let codec = codec();
        assert!(!codec.matches("123456", "not-hex"));
        assert!(!codec.matches("123456", ""));
        assert!(!codec.matches("123456", "abcd"));
    }
}
