use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;

/// One-way salted password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only when `digest` is unusable.
    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool>;
}

/// Argon2id with a fixed cost. Verification reads the cost from the PHC
/// string, so hashes made with other parameters still verify.
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest).map_err(|e| anyhow!("corrupt password hash: {}", e))?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow!("password verification failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::new(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn hash_and_verify() {
        let hasher = cheap();
        let hashed = hasher.hash("secure_password_123").unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(hasher.verify("secure_password_123", &hashed).unwrap());
        assert!(!hasher.verify("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let hasher = cheap();
        assert_ne!(hasher.hash("pw1").unwrap(), hasher.hash("pw1").unwrap());
    }

    #[test]
    fn default_cost_verifies_cheap_hash() {
        let hashed = cheap().hash("pw1").unwrap();
        assert!(Argon2Hasher::default().verify("pw1", &hashed).unwrap());
    }

    #[test]
    fn garbage_digest_is_an_error() {
        assert!(cheap().verify("pw1", "not-a-phc-string").is_err());
    }
}
