use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use planner_types::User;
use planner_types::api::Claims;

/// Default session lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

/// Issues and checks HS256 session tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &User) -> jsonwebtoken::errors::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            platoon: user.platoon,
            is_lieutenant: user.is_lieutenant,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Checks signature and expiry, with no clock leeway past `exp`.
    pub fn decode(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;
    use planner_types::Platoon;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: String::new(),
            platoon: Platoon::Red,
            is_lieutenant: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_decode() {
        let signer = TokenSigner::new(b"test-secret", Duration::hours(DEFAULT_TOKEN_TTL_HOURS));
        let user = user();
        let claims = signer.decode(&signer.issue(&user).unwrap()).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.platoon, Platoon::Red);
        assert!(claims.is_lieutenant);
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenSigner::new(b"one", Duration::days(7)).issue(&user()).unwrap();
        let err = TokenSigner::new(b"two", Duration::days(7)).decode(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new(b"test-secret", Duration::days(-1));
        let err = signer.decode(&signer.issue(&user()).unwrap()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn no_grace_period_after_expiry() {
        let signer = TokenSigner::new(b"test-secret", Duration::seconds(-5));
        let err = signer.decode(&signer.issue(&user()).unwrap()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }
}
