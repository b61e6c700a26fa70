//! Bearer token verification
//!
//! Access tokens are HS256 JWTs issued by the identity provider and signed
//! with the project's JWT secret. The `sub` claim is the user id.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims we read from an access token. Everything else is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Authentication failures. Display strings are what clients see.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or invalid Authorization header")]
    MissingHeader,

    #[error("Invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid or expired token")]
    InvalidSubject,
}

/// Token that passed signature, expiry and audience checks
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub user_id: Uuid,
    pub claims: Claims,
}

/// Verifies access tokens against the shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier for `secret`.
    ///
    /// When `audience` is `None` the `aud` claim is not checked.
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("token rejected: {}", e);
            AuthError::InvalidToken(e)
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::InvalidSubject)?;

        Ok(VerifiedToken {
            user_id,
            claims: data.claims,
        })
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingHeader)?;
    Ok(token)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub(crate) const SECRET: &str = "test-jwt-secret";

    pub(crate) fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    pub(crate) fn mint(sub: &str, exp: u64, aud: Option<&str>, secret: &str) -> String {
        let mut claims = json!({ "sub": sub, "exp": exp, "role": "authenticated" });
        if let Some(aud) = aud {
            claims["aud"] = json!(aud);
        }
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_token() {
        let id = Uuid::new_v4();
        let token = mint(&id.to_string(), now() + 3600, None, SECRET);
        let verified = TokenVerifier::new(SECRET, None).verify(&token).unwrap();
        assert_eq!(verified.user_id, id);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = mint(&Uuid::new_v4().to_string(), now() + 3600, None, "other");
        let err = TokenVerifier::new(SECRET, None).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn rejects_expired_token() {
        // well past the default leeway
        let token = mint(&Uuid::new_v4().to_string(), now() - 3600, None, SECRET);
        let err = TokenVerifier::new(SECRET, None).verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired token");
    }

    #[test]
    fn checks_audience_when_configured() {
        let id = Uuid::new_v4().to_string();
        let verifier = TokenVerifier::new(SECRET, Some("authenticated"));

        let good = mint(&id, now() + 3600, Some("authenticated"), SECRET);
        assert!(verifier.verify(&good).is_ok());

        let bad = mint(&id, now() + 3600, Some("anon"), SECRET);
        assert!(verifier.verify(&bad).is_err());
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let token = mint("service-account", now() + 3600, None, SECRET);
        let err = TokenVerifier::new(SECRET, None).verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSubject));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(bearer_token(None).is_err());
        assert!(bearer_token(Some("Basic abc")).is_err());
        assert!(bearer_token(Some("Bearer ")).is_err());
        assert!(bearer_token(Some("bearer abc")).is_err());
    }
}
