//! Session and OAuth state tokens.
//!
//! Both are HS256 JWTs signed with the same secret and told apart by the
//! `purpose` claim, so an OAuth `state` value can never be replayed as a
//! session token.

use crate::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use todo_core::User;
use uuid::Uuid;

const PURPOSE_SESSION: &str = "session";
const PURPOSE_OAUTH_STATE: &str = "oauth_state";

/// Lifetime of the `state` parameter round-tripped through the provider.
const STATE_TTL_SECONDS: i64 = 600;

/// Claims carried by every token this crate mints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (provider subject). Empty for state tokens.
    pub sub: String,
    /// Token id.
    pub jti: String,
    pub purpose: String,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

impl SessionClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Mints and verifies tokens.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Manager with a random per-process secret. Tokens don't survive a
    /// restart.
    pub fn ephemeral(ttl: Duration) -> Self {
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::new(&secret, ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session token for `user_id`, valid for the configured ttl.
    pub fn issue(&self, user_id: &str) -> Result<(String, SessionClaims), AuthError> {
        self.mint(user_id, PURPOSE_SESSION, self.ttl)
    }

    /// Check signature and expiry of a session token.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self.decode(token)?;
        if claims.purpose != PURPOSE_SESSION {
            return Err(AuthError::TokenInvalid("not a session token".to_string()));
        }
        if claims.sub.is_empty() {
            return Err(AuthError::TokenInvalid("missing subject".to_string()));
        }
        Ok(claims)
    }

    /// Issue an opaque `state` value for the OAuth redirect.
    pub fn issue_state(&self) -> Result<String, AuthError> {
        let (token, _) = self.mint("", PURPOSE_OAUTH_STATE, Duration::seconds(STATE_TTL_SECONDS))?;
        Ok(token)
    }

    /// Check a `state` value returned by the provider.
    pub fn verify_state(&self, state: &str) -> Result<(), AuthError> {
        let claims = self
            .decode(state)
            .map_err(|e| AuthError::InvalidGrant(format!("bad oauth state: {e}")))?;
        if claims.purpose != PURPOSE_OAUTH_STATE {
            return Err(AuthError::InvalidGrant("bad oauth state: wrong token kind".to_string()));
        }
        Ok(())
    }

    fn mint(
        &self,
        sub: &str,
        purpose: &str,
        ttl: Duration,
    ) -> Result<(String, SessionClaims), AuthError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: sub.to_string(),
            jti: Uuid::new_v4().to_string(),
            purpose: purpose.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("failed to sign token: {e}")))?;
        Ok((token, claims))
    }

    fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let validation = validation();
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature if is_past_expiry(token) => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Whether a token that failed its signature check is also past `exp`.
///
/// Expiry wins over the signature: an expired token is reported as expired
/// whoever signed it. The claims read here are never trusted for anything
/// else.
fn is_past_expiry(token: &str) -> bool {
    let mut validation = validation();
    validation.insecure_disable_signature_validation();
    matches!(
        decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation),
        Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature)
    )
}
