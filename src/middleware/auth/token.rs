use hmac::{Hmac, Mac};
use hyper::header::{AUTHORIZATION, COOKIE};
use hyper::HeaderMap;
use jwt::{SignWithKey, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::middleware::auth::models::{SessionClaims, SessionToken};
use crate::utils::unix_now;

/// Issues and validates the gateway's own signed session credential.
///
/// Side-effect-free with respect to shared state; safe to call concurrently
/// without locks. The signing secret is read-only after startup.
pub struct TokenService {
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    fn signing_key(&self) -> Result<Hmac<Sha256>, TokenError> {
        Hmac::new_from_slice(self.config.secret.as_bytes())
            .map_err(|_| TokenError::Signing("failed to create signing key".to_string()))
    }

    /// Expiry for a subject: the configured TTL, or the short TTL when the
    /// subject is the designated short-TTL test account
    pub(crate) fn expiration_for(&self, username: &str, now: u64) -> u64 {
        let short_ttl_account = self
            .config
            .short_ttl_username
            .as_deref()
            .map(|u| u == username)
            .unwrap_or(false);

        if short_ttl_account {
            now + self.config.short_ttl_expiration_seconds
        } else {
            now + self.config.expiration_seconds
        }
    }

    /// Issue a signed session token for a username
    pub fn issue(&self, username: &str) -> Result<SessionToken, TokenError> {
        let now = unix_now();
        let claims = SessionClaims {
            sub: username.to_string(),
            iss: self.config.issuer.clone(),
            iat: now,
            exp: self.expiration_for(username, now),
            jti: Uuid::new_v4().to_string(),
        };

        // signing consumes the claims; keep the originals for the token below
        let raw = claims
            .clone()
            .sign_with_key(&self.signing_key()?)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(SessionToken {
            raw,
            subject: claims.sub,
            issuer: claims.iss,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token_id: claims.jti,
            authenticated: false,
        })
    }

    /// Validate a serialized token.
    ///
    /// Fails with `Expired` past the expiry time and `Malformed` for any
    /// signature or structural problem; internal parser errors never reach
    /// the caller. Only this path sets the `authenticated` flag.
    pub fn validate(&self, raw: &str) -> Result<SessionToken, TokenError> {
        let claims: SessionClaims = raw
            .verify_with_key(&self.signing_key()?)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                TokenError::Malformed
            })?;

        if claims.exp < unix_now() {
            tracing::debug!(
                "Token with id '{}' for user '{}' is expired",
                claims.jti,
                claims.sub
            );
            return Err(TokenError::Expired);
        }

        Ok(SessionToken {
            raw: raw.to_string(),
            subject: claims.sub,
            issuer: claims.iss,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token_id: claims.jti,
            authenticated: true,
        })
    }

    /// Extract the serialized token from a request: the session cookie is
    /// checked first, then the Authorization bearer header
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let from_cookie = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookies| {
                cookies.split(';').find_map(|pair| {
                    let (key, value) = pair.trim().split_once('=')?;
                    (key == self.config.cookie_name).then(|| value.to_string())
                })
            });

        from_cookie.or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|auth| auth.strip_prefix("Bearer "))
                .map(|t| t.to_string())
        })
    }
}
