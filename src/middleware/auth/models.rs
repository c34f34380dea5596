use serde::{Deserialize, Serialize};

/// Claims embedded in a session token. No other claims are embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (username)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: u64,

    /// Expiration time (Unix timestamp)
    pub exp: u64,

    /// Unique token id for traceability
    pub jti: String,
}

/// A validated or freshly issued session token.
///
/// There is no server-side store; validity is determined purely by signature
/// and expiry at validation time.
#[derive(Debug, Clone)]
pub struct SessionToken {
    /// Serialized signed token
    pub raw: String,

    /// Subject (username)
    pub subject: String,

    /// Issuer
    pub issuer: String,

    /// Issued at (Unix timestamp)
    pub issued_at: u64,

    /// Expiration time (Unix timestamp)
    pub expires_at: u64,

    /// Unique token id
    pub token_id: String,

    /// Set only by a successful validation
    pub authenticated: bool,
}

/// The caller's current authentication, supplied by the request-handling
/// layer and consumed read-only by the command resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerCredential {
    /// No credential presented
    Anonymous,

    /// HTTP Basic credentials
    Basic { username: String, password: String },

    /// Bearer token
    Bearer { token: String, user_id: Option<String> },

    /// TLS client certificate
    ClientCertificate {
        /// Mainframe user id the certificate maps to
        user_id: String,
        /// Whether the certificate was verified by the request layer
        authenticated: bool,
    },
}

impl CallerCredential {
    /// Resolved mainframe user id, when the credential carries one
    pub fn user_id(&self) -> Option<&str> {
        match self {
            CallerCredential::Anonymous => None,
            CallerCredential::Basic { username, .. } => Some(username),
            CallerCredential::Bearer { user_id, .. } => user_id.as_deref(),
            CallerCredential::ClientCertificate { user_id, .. } => Some(user_id),
        }
    }

    /// Bearer token, when the caller presented one
    pub fn bearer(&self) -> Option<&str> {
        match self {
            CallerCredential::Bearer { token, .. } => Some(token),
            _ => None,
        }
    }

    /// True only for a client certificate the request layer has verified
    pub fn is_authenticated_certificate(&self) -> bool {
        matches!(
            self,
            CallerCredential::ClientCertificate {
                authenticated: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id() {
        assert_eq!(CallerCredential::Anonymous.user_id(), None);
        assert_eq!(
            CallerCredential::Basic {
                username: "USER1".to_string(),
                password: "pw".to_string()
            }
            .user_id(),
            Some("USER1")
        );
        assert_eq!(
            CallerCredential::ClientCertificate {
                user_id: "CERTUSR".to_string(),
                authenticated: false
            }
            .user_id(),
            Some("CERTUSR")
        );
    }

    #[test]
    fn test_is_authenticated_certificate() {
        assert!(CallerCredential::ClientCertificate {
            user_id: "CERTUSR".to_string(),
            authenticated: true
        }
        .is_authenticated_certificate());
        assert!(!CallerCredential::ClientCertificate {
            user_id: "CERTUSR".to_string(),
            authenticated: false
        }
        .is_authenticated_certificate());
        assert!(!CallerCredential::Anonymous.is_authenticated_certificate());
    }
}
