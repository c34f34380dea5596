use serde::{Deserialize, Serialize};

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token issuer claim
    pub issuer: String,

    /// Shared secret used to sign and verify tokens
    pub secret: String,

    /// Name of the cookie carrying the session token
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Token expiration time in seconds
    pub expiration_seconds: u64,

    /// Designated test account whose tokens get the short TTL below.
    /// This is an escape hatch for expiry testing, not a per-user policy.
    pub short_ttl_username: Option<String>,

    /// Expiration time in seconds applied to the short-TTL account
    #[serde(default = "default_short_ttl")]
    pub short_ttl_expiration_seconds: u64,
}

fn default_cookie_name() -> String {
    "gwSessionToken".to_string()
}

fn default_short_ttl() -> u64 {
    60
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "gateway".to_string(),
            secret: String::new(),
            cookie_name: default_cookie_name(),
            expiration_seconds: 86400,
            short_ttl_username: None,
            short_ttl_expiration_seconds: default_short_ttl(),
        }
    }
}

/// Mainframe identity (SAF) service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafConfig {
    /// URL of the token exchange endpoint
    pub authenticate_url: String,

    /// URL of the token verification endpoint
    pub verify_url: String,

    /// Request timeout in seconds for calls to the identity service
    #[serde(default = "default_saf_timeout")]
    pub timeout_seconds: u64,
}

fn default_saf_timeout() -> u64 {
    10
}

impl Default for SafConfig {
    fn default() -> Self {
        Self {
            authenticate_url: "https://localhost:10013/saf/authenticate".to_string(),
            verify_url: "https://localhost:10013/saf/verify".to_string(),
            timeout_seconds: default_saf_timeout(),
        }
    }
}

/// Routing rule construction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Header used to cascade a request through more than one gateway
    #[serde(default = "default_forward_header")]
    pub forward_header: String,
}

fn default_forward_header() -> String {
    "X-Forward-To".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            forward_header: default_forward_header(),
        }
    }
}

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Service id this gateway registers under
    #[serde(default = "default_service_id")]
    pub service_id: String,

    /// Session token configuration
    #[serde(default)]
    pub token: TokenConfig,

    /// Mainframe identity service configuration
    #[serde(default)]
    pub saf: SafConfig,

    /// Routing configuration
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_service_id() -> String {
    "gateway".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service_id: default_service_id(),
            token: TokenConfig::default(),
            saf: SafConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.token.cookie_name, "gwSessionToken");
        assert_eq!(config.routing.forward_header, "X-Forward-To");
        assert_eq!(config.saf.timeout_seconds, 10);
        assert!(config.token.short_ttl_username.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{
                "token": {
                    "issuer": "gw",
                    "secret": "s3cret",
                    "expiration_seconds": 3600,
                    "short_ttl_username": "expire-test"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.token.issuer, "gw");
        assert_eq!(config.token.short_ttl_username.as_deref(), Some("expire-test"));
        assert_eq!(config.token.short_ttl_expiration_seconds, 60);
        assert_eq!(config.routing.forward_header, "X-Forward-To");
    }
}
