use thiserror::Error;

/// Gateway error types
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),

    #[error("Authentication scheme error: {0}")]
    AuthError(#[from] AuthSchemeError),

    #[error("Identity service error: {0}")]
    IdentityError(#[from] IdentityError),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// HTTP status code mapping for gateway errors
impl GatewayError {
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::TokenError(_) => 401,
            GatewayError::AuthError(_) => 401,
            GatewayError::IdentityError(err) => err.status_code(),
            GatewayError::Precondition(_) => 500,
            GatewayError::InternalError(_) => 500,
            GatewayError::InvalidRequest(_) => 400,
        }
    }

    /// Stable, machine-readable reason code surfaced to callers
    pub fn reason_code(&self) -> &'static str {
        match self {
            GatewayError::TokenError(err) => err.reason_code(),
            GatewayError::AuthError(err) => err.reason_code(),
            GatewayError::IdentityError(err) => err.reason_code(),
            GatewayError::Precondition(_) => "gateway.precondition",
            GatewayError::InternalError(_) => "gateway.internal",
            GatewayError::InvalidRequest(_) => "gateway.invalidRequest",
        }
    }
}

/// Session token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed or its signature does not verify")]
    Malformed,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            TokenError::Expired => "token.expired",
            TokenError::Malformed => "token.malformed",
            TokenError::Signing(_) => "token.signing",
        }
    }
}

/// Errors raised while building or applying authentication commands
#[derive(Debug, Error)]
pub enum AuthSchemeError {
    #[error("No usable authentication source on the request")]
    MissingAuthSource,

    #[error("Service declares a mainframe scheme but no application id")]
    MissingApplid,

    #[error("Caller has no resolvable mainframe user id")]
    MissingUserId,

    #[error("Pass ticket generation failed: {0}")]
    TicketGeneration(String),
}

impl AuthSchemeError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            AuthSchemeError::MissingAuthSource => "auth.missingSource",
            AuthSchemeError::MissingApplid => "auth.missingApplid",
            AuthSchemeError::MissingUserId => "auth.missingUserId",
            AuthSchemeError::TicketGeneration(_) => "auth.ticketGeneration",
        }
    }
}

/// Errors from the external mainframe identity service
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity exchange rejected the credentials")]
    AuthRejected,

    #[error("Identity service failure: {0}")]
    Integration(String),

    #[error("Identity service unreachable: {0}")]
    Transport(String),
}

impl IdentityError {
    /// 401 for rejected credentials, 502 for a broken upstream so operators
    /// can tell "your credentials are wrong" from "our backend is broken"
    pub fn status_code(&self) -> u16 {
        match self {
            IdentityError::AuthRejected => 401,
            IdentityError::Integration(_) => 502,
            IdentityError::Transport(_) => 502,
        }
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            IdentityError::AuthRejected => "identity.rejected",
            IdentityError::Integration(_) => "identity.integration",
            IdentityError::Transport(_) => "identity.transport",
        }
    }
}
