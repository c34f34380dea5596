pub mod commands;
pub mod models;
pub mod passticket;
pub mod saf;
pub mod token;

use std::sync::Arc;

use crate::error::{AuthSchemeError, GatewayError};
use crate::middleware::auth::commands::{
    AuthenticationCommand, MainframeIdentityCommand, PassTicketCommand, UniversalCommand,
};
use crate::middleware::auth::models::CallerCredential;
use crate::middleware::auth::passticket::PassTicketGenerator;
use crate::middleware::auth::saf::MainframeIdentityProvider;
use crate::models::{Authentication, AuthenticationScheme};

/// Transport used for the outbound call, chosen once per call before the
/// authentication command is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Transport presenting the caller's client certificate
    ClientCertificate,

    /// Transport without a client certificate
    Plain,
}

/// Selects and builds the authentication command to apply to an outbound
/// call from a service's declared scheme
pub struct AuthCommandResolver {
    identity: Arc<MainframeIdentityProvider>,
    tickets: Arc<dyn PassTicketGenerator>,
    session_cookie: String,
}

impl AuthCommandResolver {
    pub fn new(
        identity: Arc<MainframeIdentityProvider>,
        tickets: Arc<dyn PassTicketGenerator>,
        session_cookie: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            tickets,
            session_cookie: session_cookie.into(),
        }
    }

    /// Resolve the command for a service's declared authentication.
    ///
    /// A service with no resolvable declaration gets a `Universal` command
    /// that defers the decision until the target instance is known.
    pub fn resolve(
        self: &Arc<Self>,
        authentication: &Authentication,
    ) -> Result<AuthenticationCommand, GatewayError> {
        match authentication.scheme {
            Some(_) => self.concrete_command(authentication),
            None => Ok(AuthenticationCommand::Universal(UniversalCommand {
                resolver: Arc::clone(self),
                resolved: None,
            })),
        }
    }

    /// Build the concrete command for a known declaration. Used directly by
    /// `resolve` and lazily by `Universal` once the instance is known; an
    /// instance that declares nothing injects no credential.
    pub(crate) fn concrete_command(
        &self,
        authentication: &Authentication,
    ) -> Result<AuthenticationCommand, GatewayError> {
        match authentication.scheme {
            None | Some(AuthenticationScheme::Bypass) => Ok(AuthenticationCommand::Bypass),

            Some(AuthenticationScheme::ForwardToken) => Ok(AuthenticationCommand::ForwardBearer),

            Some(AuthenticationScheme::SafIdt) => {
                let applid = Self::required_applid(authentication)?;
                Ok(AuthenticationCommand::MainframeIdentity(
                    MainframeIdentityCommand {
                        applid,
                        identity: Arc::clone(&self.identity),
                        tickets: Arc::clone(&self.tickets),
                        session_cookie: self.session_cookie.clone(),
                    },
                ))
            }

            Some(AuthenticationScheme::PassTicket) => {
                let applid = Self::required_applid(authentication)?;
                Ok(AuthenticationCommand::PassTicket(PassTicketCommand {
                    applid,
                    tickets: Arc::clone(&self.tickets),
                    session_cookie: self.session_cookie.clone(),
                }))
            }
        }
    }

    fn required_applid(authentication: &Authentication) -> Result<String, GatewayError> {
        authentication
            .applid
            .clone()
            .ok_or_else(|| AuthSchemeError::MissingApplid.into())
    }

    /// Choose the outbound transport: the certificate-bearing transport is
    /// used only when the effective scheme is bypass and the caller is
    /// authenticated via a client certificate.
    pub fn select_transport(
        &self,
        command: &AuthenticationCommand,
        caller: &CallerCredential,
    ) -> TransportKind {
        if command.is_bypass() && caller.is_authenticated_certificate() {
            TransportKind::ClientCertificate
        } else {
            TransportKind::Plain
        }
    }
}
