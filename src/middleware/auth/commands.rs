use std::sync::Arc;

use crate::core::metadata::MetadataParser;
use crate::core::request::OutboundRequest;
use crate::error::{AuthSchemeError, GatewayError};
use crate::middleware::auth::models::CallerCredential;
use crate::middleware::auth::passticket::PassTicketGenerator;
use crate::middleware::auth::saf::MainframeIdentityProvider;
use crate::middleware::auth::AuthCommandResolver;
use crate::models::ServiceInstance;

/// Header carrying the mainframe identity token to the backend
pub const SAF_TOKEN_HEADER: &str = "X-SAF-Token";

/// Facts about the single in-flight outbound call.
///
/// `target` is filled in once load-balancer selection has run; commands that
/// need it before then fail with a precondition error.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub caller: CallerCredential,
    pub target: Option<ServiceInstance>,
}

impl CallContext {
    pub fn new(caller: CallerCredential) -> Self {
        Self {
            caller,
            target: None,
        }
    }

    pub fn with_target(mut self, target: ServiceInstance) -> Self {
        self.target = Some(target);
        self
    }
}

/// The credential transformation to apply to one outbound call.
///
/// Owned by the single in-flight call; the `Universal` variant caches its
/// concrete decision inside itself and must never be shared across calls.
pub enum AuthenticationCommand {
    /// Forward the request without injecting any credential
    Bypass,

    /// Re-attach the caller's own bearer token unchanged
    ForwardBearer,

    /// Exchange the caller's identity for a mainframe identity token
    MainframeIdentity(MainframeIdentityCommand),

    /// Authenticate with a freshly generated one-time pass ticket
    PassTicket(PassTicketCommand),

    /// Scheme unresolved at declaration time; decided against the resolved
    /// target instance on first application
    Universal(UniversalCommand),
}

pub struct MainframeIdentityCommand {
    pub(crate) applid: String,
    pub(crate) identity: Arc<MainframeIdentityProvider>,
    pub(crate) tickets: Arc<dyn PassTicketGenerator>,
    pub(crate) session_cookie: String,
}

pub struct PassTicketCommand {
    pub(crate) applid: String,
    pub(crate) tickets: Arc<dyn PassTicketGenerator>,
    pub(crate) session_cookie: String,
}

pub struct UniversalCommand {
    pub(crate) resolver: Arc<AuthCommandResolver>,
    pub(crate) resolved: Option<Box<AuthenticationCommand>>,
}

impl AuthenticationCommand {
    /// True when no credential is injected into the outbound call
    pub fn is_bypass(&self) -> bool {
        matches!(self, AuthenticationCommand::Bypass)
    }

    /// Apply this command to the outbound request.
    ///
    /// For `Universal` the concrete command is resolved from the target
    /// instance's metadata on the first application and cached for the
    /// remaining lifetime of this command only.
    pub async fn apply(
        &mut self,
        request: &mut OutboundRequest,
        ctx: &CallContext,
    ) -> Result<(), GatewayError> {
        match self {
            AuthenticationCommand::Universal(universal) => {
                let mut inner = match universal.resolved.take() {
                    Some(inner) => inner,
                    None => {
                        let target = ctx.target.as_ref().ok_or_else(|| {
                            GatewayError::Precondition(
                                "authentication command applied before target instance resolution"
                                    .to_string(),
                            )
                        })?;

                        let auth = MetadataParser::new().parse_authentication(&target.metadata);
                        Box::new(universal.resolver.concrete_command(&auth)?)
                    }
                };

                let result = inner.apply_concrete(request, ctx).await;
                universal.resolved = Some(inner);
                result
            }
            _ => self.apply_concrete(request, ctx).await,
        }
    }

    async fn apply_concrete(
        &mut self,
        request: &mut OutboundRequest,
        ctx: &CallContext,
    ) -> Result<(), GatewayError> {
        match self {
            AuthenticationCommand::Bypass => Ok(()),

            AuthenticationCommand::ForwardBearer => {
                let token = ctx
                    .caller
                    .bearer()
                    .ok_or(AuthSchemeError::MissingAuthSource)?;
                request.set_bearer(token);
                Ok(())
            }

            AuthenticationCommand::MainframeIdentity(cmd) => {
                let user_id = ctx.caller.user_id().ok_or(AuthSchemeError::MissingUserId)?;

                let ticket = cmd.tickets.generate(user_id, &cmd.applid)?;
                let token = cmd.identity.generate(user_id, &ticket, &cmd.applid).await?;

                request.set_header(SAF_TOKEN_HEADER, &token);
                request.remove_cookie(&cmd.session_cookie);
                Ok(())
            }

            AuthenticationCommand::PassTicket(cmd) => {
                let user_id = ctx.caller.user_id().ok_or(AuthSchemeError::MissingUserId)?;

                // one-time ticket, freshly generated for every call
                let ticket = cmd.tickets.generate(user_id, &cmd.applid)?;

                request.set_basic_auth(user_id, &ticket);
                request.remove_cookie(&cmd.session_cookie);
                Ok(())
            }

            AuthenticationCommand::Universal(_) => Err(GatewayError::Precondition(
                "universal command cannot resolve to another universal command".to_string(),
            )),
        }
    }
}
