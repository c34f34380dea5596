// Gateway core library
//
// Turns registry-announced service metadata into routing rules and resolves
// the authentication command each outbound call must apply.

pub mod config;
pub mod core;
pub mod error;
pub mod middleware;
pub mod models;
pub mod utils;

pub use crate::config::{GatewayConfig, RoutingConfig, SafConfig, TokenConfig};
pub use crate::core::metadata::MetadataParser;
pub use crate::core::notifier::{GatewayLookup, GatewayPeer, PeerClient, RegistryChangeNotifier};
pub use crate::core::request::OutboundRequest;
pub use crate::core::router::{
    build_rules, ByBasePath, ByHeader, PublishedRoutes, RouteFilter, RoutePredicate, RouteRuleBuilder,
    RouteTable, RoutingRule,
};
pub use crate::error::{AuthSchemeError, GatewayError, IdentityError, TokenError};
pub use crate::middleware::auth::commands::{AuthenticationCommand, CallContext, SAF_TOKEN_HEADER};
pub use crate::middleware::auth::models::{CallerCredential, SessionToken};
pub use crate::middleware::auth::passticket::{PassTicketGenerator, RandomPassTicketGenerator};
pub use crate::middleware::auth::saf::{MainframeIdentityProvider, SafHttpResponse, SafTransport};
pub use crate::middleware::auth::token::TokenService;
pub use crate::middleware::auth::{AuthCommandResolver, TransportKind};
pub use crate::models::{
    ApiInfo, Authentication, AuthenticationScheme, RegistryEvent, RoutedService, RoutedServices,
    ServiceDescriptor, ServiceInstance,
};
