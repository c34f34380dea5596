// Models shared across the gateway core

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One registered instance of a backend service, as seen in the registry
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    /// Instance ID, in `host:serviceId:port` form
    pub instance_id: String,

    /// Service ID the instance registered under
    pub service_id: String,

    /// Base URL of the instance
    pub base_url: String,

    /// Flat registration metadata
    pub metadata: HashMap<String, String>,
}

impl ServiceInstance {
    pub fn new(
        instance_id: impl Into<String>,
        service_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            service_id: service_id.into(),
            base_url: base_url.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Published API version information for one registered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// API identifier, e.g. `org.example.accounts`
    pub api_id: Option<String>,

    /// Gateway-side URL prefix the API is exposed under
    pub gateway_url: Option<String>,

    /// Dotted version string, e.g. `1.2.0`
    pub version: Option<String>,

    /// URL of the API description document
    pub swagger_url: Option<String>,

    /// URL of the human-readable documentation
    pub documentation_url: Option<String>,
}

impl ApiInfo {
    /// Leading integer of `version`, or `-1` when absent or non-numeric
    pub fn major_version(&self) -> i32 {
        self.version
            .as_deref()
            .and_then(|v| v.split('.').next())
            .and_then(|major| major.trim().parse::<i32>().ok())
            .unwrap_or(-1)
    }
}

/// One path mapping from the gateway's external namespace to a backend's
/// internal namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedService {
    /// Sub-identifier of the route group, e.g. `ui` or `api-v1`
    pub sub_service_id: String,

    /// Gateway-side path, stored without leading and trailing slashes
    pub gateway_url: String,

    /// Backend-side path, stored with exactly one leading slash
    pub service_url: String,
}

impl RoutedService {
    pub fn new(
        sub_service_id: impl Into<String>,
        gateway_url: impl Into<String>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            sub_service_id: sub_service_id.into(),
            gateway_url: gateway_url.into(),
            service_url: service_url.into(),
        }
    }
}

/// Ordered collection of routes owned by one registered instance.
/// Rebuilt fully on every metadata refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutedServices {
    routes: Vec<RoutedService>,
}

impl RoutedServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: RoutedService) {
        self.routes.push(route);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutedService> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find a route group by its sub-identifier
    pub fn find(&self, sub_service_id: &str) -> Option<&RoutedService> {
        self.routes.iter().find(|r| r.sub_service_id == sub_service_id)
    }
}

impl FromIterator<RoutedService> for RoutedServices {
    fn from_iter<T: IntoIterator<Item = RoutedService>>(iter: T) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

/// Authentication scheme a service declares in its registration metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticationScheme {
    /// Forward the request without injecting any credential
    Bypass,

    /// Re-attach the caller's own bearer token
    ForwardToken,

    /// Exchange the caller's identity for a mainframe identity token
    SafIdt,

    /// Generate a one-time pass ticket for the target application
    PassTicket,
}

impl AuthenticationScheme {
    /// Map a metadata scheme name; unknown names yield `None`
    pub fn from_metadata(value: &str) -> Option<Self> {
        match value {
            "bypass" => Some(Self::Bypass),
            "forwardToken" => Some(Self::ForwardToken),
            "safIdt" => Some(Self::SafIdt),
            "passTicket" => Some(Self::PassTicket),
            _ => None,
        }
    }
}

/// Authentication declaration parsed from a service's registration metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Authentication {
    /// Declared scheme; `None` when undeclared or unrecognized
    pub scheme: Option<AuthenticationScheme>,

    /// Mainframe application id the service authenticates against
    pub applid: Option<String>,
}

impl Authentication {
    pub fn new(scheme: Option<AuthenticationScheme>, applid: Option<String>) -> Self {
        Self { scheme, applid }
    }

    pub fn is_empty(&self) -> bool {
        self.scheme.is_none() && self.applid.is_none()
    }
}

/// Human-readable service descriptors parsed from scalar metadata keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Change event emitted by the registry.
///
/// `changed == true` is a targeted instance-metadata change; anything else is
/// a structural availability event that invalidates everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    pub instance_id: String,
    pub changed: bool,
}

impl RegistryEvent {
    /// Service id embedded in a `host:serviceId:port` instance id
    pub fn service_id(&self) -> Option<&str> {
        let mut parts = self.instance_id.split(':');
        parts.next()?;
        parts.next()
    }
}
