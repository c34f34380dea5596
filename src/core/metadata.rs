use std::collections::{BTreeMap, HashMap};

use crate::models::{
    ApiInfo, Authentication, AuthenticationScheme, RoutedService, RoutedServices,
    ServiceDescriptor,
};
use crate::utils::{add_first_slash, remove_first_and_last_slash};

const API_INFO_PREFIX: &str = "apiInfo.";
const ROUTES_PREFIX: &str = "routes.";
const ROUTES_GATEWAY_URL: &str = "gatewayUrl";
const ROUTES_SERVICE_URL: &str = "serviceUrl";
const AUTHENTICATION_SCHEME: &str = "authentication.scheme";
const AUTHENTICATION_APPLID: &str = "authentication.applid";
const SERVICE_TITLE: &str = "service.title";
const SERVICE_DESCRIPTION: &str = "service.description";

/// Decodes the flat string-keyed metadata of a registered instance into
/// structured records. Parsing is pure: malformed entries are skipped and
/// logged, never surfaced to the caller.
#[derive(Debug, Default)]
pub struct MetadataParser;

impl MetadataParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `apiInfo.<n>.<field>` entries, one ApiInfo per distinct `<n>`
    pub fn parse_api_info(&self, metadata: &HashMap<String, String>) -> Vec<ApiInfo> {
        let mut collected: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();

        for (key, value) in metadata {
            if !key.starts_with(API_INFO_PREFIX) {
                continue;
            }

            let keys = key.split('.').collect::<Vec<_>>();
            if keys.len() != 3 {
                tracing::debug!("Skipping malformed apiInfo metadata key: {}", key);
                continue;
            }

            collected.entry(keys[1]).or_default().insert(keys[2], value);
        }

        collected
            .into_values()
            .map(|fields| self.build_api_info(&fields))
            .collect()
    }

    fn build_api_info(&self, fields: &BTreeMap<&str, &str>) -> ApiInfo {
        let mut info = ApiInfo {
            api_id: None,
            gateway_url: None,
            version: None,
            swagger_url: None,
            documentation_url: None,
        };

        for (&field, &value) in fields {
            match field {
                "apiId" => info.api_id = Some(value.to_string()),
                "gatewayUrl" => info.gateway_url = Some(value.to_string()),
                "version" => info.version = Some(value.to_string()),
                "swaggerUrl" => info.swagger_url = Some(value.to_string()),
                "documentationUrl" => info.documentation_url = Some(value.to_string()),
                other => {
                    tracing::debug!("Ignoring unknown apiInfo field: {}", other);
                }
            }
        }

        info
    }

    /// Parse `routes.<subId>.gatewayUrl|serviceUrl` entries into routes.
    ///
    /// A single pass keeps a pending half-built map keyed by subId; a route is
    /// emitted only when its second half arrives. A subId whose pairing never
    /// completes yields no route.
    pub fn parse_routes(&self, metadata: &HashMap<String, String>) -> RoutedServices {
        let mut pending: HashMap<&str, PendingHalf> = HashMap::new();
        let mut routes = RoutedServices::new();

        for (key, value) in metadata {
            if !key.starts_with(ROUTES_PREFIX) {
                continue;
            }

            let keys = key.split('.').collect::<Vec<_>>();
            if keys.len() != 3 {
                tracing::debug!("Skipping malformed route metadata key: {}", key);
                continue;
            }

            let sub_service_id = keys[1];
            let half = match keys[2] {
                ROUTES_GATEWAY_URL => PendingHalf::Gateway(remove_first_and_last_slash(value)),
                ROUTES_SERVICE_URL => PendingHalf::Service(add_first_slash(value)),
                other => {
                    tracing::debug!("Ignoring unknown route field: {}", other);
                    continue;
                }
            };

            match (pending.remove(sub_service_id), half) {
                (Some(PendingHalf::Service(service_url)), PendingHalf::Gateway(gateway_url))
                | (Some(PendingHalf::Gateway(gateway_url)), PendingHalf::Service(service_url)) => {
                    routes.add(RoutedService::new(sub_service_id, gateway_url, service_url));
                }
                (Some(first), _) => {
                    // same half arrived twice; keep the earlier value
                    pending.insert(sub_service_id, first);
                }
                (None, half) => {
                    pending.insert(sub_service_id, half);
                }
            }
        }

        routes
    }

    /// Parse the scalar authentication declaration. An unrecognized scheme
    /// name is logged and treated as undeclared.
    pub fn parse_authentication(&self, metadata: &HashMap<String, String>) -> Authentication {
        let scheme = metadata.get(AUTHENTICATION_SCHEME).and_then(|name| {
            let scheme = AuthenticationScheme::from_metadata(name);
            if scheme.is_none() {
                tracing::warn!("Unknown authentication scheme in metadata: {}", name);
            }
            scheme
        });

        Authentication::new(scheme, metadata.get(AUTHENTICATION_APPLID).cloned())
    }

    /// Parse the scalar service descriptors
    pub fn parse_service_descriptor(&self, metadata: &HashMap<String, String>) -> ServiceDescriptor {
        ServiceDescriptor {
            title: metadata.get(SERVICE_TITLE).cloned(),
            description: metadata.get(SERVICE_DESCRIPTION).cloned(),
        }
    }
}

#[derive(Debug)]
enum PendingHalf {
    Gateway(String),
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_api_info() {
        let parser = MetadataParser::new();
        let metadata = metadata(&[
            ("apiInfo.0.apiId", "org.example.accounts"),
            ("apiInfo.0.gatewayUrl", "api/v1"),
            ("apiInfo.0.version", "1.2.0"),
            ("apiInfo.0.swaggerUrl", "https://service/swagger"),
            ("apiInfo.1.apiId", "org.example.accounts"),
            ("apiInfo.1.version", "2.0.0"),
            ("apiInfo.1.documentationUrl", "https://docs.example.org"),
        ]);

        let infos = parser.parse_api_info(&metadata);

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].version.as_deref(), Some("1.2.0"));
        assert_eq!(infos[0].major_version(), 1);
        assert_eq!(infos[0].swagger_url.as_deref(), Some("https://service/swagger"));
        assert_eq!(infos[1].major_version(), 2);
        assert_eq!(
            infos[1].documentation_url.as_deref(),
            Some("https://docs.example.org")
        );
    }

    #[test]
    fn test_parse_api_info_unknown_field_ignored() {
        let parser = MetadataParser::new();
        let metadata = metadata(&[
            ("apiInfo.0.apiId", "org.example.accounts"),
            ("apiInfo.0.shinyNewField", "whatever"),
        ]);

        let infos = parser.parse_api_info(&metadata);

        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].api_id.as_deref(), Some("org.example.accounts"));
    }

    #[test]
    fn test_parse_api_info_non_numeric_version() {
        let parser = MetadataParser::new();
        let metadata = metadata(&[("apiInfo.0.version", "v1-beta")]);

        let infos = parser.parse_api_info(&metadata);

        assert_eq!(infos[0].major_version(), -1);
    }

    #[test]
    fn test_parse_routes_pairs_both_halves() {
        let parser = MetadataParser::new();
        let metadata = metadata(&[
            ("routes.api-v1.gatewayUrl", "/api/v1/"),
            ("routes.api-v1.serviceUrl", "x"),
            ("routes.ui.gatewayUrl", "ui"),
            ("routes.ui.serviceUrl", "/ui/"),
        ]);

        let routes = parser.parse_routes(&metadata);

        assert_eq!(routes.len(), 2);
        let api = routes.find("api-v1").unwrap();
        assert_eq!(api.gateway_url, "api/v1");
        assert_eq!(api.service_url, "/x");
        let ui = routes.find("ui").unwrap();
        assert_eq!(ui.gateway_url, "ui");
        assert_eq!(ui.service_url, "/ui/");
    }

    #[test]
    fn test_parse_routes_unpaired_half_dropped() {
        let parser = MetadataParser::new();
        let gateway_only = metadata(&[("routes.ui.gatewayUrl", "/ui/")]);
        assert!(parser.parse_routes(&gateway_only).is_empty());

        let service_only = metadata(&[("routes.ui.serviceUrl", "/ui/")]);
        assert!(parser.parse_routes(&service_only).is_empty());
    }

    #[test]
    fn test_parse_routes_ignores_unrelated_keys() {
        let parser = MetadataParser::new();
        let metadata = metadata(&[
            ("routes.api.gatewayUrl", "api"),
            ("routes.api.serviceUrl", "/api"),
            ("routes.api.extraField", "ignored"),
            ("service.title", "Accounts"),
            ("routes.broken", "too-short"),
        ]);

        let routes = parser.parse_routes(&metadata);

        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_parse_authentication() {
        let parser = MetadataParser::new();
        let meta = metadata(&[
            ("authentication.scheme", "passTicket"),
            ("authentication.applid", "TSTAPPL"),
        ]);

        let auth = parser.parse_authentication(&meta);

        assert_eq!(auth.scheme, Some(AuthenticationScheme::PassTicket));
        assert_eq!(auth.applid.as_deref(), Some("TSTAPPL"));
    }

    #[test]
    fn test_parse_authentication_unknown_scheme() {
        let parser = MetadataParser::new();
        let meta = metadata(&[("authentication.scheme", "kerberos")]);

        let auth = parser.parse_authentication(&meta);

        assert!(auth.scheme.is_none());
    }

    #[test]
    fn test_parse_service_descriptor() {
        let parser = MetadataParser::new();
        let meta = metadata(&[
            ("service.title", "Accounts"),
            ("service.description", "Account management API"),
        ]);

        let descriptor = parser.parse_service_descriptor(&meta);

        assert_eq!(descriptor.title.as_deref(), Some("Accounts"));
        assert_eq!(descriptor.description.as_deref(), Some("Account management API"));
    }
}
