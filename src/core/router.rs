use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::RwLock;

use crate::models::{ApiInfo, Authentication, RoutedService, RoutedServices};
use crate::utils::{add_first_slash, remove_first_and_last_slash};

/// Matching predicate consumed by the forwarding engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePredicate {
    /// Match the request path against an ant-style pattern
    Path { pattern: String },

    /// Match a routing header against a regular expression
    Header { header: String, regexp: String },
}

impl RoutePredicate {
    /// Check a routing-header value against a Header predicate.
    /// Path predicates are evaluated by the forwarding engine itself.
    pub fn matches_header(&self, value: &str) -> bool {
        match self {
            RoutePredicate::Header { regexp, .. } => Regex::new(&format!("^{regexp}$"))
                .map(|re| re.is_match(value))
                .unwrap_or(false),
            RoutePredicate::Path { .. } => false,
        }
    }
}

/// Rewrite transform consumed by the forwarding engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteFilter {
    /// Rewrite the matched gateway path into the backend path
    RewritePath { regexp: String, replacement: String },

    /// Consume the routing header to select the next hop instead of
    /// rewriting the path; used when a request cascades through more than
    /// one gateway before reaching the terminal backend
    HeaderRouteStep { header: String },
}

impl RouteFilter {
    /// Apply a RewritePath filter to a request path
    pub fn rewrite(&self, path: &str) -> Option<String> {
        match self {
            RouteFilter::RewritePath { regexp, replacement } => {
                let re = Regex::new(&format!("^{regexp}$")).ok()?;
                if !re.is_match(path) {
                    return None;
                }
                Some(re.replace(path, replacement.as_str()).into_owned())
            }
            RouteFilter::HeaderRouteStep { .. } => None,
        }
    }
}

/// One routing rule: predicate, rewrite and evaluation order.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRule {
    pub service_id: String,
    pub predicate: RoutePredicate,
    pub filter: RouteFilter,
    pub priority: i32,
    pub order: i32,
}

/// Strategy turning one routed service into a predicate/filter pair.
/// Builders with a numerically lower priority are evaluated first.
pub trait RouteRuleBuilder: Send + Sync {
    fn build_predicate(&self, service_id: &str, route: &RoutedService) -> RoutePredicate;

    fn build_filter(&self, service_id: &str, route: &RoutedService) -> RouteFilter;

    fn priority(&self) -> i32;
}

/// Routes by base path: `/<serviceId>/<basePath>/**`
pub struct ByBasePath;

impl ByBasePath {
    fn base_path(route: &RoutedService) -> String {
        remove_first_and_last_slash(&route.gateway_url)
    }
}

impl RouteRuleBuilder for ByBasePath {
    fn build_predicate(&self, service_id: &str, route: &RoutedService) -> RoutePredicate {
        RoutePredicate::Path {
            pattern: format!("/{}/{}/**", service_id, Self::base_path(route)),
        }
    }

    fn build_filter(&self, service_id: &str, route: &RoutedService) -> RouteFilter {
        RouteFilter::RewritePath {
            regexp: format!("/{}/{}/?(?<remaining>.*)", service_id, Self::base_path(route)),
            replacement: format!("{}/${{remaining}}", add_first_slash(&route.service_url)),
        }
    }

    fn priority(&self) -> i32 {
        1
    }
}

/// Routes by a forwarding header: matches `<serviceId>(/.*)?` and consumes
/// the header to select the next hop
pub struct ByHeader {
    header: String,
}

impl ByHeader {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl RouteRuleBuilder for ByHeader {
    fn build_predicate(&self, service_id: &str, _route: &RoutedService) -> RoutePredicate {
        RoutePredicate::Header {
            header: self.header.clone(),
            regexp: format!("{service_id}(/.*)?"),
        }
    }

    fn build_filter(&self, _service_id: &str, _route: &RoutedService) -> RouteFilter {
        RouteFilter::HeaderRouteStep {
            header: self.header.clone(),
        }
    }

    fn priority(&self) -> i32 {
        0
    }
}

/// Build the full rule set for one service.
///
/// Routes are ordered longest gateway path first so a general pattern never
/// shadows a more specific one; for each route the builders run in priority
/// order and every produced rule gets the next evaluation order.
pub fn build_rules(
    service_id: &str,
    routes: &RoutedServices,
    builders: &[Box<dyn RouteRuleBuilder>],
) -> Vec<RoutingRule> {
    let mut sorted_routes = routes.iter().collect::<Vec<_>>();
    sorted_routes.sort_by(|a, b| {
        let a_len = remove_first_and_last_slash(&a.gateway_url).len();
        let b_len = remove_first_and_last_slash(&b.gateway_url).len();
        b_len.cmp(&a_len)
    });

    let mut sorted_builders = builders.iter().collect::<Vec<_>>();
    sorted_builders.sort_by_key(|b| b.priority());

    let mut order = 0;
    let mut rules = Vec::with_capacity(sorted_routes.len() * sorted_builders.len());

    for route in sorted_routes {
        for builder in &sorted_builders {
            rules.push(RoutingRule {
                service_id: service_id.to_string(),
                predicate: builder.build_predicate(service_id, route),
                filter: builder.build_filter(service_id, route),
                priority: builder.priority(),
                order,
            });
            order += 1;
        }
    }

    rules
}

/// Complete routing/auth snapshot for one service, replaced atomically on
/// every metadata refresh
#[derive(Debug, Clone)]
pub struct PublishedRoutes {
    pub service_id: String,
    pub routes: RoutedServices,
    pub rules: Vec<RoutingRule>,
    pub api_info: Vec<ApiInfo>,
    pub authentication: Authentication,
}

/// Per-service route snapshots.
///
/// Readers always see either the old or the new complete snapshot: a refresh
/// swaps the whole `Arc` under the write lock, it never mutates in place.
#[derive(Debug, Default)]
pub struct RouteTable {
    services: RwLock<HashMap<String, Arc<PublishedRoutes>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fresh snapshot for a service
    pub async fn publish(&self, published: PublishedRoutes) {
        let mut services = self.services.write().await;
        services.insert(published.service_id.clone(), Arc::new(published));
    }

    /// Current snapshot for a service, if any
    pub async fn snapshot(&self, service_id: &str) -> Option<Arc<PublishedRoutes>> {
        let services = self.services.read().await;
        services.get(service_id).cloned()
    }

    /// Drop the snapshot for one service, or every snapshot when no service
    /// id is given. This is the receiving side of a registry-change
    /// invalidation call.
    pub async fn invalidate(&self, service_id: Option<&str>) {
        let mut services = self.services.write().await;
        match service_id {
            Some(id) => {
                services.remove(id);
            }
            None => services.clear(),
        }
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoutedService;

    fn route(gateway_url: &str, service_url: &str) -> RoutedService {
        RoutedService::new("api-v1", gateway_url, service_url)
    }

    #[test]
    fn test_base_path_predicate_normalizes_slashes() {
        let builder = ByBasePath;

        for input in ["a", "/a", "a/", "/a/"] {
            let predicate = builder.build_predicate("svc", &route(input, "/x"));
            assert_eq!(
                predicate,
                RoutePredicate::Path {
                    pattern: "/svc/a/**".to_string()
                },
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_base_path_predicate_all_slashes_is_empty_base() {
        let builder = ByBasePath;
        let predicate = builder.build_predicate("svc", &route("//", "/x"));
        assert_eq!(
            predicate,
            RoutePredicate::Path {
                pattern: "/svc//**".to_string()
            }
        );
    }

    #[test]
    fn test_base_path_filter_round_trip() {
        let builder = ByBasePath;

        for service_url in ["x", "/x"] {
            let filter = builder.build_filter("svc", &route("/api/v1/", service_url));
            assert_eq!(
                filter,
                RouteFilter::RewritePath {
                    regexp: "/svc/api/v1/?(?<remaining>.*)".to_string(),
                    replacement: "/x/${remaining}".to_string(),
                }
            );

            assert_eq!(
                filter.rewrite("/svc/api/v1/accounts/42").as_deref(),
                Some("/x/accounts/42")
            );
            assert_eq!(filter.rewrite("/svc/api/v1").as_deref(), Some("/x/"));
            assert_eq!(filter.rewrite("/other/api/v1/accounts"), None);
        }
    }

    #[test]
    fn test_header_predicate_and_filter() {
        let builder = ByHeader::new("X-Forward-To");

        let predicate = builder.build_predicate("svc", &route("api/v1", "/x"));
        assert_eq!(
            predicate,
            RoutePredicate::Header {
                header: "X-Forward-To".to_string(),
                regexp: "svc(/.*)?".to_string(),
            }
        );
        assert!(predicate.matches_header("svc"));
        assert!(predicate.matches_header("svc/api/v1"));
        assert!(!predicate.matches_header("svc2"));
        assert!(!predicate.matches_header("other"));

        assert_eq!(
            builder.build_filter("svc", &route("api/v1", "/x")),
            RouteFilter::HeaderRouteStep {
                header: "X-Forward-To".to_string()
            }
        );
    }

    #[test]
    fn test_header_takes_precedence_over_base_path() {
        assert!(ByHeader::new("X-Forward-To").priority() < ByBasePath.priority());
    }

    #[test]
    fn test_build_rules_orders_by_path_length_and_priority() {
        let mut routes = RoutedServices::new();
        routes.add(RoutedService::new("ui", "/", "/ui"));
        routes.add(RoutedService::new("api-v1", "/api/v1", "/api"));

        let builders: Vec<Box<dyn RouteRuleBuilder>> =
            vec![Box::new(ByBasePath), Box::new(ByHeader::new("X-Forward-To"))];

        let rules = build_rules("svc", &routes, &builders);

        assert_eq!(rules.len(), 4);
        // longest gateway path first, header builder before base path
        assert_eq!(rules[0].priority, 0);
        assert!(matches!(rules[0].filter, RouteFilter::HeaderRouteStep { .. }));
        assert_eq!(
            rules[1].predicate,
            RoutePredicate::Path {
                pattern: "/svc/api/v1/**".to_string()
            }
        );
        assert_eq!(
            rules[3].predicate,
            RoutePredicate::Path {
                pattern: "/svc//**".to_string()
            }
        );
        assert_eq!(
            rules.iter().map(|r| r.order).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_route_table_swaps_snapshots() {
        let table = RouteTable::new();

        let mut routes = RoutedServices::new();
        routes.add(RoutedService::new("api-v1", "api/v1", "/api"));
        table
            .publish(PublishedRoutes {
                service_id: "svc".to_string(),
                routes: routes.clone(),
                rules: Vec::new(),
                api_info: Vec::new(),
                authentication: Default::default(),
            })
            .await;

        let old = table.snapshot("svc").await.unwrap();
        assert_eq!(old.routes.len(), 1);

        let mut refreshed = RoutedServices::new();
        refreshed.add(RoutedService::new("api-v1", "api/v1", "/api"));
        refreshed.add(RoutedService::new("ui", "ui", "/ui"));
        table
            .publish(PublishedRoutes {
                service_id: "svc".to_string(),
                routes: refreshed,
                rules: Vec::new(),
                api_info: Vec::new(),
                authentication: Default::default(),
            })
            .await;

        // the snapshot taken before the refresh is unchanged
        assert_eq!(old.routes.len(), 1);
        assert_eq!(table.snapshot("svc").await.unwrap().routes.len(), 2);
    }

    #[tokio::test]
    async fn test_route_table_invalidate() {
        let table = RouteTable::new();
        for id in ["a", "b"] {
            table
                .publish(PublishedRoutes {
                    service_id: id.to_string(),
                    routes: RoutedServices::new(),
                    rules: Vec::new(),
                    api_info: Vec::new(),
                    authentication: Default::default(),
                })
                .await;
        }

        table.invalidate(Some("a")).await;
        assert!(table.snapshot("a").await.is_none());
        assert!(table.snapshot("b").await.is_some());

        table.invalidate(None).await;
        assert!(table.is_empty().await);
    }
}
