use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::models::RegistryEvent;

/// A peer gateway instance that caches routing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPeer {
    /// Instance ID, in `host:serviceId:port` form
    pub instance_id: String,

    /// Base URL of the peer's management endpoint
    pub base_url: String,
}

impl GatewayPeer {
    pub fn new(instance_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            base_url: base_url.into(),
        }
    }
}

/// Lookup of the currently registered gateway peers
#[async_trait]
pub trait GatewayLookup: Send + Sync {
    async fn gateway_peers(&self) -> Vec<GatewayPeer>;
}

/// Issues a cache-eviction call to one peer URL
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn evict(&self, url: &str) -> Result<(), String>;
}

/// reqwest-backed eviction client
pub struct RestPeerClient {
    client: reqwest::Client,
}

impl RestPeerClient {
    pub fn new(timeout_seconds: u64) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PeerClient for RestPeerClient {
    async fn evict(&self, url: &str) -> Result<(), String> {
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("peer returned {}", response.status()))
        }
    }
}

/// Tells every other gateway instance to drop its cached routing state when
/// the registry changes.
///
/// Delivery is best effort: a failed peer is logged and skipped, never
/// retried, and never blocks the remaining peers.
pub struct RegistryChangeNotifier {
    own_instance_id: String,
    lookup: Arc<dyn GatewayLookup>,
    client: Arc<dyn PeerClient>,
}

impl RegistryChangeNotifier {
    pub fn new(
        own_instance_id: impl Into<String>,
        lookup: Arc<dyn GatewayLookup>,
        client: Arc<dyn PeerClient>,
    ) -> Self {
        Self {
            own_instance_id: own_instance_id.into(),
            lookup,
            client,
        }
    }

    /// React to a registry event: a targeted metadata change evicts one
    /// service, anything else evicts everything
    pub fn on_event(self: &Arc<Self>, event: RegistryEvent) {
        if event.changed {
            match event.service_id() {
                Some(service_id) => self.notify(Some(service_id.to_string())),
                None => {
                    tracing::warn!(
                        "Registry event with unparseable instance id '{}', evicting all services",
                        event.instance_id
                    );
                    self.notify(None);
                }
            }
        } else {
            self.notify(None);
        }
    }

    /// Fire-and-forget eviction broadcast; the caller never waits on peers
    pub fn notify(self: &Arc<Self>, service_id: Option<String>) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            notifier.broadcast(service_id.as_deref()).await;
        });
    }

    /// Evict cached state for one service (or all, when `service_id` is
    /// `None`) on every peer except this instance
    pub async fn broadcast(&self, service_id: Option<&str>) {
        let peers = self.lookup.gateway_peers().await;

        for peer in peers {
            if peer.instance_id == self.own_instance_id {
                continue;
            }

            let url = match service_id {
                Some(id) => format!("{}/cache/services/{}", peer.base_url, id),
                None => format!("{}/cache/services", peer.base_url),
            };

            if let Err(err) = self.client.evict(&url).await {
                tracing::warn!(
                    "Cache eviction on peer '{}' failed: {}",
                    peer.instance_id,
                    err
                );
            } else {
                tracing::debug!("Evicted cache on peer '{}'", peer.instance_id);
            }
        }
    }
}
