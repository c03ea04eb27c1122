//! Application state.

use std::sync::Arc;

use coursepay_store::RocksStore;

use crate::config::ServiceConfig;
use crate::gateway::GatewayClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Payment gateway client (optional).
    pub gateway: Option<Arc<GatewayClient>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        let gateway = match (
            config.gateway_key.as_ref(),
            config.gateway_salt.as_ref(),
            config.gateway_base_url.as_ref(),
        ) {
            (Some(key), Some(salt), Some(base_url)) => {
                tracing::info!(gateway_url = %base_url, "Payment gateway integration enabled");
                Some(Arc::new(GatewayClient::new(key, salt, base_url)))
            }
            _ => None,
        };

        if gateway.is_none() {
            tracing::warn!("Payment gateway not configured - top-ups will not be available");
        }

        Self {
            store,
            config,
            gateway,
        }
    }

    /// Check if the payment gateway is configured.
    #[must_use]
    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }
}
