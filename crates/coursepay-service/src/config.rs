//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/coursepay").
    pub data_dir: String,

    /// Shared secret for validating identity-provider JWTs (HS256).
    pub auth_jwt_secret: Option<String>,

    /// Service API key for support tooling (manual credits).
    pub service_api_key: Option<String>,

    /// Payment gateway merchant key.
    pub gateway_key: Option<String>,

    /// Payment gateway signing salt.
    pub gateway_salt: Option<String>,

    /// Payment gateway base URL.
    pub gateway_base_url: Option<String>,

    /// Public base URL of this deployment, used to build the signed
    /// success/failure redirect URLs.
    pub app_url: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Gateway secrets file structure.
#[derive(Debug, Deserialize)]
struct GatewaySecrets {
    key: String,
    salt: String,
    base_url: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        // Try to load gateway secrets from file first, then fall back to env vars
        let (gateway_key, gateway_salt, gateway_base_url) = load_gateway_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/coursepay".into()),
            auth_jwt_secret: std::env::var("AUTH_JWT_SECRET").ok(),
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            gateway_key,
            gateway_salt,
            gateway_base_url,
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Whether the three gateway settings needed to initiate payments are present.
    #[must_use]
    pub fn gateway_configured(&self) -> bool {
        self.gateway_key.is_some() && self.gateway_salt.is_some() && self.gateway_base_url.is_some()
    }
}

/// Load gateway secrets from file or environment.
fn load_gateway_secrets() -> (Option<String>, Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/gateway.json",
        "coursepay/.secrets/gateway.json",
        "../.secrets/gateway.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<GatewaySecrets>(path) {
            tracing::info!(path = %path, "Loaded gateway secrets from file");
            return (
                Some(secrets.key),
                Some(secrets.salt),
                Some(secrets.base_url),
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("Gateway secrets file not found, using environment variables");
    (
        std::env::var("GATEWAY_KEY").ok(),
        std::env::var("GATEWAY_SALT").ok(),
        std::env::var("GATEWAY_BASE_URL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/coursepay".into(),
            auth_jwt_secret: None,
            service_api_key: None,
            gateway_key: None,
            gateway_salt: None,
            gateway_base_url: None,
            app_url: "http://localhost:3000".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
