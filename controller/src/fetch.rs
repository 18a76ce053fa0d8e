//! Configuration retrieval
//!
//! Controller, assessment and item configuration are JSON documents under a
//! common base, either an HTTP(S) URL or a local directory:
//!
//! ```text
//! {base}/controller/config.json
//! {base}/assessments/config.json
//! {base}/items/{name}/config.json
//! ```
//!
//! Every document is validated after decoding; a shape mismatch fails the
//! fetch just like a transport error does.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared_types::{
    AssessmentConfiguration, ConfigError, ControllerConfiguration, ItemConfiguration,
};
use std::path::PathBuf;
use std::sync::Arc;

pub const CONTROLLER_CONFIG_PATH: &str = "controller/config.json";
pub const ASSESSMENT_CONFIG_PATH: &str = "assessments/config.json";

pub fn item_config_path(name: &str) -> String {
    format!("items/{name}/config.json")
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("invalid configuration base: {0}")]
    InvalidBase(String),

    #[error("invalid item name: {0:?}")]
    InvalidItemName(String),

    #[error("request for {path} failed: {message}")]
    Request { path: String, message: String },

    #[error("request for {path} returned status {status}")]
    Status { path: String, status: u16 },

    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("could not decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ConfigError,
    },
}

/// An item configuration plus the full document it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedItem {
    pub config: ItemConfiguration,
    pub document: serde_json::Value,
}

/// Asynchronous access to the configuration documents.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Raw JSON document at `path`, relative to the base
    async fn fetch_document(&self, path: &str) -> Result<serde_json::Value, FetchError>;

    async fn controller_config(&self) -> Result<ControllerConfiguration, FetchError> {
        let document = self.fetch_document(CONTROLLER_CONFIG_PATH).await?;
        let config: ControllerConfiguration = decode(CONTROLLER_CONFIG_PATH, document)?;
        config.validate().map_err(|source| FetchError::Invalid {
            path: CONTROLLER_CONFIG_PATH.to_string(),
            source,
        })?;
        Ok(config)
    }

    async fn assessment_config(&self) -> Result<AssessmentConfiguration, FetchError> {
        let document = self.fetch_document(ASSESSMENT_CONFIG_PATH).await?;
        let config: AssessmentConfiguration = decode(ASSESSMENT_CONFIG_PATH, document)?;
        config.validate().map_err(|source| FetchError::Invalid {
            path: ASSESSMENT_CONFIG_PATH.to_string(),
            source,
        })?;
        Ok(config)
    }

    async fn item_config(&self, name: &str) -> Result<FetchedItem, FetchError> {
        if name.is_empty() || name == ".." || name.contains(['/', '\\']) {
            return Err(FetchError::InvalidItemName(name.to_string()));
        }
        let path = item_config_path(name);
        let document = self.fetch_document(&path).await?;
        let config: ItemConfiguration = decode(&path, document.clone())?;
        config
            .validate()
            .map_err(|source| FetchError::Invalid {
                path: path.clone(),
                source,
            })?;
        Ok(FetchedItem { config, document })
    }
}

fn decode<T: DeserializeOwned>(path: &str, document: serde_json::Value) -> Result<T, FetchError> {
    serde_json::from_value(document).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Pick the source for `base`: URLs are fetched over HTTP, anything else is a
/// directory on disk.
pub fn config_source(base: &str) -> Result<Arc<dyn ConfigSource>, FetchError> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(Arc::new(HttpConfigSource::new(base)?))
    } else {
        Ok(Arc::new(DirConfigSource::new(base)))
    }
}

// ============================================================================
// HTTP
// ============================================================================

pub struct HttpConfigSource {
    client: reqwest::Client,
    base: url::Url,
}

impl HttpConfigSource {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = url::Url::parse(&normalized)
            .map_err(|e| FetchError::InvalidBase(format!("{base}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn fetch_document(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FetchError::InvalidBase(e.to_string()))?;
        let request_error = |e: reqwest::Error| FetchError::Request {
            path: path.to_string(),
            message: e.to_string(),
        };

        tracing::debug!(url = %url, "Fetching configuration");
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Directory
// ============================================================================

pub struct DirConfigSource {
    root: PathBuf,
}

impl DirConfigSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ConfigSource for DirConfigSource {
    async fn fetch_document(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        let file = self.root.join(path);
        let text = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| FetchError::Io {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        serde_json::from_str(&text).map_err(|e| FetchError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
