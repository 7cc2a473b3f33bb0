//! Engine and geometry-service configuration.

use serde::{Deserialize, Serialize};

/// Deployment mode for the geometry-operations provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Embedded mode: projection and relation tests computed in-process.
    #[default]
    Embedded,
    /// Remote mode: operations delegated to a hosted geometry service.
    Remote,
}

/// Configuration for reaching a geometry service.
///
/// Selects between the embedded and remote providers; the remote fields are
/// only consulted when `mode` is [`DeploymentMode::Remote`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoServiceConfig {
    /// Deployment mode (embedded or remote).
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Geometry service base URL (required when mode is Remote).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer token for the remote service (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Connection timeout in milliseconds (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    /// Per-request timeout in milliseconds (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for GeoServiceConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Embedded,
            endpoint: None,
            auth_token: None,
            connect_timeout_ms: None,
            request_timeout_ms: None,
        }
    }
}

impl GeoServiceConfig {
    /// Create an embedded configuration.
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Create a remote configuration for the given endpoint.
    pub fn remote(endpoint: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Remote,
            endpoint: Some(endpoint.into()),
            ..Default::default()
        }
    }

    /// Set the authentication token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }
}

/// Size limits for the aggregation engine.
///
/// The relation path is a full pairwise comparison between all grid cells
/// and all input geometries, so it carries a hard cap. The projection path
/// caps batch size instead of silently chunking, keeping reprojection order
/// and batching cost explicit to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineLimits {
    /// Maximum geometry count for the relation aggregation path.
    pub max_relate_geometries: usize,

    /// Maximum batch size for a delegated projection request.
    pub max_projection_batch: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_relate_geometries: 1000,
            max_projection_batch: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_embedded() {
        let config = GeoServiceConfig::default();
        assert_eq!(config.mode, DeploymentMode::Embedded);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_remote_config() {
        let config = GeoServiceConfig::remote("https://geometry.example.com/rest")
            .with_auth_token("secret-token")
            .with_request_timeout_ms(10_000);

        assert_eq!(config.mode, DeploymentMode::Remote);
        assert_eq!(
            config.endpoint,
            Some("https://geometry.example.com/rest".to_string())
        );
        assert_eq!(config.auth_token, Some("secret-token".to_string()));
        assert_eq!(config.request_timeout_ms, Some(10_000));
    }

    #[test]
    fn test_default_limits() {
        let limits = EngineLimits::default();
        assert_eq!(limits.max_relate_geometries, 1000);
        assert_eq!(limits.max_projection_batch, 2000);
    }
}
