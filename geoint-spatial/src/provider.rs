//! Geometry-operations provider trait.
//!
//! Abstracts over embedded (in-process) and remote (hosted geometry
//! service) implementations of the two collaborator capabilities the
//! engine consumes: batch reprojection and the pairwise intersection
//! relation test. The aggregation engine works identically with either
//! backend; which one is used is a configuration choice, never a
//! subclassing one.
//!
//! # Resource scoping
//!
//! The remote provider owns its HTTP session for the provider's lifetime
//! and releases it on drop, on every exit path (success, validation
//! failure, or transport error), including calls where the service is
//! never reached.

use crate::config::{DeploymentMode, GeoServiceConfig};
use crate::crs::Crs;
use crate::error::{Result, SpatialError};
use async_trait::async_trait;
use geo::{BoundingRect, Intersects};
use geo_types::{Geometry, Polygon};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Geometry-operations provider.
///
/// Both operations preserve input cardinality and order. Failures are
/// synchronous; no retries are attempted.
#[async_trait]
pub trait GeoOperationsProvider: Send + Sync {
    /// Reproject a geometry batch from `source` to `target`.
    async fn project(
        &self,
        geometries: &[Geometry<f64>],
        source: Crs,
        target: Crs,
    ) -> Result<Vec<Geometry<f64>>>;

    /// Return every intersecting `(cell index, geometry index)` pair between
    /// the cell polygons and the input geometries, evaluated in `crs`.
    async fn relate_intersects(
        &self,
        cells: &[Polygon<f64>],
        geometries: &[Geometry<f64>],
        crs: Crs,
    ) -> Result<Vec<(usize, usize)>>;
}

/// In-process provider.
///
/// Projects 4326↔3857 via the closed-form spherical Mercator transform and
/// evaluates the intersection relation with the `geo` crate, with a
/// bounding-box pre-filter ahead of the exact test.
#[derive(Debug, Default, Clone)]
pub struct EmbeddedGeoProvider;

impl EmbeddedGeoProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GeoOperationsProvider for EmbeddedGeoProvider {
    async fn project(
        &self,
        geometries: &[Geometry<f64>],
        source: Crs,
        target: Crs,
    ) -> Result<Vec<Geometry<f64>>> {
        if source == target {
            return Ok(geometries.to_vec());
        }

        match (source, target) {
            (Crs::WGS84, Crs::WEB_MERCATOR) => Ok(geometries
                .iter()
                .map(crate::mercator::project_geometry_forward)
                .collect()),
            (Crs::WEB_MERCATOR, Crs::WGS84) => Ok(geometries
                .iter()
                .map(crate::mercator::project_geometry_inverse)
                .collect()),
            (source, target) => Err(SpatialError::InvalidParameter(format!(
                "embedded provider cannot project {} -> {}",
                source, target
            ))),
        }
    }

    async fn relate_intersects(
        &self,
        cells: &[Polygon<f64>],
        geometries: &[Geometry<f64>],
        _crs: Crs,
    ) -> Result<Vec<(usize, usize)>> {
        // Bounding boxes once per operand; the exact test only runs for
        // pairs whose boxes overlap.
        let geometry_boxes: Vec<_> = geometries.iter().map(|g| g.bounding_rect()).collect();

        let mut pairs = Vec::new();
        for (cell_index, cell) in cells.iter().enumerate() {
            let cell_box = cell.bounding_rect();
            for (geometry_index, geometry) in geometries.iter().enumerate() {
                if let (Some(cb), Some(gb)) = (cell_box, geometry_boxes[geometry_index]) {
                    if !cb.intersects(&gb) {
                        continue;
                    }
                }
                if cell.intersects(geometry) {
                    pairs.push((cell_index, geometry_index));
                }
            }
        }

        tracing::trace!(
            cells = cells.len(),
            geometries = geometries.len(),
            pairs = pairs.len(),
            "evaluated intersection relation"
        );

        Ok(pairs)
    }
}

/// Wire request for the remote projection operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRequest<'a> {
    geometries: &'a [Geometry<f64>],
    source_wkid: i32,
    target_wkid: i32,
}

/// Wire response for the remote projection operation.
#[derive(Debug, Deserialize)]
struct ProjectResponse {
    geometries: Option<Vec<Geometry<f64>>>,
}

/// Wire request for the remote relation operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelateRequest<'a> {
    cells: &'a [Polygon<f64>],
    geometries: &'a [Geometry<f64>],
    wkid: i32,
    relation: &'static str,
}

/// One intersecting pair in a relate response.
#[derive(Debug, Deserialize)]
struct RelationPair {
    #[serde(rename = "geometry1Index")]
    cell_index: usize,
    #[serde(rename = "geometry2Index")]
    geometry_index: usize,
}

/// Wire response for the remote relation operation.
#[derive(Debug, Deserialize)]
struct RelateResponse {
    relations: Option<Vec<RelationPair>>,
}

fn decode_projection(response: ProjectResponse, expected: usize) -> Result<Vec<Geometry<f64>>> {
    let geometries = response.geometries.ok_or_else(|| {
        SpatialError::ContractViolation("projection response missing 'geometries' field".into())
    })?;
    if geometries.len() != expected {
        return Err(SpatialError::ContractViolation(format!(
            "projection response returned {} geometries for a batch of {}",
            geometries.len(),
            expected
        )));
    }
    Ok(geometries)
}

fn decode_relations(response: RelateResponse) -> Result<Vec<(usize, usize)>> {
    let relations = response.relations.ok_or_else(|| {
        SpatialError::ContractViolation("relate response missing 'relations' field".into())
    })?;
    Ok(relations
        .into_iter()
        .map(|pair| (pair.cell_index, pair.geometry_index))
        .collect())
}

/// Remote provider delegating to a hosted geometry service over HTTP.
///
/// POSTs JSON to `{endpoint}/project` and `{endpoint}/relate`. A response
/// missing its required field is a [`SpatialError::ContractViolation`];
/// transport failures surface as [`SpatialError::Remote`].
pub struct RemoteGeoProvider {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl RemoteGeoProvider {
    /// Create a remote provider from configuration.
    pub fn from_config(config: &GeoServiceConfig) -> Result<Self> {
        if config.mode != DeploymentMode::Remote {
            return Err(SpatialError::InvalidParameter(
                "remote provider requires mode 'remote'".to_string(),
            ));
        }
        let endpoint = config.endpoint.as_ref().ok_or_else(|| {
            SpatialError::InvalidParameter("remote geo service config missing 'endpoint'".into())
        })?;

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms.unwrap_or(5_000));
        let request_timeout = Duration::from_millis(config.request_timeout_ms.unwrap_or(30_000));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| SpatialError::Remote(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Create a remote provider with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }

    /// Set the authentication token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    async fn post_json<Req: Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/{}", self.endpoint, path);
        let mut http_request = self.client.post(&url).json(request);
        if let Some(ref token) = self.auth_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                SpatialError::Remote(format!("geometry service timeout: {}", e))
            } else if e.is_connect() {
                SpatialError::Remote(format!("failed to connect to geometry service: {}", e))
            } else {
                SpatialError::Remote(format!("geometry service request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpatialError::Remote(format!(
                "geometry service returned {}: {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            SpatialError::ContractViolation(format!(
                "failed to parse geometry service response: {}",
                e
            ))
        })
    }
}

impl fmt::Debug for RemoteGeoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteGeoProvider")
            .field("endpoint", &self.endpoint)
            .field("has_auth_token", &self.auth_token.is_some())
            .finish()
    }
}

#[async_trait]
impl GeoOperationsProvider for RemoteGeoProvider {
    async fn project(
        &self,
        geometries: &[Geometry<f64>],
        source: Crs,
        target: Crs,
    ) -> Result<Vec<Geometry<f64>>> {
        if source == target {
            return Ok(geometries.to_vec());
        }

        let request = ProjectRequest {
            geometries,
            source_wkid: source.wkid(),
            target_wkid: target.wkid(),
        };
        let response: ProjectResponse = self.post_json("project", &request).await?;
        decode_projection(response, geometries.len())
    }

    async fn relate_intersects(
        &self,
        cells: &[Polygon<f64>],
        geometries: &[Geometry<f64>],
        crs: Crs,
    ) -> Result<Vec<(usize, usize)>> {
        let request = RelateRequest {
            cells,
            geometries,
            wkid: crs.wkid(),
            relation: "intersects",
        };
        let response: RelateResponse = self.post_json("relate", &request).await?;
        decode_relations(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, LineString, Point};

    fn square(xmin: f64, ymin: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                coord! { x: xmin, y: ymin },
                coord! { x: xmin, y: ymin + size },
                coord! { x: xmin + size, y: ymin + size },
                coord! { x: xmin + size, y: ymin },
                coord! { x: xmin, y: ymin },
            ]),
            vec![],
        )
    }

    #[tokio::test]
    async fn test_embedded_identity_projection_is_noop() {
        let provider = EmbeddedGeoProvider::new();
        let input = vec![Geometry::Point(Point::new(12.0, 51.0))];
        let output = provider
            .project(&input, Crs::WGS84, Crs::WGS84)
            .await
            .unwrap();
        assert_eq!(input, output);
    }

    #[tokio::test]
    async fn test_embedded_projection_rejects_unknown_pair() {
        let provider = EmbeddedGeoProvider::new();
        let input = vec![Geometry::Point(Point::new(12.0, 51.0))];
        let result = provider.project(&input, Crs(25832), Crs::WEB_MERCATOR).await;
        assert!(matches!(result, Err(SpatialError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_embedded_projection_round_trip() {
        let provider = EmbeddedGeoProvider::new();
        let input = vec![
            Geometry::Point(Point::new(12.24555, 51.83864)),
            Geometry::Point(Point::new(-122.4194, 37.7749)),
        ];
        let projected = provider
            .project(&input, Crs::WGS84, Crs::WEB_MERCATOR)
            .await
            .unwrap();
        let back = provider
            .project(&projected, Crs::WEB_MERCATOR, Crs::WGS84)
            .await
            .unwrap();

        for (a, b) in input.iter().zip(&back) {
            let (Geometry::Point(pa), Geometry::Point(pb)) = (a, b) else {
                panic!("expected points");
            };
            assert!((pa.x() - pb.x()).abs() < 1e-6);
            assert!((pa.y() - pb.y()).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_embedded_relate_finds_intersecting_pairs() {
        let provider = EmbeddedGeoProvider::new();
        let cells = vec![square(0.0, 0.0, 10.0), square(10.0, 0.0, 10.0)];
        let geometries = vec![
            Geometry::Polygon(square(5.0, 2.0, 10.0)), // spans both cells
            Geometry::Point(Point::new(2.0, 2.0)),     // first cell only
            Geometry::Point(Point::new(50.0, 50.0)),   // no cell
        ];

        let pairs = provider
            .relate_intersects(&cells, &geometries, Crs::WEB_MERCATOR)
            .await
            .unwrap();

        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_decode_relations_missing_field_is_contract_violation() {
        let response: RelateResponse = serde_json::from_str("{}").unwrap();
        let result = decode_relations(response);
        assert!(matches!(result, Err(SpatialError::ContractViolation(_))));
    }

    #[test]
    fn test_decode_relations_pairs() {
        let response: RelateResponse = serde_json::from_str(
            r#"{"relations": [
                {"geometry1Index": 3, "geometry2Index": 0},
                {"geometry1Index": 3, "geometry2Index": 1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(decode_relations(response).unwrap(), vec![(3, 0), (3, 1)]);
    }

    #[test]
    fn test_decode_projection_count_mismatch() {
        let response = ProjectResponse {
            geometries: Some(vec![Geometry::Point(Point::new(0.0, 0.0))]),
        };
        let result = decode_projection(response, 2);
        assert!(matches!(result, Err(SpatialError::ContractViolation(_))));
    }

    #[test]
    fn test_remote_from_config_requires_endpoint() {
        let mut config = GeoServiceConfig::default();
        config.mode = DeploymentMode::Remote;
        assert!(RemoteGeoProvider::from_config(&config).is_err());

        let config = GeoServiceConfig::embedded();
        assert!(RemoteGeoProvider::from_config(&config).is_err());
    }

    #[test]
    fn test_remote_from_config_with_endpoint() {
        let config = GeoServiceConfig::remote("https://geometry.example.com/rest/")
            .with_auth_token("secret-token");
        let provider = RemoteGeoProvider::from_config(&config).unwrap();
        assert_eq!(provider.endpoint, "https://geometry.example.com/rest");
        assert_eq!(provider.auth_token, Some("secret-token".to_string()));
    }

    #[test]
    fn test_remote_debug_hides_token() {
        let provider = RemoteGeoProvider::new("https://geometry.example.com").with_auth_token("s3cret");
        let debug_output = format!("{:?}", provider);
        assert!(debug_output.contains("has_auth_token: true"));
        assert!(!debug_output.contains("s3cret"));
    }
}
