//! HTTP client for the protest-news aggregation API.

use crate::error::{ProtestApiError, Result};
use chrono::NaiveDate;
use reqwest::Client;
use std::fmt;
use std::time::Duration;

const HOST_HEADER: &str = "x-rapidapi-host";
const KEY_HEADER: &str = "x-rapidapi-key";

/// Supported output formats for feature endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutFormat {
    Esri,
    #[default]
    GeoJson,
    Json,
}

impl fmt::Display for OutFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutFormat::Esri => "esri",
            OutFormat::GeoJson => "geojson",
            OutFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Client for the protest-news aggregation API hosted at RapidAPI.
pub struct GeoProtestClient {
    client: Client,
    url: String,
    host: String,
    key: String,
}

impl GeoProtestClient {
    /// Create a client for the given base URL and RapidAPI credentials.
    ///
    /// Both the host and the key header values are required.
    pub fn new(
        url: impl Into<String>,
        host: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self> {
        let host = host.into();
        let key = key.into();
        if host.is_empty() {
            return Err(ProtestApiError::MissingHeader(HOST_HEADER));
        }
        if key.is_empty() {
            return Err(ProtestApiError::MissingHeader(KEY_HEADER));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            host,
            key,
        })
    }

    /// Binned protest/demonstration features for a day, parsed as JSON.
    ///
    /// Without a date the service returns the last 24 hours; yesterday is
    /// the latest date guaranteed to be available.
    pub async fn aggregate(
        &self,
        date: Option<NaiveDate>,
        format: OutFormat,
    ) -> Result<serde_json::Value> {
        let response = self.request("aggregate", date, Some(format)).await?;
        Ok(response.json().await?)
    }

    /// Binned protest/demonstration features for a day, as raw response text.
    pub async fn aggregate_as_text(
        &self,
        date: Option<NaiveDate>,
        format: OutFormat,
    ) -> Result<String> {
        let response = self.request("aggregate", date, Some(format)).await?;
        Ok(response.text().await?)
    }

    /// Broadcasted articles related to protests/demonstrations.
    pub async fn articles(&self, date: Option<NaiveDate>) -> Result<serde_json::Value> {
        let response = self.request("articles", date, None).await?;
        Ok(response.json().await?)
    }

    /// Hotspot locations related to protests/demonstrations, parsed as JSON.
    pub async fn hotspots(
        &self,
        date: Option<NaiveDate>,
        format: OutFormat,
    ) -> Result<serde_json::Value> {
        let response = self.request("hotspots", date, Some(format)).await?;
        Ok(response.json().await?)
    }

    /// Hotspot locations related to protests/demonstrations, as raw text.
    pub async fn hotspots_as_text(
        &self,
        date: Option<NaiveDate>,
        format: OutFormat,
    ) -> Result<String> {
        let response = self.request("hotspots", date, Some(format)).await?;
        Ok(response.text().await?)
    }

    async fn request(
        &self,
        endpoint: &str,
        date: Option<NaiveDate>,
        format: Option<OutFormat>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.url, endpoint);
        let params = query_params(date, format);

        tracing::trace!(endpoint = endpoint, "requesting protest features");

        let response = self
            .client
            .get(&url)
            .header(HOST_HEADER, &self.host)
            .header(KEY_HEADER, &self.key)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProtestApiError::Status { status, body });
        }

        Ok(response)
    }
}

impl fmt::Debug for GeoProtestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoProtestClient")
            .field("url", &self.url)
            .field("host", &self.host)
            .field("has_key", &!self.key.is_empty())
            .finish()
    }
}

fn query_params(date: Option<NaiveDate>, format: Option<OutFormat>) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(2);
    if let Some(format) = format {
        params.push(("format", format.to_string()));
    }
    if let Some(date) = date {
        params.push(("date", date.format("%Y-%m-%d").to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_format_display() {
        assert_eq!(OutFormat::Esri.to_string(), "esri");
        assert_eq!(OutFormat::GeoJson.to_string(), "geojson");
        assert_eq!(OutFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_new_requires_credentials() {
        assert!(matches!(
            GeoProtestClient::new("https://api.example.com", "", "key"),
            Err(ProtestApiError::MissingHeader(HOST_HEADER))
        ));
        assert!(matches!(
            GeoProtestClient::new("https://api.example.com", "host", ""),
            Err(ProtestApiError::MissingHeader(KEY_HEADER))
        ));
        assert!(GeoProtestClient::new("https://api.example.com/", "host", "key").is_ok());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = GeoProtestClient::new("https://api.example.com/", "host", "key").unwrap();
        assert_eq!(client.url, "https://api.example.com");
    }

    #[test]
    fn test_query_params() {
        let date = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        let params = query_params(Some(date), Some(OutFormat::GeoJson));
        assert_eq!(
            params,
            vec![
                ("format", "geojson".to_string()),
                ("date", "2022-03-14".to_string())
            ]
        );

        let params = query_params(None, None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_debug_hides_key() {
        let client =
            GeoProtestClient::new("https://api.example.com", "host", "s3cret-key").unwrap();
        let debug_output = format!("{:?}", client);
        assert!(!debug_output.contains("s3cret-key"));
    }
}
