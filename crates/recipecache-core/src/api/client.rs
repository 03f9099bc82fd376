//! HTTP client for the recipe catalog endpoint.
//!
//! One GET per catalog fetch, no retries. Any non-2xx status is an
//! `InvalidResponse`; any problem with the body is a `Decoding` error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use tracing::{debug, warn};

use super::{AssetFetcher, RecipeSource};
use crate::error::{CatalogError, Result};
use crate::models::{Recipe, RecipesResponse};

// ============================================================================
// Constants
// ============================================================================

/// Public catalog served by the recipe CDN
pub const DEFAULT_ENDPOINT: &str = "https://d3jbb8n5wk0qxi.cloudfront.net/recipes.json";

/// Catalog client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RecipeClient {
    client: Client,
    endpoint: String,
}

impl RecipeClient {
    /// Create a client for the given endpoint.
    ///
    /// The endpoint is validated on each fetch, so a malformed value fails
    /// with `InvalidUrl` at that point rather than here.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(CatalogError::network)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client that shares this client's connection pool.
    pub fn with_endpoint(&self, endpoint: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "Malformed catalog endpoint");
            CatalogError::InvalidUrl(self.endpoint.clone())
        })
    }

    /// Fail on any status outside 200-299. The body is not inspected.
    fn check_status(status: StatusCode) -> Result<()> {
        if status.is_success() {
            Ok(())
        } else {
            Err(CatalogError::InvalidResponse(status.as_u16()))
        }
    }

    async fn get(&self, url: Url, accept: &'static str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, accept)
            .send()
            .await
            .map_err(CatalogError::network)?;

        Self::check_status(response.status())?;
        Ok(response)
    }
}

/// Decode a catalog body into domain records, preserving order.
///
/// Every decode failure collapses into `CatalogError::Decoding`; the parser
/// error is only logged.
pub fn decode_recipes(body: &str) -> Result<Vec<Recipe>> {
    let parsed: RecipesResponse = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Failed to parse recipe catalog");
        CatalogError::Decoding
    })?;

    Ok(parsed.recipes.into_iter().map(Recipe::from).collect())
}

#[async_trait]
impl RecipeSource for RecipeClient {
    async fn fetch_all(&self) -> Result<Vec<Recipe>> {
        let url = self.endpoint_url()?;
        debug!(url = %url, "Fetching recipe catalog");

        let response = self.get(url, "application/json").await?;
        let body = response.text().await.map_err(CatalogError::network)?;

        let recipes = decode_recipes(&body)?;
        debug!(count = recipes.len(), "Recipe catalog fetched");
        Ok(recipes)
    }
}

#[async_trait]
impl AssetFetcher for RecipeClient {
    async fn fetch_asset(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.get(url.clone(), "image/*").await?;
        let bytes = response.bytes().await.map_err(CatalogError::network)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_check_status() {
        assert!(RecipeClient::check_status(StatusCode::OK).is_ok());
        assert!(RecipeClient::check_status(StatusCode::NO_CONTENT).is_ok());

        let err = RecipeClient::check_status(StatusCode::NOT_FOUND).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse(404)));

        let err = RecipeClient::check_status(StatusCode::MOVED_PERMANENTLY).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_decode_preserves_order() {
        let body = r#"{"recipes": [
            {"cuisine": "Malaysian", "name": "Apam Balik", "uuid": "0c6ca6e7-e32a-4053-b824-1dbf749910d8"},
            {"cuisine": "British", "name": "Apple & Blackberry Crumble", "uuid": "599344f4-3c5c-4cca-b914-2210e3b3312f"},
            {"cuisine": "American", "name": "Banana Pancakes", "uuid": "f8b20884-1e54-4e72-a417-dabbc8d91f12"}
        ]}"#;

        let recipes = decode_recipes(body).expect("valid catalog");
        let names: Vec<&str> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Apam Balik", "Apple & Blackberry Crumble", "Banana Pancakes"]);
    }

    #[test]
    fn test_decode_empty_catalog() {
        let recipes = decode_recipes(r#"{"recipes": []}"#).expect("empty catalog is valid");
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_decode_errors_collapse() {
        // Malformed JSON
        assert!(matches!(decode_recipes("{\"recipes\": ["), Err(CatalogError::Decoding)));
        // Missing envelope field
        assert!(matches!(decode_recipes("{\"items\": []}"), Err(CatalogError::Decoding)));
        // Record missing a required field
        let body = r#"{"recipes": [{"cuisine": "British", "uuid": "599344f4-3c5c-4cca-b914-2210e3b3312f"}]}"#;
        assert!(matches!(decode_recipes(body), Err(CatalogError::Decoding)));
        // Type mismatch
        let body = r#"{"recipes": [{"cuisine": 7, "name": "x", "uuid": "y"}]}"#;
        assert!(matches!(decode_recipes(body), Err(CatalogError::Decoding)));
    }

    #[tokio::test]
    async fn test_fetch_all_with_malformed_endpoint() {
        let client = RecipeClient::new("not a url", None).expect("client builds");
        let err = client.fetch_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[test]
    fn test_with_endpoint_keeps_pool() {
        let client = RecipeClient::new(DEFAULT_ENDPOINT, None).expect("client builds");
        let other = client.with_endpoint("https://example.com/recipes-empty.json");
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(other.endpoint(), "https://example.com/recipes-empty.json");
    }
}
