//! Menu service client (order service → catalog).

use reqwest::{Client, StatusCode};
use url::Url;

use super::ClientError;
use crate::objects::MenuItem;

/// Typed HTTP client for the menu service's catalog lookup endpoint.
#[derive(Debug, Clone)]
pub struct MenuClient {
    http: Client,
    base_url: Url,
}

impl MenuClient {
    /// Create a new `MenuClient`.
    ///
    /// * `base_url` – root URL of the menu service (e.g. `http://menu:8081`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: super::default_http_client(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure a proxy or a different timeout).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/menu/items/{menu_item_id}` – resolve one catalog item.
    ///
    /// Returns `Ok(None)` when the item does not exist (HTTP 404); any other
    /// non-success response is a downstream error.
    pub async fn item(&self, menu_item_id: &str) -> Result<Option<MenuItem>, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/menu/items/{menu_item_id}"))?;

        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }

        let bytes = resp.bytes().await?;
        let item = serde_json::from_slice(&bytes)?;
        Ok(Some(item))
    }
}
