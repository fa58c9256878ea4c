//! Order service client (payment service → order service).
//!
//! This is the synchronous fallback path of the payment saga: when the
//! broker cannot carry the `payment.success` event, the payment service
//! pushes the resulting order transition directly over HTTP.

use reqwest::{Client, StatusCode};
use url::Url;
use uuid::Uuid;

use super::ClientError;
use crate::objects::{OrderStatus, UpdateOrderStatusRequest};

/// Typed HTTP client for the order service's status-update endpoint.
#[derive(Debug, Clone)]
pub struct OrderServiceClient {
    http: Client,
    base_url: Url,
}

impl OrderServiceClient {
    /// Create a new `OrderServiceClient`.
    ///
    /// * `base_url` – root URL of the order service (e.g. `http://orders:8083`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: super::default_http_client(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `PUT /api/orders/{order_id}/status` – apply an order status transition.
    ///
    /// 200 and 201 count as success; every other response is a downstream
    /// error and the caller decides whether to retry (this core never does).
    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!("/api/orders/{order_id}/status"))?;

        let resp = self
            .http
            .put(url)
            .json(&UpdateOrderStatusRequest { status })
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(ClientError::Api { status, body })
            }
        }
    }
}
