//! Catalog lookup seam.
//!
//! Order creation resolves every requested line item against the menu
//! service. The trait keeps the lifecycle testable without a running menu
//! service.

use async_trait::async_trait;
use canteen_sdk::client::{ClientError, MenuClient};
use canteen_sdk::objects::MenuItem;

/// Resolve a catalog item by id. `Ok(None)` means the item does not exist;
/// `Err` means the catalog itself could not answer.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn item(&self, menu_item_id: &str) -> Result<Option<MenuItem>, ClientError>;
}

/// Catalog backed by the menu service's HTTP API.
pub struct HttpCatalog {
    client: MenuClient,
}

impl HttpCatalog {
    pub fn new(client: MenuClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn item(&self, menu_item_id: &str) -> Result<Option<MenuItem>, ClientError> {
        self.client.item(menu_item_id).await
    }
}
