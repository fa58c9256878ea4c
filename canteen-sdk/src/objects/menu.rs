use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item as returned by the menu service.
///
/// Only the fields the order saga needs are kept; the menu service response
/// may carry more and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}
