use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutUrlRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "cartId is required"))]
    pub cart_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutUrlResponse {
    pub checkout_url: String,
}
