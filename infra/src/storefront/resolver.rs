use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use cg_core::errors::ResolveError;
use cg_core::services::SubjectAttributeResolver;
use cg_shared::config::StorefrontConfig;

use crate::InfrastructureError;

const CART_QUERY: &str = "query GetCart($id: ID!) { cart(id: $id) { checkoutUrl } }";
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

#[derive(Debug, Deserialize)]
struct CartResponse {
    #[serde(default)]
    data: Option<CartData>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CartData {
    #[serde(default)]
    cart: Option<Cart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cart {
    #[serde(default)]
    checkout_url: Option<String>,
}

/// Looks up `cart(id) { checkoutUrl }` for a subject id
pub struct StorefrontCheckoutResolver {
    client: Client,
    api_url: String,
    api_token: String,
}

impl StorefrontCheckoutResolver {
    pub fn new(config: &StorefrontConfig) -> Result<Self, InfrastructureError> {
        if !config.is_configured() {
            return Err(InfrastructureError::Config(
                "SHOPIFY_STOREFRONT_API_URL and SHOPIFY_STOREFRONT_API_TOKEN must be set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl SubjectAttributeResolver for StorefrontCheckoutResolver {
    async fn resolve(&self, subject_id: &str) -> Result<String, ResolveError> {
        let response = self
            .client
            .post(&self.api_url)
            .header(ACCESS_TOKEN_HEADER, &self.api_token)
            .json(&json!({ "query": CART_QUERY, "variables": { "id": subject_id } }))
            .send()
            .await
            .map_err(|e| ResolveError::Upstream {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Upstream {
                message: format!("Storefront API responded with HTTP {}", status.as_u16()),
            });
        }

        let body: CartResponse = response.json().await.map_err(|e| ResolveError::Upstream {
            message: format!("Malformed Storefront response: {}", e),
        })?;

        extract_checkout_url(body)
    }
}

fn extract_checkout_url(body: CartResponse) -> Result<String, ResolveError> {
    if let Some(errors) = body.errors {
        return Err(ResolveError::Upstream {
            message: format!("Storefront API returned errors: {}", errors),
        });
    }

    body.data
        .and_then(|data| data.cart)
        .and_then(|cart| cart.checkout_url)
        .filter(|url| !url.is_empty())
        .ok_or(ResolveError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: Value) -> Result<String, ResolveError> {
        extract_checkout_url(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_extracts_checkout_url() {
        let url = parse(json!({
            "data": { "cart": { "checkoutUrl": "https://shop.example.com/cart/c/abc" } }
        }));
        assert_eq!(url.unwrap(), "https://shop.example.com/cart/c/abc");
    }

    #[test]
    fn test_missing_cart_is_not_found() {
        assert_eq!(parse(json!({ "data": { "cart": null } })), Err(ResolveError::NotFound));
        assert_eq!(parse(json!({})), Err(ResolveError::NotFound));
    }

    #[test]
    fn test_graphql_errors_are_upstream_failures() {
        let result = parse(json!({
            "data": null,
            "errors": [{ "message": "Access denied" }]
        }));
        assert!(matches!(result, Err(ResolveError::Upstream { .. })));
    }

    #[test]
    fn test_unconfigured_storefront_is_rejected() {
        let config = StorefrontConfig {
            api_url: String::new(),
            api_token: String::new(),
            timeout_ms: 1000,
        };
        assert!(matches!(
            StorefrontCheckoutResolver::new(&config),
            Err(InfrastructureError::Config(_))
        ));
    }
}
