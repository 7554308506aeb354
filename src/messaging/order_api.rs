use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::domain::order::{OrderId, OrderUpdate, UpdateOutcome};

// ============================================================================
// Order Update API - Outbound REST call
// ============================================================================
//
// PUT {base_url}/order/update/{order_id}
//   body:     { "items": [...], "deliveryStatus"?: "completed" }
//   response: { "success": bool, "message"?: string }
//
// ============================================================================

/// Backend answer to an update request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from order service (HTTP {0})")]
    Status(u16),

    #[error("Malformed response from order service: {0}")]
    Decode(String),

    #[error("Invalid order service URL: {0}")]
    InvalidConfig(String),
}

/// Map a request result onto the workflow's view of it
pub fn outcome_of(result: Result<UpdateResponse, ApiError>) -> UpdateOutcome {
    match result {
        Ok(UpdateResponse { success: true, .. }) => UpdateOutcome::Accepted,
        Ok(UpdateResponse { success: false, message }) => UpdateOutcome::Rejected { message },
        Err(e) => UpdateOutcome::Failed { error: e.to_string() },
    }
}

/// Seam between the order card and the order service
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn update_order(
        &self,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<UpdateResponse, ApiError>;
}

pub struct HttpOrderApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpOrderApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        // Fail early on a base URL the update path cannot be built from
        Self::build_update_url(&config.base_url, &OrderId::new("probe"))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    pub fn update_url(&self, order_id: &OrderId) -> Result<Url, ApiError> {
        Self::build_update_url(&self.base_url, order_id)
    }

    fn build_update_url(base_url: &str, order_id: &OrderId) -> Result<Url, ApiError> {
        let mut url = Url::parse(base_url).map_err(|e| ApiError::InvalidConfig(format!("{base_url}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidConfig(format!("{base_url}: cannot be a base")))?
            .pop_if_empty()
            .extend(["order", "update", order_id.as_str()]);
        Ok(url)
    }
}

/// Decode a response body; a non-2xx status with a well-formed body is still
/// the backend's answer.
fn decode_response(status: StatusCode, body: &str) -> Result<UpdateResponse, ApiError> {
    match serde_json::from_str::<UpdateResponse>(body) {
        Ok(response) => Ok(response),
        Err(_) if !status.is_success() => Err(ApiError::Status(status.as_u16())),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn update_order(
        &self,
        order_id: &OrderId,
        update: &OrderUpdate,
    ) -> Result<UpdateResponse, ApiError> {
        let url = self.update_url(order_id)?;

        tracing::debug!(
            order_id = %order_id,
            item_count = update.items.len(),
            delivery_status = ?update.delivery_status,
            "Sending order update"
        );

        let mut request = self.client.put(url).json(update);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let decoded = decode_response(status, &body);
        match &decoded {
            Ok(r) => tracing::info!(
                order_id = %order_id,
                status = status.as_u16(),
                success = r.success,
                "Order service answered update"
            ),
            Err(e) => tracing::warn!(
                order_id = %order_id,
                status = status.as_u16(),
                error = %e,
                "Order service returned an unusable response"
            ),
        }
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn api(base_url: &str) -> HttpOrderApi {
        HttpOrderApi::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(1),
            token: None,
        })
        .unwrap()
    }

    #[test]
    fn test_update_url_appends_order_path() {
        let url = api("http://localhost:5000/api").update_url(&OrderId::new("65f0ab")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/order/update/65f0ab");
    }

    #[test]
    fn test_update_url_escapes_order_id() {
        let url = api("https://shop.example.com").update_url(&OrderId::new("a/b")).unwrap();
        assert_eq!(url.as_str(), "https://shop.example.com/order/update/a%2Fb");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpOrderApi::new(&ApiConfig {
            base_url: "not a url".to_string(),
            ..ApiConfig::default()
        });
        assert!(matches!(result, Err(ApiError::InvalidConfig(_))));
    }

    #[test]
    fn test_decode_success_and_failure_bodies() {
        let ok = decode_response(StatusCode::OK, r#"{"success":true}"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.message, None);

        let refused =
            decode_response(StatusCode::BAD_REQUEST, r#"{"success":false,"message":"Out of stock"}"#)
                .unwrap();
        assert_eq!(refused.message.as_deref(), Some("Out of stock"));
    }

    #[test]
    fn test_decode_unusable_bodies() {
        assert!(matches!(
            decode_response(StatusCode::BAD_GATEWAY, "<html>"),
            Err(ApiError::Status(502))
        ));
        assert!(matches!(
            decode_response(StatusCode::OK, "{}"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            outcome_of(Ok(UpdateResponse { success: true, message: None })),
            UpdateOutcome::Accepted
        );
        assert_eq!(
            outcome_of(Ok(UpdateResponse { success: false, message: Some("x".to_string()) })),
            UpdateOutcome::Rejected { message: Some("x".to_string()) }
        );
        assert!(matches!(
            outcome_of(Err(ApiError::Status(500))),
            UpdateOutcome::Failed { .. }
        ));
    }
}
