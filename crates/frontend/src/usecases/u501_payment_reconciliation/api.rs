use async_trait::async_trait;
use contracts::domain::a001_order::UpdateOrderRequest;
use contracts::shared::ApiResponse;
use gloo_net::http::Request;

use super::submit::OrderUpdater;
use crate::shared::api_utils::api_base;
use crate::system::auth::storage;

/// `PATCH /api/orders/{orderId}`
pub async fn update_order(
    request: &UpdateOrderRequest,
) -> Result<ApiResponse<serde_json::Value>, String> {
    let url = format!(
        "{}/api/orders/{}",
        api_base(),
        urlencoding::encode(&request.order_id)
    );

    let mut builder = Request::patch(&url).header("Accept", "application/json");
    if let Some(token) = storage::get_access_token() {
        builder = builder.header("Authorization", &format!("Bearer {}", token));
    }

    let response = builder
        .json(request)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Failed to send request: {}", e))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;

    interpret_response(status, &text)
}

/// Turn a status and body into the API envelope.
///
/// A 2xx with an empty body (`204 No Content`) counts as success without
/// data. Error statuses usually still carry the `{ success: false, error }`
/// envelope.
fn interpret_response(
    status: u16,
    text: &str,
) -> Result<ApiResponse<serde_json::Value>, String> {
    let ok = (200..300).contains(&status);
    if ok && text.trim().is_empty() {
        return Ok(ApiResponse {
            success: true,
            data: None,
            error: None,
        });
    }

    match serde_json::from_str::<ApiResponse<serde_json::Value>>(text) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !ok => Err(format!("HTTP {}: {}", status, text)),
        Err(e) => Err(format!("Failed to parse response: {}", e)),
    }
}

/// [`OrderUpdater`] backed by the REST API
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpOrderUpdater;

#[async_trait(?Send)]
impl OrderUpdater for HttpOrderUpdater {
    async fn update_order(
        &self,
        request: UpdateOrderRequest,
    ) -> Result<ApiResponse<serde_json::Value>, String> {
        update_order(&request).await
    }
}
