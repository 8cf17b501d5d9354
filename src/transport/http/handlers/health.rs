use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(serde_json::json!({ "status": "ok" })),
            error: None,
        }),
    )
}
