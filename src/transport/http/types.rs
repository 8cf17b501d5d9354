use crate::domain::error::Error;
use crate::domain::identity::IdentityStore;
use crate::domain::model::{ReviewStatus, UserRole};
use crate::domain::profiles::ProfileDirectory;
use crate::domain::waves::WaveLedger;
use crate::storage::document::DocumentStore;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityStore,
    pub profiles: ProfileDirectory,
    pub waves: WaveLedger,
}

impl AppState {
    /// Wires the three domain services over one document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let identity = IdentityStore::new(store.clone());
        let profiles = ProfileDirectory::new(store.clone());
        let waves = WaveLedger::new(store, profiles.clone());
        AppState {
            identity,
            profiles,
            waves,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn json_ok<T: Serialize>(value: &T) -> (StatusCode, Json<ApiResponse>) {
    match serde_json::to_value(value) {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(format!("Serialization failed: {}", e)),
            }),
        ),
    }
}

pub fn error_response(err: &Error) -> (StatusCode, Json<ApiResponse>) {
    let status = match err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }),
    )
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}

/// Caller identity supplied by the (trusted, external) authentication
/// layer through request headers. The core enforces its own invariants,
/// not access policy.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub role: UserRole,
    pub email: Option<String>,
}

pub fn caller_from_headers(
    headers: &HeaderMap,
) -> Result<Caller, (StatusCode, Json<ApiResponse>)> {
    let user_id = headers
        .get("x-caller-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse {
                    success: false,
                    data: None,
                    error: Some("Missing x-caller-id header".to_string()),
                }),
            )
        })?;
    let role = match headers
        .get("x-caller-role")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_lowercase())
        .as_deref()
    {
        Some("admin") => UserRole::Admin,
        Some("company") => UserRole::Company,
        Some("charity") => UserRole::Charity,
        _ => UserRole::Person,
    };
    let email = headers
        .get("x-caller-email")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    Ok(Caller {
        user_id: user_id.to_string(),
        role,
        email,
    })
}

// --- Request DTOs ---

#[derive(Deserialize, Debug, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharitySupportRequest {
    pub charity_id: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct StatusRequest {
    pub status: ReviewStatus,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
    #[serde(default)]
    pub is_approved: Option<bool>,
}

// --- Query DTOs ---

#[derive(Deserialize, Debug, IntoParams)]
pub struct ProfileListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct WaveFilterQuery {
    /// Comma-separated hashtags; a wave matches when its hashtag is in
    /// the set.
    pub hashtags: Option<String>,
    /// Case-insensitive title substring.
    pub title: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, Debug, IntoParams)]
pub struct TagsQuery {
    /// Comma-separated tags; a wave matches when it carries any of them.
    pub tags: String,
}

/// Splits a comma-separated query value, dropping empty segments.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
