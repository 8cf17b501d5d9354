use crate::domain::model::{NewProfile, ProfilePatch};
use crate::infra::config;
use crate::transport::http::types::{
    caller_from_headers, error_response, json_422, json_ok, ApiResponse, AppState,
    CharitySupportRequest, ProfileListQuery, SearchQuery, StatusRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = NewProfile,
    responses(
        (status = 200, description = "Profile created", body = ApiResponse),
        (status = 401, description = "Missing caller identity", body = ApiResponse),
        (status = 409, description = "Profile or slug already exists", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn create_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<NewProfile>, JsonRejection>,
) -> impl IntoResponse {
    let caller = match caller_from_headers(&headers) {
        Ok(c) => c,
        Err(resp) => return resp.into_response(),
    };
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a profile object").into_response(),
    };
    match state
        .profiles
        .create_profile(&caller.user_id, caller.email.as_deref(), input)
        .await
    {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    params(ProfileListQuery),
    responses((status = 200, description = "Paginated profiles", body = ApiResponse))
)]
pub async fn list_profiles_handler(
    State(state): State<AppState>,
    Query(query): Query<ProfileListQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or_else(config::default_page_limit);
    match state
        .profiles
        .list(page, limit, query.industry.as_deref(), query.location.as_deref())
        .await
    {
        Ok(profiles) => json_ok(&profiles).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/search",
    params(SearchQuery),
    responses((status = 200, description = "Matching profiles", body = ApiResponse))
)]
pub async fn search_profiles_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or_else(config::default_page_limit);
    match state.profiles.search(&query.q, page, limit).await {
        Ok(profiles) => json_ok(&profiles).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/me",
    responses(
        (status = 200, description = "The caller's profile", body = ApiResponse),
        (status = 401, description = "Missing caller identity", body = ApiResponse),
        (status = 404, description = "Caller has no profile", body = ApiResponse)
    )
)]
pub async fn my_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let caller = match caller_from_headers(&headers) {
        Ok(c) => c,
        Err(resp) => return resp.into_response(),
    };
    match state.profiles.get_by_owner(&caller.user_id).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/charities",
    responses((status = 200, description = "Profiles owned by charity users", body = ApiResponse))
)]
pub async fn list_charity_profiles_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.profiles.list_charity_profiles(&state.identity).await {
        Ok(profiles) => json_ok(&profiles).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/slug/{slug}",
    params(("slug" = String, Path, description = "Profile slug")),
    responses(
        (status = 200, description = "Profile", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse)
    )
)]
pub async fn get_profile_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    match state.profiles.get_by_slug(&slug).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse)
    )
)]
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.profiles.get(&id).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse),
        (status = 409, description = "Slug already exists", body = ApiResponse)
    )
)]
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<ProfilePatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a profile patch object").into_response(),
    };
    match state.profiles.update(&id, patch).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile deleted", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse)
    )
)]
pub async fn delete_profile_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.profiles.delete(&id).await {
        Ok(()) => json_ok(&serde_json::json!({ "deleted": true })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/profiles/{id}/charities",
    params(("id" = String, Path, description = "Profile id")),
    request_body = CharitySupportRequest,
    responses(
        (status = 200, description = "Charity support added", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse),
        (status = 409, description = "Charity already supported", body = ApiResponse)
    )
)]
pub async fn add_charity_support_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<CharitySupportRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"charityId\": \"...\"}").into_response(),
    };
    match state.profiles.add_charity_support(&id, &body.charity_id).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/profiles/{id}/charities/{charityId}",
    params(
        ("id" = String, Path, description = "Profile id"),
        ("charityId" = String, Path, description = "Supported charity profile id")
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Support status updated", body = ApiResponse),
        (status = 404, description = "Profile or support entry not found", body = ApiResponse)
    )
)]
pub async fn set_charity_support_status_handler(
    State(state): State<AppState>,
    Path((id, charity_id)): Path<(String, String)>,
    request: Result<Json<StatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"status\": \"pending|approved|rejected\"}").into_response(),
    };
    match state
        .profiles
        .set_charity_support_status(&id, &charity_id, body.status)
        .await
    {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{id}/charities/{charityId}",
    params(
        ("id" = String, Path, description = "Profile id"),
        ("charityId" = String, Path, description = "Supported charity profile id")
    ),
    responses(
        (status = 200, description = "Charity support removed", body = ApiResponse),
        (status = 404, description = "Profile or support entry not found", body = ApiResponse)
    )
)]
pub async fn remove_charity_support_handler(
    State(state): State<AppState>,
    Path((id, charity_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.profiles.remove_charity_support(&id, &charity_id).await {
        Ok(profile) => json_ok(&profile).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/profiles/{id}/metrics",
    params(("id" = String, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Aggregated profile metrics", body = ApiResponse),
        (status = 404, description = "Profile not found", body = ApiResponse)
    )
)]
pub async fn profile_metrics_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.profiles.compute_metrics(&id, &state.waves).await {
        Ok(metrics) => json_ok(&metrics).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
