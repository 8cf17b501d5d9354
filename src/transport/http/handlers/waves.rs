use crate::domain::model::{NewWave, WavePatch};
use crate::infra::config;
use crate::transport::http::types::{
    caller_from_headers, error_response, json_422, json_ok, split_csv, ApiResponse, AppState,
    CommentRequest, StatusRequest, TagsQuery, WaveFilterQuery,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/waves",
    request_body = NewWave,
    responses(
        (status = 200, description = "Wave created", body = ApiResponse),
        (status = 400, description = "Missing or empty title", body = ApiResponse),
        (status = 404, description = "Creator profile not found", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn create_wave_handler(
    State(state): State<AppState>,
    request: Result<Json<NewWave>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a wave object").into_response(),
    };
    match state.waves.create_wave(input).await {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves",
    params(WaveFilterQuery),
    responses((status = 200, description = "Paginated approved waves", body = ApiResponse))
)]
pub async fn list_waves_handler(
    State(state): State<AppState>,
    Query(query): Query<WaveFilterQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or_else(config::default_page_limit);
    // `?hashtags=` with no values means "no hashtag filter", not
    // "match nothing".
    let hashtags = query
        .hashtags
        .as_deref()
        .map(split_csv)
        .filter(|tags| !tags.is_empty());
    match state
        .waves
        .find_with_filters(hashtags.as_deref(), query.title.as_deref(), page, limit)
        .await
    {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/hashtags",
    responses((status = 200, description = "Hashtags ranked by participant count", body = ApiResponse))
)]
pub async fn list_hashtags_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.waves.all_hashtags().await {
        Ok(stats) => json_ok(&stats).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/creator/{profileId}",
    params(("profileId" = String, Path, description = "Creator profile id")),
    responses((status = 200, description = "Waves created by the profile", body = ApiResponse))
)]
pub async fn waves_by_creator_handler(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.waves.find_by_creator(&profile_id).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/charity/{profileId}",
    params(("profileId" = String, Path, description = "Charity profile id")),
    responses((status = 200, description = "Waves endorsing the charity", body = ApiResponse))
)]
pub async fn waves_by_charity_handler(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.waves.find_by_charity(&profile_id).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/cause/{causeName}",
    params(("causeName" = String, Path, description = "Cause name")),
    responses((status = 200, description = "Waves under the cause", body = ApiResponse))
)]
pub async fn waves_by_cause_handler(
    State(state): State<AppState>,
    Path(cause): Path<String>,
) -> impl IntoResponse {
    match state.waves.find_by_cause(&cause).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/hashtag/{hashtag}",
    params(("hashtag" = String, Path, description = "Exact hashtag")),
    responses((status = 200, description = "Waves carrying the hashtag", body = ApiResponse))
)]
pub async fn waves_by_hashtag_handler(
    State(state): State<AppState>,
    Path(hashtag): Path<String>,
) -> impl IntoResponse {
    match state.waves.find_by_hashtag(&hashtag).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/tags",
    params(TagsQuery),
    responses((status = 200, description = "Waves carrying any of the tags", body = ApiResponse))
)]
pub async fn waves_by_tags_handler(
    State(state): State<AppState>,
    Query(query): Query<TagsQuery>,
) -> impl IntoResponse {
    let tags = split_csv(&query.tags);
    match state.waves.find_by_tags(&tags).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/participant/{profileId}",
    params(("profileId" = String, Path, description = "Participant profile id")),
    responses((status = 200, description = "Waves the profile participates in", body = ApiResponse))
)]
pub async fn waves_by_participant_handler(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> impl IntoResponse {
    match state.waves.find_by_participant(&profile_id).await {
        Ok(waves) => json_ok(&waves).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/waves/{id}",
    params(("id" = String, Path, description = "Wave id")),
    responses(
        (status = 200, description = "Wave with resolved profiles", body = ApiResponse),
        (status = 404, description = "Wave not found", body = ApiResponse)
    )
)]
pub async fn get_wave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.waves.get(&id).await {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/waves/{id}",
    params(("id" = String, Path, description = "Wave id")),
    request_body = WavePatch,
    responses(
        (status = 200, description = "Wave updated", body = ApiResponse),
        (status = 404, description = "Wave not found", body = ApiResponse)
    )
)]
pub async fn update_wave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<WavePatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a wave patch object").into_response(),
    };
    match state.waves.update(&id, patch).await {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/waves/{id}/comments",
    params(("id" = String, Path, description = "Wave id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse),
        (status = 400, description = "Empty comment content", body = ApiResponse),
        (status = 401, description = "Missing caller identity", body = ApiResponse),
        (status = 404, description = "Wave or caller profile not found", body = ApiResponse)
    )
)]
pub async fn add_comment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    request: Result<Json<CommentRequest>, JsonRejection>,
) -> impl IntoResponse {
    let caller = match caller_from_headers(&headers) {
        Ok(c) => c,
        Err(resp) => return resp.into_response(),
    };
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"content\": \"...\"}").into_response(),
    };
    // Comments are authored by the caller's profile, not the raw user id.
    let author = match state.profiles.get_by_owner(&caller.user_id).await {
        Ok(p) => p,
        Err(e) => return error_response(&e).into_response(),
    };
    match state
        .waves
        .add_comment(&id, &author.id, &body.content, body.is_approved.unwrap_or(false))
        .await
    {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/waves/{id}/participants",
    params(("id" = String, Path, description = "Wave id")),
    responses(
        (status = 200, description = "Caller joined as pending participant", body = ApiResponse),
        (status = 401, description = "Missing caller identity", body = ApiResponse),
        (status = 404, description = "Wave or caller profile not found", body = ApiResponse),
        (status = 409, description = "Already a participant", body = ApiResponse)
    )
)]
pub async fn join_wave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let caller = match caller_from_headers(&headers) {
        Ok(c) => c,
        Err(resp) => return resp.into_response(),
    };
    let joiner = match state.profiles.get_by_owner(&caller.user_id).await {
        Ok(p) => p,
        Err(e) => return error_response(&e).into_response(),
    };
    match state.waves.add_participant(&id, &joiner.id).await {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/waves/{id}/participants/{profileId}",
    params(
        ("id" = String, Path, description = "Wave id"),
        ("profileId" = String, Path, description = "Participant profile id")
    ),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Participant status updated", body = ApiResponse),
        (status = 404, description = "Wave or participant not found", body = ApiResponse)
    )
)]
pub async fn update_participant_status_handler(
    State(state): State<AppState>,
    Path((id, profile_id)): Path<(String, String)>,
    request: Result<Json<StatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"status\": \"pending|approved|rejected\"}").into_response(),
    };
    match state
        .waves
        .update_participant_status(&id, &profile_id, body.status)
        .await
    {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/api/waves/{id}/charity-approval",
    params(("id" = String, Path, description = "Wave id")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Charity approval status set", body = ApiResponse),
        (status = 404, description = "Wave not found", body = ApiResponse)
    )
)]
pub async fn set_charity_approval_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<StatusRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"status\": \"pending|approved|rejected\"}").into_response(),
    };
    match state.waves.set_charity_approval_status(&id, body.status).await {
        Ok(wave) => json_ok(&wave).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/waves/{id}",
    params(("id" = String, Path, description = "Wave id")),
    responses(
        (status = 200, description = "Wave deleted", body = ApiResponse),
        (status = 404, description = "Wave not found", body = ApiResponse)
    )
)]
pub async fn delete_wave_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.waves.remove(&id).await {
        Ok(()) => json_ok(&serde_json::json!({ "deleted": true })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
