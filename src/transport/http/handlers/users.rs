use crate::domain::error::Error;
use crate::domain::model::{NewUser, UserPatch, UserView};
use crate::transport::http::types::{
    error_response, json_422, json_ok, ApiResponse, AppState, VerifyEmailRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use log::info;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 200, description = "User registered", body = ApiResponse),
        (status = 409, description = "Email already exists", body = ApiResponse),
        (status = 422, description = "Invalid JSON body", body = ApiResponse)
    )
)]
pub async fn register_user_handler(
    State(state): State<AppState>,
    request: Result<Json<NewUser>, JsonRejection>,
) -> impl IntoResponse {
    let Json(input) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a user object").into_response(),
    };
    let user = match state.identity.create_user(input).await {
        Ok(u) => u,
        Err(e) => return error_response(&e).into_response(),
    };

    // Mail delivery is an external collaborator; stamp the token and log
    // it so the flow stays exercisable end to end.
    let token = Uuid::new_v4().to_string();
    if let Err(e) = state.identity.set_verification_token(&user.id, &token).await {
        return error_response(&e).into_response();
    }
    info!("verification token issued for {}: {}", user.email, token);

    json_ok(&UserView::from(user)).into_response()
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User with profile flag", body = ApiResponse),
        (status = 404, description = "User not found", body = ApiResponse)
    )
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = match state.identity.get_user(&id).await {
        Ok(u) => u,
        Err(e) => return error_response(&e).into_response(),
    };
    let profile_exists = match state.profiles.get_by_owner(&id).await {
        Ok(_) => true,
        Err(Error::NotFound(_)) => false,
        Err(e) => return error_response(&e).into_response(),
    };
    json_ok(&serde_json::json!({
        "user": UserView::from(user),
        "profileExists": profile_exists,
    }))
    .into_response()
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = ApiResponse),
        (status = 404, description = "User not found", body = ApiResponse),
        (status = 409, description = "Email already exists", body = ApiResponse)
    )
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UserPatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "a user patch object").into_response(),
    };
    match state.identity.update_user(&id, patch).await {
        Ok(user) => json_ok(&UserView::from(user)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse),
        (status = 404, description = "User not found", body = ApiResponse)
    )
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.identity.delete_user(&id).await {
        Ok(()) => json_ok(&serde_json::json!({ "deleted": true })).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/verification-token",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Fresh verification token issued", body = ApiResponse),
        (status = 404, description = "User not found", body = ApiResponse),
        (status = 409, description = "User already verified", body = ApiResponse)
    )
)]
pub async fn issue_verification_token_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = match state.identity.get_user(&id).await {
        Ok(u) => u,
        Err(e) => return error_response(&e).into_response(),
    };
    if user.is_verified {
        return error_response(&Error::conflict("user is already verified")).into_response();
    }
    let token = Uuid::new_v4().to_string();
    if let Err(e) = state.identity.set_verification_token(&id, &token).await {
        return error_response(&e).into_response();
    }
    info!("verification token re-issued for {}: {}", user.email, token);
    json_ok(&serde_json::json!({ "message": "verification token issued" })).into_response()
}

#[utoipa::path(
    post,
    path = "/api/users/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = ApiResponse),
        (status = 404, description = "Invalid or expired token", body = ApiResponse)
    )
)]
pub async fn verify_email_handler(
    State(state): State<AppState>,
    request: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"token\": \"...\"}").into_response(),
    };
    let user = match state.identity.find_by_verification_token(&body.token).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return error_response(&Error::not_found("valid verification token")).into_response()
        }
        Err(e) => return error_response(&e).into_response(),
    };
    match state.identity.activate_user(&user.id).await {
        Ok(_) => json_ok(&serde_json::json!({ "message": "email verified successfully" }))
            .into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
