use crate::domain::model::{
    Certification, NewProfile, NewUser, NewWave, ProfilePatch, ReviewStatus, SupportType,
    UserPatch, UserRole, WavePatch,
};
use crate::transport::http::handlers::{health, profiles, users, waves};
use crate::transport::http::types::{
    ApiResponse, CharitySupportRequest, CommentRequest, StatusRequest, VerifyEmailRequest,
};
use axum::routing::{get, patch, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        users::register_user_handler,
        users::verify_email_handler,
        users::get_user_handler,
        users::update_user_handler,
        users::delete_user_handler,
        users::issue_verification_token_handler,
        profiles::create_profile_handler,
        profiles::list_profiles_handler,
        profiles::search_profiles_handler,
        profiles::my_profile_handler,
        profiles::list_charity_profiles_handler,
        profiles::get_profile_by_slug_handler,
        profiles::get_profile_handler,
        profiles::update_profile_handler,
        profiles::delete_profile_handler,
        profiles::add_charity_support_handler,
        profiles::set_charity_support_status_handler,
        profiles::remove_charity_support_handler,
        profiles::profile_metrics_handler,
        waves::create_wave_handler,
        waves::list_waves_handler,
        waves::list_hashtags_handler,
        waves::waves_by_creator_handler,
        waves::waves_by_charity_handler,
        waves::waves_by_cause_handler,
        waves::waves_by_hashtag_handler,
        waves::waves_by_tags_handler,
        waves::waves_by_participant_handler,
        waves::get_wave_handler,
        waves::update_wave_handler,
        waves::add_comment_handler,
        waves::join_wave_handler,
        waves::update_participant_status_handler,
        waves::set_charity_approval_handler,
        waves::delete_wave_handler
    ),
    components(schemas(
        ApiResponse,
        NewUser,
        UserPatch,
        UserRole,
        VerifyEmailRequest,
        NewProfile,
        ProfilePatch,
        Certification,
        CharitySupportRequest,
        NewWave,
        WavePatch,
        SupportType,
        ReviewStatus,
        StatusRequest,
        CommentRequest
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/users", post(users::register_user_handler))
        .route("/api/users/verify-email", post(users::verify_email_handler))
        .route(
            "/api/users/:id",
            get(users::get_user_handler)
                .patch(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
        .route(
            "/api/users/:id/verification-token",
            post(users::issue_verification_token_handler),
        )
        .route(
            "/api/profiles",
            post(profiles::create_profile_handler).get(profiles::list_profiles_handler),
        )
        .route("/api/profiles/search", get(profiles::search_profiles_handler))
        .route("/api/profiles/me", get(profiles::my_profile_handler))
        .route(
            "/api/profiles/charities",
            get(profiles::list_charity_profiles_handler),
        )
        .route(
            "/api/profiles/slug/:slug",
            get(profiles::get_profile_by_slug_handler),
        )
        .route(
            "/api/profiles/:id",
            get(profiles::get_profile_handler)
                .put(profiles::update_profile_handler)
                .delete(profiles::delete_profile_handler),
        )
        .route(
            "/api/profiles/:id/charities",
            post(profiles::add_charity_support_handler),
        )
        .route(
            "/api/profiles/:id/charities/:charityId",
            patch(profiles::set_charity_support_status_handler)
                .delete(profiles::remove_charity_support_handler),
        )
        .route(
            "/api/profiles/:id/metrics",
            get(profiles::profile_metrics_handler),
        )
        .route(
            "/api/waves",
            post(waves::create_wave_handler).get(waves::list_waves_handler),
        )
        .route("/api/waves/hashtags", get(waves::list_hashtags_handler))
        .route(
            "/api/waves/creator/:profileId",
            get(waves::waves_by_creator_handler),
        )
        .route(
            "/api/waves/charity/:profileId",
            get(waves::waves_by_charity_handler),
        )
        .route("/api/waves/cause/:causeName", get(waves::waves_by_cause_handler))
        .route(
            "/api/waves/hashtag/:hashtag",
            get(waves::waves_by_hashtag_handler),
        )
        .route("/api/waves/tags", get(waves::waves_by_tags_handler))
        .route(
            "/api/waves/participant/:profileId",
            get(waves::waves_by_participant_handler),
        )
        .route(
            "/api/waves/:id",
            get(waves::get_wave_handler)
                .patch(waves::update_wave_handler)
                .delete(waves::delete_wave_handler),
        )
        .route("/api/waves/:id/comments", post(waves::add_comment_handler))
        .route("/api/waves/:id/participants", post(waves::join_wave_handler))
        .route(
            "/api/waves/:id/participants/:profileId",
            patch(waves::update_participant_status_handler),
        )
        .route(
            "/api/waves/:id/charity-approval",
            patch(waves::set_charity_approval_handler),
        )
        .with_state(app_state)
}
