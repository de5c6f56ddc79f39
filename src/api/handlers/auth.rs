//! Login, logout, status and code issuance endpoints.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::error;

use crate::{
    api::guard::require_tier,
    auth::{
        AuthorizationManager, AuthorizationStatus, Credentials, OtacRequest, OtacResponse, Tier,
    },
};

pub const AUTH_TAG: &str = "auth";

#[utoipa::path(
    get,
    path = "/api/v1/auth/status",
    responses(
        (status = 200, description = "Session state of the caller", body = AuthorizationStatus),
        (status = 500, description = "Session backend unavailable")
    ),
    tag = "auth"
)]
pub async fn status(
    headers: HeaderMap,
    manager: Extension<Arc<AuthorizationManager>>,
) -> impl IntoResponse {
    match manager.status(&headers).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(err) => {
            error!("Failed to read session: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = Credentials,
    responses(
        (status = 204, description = "Code redeemed, session cookie set"),
        (status = 400, description = "Missing or malformed body"),
        (status = 401, description = "Code missing, expired, wrong or already used"),
        (status = 500, description = "Session backend unavailable")
    ),
    tag = "auth"
)]
pub async fn login(
    manager: Extension<Arc<AuthorizationManager>>,
    payload: Option<Json<Credentials>>,
) -> impl IntoResponse {
    let Some(Json(credentials)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
    };

    match manager.redeem_login(&credentials).await {
        Ok(Some(cookie)) => (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response(),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => {
            error!("Failed to redeem otac: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session ended, cookie cleared"),
        (status = 500, description = "Session backend unavailable, cookie cleared anyway")
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    manager: Extension<Arc<AuthorizationManager>>,
) -> impl IntoResponse {
    let err = match manager.logout(&headers).await {
        Ok(cookie) => return (StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response(),
        Err(err) => err,
    };

    error!("Failed to delete session: {err}");

    // The client still drops its cookie even if the record outlives it.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = manager.sessions().expired_cookie() {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, response_headers).into_response()
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/otac",
    request_body = OtacRequest,
    responses(
        (status = 200, description = "Code issued", body = OtacResponse),
        (status = 400, description = "Missing or malformed body"),
        (status = 401, description = "No service token or session"),
        (status = 403, description = "Session tier too low"),
        (status = 500, description = "Code backend unavailable")
    ),
    tag = "auth"
)]
pub async fn otac(
    headers: HeaderMap,
    manager: Extension<Arc<AuthorizationManager>>,
    payload: Option<Json<OtacRequest>>,
) -> impl IntoResponse {
    if let Err(status) = require_tier(&manager, &headers, Tier::Server).await {
        return status.into_response();
    }

    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid request body").into_response();
    };
    if request.user.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing user").into_response();
    }

    match manager.issue_otac(&request.user).await {
        Ok(code) => (StatusCode::OK, Json(OtacResponse { code })).into_response(),
        Err(err) => {
            error!("Failed to issue otac: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
