// src/utils/auth.rs

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, utils::session::SessionStore};

/// Header the admin UI sends its token in.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// The authenticated caller, injected into request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub username: String,
    pub token: String,
}

/// Pulls the token from `x-admin-token`, or from `Authorization: Bearer <token>`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_admin_header = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    };

    from_admin_header.or_else(from_bearer).map(str::to_string)
}

/// Axum Middleware: Authentication.
///
/// Resolves the presented token against the session store. On success the
/// [`AdminIdentity`] is injected for handlers; every failure is the same 401 so
/// callers cannot tell a missing token from an expired one. Discarding the
/// client's stale copy of the token is left to the client.
pub async fn auth_middleware(
    State(sessions): State<SessionStore>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers()).ok_or_else(AppError::unauthorized)?;

    let username = sessions
        .validate(&token)
        .ok_or_else(AppError::unauthorized)?;

    req.extensions_mut().insert(AdminIdentity { username, token });
    Ok(next.run(req).await)
}
