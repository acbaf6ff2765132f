use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use storefront_auth::JwtValidator;

use crate::app::errors::json_error;
use crate::context::UserContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

fn unauthorized(message: &str) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Verify the bearer token and attach a [`UserContext`] to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).ok_or_else(|| unauthorized("missing bearer token"))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        unauthorized("invalid or expired token")
    })?;

    req.extensions_mut()
        .insert(UserContext::new(claims.sub, claims.role));

    Ok(next.run(req).await)
}

/// Route layer for owner-only endpoints. Must run after [`auth_middleware`].
pub async fn require_owner(req: Request, next: Next) -> Result<Response, Response> {
    match req.extensions().get::<UserContext>() {
        Some(user) if user.role().is_owner() => Ok(next.run(req).await),
        Some(user) => {
            tracing::debug!(user_id = %user.user_id(), role = %user.role(), "owner route denied");
            Err(json_error(StatusCode::FORBIDDEN, "forbidden", "owner role required"))
        }
        None => Err(unauthorized("missing bearer token")),
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer   "),
        );
        assert_eq!(extract_bearer(&headers), None);
    }
}
