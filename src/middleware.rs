use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use http_body::{LengthLimitError, Limited};

use crate::{
    error::AppError,
    identity::IDENTITY_COOKIE,
    model::{Identity, User},
    schema::MethodOverride,
    view::{ErrorView, View},
    AppState,
};

/// Same cap axum's `DefaultBodyLimit` puts on the `Form` extractor.
pub const FORM_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Resolves the requester from the identity cookie. Never rejects a request:
/// a missing or unverifiable cookie just means anonymous.
pub async fn mw_resolve_identity<B>(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let identity = match jar.get(IDENTITY_COOKIE) {
        None => Identity::Anonymous,
        Some(cookie) => match state.identity.decode(cookie.value()) {
            Ok(user) => Identity::User(user),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring invalid identity cookie");
                Identity::Anonymous
            }
        },
    };

    if let Some(User { id, username }) = identity.user() {
        tracing::debug!(user_id = id, username = %username, "resolved identity");
    }

    request.extensions_mut().insert(identity.clone());
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorView>() {
        Some(ErrorView { status, message }) if identity.user().is_some() => {
            View::error(status, message)
                .with_identity(&identity)
                .into_response()
        }
        _ => response,
    }
}

/// Lets plain HTML forms reach PUT/PATCH/DELETE routes by POSTing with a
/// `_method` field in the query string or the urlencoded body.
///
/// Must wrap the router from the outside so it runs before routing.
pub async fn mw_method_override(request: Request<Body>, next: Next<Body>) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let from_query = request
        .uri()
        .query()
        .and_then(|q| serde_urlencoded::from_str::<MethodOverride>(q).ok())
        .and_then(|o| o.method);

    let (mut parts, body) = request.into_parts();

    let (override_method, body) = match from_query {
        Some(method) => (Some(method), body),
        None if is_form(&parts.headers) => {
            let bytes = match hyper::body::to_bytes(Limited::new(body, FORM_BODY_LIMIT)).await {
                Ok(bytes) => bytes,
                Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                    tracing::warn!(limit = FORM_BODY_LIMIT, "form body too large");
                    return AppError::PayloadTooLarge.into_response();
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read form body");
                    return AppError::Validation("unreadable form body".to_string()).into_response();
                }
            };
            let method = serde_urlencoded::from_bytes::<MethodOverride>(&bytes)
                .ok()
                .and_then(|o| o.method);
            (method, Body::from(bytes))
        }
        None => (None, body),
    };

    if let Some(method) = override_method.as_deref().and_then(parse_override) {
        tracing::debug!(%method, path = %parts.uri.path(), "method override");
        parts.method = method;
    }

    next.run(Request::from_parts(parts, body)).await
}

fn is_form(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn parse_override(raw: &str) -> Option<Method> {
    match raw.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}
