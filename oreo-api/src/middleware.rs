use crate::server::AppState;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Per-request permission filter.
///
/// Reads the caller identity from the `userId` / `signKey` headers, runs
/// the two-stage check against the request path + method, and rejects with
/// a 401 JSON body carrying the deny reason.
pub async fn permission_filter(
    State(state): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let user_id = header_value(&request, "userId");
    let sign_key = header_value(&request, "signKey");

    let decision = state
        .oreo
        .check_user_auth(
            request.uri().path(),
            request.method().as_str(),
            &user_id,
            &sign_key,
        )
        .await;

    if !decision.allowed {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": 401, "msg": decision.reason})),
        )
            .into_response();
    }

    next.run(request).await
}

fn header_value(request: &Request<axum::body::Body>, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
