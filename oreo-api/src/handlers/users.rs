use crate::entity::{AuthUserSign, UserIdQuery};
use crate::handlers::{fail, ok};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

/// GET /oreo/auth/user?userId= — regex lookup over user ids.
pub async fn query_user_info(
    State(state): State<AppState>,
    Query(q): Query<UserIdQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.get_user_by_id_regex(&q.user_id).await {
        Ok(users) => ok(users),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/user — every user, id and name only.
pub async fn query_user_info_simple(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.oreo.get_all_users().await {
        Ok(users) => ok(users),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/user/sign?userId=
pub async fn user_own_signs(
    State(state): State<AppState>,
    Query(q): Query<UserIdQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.user_own_signs(&q.user_id).await {
        Ok(signs) => ok(signs),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/user/sign — mint a sign key for the user; returns it.
pub async fn add_user_sign_key(
    State(state): State<AppState>,
    Json(body): Json<AuthUserSign>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .create_user_sign_key(&body.user_id, &body.sign_desc)
        .await
    {
        Ok(sign_key) => ok(sign_key),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/user/sign — update one owned key's description.
pub async fn update_user_sign_key(
    State(state): State<AppState>,
    Json(body): Json<AuthUserSign>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .update_user_sign_key(&body.user_id, &body.sign_key, &body.sign_desc)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/user/role?userId=
pub async fn user_own_roles(
    State(state): State<AppState>,
    Query(q): Query<UserIdQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.user_own_roles(&q.user_id).await {
        Ok(roles) => ok(roles),
        Err(e) => fail(e),
    }
}
