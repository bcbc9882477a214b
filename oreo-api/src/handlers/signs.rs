use crate::entity::{fold_url_methods, AuthSign, AuthSignCopy, AuthSignUri, SignKeyQuery, SignUserQuery};
use crate::handlers::{created, fail, ok};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

/// GET /oreo/auth/sign?signKey= — grantees and their routes.
pub async fn query_sign(
    State(state): State<AppState>,
    Query(q): Query<SignKeyQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.get_sign_by_key(&q.sign_key).await {
        Ok(view) => ok(view),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/sign — grant a key to a user.
pub async fn add_sign(
    State(state): State<AppState>,
    Json(body): Json<AuthSign>,
) -> (StatusCode, Json<Value>) {
    let url_method = match fold_url_methods(&body.url_methods) {
        Ok(folded) => folded,
        Err(e) => return fail(e),
    };

    match state
        .oreo
        .add_sign(&body.sign_key, &body.user_id, &url_method)
        .await
    {
        Ok(()) => created(),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/sign — copy a key's authority to other users.
pub async fn copy_sign(
    State(state): State<AppState>,
    Json(body): Json<AuthSignCopy>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .copy_user_sign(&body.sign_key, &body.src_user_id, &body.dest_user_ids)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// DELETE /oreo/auth/sign?signKey=&userId=
pub async fn del_sign(
    State(state): State<AppState>,
    Query(q): Query<SignUserQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.remove_sign(&q.sign_key, &q.user_id).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/sign/users?signKey=&userId= — enabled methods the grant
/// does not cover.
pub async fn sign_diff_global(
    State(state): State<AppState>,
    Query(q): Query<SignUserQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.user_sign_diff_global(&q.sign_key, &q.user_id).await {
        Ok(diff) => ok(diff),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/sign/users — OR extra (url, method) pairs into grants.
pub async fn append_sign_uri(
    State(state): State<AppState>,
    Json(body): Json<AuthSignUri>,
) -> (StatusCode, Json<Value>) {
    let url_method = match fold_url_methods(&body.url_methods) {
        Ok(folded) => folded,
        Err(e) => return fail(e),
    };

    match state
        .oreo
        .append_user_sign(&body.sign_key, &body.user_ids, &url_method)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/sign/users — XOR (url, method) pairs out of grants.
/// Toggle semantics: bits not currently granted get set.
pub async fn remove_sign_uri(
    State(state): State<AppState>,
    Json(body): Json<AuthSignUri>,
) -> (StatusCode, Json<Value>) {
    let url_method = match fold_url_methods(&body.url_methods) {
        Ok(folded) => folded,
        Err(e) => return fail(e),
    };

    match state
        .oreo
        .remove_user_sign(&body.sign_key, &body.user_ids, &url_method)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}
