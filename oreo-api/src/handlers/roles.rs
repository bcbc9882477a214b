use crate::entity::{fold_url_methods, AuthRole, AuthRoleInfo, AuthRoleUser, RoleNameQuery, UserIdQuery};
use crate::handlers::{created, fail, ok};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

/// GET /oreo/auth/role?roleName= — catalog methods the role lacks.
pub async fn role_route_diff(
    State(state): State<AppState>,
    Query(q): Query<RoleNameQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.role_route_diff(&q.role_name).await {
        Ok(diff) => ok(diff),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/role
pub async fn add_role(
    State(state): State<AppState>,
    Json(body): Json<AuthRole>,
) -> (StatusCode, Json<Value>) {
    let url_method = match fold_url_methods(&body.url_methods) {
        Ok(folded) => folded,
        Err(e) => return fail(e),
    };

    match state
        .oreo
        .add_role(
            &body.role_name,
            &body.role_desc,
            body.role_type,
            body.is_default,
            &url_method,
        )
        .await
    {
        Ok(()) => created(),
        Err(e) => fail(e),
    }
}

/// DELETE /oreo/auth/role?roleName=
pub async fn del_role(
    State(state): State<AppState>,
    Query(q): Query<RoleNameQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.remove_role(&q.role_name).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/role/user?userId= — role names only.
pub async fn query_user_roles(
    State(state): State<AppState>,
    Query(q): Query<UserIdQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.user_own_rolenames(&q.user_id).await {
        Ok(names) => ok(names),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/role/user
pub async fn add_role_users(
    State(state): State<AppState>,
    Json(body): Json<AuthRoleUser>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.add_role_users(&body.role_name, &body.role_users).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/role/user
pub async fn del_role_users(
    State(state): State<AppState>,
    Json(body): Json<AuthRoleUser>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .remove_role_users(&body.role_name, &body.role_users)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/role/info?roleName= — empty name lists every role.
pub async fn query_role_info(
    State(state): State<AppState>,
    Query(q): Query<RoleNameQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.get_role_list(&q.role_name).await {
        Ok(roles) => ok(roles),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/role/info
pub async fn set_default_role(
    State(state): State<AppState>,
    Json(body): Json<AuthRoleInfo>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.set_default_role(&body.role_name).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/role/info
pub async fn update_role_type_desc(
    State(state): State<AppState>,
    Json(body): Json<AuthRoleInfo>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .update_role_type_desc(&body.role_name, &body.role_desc, body.role_type)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}
