use crate::entity::{AuthUrlMethod, AuthUrlMethods, UrlMethodQuery, UrlQuery};
use crate::handlers::{created, fail, ok};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use oreo_core::route::RouteData;
use serde_json::Value;

/// GET /oreo/auth/route
pub async fn route_list(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.oreo.get_route_list().await {
        Ok(routes) => ok(routes),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/route
pub async fn add_routes(
    State(state): State<AppState>,
    Json(routes): Json<Vec<RouteData>>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.add_route(&routes).await {
        Ok(()) => created(),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/route — uri desc plus any listed method descs.
pub async fn update_route_desc(
    State(state): State<AppState>,
    Json(body): Json<AuthUrlMethods>,
) -> (StatusCode, Json<Value>) {
    if let Err(e) = state.oreo.update_route_desc(&body.url, &body.desc).await {
        return fail(e);
    }

    for method in &body.methods {
        if let Err(e) = state
            .oreo
            .update_route_method_desc(&body.url, &method.method, &method.desc)
            .await
        {
            return fail(e);
        }
    }

    ok(Value::Null)
}

/// DELETE /oreo/auth/route?url=
pub async fn del_route(
    State(state): State<AppState>,
    Query(q): Query<UrlQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.delete_route(&q.url).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/route/method
pub async fn data_auth_routes(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.oreo.get_data_auth_routes().await {
        Ok(routes) => ok(routes),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/route/method
pub async fn enable_data_auth(
    State(state): State<AppState>,
    Json(body): Json<AuthUrlMethod>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.enable_route_data_auth(&body.url, &body.method).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// POST /oreo/auth/route/method
pub async fn disable_data_auth(
    State(state): State<AppState>,
    Json(body): Json<AuthUrlMethod>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.disable_route_data_auth(&body.url, &body.method).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// DELETE /oreo/auth/route/method?url=&method=
pub async fn del_route_method(
    State(state): State<AppState>,
    Query(q): Query<UrlMethodQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.delete_route_by_method(&q.url, &q.method).await {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// PUT /oreo/auth/route/method/desc
pub async fn update_route_method_desc(
    State(state): State<AppState>,
    Json(body): Json<AuthUrlMethod>,
) -> (StatusCode, Json<Value>) {
    match state
        .oreo
        .update_route_method_desc(&body.url, &body.method, &body.desc)
        .await
    {
        Ok(()) => ok(Value::Null),
        Err(e) => fail(e),
    }
}

/// GET /oreo/auth/route/info?url= — regex lookup.
pub async fn query_route_info(
    State(state): State<AppState>,
    Query(q): Query<UrlQuery>,
) -> (StatusCode, Json<Value>) {
    match state.oreo.get_route_by_url_regex(&q.url).await {
        Ok(routes) => ok(routes),
        Err(e) => fail(e),
    }
}
