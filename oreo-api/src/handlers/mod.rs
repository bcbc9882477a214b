pub mod roles;
pub mod routes;
pub mod signs;
pub mod users;

use axum::http::StatusCode;
use axum::Json;
use oreo_core::error::OreoError;
use serde_json::{json, Value};

pub(crate) fn ok<T: serde::Serialize>(result: T) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"code": 0, "msg": "OK", "result": result})),
    )
}

pub(crate) fn created() -> (StatusCode, Json<Value>) {
    (
        StatusCode::CREATED,
        Json(json!({"code": 0, "msg": "OK", "result": Value::Null})),
    )
}

pub(crate) fn fail(err: OreoError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({"code": status.as_u16(), "msg": err.to_string(), "result": Value::Null})),
    )
}
