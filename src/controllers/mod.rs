pub mod admin;
pub mod location;
pub mod venues;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json, Router,
};
use std::sync::Arc;

use crate::{error::AppError, AppState};

pub fn routes(enable_admin: bool) -> Router<Arc<AppState>> {
    let router = Router::new()
        .merge(venues::routes())
        .merge(location::routes());

    if enable_admin {
        router.nest("/admin", admin::routes())
    } else {
        router
    }
}

/// Unwraps a JSON body, turning axum's plain-text rejection into our error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
