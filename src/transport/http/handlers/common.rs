use crate::storage::StoreError;
use crate::transport::http::types::{ApiReply, ApiResponse};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

/// Maps a store failure to its HTTP reply.
///
/// Not-found and validation outcomes are expected and only logged at debug.
pub fn store_error_reply(err: StoreError) -> ApiReply {
    let status = match &err {
        StoreError::NotFound(_) => {
            debug!("{}", err);
            StatusCode::NOT_FOUND
        }
        StoreError::Validation(_) => {
            debug!("{}", err);
            StatusCode::BAD_REQUEST
        }
        StoreError::MalformedDocument(_) | StoreError::Io(_) | StoreError::IdsExhausted(_) => {
            error!("{}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ApiResponse::failure(err.to_string())))
}

pub fn reply<T: Serialize>(status: StatusCode, data: &T) -> ApiReply {
    match serde_json::to_value(data) {
        Ok(value) => (status, Json(ApiResponse::ok(value))),
        Err(e) => {
            error!("response serialization failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("response serialization failed")),
            )
        }
    }
}
