//! Maps domain errors onto HTTP responses.
//!
//! Every failure leaves the API as the same JSON envelope: `code`, `message`,
//! optional `details`, and the request `traceId`. Extractor rejections
//! (malformed bodies, bad query strings, unparsable path segments) are
//! routed through here too so clients never see actix's plain-text defaults.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Strip message and details from internal errors, keeping the trace id so
/// the failure can still be found in the logs.
fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(INTERNAL_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(message = self.message(), trace_id = ?self.trace_id(), "internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}

fn rejected(source: &'static str, reason: String) -> actix_web::Error {
    debug!(source, %reason, "request rejected by extractor");
    Error::invalid_request(format!("invalid request {source}"))
        .with_details(json!({ "source": source, "reason": reason }))
        .into()
}

fn json_rejection(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            Error::invalid_request("request body is too large").into()
        }
        JsonPayloadError::ContentType => {
            Error::invalid_request("content type must be application/json").into()
        }
        other => rejected("body", other.to_string()),
    }
}

fn query_rejection(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejected("query", err.to_string())
}

fn path_rejection(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    rejected("path", err.to_string())
}

/// Extractor configs that report rejections as `invalid_request` envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_rejection)
}

/// See [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_rejection)
}

/// See [`json_config`].
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_rejection)
}
