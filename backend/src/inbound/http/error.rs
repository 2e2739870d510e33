//! HTTP adapter mapping for dashboard errors.
//!
//! Keeps the domain error type HTTP-agnostic while turning failures into
//! consistent HTML error pages and status codes.

use actix_web::http::header::{CONTENT_TYPE, ContentType};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;
use crate::render::render_error_page;

const INTERNAL_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal(INTERNAL_MESSAGE);
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        let shown = redact_if_internal(self);
        let heading = status.canonical_reason().unwrap_or("Error");
        match render_error_page(status.as_u16(), heading, shown.message(), shown.trace_id()) {
            Ok(page) => builder.content_type(ContentType::html()).body(page),
            Err(_) => builder
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body(shown.message().to_owned()),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to dashboard error");
        Self::internal(INTERNAL_MESSAGE)
    }
}
