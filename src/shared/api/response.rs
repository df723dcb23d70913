// src/shared/api/response.rs
use actix_web::{
    http::header::{self, HeaderValue},
    http::StatusCode,
    HttpResponse,
};
use serde::{Deserialize, Serialize};

/// JSON body returned for every outcome, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub code: u16,
    pub name: String,
    pub description: String,
}

impl Envelope {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            name: status_name(status).to_string(),
            description: description.into(),
        }
    }

    /// The single mapping from `(status, description)` to an HTTP response.
    pub fn respond(status: StatusCode, description: impl Into<String>) -> HttpResponse {
        HttpResponse::build(status).json(Self::new(status, description))
    }

    pub fn success(public_url: &str) -> HttpResponse {
        Self::respond(StatusCode::OK, public_url)
    }

    pub fn bad_request(description: &str) -> HttpResponse {
        Self::respond(StatusCode::BAD_REQUEST, description)
    }

    pub fn not_found(description: &str) -> HttpResponse {
        Self::respond(StatusCode::NOT_FOUND, description)
    }

    pub fn method_not_allowed(description: &str, allow: &'static str) -> HttpResponse {
        let mut resp = Self::respond(StatusCode::METHOD_NOT_ALLOWED, description);
        resp.headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static(allow));
        resp
    }

    pub fn payload_too_large(description: &str) -> HttpResponse {
        Self::respond(StatusCode::PAYLOAD_TOO_LARGE, description)
    }

    pub fn unsupported_media_type(description: &str) -> HttpResponse {
        Self::respond(StatusCode::UNSUPPORTED_MEDIA_TYPE, description)
    }

    pub fn bad_gateway(description: &str) -> HttpResponse {
        Self::respond(StatusCode::BAD_GATEWAY, description)
    }

    pub fn internal_error() -> HttpResponse {
        Self::respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected internal server error.",
        )
    }
}

fn status_name(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}
