// src/shared/api/fallback.rs
use actix_web::HttpResponse;

use crate::shared::api::Envelope;

/// Default service: unknown routes still answer with the JSON envelope.
pub async fn route_not_found() -> HttpResponse {
    Envelope::not_found("The requested resource was not found.")
}
