use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use futures::StreamExt;
use tracing::{error, warn};

use crate::shared::api::Envelope;
use crate::upload::application::{
    ports::incoming::use_cases::{check_declared_length, UploadFileError},
    services::{parse_upload, IncomingPart},
};
use crate::AppState;

// ──────────────────────────────────────────────────────────
// Routes
// ──────────────────────────────────────────────────────────

/// `POST /upload`; any other method on the path answers 405.
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/upload")
            .route(web::post().to(upload_file_handler))
            .default_service(web::to(upload_method_not_allowed)),
    );
}

async fn upload_method_not_allowed() -> HttpResponse {
    Envelope::method_not_allowed("Method not allowed. Use POST.", "POST")
}

// ──────────────────────────────────────────────────────────
// Handler
// ──────────────────────────────────────────────────────────

pub async fn upload_file_handler(
    req: HttpRequest,
    payload: Multipart,
    data: web::Data<AppState>,
) -> impl Responder {
    let policy = &data.upload.policy;

    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    if let Err(e) = check_declared_length(declared, policy) {
        return map_upload_error(e);
    }

    // Each field is its own body stream; the parser reads one before asking for the next.
    let parts = payload.map(|field| {
        field.map(|field| IncomingPart {
            field_name: field.name().unwrap_or_default().to_string(),
            file_name: field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string),
            content_type: field.content_type().map(|m| m.essence_str().to_string()),
            body: field,
        })
    });

    let command = match parse_upload(parts, policy).await {
        Ok(cmd) => cmd,
        Err(e) => return map_upload_error(e),
    };

    match data.upload.upload_file.execute(command).await {
        Ok(result) => Envelope::success(&result.public_url),
        Err(e) => map_upload_error(e),
    }
}

fn map_upload_error(e: UploadFileError) -> HttpResponse {
    match e {
        UploadFileError::MissingFile
        | UploadFileError::MissingFileName
        | UploadFileError::MultipleFiles => {
            warn!("Rejected upload: {}", e);
            Envelope::bad_request(&e.to_string())
        }
        UploadFileError::MalformedMultipart(ref reason) => {
            warn!("Malformed multipart request: {}", reason);
            Envelope::bad_request("Request body must be multipart/form-data with a 'file' field.")
        }
        UploadFileError::DisallowedExtension(ref ext) => {
            warn!(extension = ?ext, "Rejected upload: extension not allowed");
            Envelope::unsupported_media_type("File type is not allowed.")
        }
        UploadFileError::FileTooLarge {
            max_bytes,
            received_bytes,
        } => {
            warn!(max_bytes, received_bytes, "Rejected upload: file too large");
            Envelope::payload_too_large("Uploaded file exceeds the configured maximum size.")
        }
        UploadFileError::Storage(err) => {
            error!("Storage error uploading file: {}", err);
            Envelope::bad_gateway("Failed to upload file to Google Cloud Storage.")
        }
        UploadFileError::Internal(msg) => {
            error!("Internal error uploading file: {}", msg);
            Envelope::internal_error()
        }
    }
}
