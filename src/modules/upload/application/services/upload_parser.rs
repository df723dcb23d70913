use std::fmt;
use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::content_spool::{ContentSpool, SPOOL_THRESHOLD_BYTES};
use crate::upload::application::{
    domain::policies::upload_policy::UploadPolicy,
    ports::{
        incoming::use_cases::{UploadFileCommand, UploadFileError},
        outgoing::cloud_storage::ObjectContent,
    },
};

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// One multipart part, detached from any HTTP framework.
pub struct IncomingPart<B> {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: B,
}

/// Turns a stream of multipart parts into a validated [`UploadFileCommand`].
///
/// Only the `file` part is kept; other fields are skipped. The extension is
/// checked before the part body is read, and the body is abandoned as soon as
/// it grows past the policy limit. Bodies above [`SPOOL_THRESHOLD_BYTES`] are
/// spooled to a temp file.
pub async fn parse_upload<P, B, E>(
    parts: P,
    policy: &UploadPolicy,
) -> Result<UploadFileCommand, UploadFileError>
where
    P: Stream<Item = Result<IncomingPart<B>, E>>,
    B: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut parts = pin!(parts);
    let mut command: Option<UploadFileCommand> = None;

    while let Some(part) = parts.next().await {
        let part = part.map_err(|e| UploadFileError::MalformedMultipart(e.to_string()))?;

        if part.field_name != FILE_FIELD {
            continue;
        }
        if command.is_some() {
            return Err(UploadFileError::MultipleFiles);
        }

        let mut builder = UploadFileCommand::builder().content_type(part.content_type);
        if let Some(file_name) = part.file_name {
            builder = builder.file_name(file_name);
        }
        let admitted = builder.admit(policy)?;

        let content = read_limited(part.body, policy, SPOOL_THRESHOLD_BYTES).await?;
        command = Some(admitted.into_command(content));
    }

    command.ok_or(UploadFileError::MissingFile)
}

async fn read_limited<B, E>(
    body: B,
    policy: &UploadPolicy,
    spool_threshold: usize,
) -> Result<ObjectContent, UploadFileError>
where
    B: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut body = pin!(body);
    let mut spool = ContentSpool::new(spool_threshold);

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| UploadFileError::MalformedMultipart(e.to_string()))?;

        let received = spool.len() + chunk.len() as u64;
        if let Some(max_bytes) = policy.max_file_size_bytes() {
            if policy.exceeds_limit(received) {
                return Err(UploadFileError::FileTooLarge {
                    max_bytes,
                    received_bytes: received,
                });
            }
        }

        spool.write(&chunk).await.map_err(spool_error)?;
    }

    spool.finish().await.map_err(spool_error)
}

fn spool_error(err: std::io::Error) -> UploadFileError {
    tracing::error!(error = %err, "failed to buffer upload body");
    UploadFileError::Internal(format!("failed to buffer upload body: {err}"))
}
