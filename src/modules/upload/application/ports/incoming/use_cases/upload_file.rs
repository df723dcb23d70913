use async_trait::async_trait;

use crate::upload::application::{
    domain::policies::upload_policy::{normalized_extension, UploadPolicy},
    ports::outgoing::cloud_storage::{ObjectContent, StoreObjectError},
};

/// Headroom for multipart boundaries and part headers when comparing the
/// declared request length against the per-file limit.
pub const MULTIPART_OVERHEAD_ALLOWANCE: u64 = 64 * 1024;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum UploadFileError {
    #[error("Missing required multipart field 'file'.")]
    MissingFile,

    #[error("A filename must be supplied.")]
    MissingFileName,

    #[error("Only one 'file' field may be sent per request.")]
    MultipleFiles,

    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("File type is not allowed: {}", .0.as_deref().unwrap_or("<none>"))]
    DisallowedExtension(Option<String>),

    #[error("Uploaded file exceeds the configured maximum size (max {max_bytes} bytes, got at least {received_bytes} bytes).")]
    FileTooLarge { max_bytes: u64, received_bytes: u64 },

    #[error("Storage service error: {0}")]
    Storage(#[from] StoreObjectError),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn check_extension(
    file_name: &str,
    policy: &UploadPolicy,
) -> Result<Option<String>, UploadFileError> {
    let extension = normalized_extension(file_name);
    if !policy.permits_extension(extension.as_deref()) {
        return Err(UploadFileError::DisallowedExtension(extension));
    }
    Ok(extension)
}

/// Early rejection from the request's `Content-Length`, before any body is read.
pub fn check_declared_length(
    declared_bytes: Option<u64>,
    policy: &UploadPolicy,
) -> Result<(), UploadFileError> {
    match (declared_bytes, policy.max_file_size_bytes()) {
        (Some(declared), Some(max_bytes))
            if declared > max_bytes.saturating_add(MULTIPART_OVERHEAD_ALLOWANCE) =>
        {
            Err(UploadFileError::FileTooLarge {
                max_bytes,
                received_bytes: declared,
            })
        }
        _ => Ok(()),
    }
}

/// A fully received file that passed the upload policy.
///
/// Only reachable through [`AdmittedFile::into_command`]; the size limit is
/// enforced by whoever reads the body (see `parse_upload`).
#[derive(Debug)]
pub struct UploadFileCommand {
    original_name: String,
    extension: Option<String>,
    content_type: Option<String>,
    content: ObjectContent,
}

impl UploadFileCommand {
    pub fn builder() -> UploadFileCommandBuilder {
        UploadFileCommandBuilder::default()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
    pub fn content(&self) -> &ObjectContent {
        &self.content
    }
    pub fn size(&self) -> u64 {
        self.content.len()
    }

    pub fn into_parts(self) -> (Option<String>, Option<String>, ObjectContent) {
        (self.extension, self.content_type, self.content)
    }
}

#[derive(Default)]
pub struct UploadFileCommandBuilder {
    file_name: Option<String>,
    content_type: Option<String>,
}

impl UploadFileCommandBuilder {
    pub fn file_name(mut self, file_name: String) -> Self {
        self.file_name = Some(file_name);
        self
    }

    pub fn content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Checks the file name, then its extension, against the injected policy.
    /// Runs before any of the body is read.
    pub fn admit(self, policy: &UploadPolicy) -> Result<AdmittedFile, UploadFileError> {
        let original_name = self
            .file_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(UploadFileError::MissingFileName)?;
        let extension = check_extension(&original_name, policy)?;

        Ok(AdmittedFile {
            original_name,
            extension,
            content_type: self.content_type,
        })
    }
}

/// File metadata that passed the name and extension checks; waiting for its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedFile {
    original_name: String,
    extension: Option<String>,
    content_type: Option<String>,
}

impl AdmittedFile {
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn into_command(self, content: impl Into<ObjectContent>) -> UploadFileCommand {
        UploadFileCommand {
            original_name: self.original_name,
            extension: self.extension,
            content_type: self.content_type,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFileResult {
    pub object_name: String,
    pub public_url: String,
    pub size_bytes: u64,
}

#[async_trait]
pub trait UploadFileUseCase: Send + Sync {
    async fn execute(
        &self,
        command: UploadFileCommand,
    ) -> Result<UploadFileResult, UploadFileError>;
}
