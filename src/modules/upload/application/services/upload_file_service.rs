use async_trait::async_trait;

use crate::upload::application::{
    domain::entities::ObjectName,
    ports::{
        incoming::use_cases::{
            UploadFileCommand, UploadFileError, UploadFileResult, UploadFileUseCase,
        },
        outgoing::cloud_storage::{ObjectStorage, StoreObject},
    },
};

pub struct UploadFileService<S>
where
    S: ObjectStorage,
{
    storage: S,
}

impl<S> UploadFileService<S>
where
    S: ObjectStorage,
{
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S> UploadFileUseCase for UploadFileService<S>
where
    S: ObjectStorage + Send + Sync,
{
    async fn execute(
        &self,
        command: UploadFileCommand,
    ) -> Result<UploadFileResult, UploadFileError> {
        let size_bytes = command.size();
        let original_name = command.original_name().to_string();
        let (extension, content_type, content) = command.into_parts();

        // Fresh name per request; the client's file name is never reused.
        let object_name = ObjectName::generate(extension.as_deref());

        let object = StoreObject::try_new(object_name.to_string(), content_type, content)
            .map_err(|e| UploadFileError::Internal(e.to_string()))?;

        let public_url = self.storage.store(object).await.map_err(|err| {
            tracing::error!(
                object_name = %object_name,
                error = %err,
                "object storage rejected upload"
            );
            UploadFileError::Storage(err)
        })?;

        tracing::info!(
            object_name = %object_name,
            original_name = %original_name,
            size_bytes,
            "file uploaded"
        );

        Ok(UploadFileResult {
            object_name: object_name.into_string(),
            public_url,
            size_bytes,
        })
    }
}
