use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::shared::config::StorageConfig;
use crate::upload::application::ports::outgoing::cloud_storage::{
    ObjectContent, ObjectStorage, StoreObject, StoreObjectError,
};

const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Unreserved URL characters stay as they are; everything else is escaped.
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn public_url(bucket: &str, object_name: &str) -> String {
    format!(
        "{}/{}/{}",
        PUBLIC_HOST,
        bucket,
        utf8_percent_encode(object_name, OBJECT_NAME)
    )
}

/// What the underlying client needs for one single request upload.
#[derive(Debug)]
struct ObjectUpload {
    bucket: String,
    name: String,
    content_type: String,
    content: ObjectContent,
    public_read: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct UploadFailure {
    status: Option<u16>,
    message: String,
}

impl UploadFailure {
    fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

fn map_upload_failure(failure: &UploadFailure) -> StoreObjectError {
    let m = failure.message.to_lowercase();

    if m.contains("quota") || m.contains("rate limit") {
        return StoreObjectError::QuotaExceeded;
    }

    match failure.status {
        Some(401) | Some(403) => StoreObjectError::AccessDenied,
        Some(404) => StoreObjectError::BucketNotFound,
        Some(429) => StoreObjectError::QuotaExceeded,
        Some(_) => StoreObjectError::Infrastructure,
        None if m.contains("timeout")
            || m.contains("dns")
            || m.contains("connection")
            || m.contains("network")
            || m.contains("tcp") =>
        {
            StoreObjectError::Network
        }
        None => StoreObjectError::Infrastructure,
    }
}

/// Internal seam so the adapter can be tested without touching real GCS types.
#[async_trait]
trait GcsClient: Send + Sync {
    async fn upload_object(&self, upload: ObjectUpload) -> Result<(), UploadFailure>;
}

#[cfg(test)]
struct ArcGcsClient(Arc<dyn GcsClient>);

#[cfg(test)]
#[async_trait]
impl GcsClient for ArcGcsClient {
    async fn upload_object(&self, upload: ObjectUpload) -> Result<(), UploadFailure> {
        self.0.upload_object(upload).await
    }
}

/// Production adapter for the [`ObjectStorage`] port.
#[derive(Clone)]
pub struct GcsObjectStorage {
    client: Arc<OnceCell<Box<dyn GcsClient>>>,
    bucket: String,
    credentials_path: PathBuf,
    public_read: bool,
}

impl GcsObjectStorage {
    /// The client is created lazily on the first upload.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: Arc::new(OnceCell::new()),
            bucket: config.bucket,
            credentials_path: config.credentials_path,
            public_read: config.public_read,
        }
    }

    async fn get_client(&self) -> Result<&dyn GcsClient, Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .get_or_try_init(|| async {
                let real_client = RealGcsClient::new(&self.credentials_path).await?;
                Ok(Box::new(real_client) as Box<dyn GcsClient>)
            })
            .await
            .map(|boxed| &**boxed)
    }

    #[cfg(test)]
    fn with_client(client: Arc<dyn GcsClient>, bucket: &str, public_read: bool) -> Self {
        let once = OnceCell::new();
        let _ = once.set(Box::new(ArcGcsClient(client)) as Box<dyn GcsClient>);

        Self {
            client: Arc::new(once),
            bucket: bucket.to_string(),
            credentials_path: PathBuf::new(),
            public_read,
        }
    }
}

#[async_trait]
impl ObjectStorage for GcsObjectStorage {
    async fn store(&self, object: StoreObject) -> Result<String, StoreObjectError> {
        let client = self.get_client().await.map_err(|e| {
            tracing::error!(error = %e, "failed to initialize GCS client");
            StoreObjectError::Infrastructure
        })?;

        let name = object.object_name().to_string();
        let content_type = object.content_type().to_string();

        let upload = ObjectUpload {
            bucket: self.bucket.clone(),
            name: name.clone(),
            content_type,
            content: object.into_content(),
            public_read: self.public_read,
        };

        client.upload_object(upload).await.map_err(|failure| {
            tracing::warn!(
                bucket = %self.bucket,
                object_name = %name,
                status = ?failure.status,
                message = %failure.message,
                "GCS upload failed"
            );
            map_upload_failure(&failure)
        })?;

        Ok(public_url(&self.bucket, &name))
    }
}

// ============================================================================
// Real Google Cloud Storage client (google-cloud-storage)
// ============================================================================

struct RealGcsClient {
    client: google_cloud_storage::client::Client,
}

impl RealGcsClient {
    async fn new(
        credentials_path: &std::path::Path,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        use google_cloud_storage::client::{
            google_cloud_auth::credentials::CredentialsFile, ClientConfig,
        };

        tracing::info!(path = %credentials_path.display(), "Initializing GCS client...");

        let credentials =
            CredentialsFile::new_from_file(credentials_path.to_string_lossy().into_owned())
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read GCS credentials: {:?}", e);
                    e
                })?;

        let config = ClientConfig::default()
            .with_credentials(credentials)
            .await
            .map_err(|e| {
                tracing::error!("Failed to build GCS client config: {:?}", e);
                e
            })?;

        tracing::info!("GCS client created");

        Ok(Self {
            client: google_cloud_storage::client::Client::new(config),
        })
    }
}

#[async_trait]
impl GcsClient for RealGcsClient {
    async fn upload_object(&self, upload: ObjectUpload) -> Result<(), UploadFailure> {
        use google_cloud_storage::http::{
            object_access_controls::PredefinedObjectAcl,
            objects::upload::{Media, UploadObjectRequest, UploadType},
            Error,
        };
        use tokio_util::io::ReaderStream;

        let upload_type = UploadType::Simple(Media {
            name: upload.name.into(),
            content_type: upload.content_type.into(),
            content_length: Some(upload.content.len()),
        });

        let request = UploadObjectRequest {
            bucket: upload.bucket,
            predefined_acl: upload.public_read.then_some(PredefinedObjectAcl::PublicRead),
            ..Default::default()
        };

        // Spooled bodies are streamed from disk with their known length.
        let result = match upload.content {
            ObjectContent::Memory(bytes) => {
                self.client
                    .upload_object(&request, bytes, &upload_type)
                    .await
            }
            ObjectContent::Spooled { file, .. } => {
                self.client
                    .upload_streamed_object(&request, ReaderStream::new(file), &upload_type)
                    .await
            }
        };

        result.map(|_| ()).map_err(|e| match e {
                Error::Response(resp) => UploadFailure {
                    status: Some(resp.code),
                    message: resp.message,
                },
                other => UploadFailure::transport(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// An upload as the fake saw it, with the content read back into memory.
    #[derive(Debug, Clone)]
    struct RecordedUpload {
        bucket: String,
        name: String,
        content_type: String,
        content: Bytes,
        spooled: bool,
        public_read: bool,
    }

    struct FakeGcsClient {
        uploads: Mutex<Vec<RecordedUpload>>,
        upload_result: Mutex<Result<(), UploadFailure>>,
    }

    impl Default for FakeGcsClient {
        fn default() -> Self {
            Self {
                uploads: Mutex::new(Vec::new()),
                upload_result: Mutex::new(Ok(())),
            }
        }
    }

    impl FakeGcsClient {
        fn new() -> Self {
            Self::default()
        }

        fn failing(status: Option<u16>, message: &str) -> Self {
            let fake = Self::new();
            *fake.upload_result.lock().unwrap() = Err(UploadFailure {
                status,
                message: message.to_string(),
            });
            fake
        }

        fn uploads(&self) -> Vec<RecordedUpload> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GcsClient for FakeGcsClient {
        async fn upload_object(&self, upload: ObjectUpload) -> Result<(), UploadFailure> {
            let spooled = upload.content.is_spooled();
            let content = upload.content.read_all().await.unwrap();
            self.uploads.lock().unwrap().push(RecordedUpload {
                bucket: upload.bucket,
                name: upload.name,
                content_type: upload.content_type,
                content,
                spooled,
                public_read: upload.public_read,
            });
            self.upload_result.lock().unwrap().clone()
        }
    }

    fn sample_object() -> StoreObject {
        StoreObject::try_new(
            "0f8e.png".to_string(),
            Some("image/png".to_string()),
            Bytes::from_static(b"pixels"),
        )
        .unwrap()
    }

    async fn store_with(fake: FakeGcsClient) -> Result<String, StoreObjectError> {
        let svc = GcsObjectStorage::with_client(Arc::new(fake), "uploads-bucket", true);
        svc.store(sample_object()).await
    }

    #[tokio::test]
    async fn test_store_uploads_object_and_returns_public_url() {
        let fake = Arc::new(FakeGcsClient::new());
        let svc = GcsObjectStorage::with_client(fake.clone(), "uploads-bucket", true);

        let url = svc.store(sample_object()).await.unwrap();
        assert_eq!(url, "https://storage.googleapis.com/uploads-bucket/0f8e.png");

        let uploads = fake.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bucket, "uploads-bucket");
        assert_eq!(uploads[0].name, "0f8e.png");
        assert_eq!(uploads[0].content_type, "image/png");
        assert_eq!(uploads[0].content.as_ref(), b"pixels");
        assert!(uploads[0].public_read);
    }

    #[tokio::test]
    async fn test_store_passes_private_acl_setting() {
        let fake = Arc::new(FakeGcsClient::new());
        let svc = GcsObjectStorage::with_client(fake.clone(), "private-bucket", false);

        svc.store(sample_object()).await.unwrap();

        assert!(!fake.uploads()[0].public_read);
    }

    #[tokio::test]
    async fn test_store_maps_forbidden_to_access_denied() {
        let err = store_with(FakeGcsClient::failing(Some(403), "Forbidden"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::AccessDenied);

        let err = store_with(FakeGcsClient::failing(Some(401), "Invalid Credentials"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::AccessDenied);
    }

    #[tokio::test]
    async fn test_store_maps_missing_bucket() {
        let err = store_with(FakeGcsClient::failing(
            Some(404),
            "The specified bucket does not exist.",
        ))
        .await
        .unwrap_err();

        assert_eq!(err, StoreObjectError::BucketNotFound);
    }

    #[tokio::test]
    async fn test_store_maps_quota_errors() {
        let err = store_with(FakeGcsClient::failing(Some(429), "Too Many Requests"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::QuotaExceeded);

        let err = store_with(FakeGcsClient::failing(Some(403), "Quota exceeded for project"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::QuotaExceeded);
    }

    #[tokio::test]
    async fn test_store_maps_transport_errors_to_network() {
        let err = store_with(FakeGcsClient::failing(None, "error trying to connect: dns error"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreObjectError::Network);
    }

    #[tokio::test]
    async fn test_store_maps_unknown_errors_to_infrastructure() {
        let err = store_with(FakeGcsClient::failing(Some(503), "Backend Error"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::Infrastructure);

        let err = store_with(FakeGcsClient::failing(None, "something odd"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreObjectError::Infrastructure);
    }

    #[tokio::test]
    async fn test_store_hands_spooled_content_to_client() {
        use tokio::io::{AsyncSeekExt, AsyncWriteExt};

        let mut file = tokio::fs::File::from_std(tempfile::tempfile().unwrap());
        file.write_all(b"large body").await.unwrap();
        file.rewind().await.unwrap();

        let object = StoreObject::try_new(
            "big.bin".to_string(),
            None,
            ObjectContent::Spooled { file, len: 10 },
        )
        .unwrap();

        let fake = Arc::new(FakeGcsClient::new());
        let svc = GcsObjectStorage::with_client(fake.clone(), "uploads-bucket", true);
        svc.store(object).await.unwrap();

        let uploads = fake.uploads();
        assert!(uploads[0].spooled);
        assert_eq!(uploads[0].content.as_ref(), b"large body");
        assert_eq!(uploads[0].content_type, "application/octet-stream");
    }

    #[test]
    fn test_public_url_format() {
        assert_eq!(
            public_url("my-bucket", "abc.txt"),
            "https://storage.googleapis.com/my-bucket/abc.txt"
        );
    }

    #[test]
    fn test_public_url_escapes_reserved_characters() {
        assert_eq!(
            public_url("my-bucket", "3f2a.jpg_large"),
            "https://storage.googleapis.com/my-bucket/3f2a.jpg_large"
        );
        assert_eq!(
            public_url("my-bucket", "3f2a.p g#1"),
            "https://storage.googleapis.com/my-bucket/3f2a.p%20g%231"
        );
    }
}
