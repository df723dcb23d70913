use async_trait::async_trait;
use bytes::Bytes;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ============================================================================
// Domain Types
// ============================================================================

/// Bytes of one upload, either held in memory or spooled to an anonymous temp file.
///
/// A spooled file is positioned at its start and is removed by the OS once dropped.
#[derive(Debug)]
pub enum ObjectContent {
    Memory(Bytes),
    Spooled { file: tokio::fs::File, len: u64 },
}

impl ObjectContent {
    pub fn len(&self) -> u64 {
        match self {
            ObjectContent::Memory(bytes) => bytes.len() as u64,
            ObjectContent::Spooled { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_spooled(&self) -> bool {
        matches!(self, ObjectContent::Spooled { .. })
    }

    /// Reads everything back into memory.
    #[cfg(test)]
    pub async fn read_all(self) -> std::io::Result<Bytes> {
        use tokio::io::AsyncReadExt;

        match self {
            ObjectContent::Memory(bytes) => Ok(bytes),
            ObjectContent::Spooled { mut file, len } => {
                let mut out = Vec::with_capacity(len as usize);
                file.read_to_end(&mut out).await?;
                Ok(Bytes::from(out))
            }
        }
    }
}

impl From<Bytes> for ObjectContent {
    fn from(bytes: Bytes) -> Self {
        ObjectContent::Memory(bytes)
    }
}

/// Validated object handed to the storage backend.
///
/// # Construction
/// - Use `try_new()`, which rejects an empty object name
/// - A missing or blank content type falls back to `application/octet-stream`
#[derive(Debug)]
pub struct StoreObject {
    object_name: String,
    content_type: String,
    content: ObjectContent,
}

impl StoreObject {
    pub fn try_new(
        object_name: String,
        content_type: Option<String>,
        content: impl Into<ObjectContent>,
    ) -> Result<Self, StoreObjectInfoError> {
        if object_name.trim().is_empty() {
            return Err(StoreObjectInfoError::EmptyField("object_name"));
        }

        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(Self {
            object_name,
            content_type,
            content: content.into(),
        })
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content(&self) -> &ObjectContent {
        &self.content
    }

    pub fn into_content(self) -> ObjectContent {
        self.content
    }

    pub fn size(&self) -> u64 {
        self.content.len()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Upstream failures reported by the storage backend.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreObjectError {
    #[error("Access to the bucket was denied")]
    AccessDenied,

    #[error("Bucket not found")]
    BucketNotFound,

    #[error("Storage quota or rate limit exceeded")]
    QuotaExceeded,

    #[error("Network problem occurred")]
    Network,

    #[error("Infrastructure error occurred")]
    Infrastructure,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreObjectInfoError {
    #[error("Field '{0}' cannot be empty")]
    EmptyField(&'static str),
}

// ============================================================================
// Port Interface
// ============================================================================

/// Port for persisting uploaded bytes.
///
/// A successful call leaves exactly one new object visible in the bucket; a
/// failed call must leave none.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `object` and returns its public URL.
    async fn store(&self, object: StoreObject) -> Result<String, StoreObjectError>;
}
