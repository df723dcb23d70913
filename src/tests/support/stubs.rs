use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use crate::upload::application::ports::outgoing::cloud_storage::{
    ObjectStorage, StoreObject, StoreObjectError,
};

pub const TEST_BUCKET: &str = "test-bucket";

/// Snapshot of a stored object, content read back into memory.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub object_name: String,
    pub content_type: String,
    pub content: Bytes,
    pub spooled: bool,
}

impl StoredObject {
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Records every stored object and answers with a bucket style public URL.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: Mutex<Vec<StoredObject>>,
}

impl InMemoryObjectStorage {
    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn store(&self, object: StoreObject) -> Result<String, StoreObjectError> {
        let object_name = object.object_name().to_string();
        let content_type = object.content_type().to_string();
        let content = object.into_content();
        let spooled = content.is_spooled();
        let content = content
            .read_all()
            .await
            .map_err(|_| StoreObjectError::Infrastructure)?;

        let url = format!(
            "https://storage.googleapis.com/{}/{}",
            TEST_BUCKET, object_name
        );
        self.objects.lock().unwrap().push(StoredObject {
            object_name,
            content_type,
            content,
            spooled,
        });
        Ok(url)
    }
}

/// Always fails with the wrapped error and stores nothing.
pub struct FailingObjectStorage(pub StoreObjectError);

#[async_trait]
impl ObjectStorage for FailingObjectStorage {
    async fn store(&self, _object: StoreObject) -> Result<String, StoreObjectError> {
        Err(self.0.clone())
    }
}

// Lets tests keep a handle on the stub after moving it into the service.
#[async_trait]
impl<T> ObjectStorage for std::sync::Arc<T>
where
    T: ObjectStorage + ?Sized,
{
    async fn store(&self, object: StoreObject) -> Result<String, StoreObjectError> {
        (**self).store(object).await
    }
}
