use crate::tests::support::stubs::InMemoryObjectStorage;
use crate::upload::application::{
    domain::policies::upload_policy::UploadPolicy,
    ports::{incoming::use_cases::UploadFileUseCase, outgoing::cloud_storage::ObjectStorage},
    services::UploadFileService,
    upload_use_cases::UploadUseCases,
};
use crate::AppState;
use actix_web::web;
use std::sync::Arc;

pub struct TestAppStateBuilder {
    policy: UploadPolicy,
    storage: Arc<dyn ObjectStorage>,
    upload_file: Option<Arc<dyn UploadFileUseCase + Send + Sync>>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::unrestricted(),
            storage: Arc::new(InMemoryObjectStorage::default()),
            upload_file: None,
        }
    }
}

impl TestAppStateBuilder {
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs the real upload service on top of the given storage.
    pub fn with_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the whole use case, bypassing storage.
    pub fn with_upload_file(
        mut self,
        uc: impl UploadFileUseCase + Send + Sync + 'static,
    ) -> Self {
        self.upload_file = Some(Arc::new(uc));
        self
    }

    pub fn build(self) -> web::Data<AppState> {
        let upload_file: Arc<dyn UploadFileUseCase + Send + Sync> = match self.upload_file {
            Some(uc) => uc,
            None => Arc::new(UploadFileService::new(self.storage)),
        };

        web::Data::new(AppState {
            upload: UploadUseCases {
                policy: Arc::new(self.policy),
                upload_file,
            },
        })
    }
}
