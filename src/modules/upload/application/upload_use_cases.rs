use std::sync::Arc;

use crate::upload::application::{
    domain::policies::upload_policy::UploadPolicy,
    ports::incoming::use_cases::UploadFileUseCase,
};

#[derive(Clone)]
pub struct UploadUseCases {
    pub policy: Arc<UploadPolicy>,
    pub upload_file: Arc<dyn UploadFileUseCase + Send + Sync>,
}
