mod upload_file;

pub use upload_file::{
    check_declared_length, AdmittedFile, UploadFileCommand, UploadFileCommandBuilder,
    UploadFileError, UploadFileResult, UploadFileUseCase, MULTIPART_OVERHEAD_ALLOWANCE,
};
