mod content_spool;
mod upload_file_service;
mod upload_parser;

pub use upload_file_service::UploadFileService;
pub use upload_parser::{parse_upload, IncomingPart};
