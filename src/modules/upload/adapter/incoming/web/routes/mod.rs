mod upload_file;

pub use upload_file::configure_upload_routes;
