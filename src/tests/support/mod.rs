pub mod app_state_builder;
pub mod multipart;
pub mod stubs;
