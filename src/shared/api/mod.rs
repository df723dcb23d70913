pub mod fallback;
mod response;

pub use response::Envelope;
