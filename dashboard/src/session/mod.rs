//! Live sessions: deployments and connection tests

pub mod driver;
pub mod log_stream;

pub use driver::{follow, follow_request, open};
pub use log_stream::{LogStream, SessionEvent, SessionKey};
