//! REST client for the deployment backend

pub mod client;
pub mod projects;
pub mod reference;

pub use client::HttpClient;
pub use reference::ReferenceKind;
