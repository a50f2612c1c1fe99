//! Shipdeck Library
//!
//! Terminal client for a remote-deployment backend: REST calls, the realtime
//! log channel, and the views built on top of them.

pub mod app;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod realtime;
pub mod session;
pub mod storage;
pub mod utils;
pub mod views;
pub mod wizard;
pub mod workers;
