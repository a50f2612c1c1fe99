//! Realtime event channel shared by all views

pub mod channels;
pub mod client;
pub mod packet;
pub mod transport;

pub use channels::{Channels, SessionKind};
pub use client::{ConnectionState, RealtimeClient, Subscription};
