//! Realtime event models

pub mod events;
