//! Background workers

pub mod realtime;
