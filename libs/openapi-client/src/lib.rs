//! Wire models shared with the deployment backend.
//!
//! Field names follow the backend's camelCase JSON. Deserialization is
//! lenient where the backend is known to vary (numeric vs. string ids,
//! free-form status strings).

pub mod lenient;
pub mod models;
