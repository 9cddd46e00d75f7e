//! Infrastructure adapters and runtime bootstrap.

pub mod content;
pub mod contentful;
pub mod email;
pub mod error;
pub mod http;
pub mod telemetry;
