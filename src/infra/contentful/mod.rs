//! Client for the headless CMS content delivery API.

mod client;
pub mod mapping;

pub use client::{ContentClient, ContentClientConfig, DEFAULT_ENVIRONMENT};
pub(crate) use client::{transport_error, user_agent};
