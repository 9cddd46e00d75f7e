//! Application services: fetch functions, cached query hooks and contact
//! dispatch.

pub mod contact;
pub mod content;
pub mod error;
pub mod queries;
pub mod query;
pub mod sitemap;
