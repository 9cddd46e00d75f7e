//! Content retrieval, filtering and contact dispatch for a headless-CMS backed
//! portfolio site.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
