//! Domain layer: content entities and the pure rules applied to them.

pub mod browse;
pub mod entities;
pub mod filter;
pub mod listing;
pub mod slug;
