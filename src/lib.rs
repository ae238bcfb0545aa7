//! An HTTP service for creating, reading, updating and deleting items.

pub mod feature;
pub mod infra;
pub mod server;
