//! Items: the one resource this service manages.

pub mod item_api;
pub mod item_repository;
pub mod item_service;
