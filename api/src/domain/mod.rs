//! Domain layer - typed reads and writes against the content store

pub mod cosplayers;
pub mod documents;
pub mod posts;
