//! Data models: the extracted invoice record, response envelope, and config.

pub mod config;
pub mod envelope;
pub mod invoice;
