//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the local media store and the image description providers.

pub mod storage;
pub mod vision;
