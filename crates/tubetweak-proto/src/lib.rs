//! Shared types for tubetweak: the host-page boundary, wire-level value types
//! and the on-disk configuration.

pub mod config;
pub mod page;
pub mod platform;
pub mod protocol;
