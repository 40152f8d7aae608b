// CloudNav shared type definitions
// Each submodule defines types used across the crate.

pub mod config;
pub mod credential;
pub mod errors;
pub mod integrations;
pub mod link;
pub mod settings;
pub mod snapshot;
pub mod sync;
