// CloudNav services
// Services provide the building blocks: storage, remote access, crypto, merge rules, queries and integrations.

pub mod ai_describer;
pub mod config_loader;
pub mod crypto_service;
pub mod deep_link;
pub mod import_merge;
pub mod link_query;
pub mod local_cache;
pub mod remote_store;
pub mod webdav_backup;
