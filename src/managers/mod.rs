// CloudNav state managers
// Managers own mutable state: the snapshot and its sync pipeline, and the session's category locks.

pub mod category_lock;
pub mod push_queue;
pub mod sync_controller;
pub mod sync_session;
