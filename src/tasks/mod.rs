//! Background Tasks Module
//!
//! Periodic maintenance for the artifact cache.

mod cleanup;

pub use cleanup::spawn_cleanup_task;
