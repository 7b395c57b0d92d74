//! Database models for persistent storage.

mod trigger_set;

pub use trigger_set::*;
