//! Testing utilities and helpers
//!
//! - **[`mocks`]**: in-memory stand-ins for persisted session state and a
//!   shared call log for asserting cross-mock ordering
//! - **[`async_utils`]**: polling helpers for fire-and-forget tasks

pub mod async_utils;
pub mod mocks;

pub use async_utils::{eventually, within};
pub use mocks::{CallLog, MemorySessionStore};
