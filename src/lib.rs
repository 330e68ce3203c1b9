//! mirrormind - companion chat for a journaling app.
//!
//! Replies come from a fixed keyword table with randomized fallbacks; the
//! transcript is persisted best-effort after every exchange to a store that
//! keeps one conversation per user.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
