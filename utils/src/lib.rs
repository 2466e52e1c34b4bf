//! Shared utilities for the trinary workspace.

pub mod logging;
pub mod task;
pub mod time;

pub use logging::{init_logging, LogFormat, LoggingError};
pub use task::{panic_message, spawn_search, CancelToken, ChildToken, SearchHandle};
pub use time::{format_duration, per_second};
