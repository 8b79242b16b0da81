#![doc = include_str!("../README.md")]

pub mod cache;
pub mod callback;
pub mod config;
pub mod document;
pub mod fifo;
pub mod kv;
pub mod logging;
pub mod worker;

pub use callback::CallbackTimer;
pub use fifo::FifoQueue;

/// the current app version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
