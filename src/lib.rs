//! Shared callterm library so the binary and integration tests drive the same call flow.

pub mod app;
pub mod assistant;
pub mod client;
pub mod config;
pub mod contact;
pub mod job;
mod lock;
mod logging;
pub mod session;
mod telemetry;
pub mod terminal_restore;
pub mod ui;

pub use app::{CallApp, Phase};
pub use client::{CallBackend, CallClient};
pub use config::{AppConfig, ServiceConfig};
pub(crate) use lock::lock_or_recover;
pub use logging::{init_logging, log_debug, log_debug_content, log_file_path};
pub use telemetry::init_tracing;
