pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tasks;
pub mod tui;
pub mod views;

pub use config::Config;
pub use error::{AuthError, StoreError, TaskError};
pub use storage::Store;
