#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod chat;
pub mod config;
pub mod news;
pub mod session;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
