// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds CLI parsing and terminal setup.
pub mod aggregate;
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod gateway;
pub mod generator;
pub mod grade;
pub mod profile;
pub mod round;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod ui;
pub mod util;

pub use app::{App, AppState, Settings};
