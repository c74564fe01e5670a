// Library surface for the binary, headless integration tests, and reuse.
pub mod app;
pub mod app_dirs;
pub mod cipher;
pub mod config;
pub mod engine;
pub mod history;
pub mod level;
pub mod results;
pub mod runtime;
pub mod session;
pub mod store;
pub mod ui;
pub mod util;

/// Redraw cadence of the TUI; game time is accumulated into whole seconds
pub const TICK_RATE_MS: u64 = 100;
