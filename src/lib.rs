// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod game;
pub mod question;
pub mod round_timer;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod surface;
pub mod util;
