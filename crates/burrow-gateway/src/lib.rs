//! HTTP gateway for Burrow.
//!
//! Exposes the shortener and redirector over axum and owns the process
//! lifecycle: configuration, connection setup and orderly shutdown.

pub mod app;
pub mod cli;
pub mod context;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use cli::Cli;
pub use context::AppContext;
pub use error::AppError;
pub use state::AppState;
