//! TimeBars - A sequential countdown timer queue
//!
//! This library provides the timer queue engine (strictly one countdown at a
//! time, wall-clock based, with a five second alarm phase and auto-advance),
//! its JSON persistence, alarm backends and a local HTTP control surface.

pub mod api;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::QueueEngine;
pub use error::QueueError;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
