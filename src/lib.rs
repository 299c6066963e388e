// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use error::{AppError, Result};

use config::Config;
use services::optimizer::RouteOptimizer;
use store::Fleet;
use tokio::sync::RwLock;

/// Shared application state. The fleet sits behind a single `RwLock`; every
/// optimization operation takes the write guard for its whole duration, so
/// concurrent requests against the same route serialize instead of
/// interleaving half-applied plans.
pub struct AppState {
    pub fleet: RwLock<Fleet>,
    pub optimizer: RouteOptimizer,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            fleet: RwLock::new(Fleet::new()),
            optimizer: RouteOptimizer::new(config.optimizer.clone()),
        }
    }
}
