use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub optimizer: OptimizerConfig,
}

/// Heuristic knobs for the route optimization engine. Every threshold the
/// split/combine heuristics rely on is named here rather than buried as a
/// literal in the algorithms.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Maximum distance (km) between two areas' representative coordinates
    /// for the areas to count as adjacent.
    pub proximity_threshold_km: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_km: DEFAULT_PROXIMITY_THRESHOLD_KM,
        }
    }
}

impl OptimizerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let proximity_threshold_km: f64 = env::var("FLEET_PROXIMITY_THRESHOLD_KM")
            .unwrap_or_else(|_| defaults.proximity_threshold_km.to_string())
            .parse()
            .map_err(|_| "Invalid FLEET_PROXIMITY_THRESHOLD_KM")?;

        if proximity_threshold_km <= 0.0 {
            return Err("FLEET_PROXIMITY_THRESHOLD_KM must be positive".to_string());
        }

        Ok(Self {
            proximity_threshold_km,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            optimizer: OptimizerConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
