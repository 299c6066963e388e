//! Stable application-wide constants.
//!
//! Values here are structural invariants and default fallbacks for
//! env-var-based configuration. Heuristic knobs that benefit from runtime
//! tuning live in [`OptimizerConfig`](crate::config::OptimizerConfig).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Optimizer heuristic defaults ---

/// Default distance (km) between two areas' representative coordinates below
/// which the areas count as adjacent and their routes may be combined.
/// Chosen for urban/suburban delivery territories; depots covering rural
/// ground should raise it. Overridden by `FLEET_PROXIMITY_THRESHOLD_KM`.
pub const DEFAULT_PROXIMITY_THRESHOLD_KM: f64 = 15.0;

/// Tolerance when comparing route distances, absorbing floating-point noise
/// so an unchanged ordering is reported as "already optimal" rather than a
/// zero-kilometer improvement.
pub const DISTANCE_EPSILON_KM: f64 = 1e-9;
