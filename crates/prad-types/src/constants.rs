// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Physical Constants
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602176634e-19;

/// Proton rest mass (kg).
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Electron rest mass (kg).
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Deuteron rest mass (kg).
pub const M_DEUTERON: f64 = 3.3435837724e-27;

/// Alpha-particle rest mass (kg).
pub const M_ALPHA: f64 = 6.6446573357e-27;
