// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Run Configuration
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{ELEMENTARY_CHARGE, M_PROTON, SPEED_OF_LIGHT};
use crate::error::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Angular distribution of launch directions within the source cone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMode {
    /// Uniform flux per unit solid angle: density ∝ sin θ over [0, θ_max].
    MonteCarlo,
    /// θ drawn uniformly over [0, θ_max]; denser near the axis. Kept for
    /// comparison and testing.
    Uniform,
}

impl DistributionMode {
    pub fn parse(name: &str) -> TraceResult<Self> {
        match name {
            "monte-carlo" | "monte_carlo" | "solid-angle-uniform" => Ok(DistributionMode::MonteCarlo),
            "uniform" => Ok(DistributionMode::Uniform),
            other => Err(TraceError::InvalidParameter(format!(
                "unknown distribution mode '{other}' (expected 'monte-carlo' or 'uniform')"
            ))),
        }
    }
}

/// Parameters of a single tracing run.
///
/// A run traces one particle species; charge and mass are ensemble-wide.
/// All lengths are metres, energies joules, angles radians.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of particles launched from the source point.
    pub particle_count: usize,
    /// Kinetic energy of every particle (J).
    pub kinetic_energy_j: f64,
    /// Maximum launch half-angle from the source-detector axis (rad).
    pub max_theta_rad: f64,
    /// Angular distribution mode name, parsed via [`DistributionMode`].
    #[serde(default = "default_distribution")]
    pub distribution: String,
    /// Species charge (C). Defaults to the proton charge.
    #[serde(default = "default_charge")]
    pub charge_c: f64,
    /// Species rest mass (kg). Defaults to the proton mass.
    #[serde(default = "default_mass")]
    pub mass_kg: f64,
    /// Fixed timestep override (s). When set, adaptive Δt is bypassed.
    #[serde(default)]
    pub fixed_dt_s: Option<f64>,
    /// Adaptive Δt clamp `[min, max]` (s). Defaults to a wide range.
    #[serde(default)]
    pub dt_clamp_s: Option<[f64; 2]>,
    /// Hard cap on stepped-loop iterations before the run is flagged
    /// as not converged.
    #[serde(default = "default_iteration_budget")]
    pub iteration_budget: usize,
    /// The stepped loop ends early once the on-grid count falls to this
    /// fraction of the particles that can reach the grid.
    #[serde(default = "default_completion_fraction")]
    pub completion_fraction: f64,
}

fn default_distribution() -> String {
    "monte-carlo".to_string()
}

fn default_charge() -> f64 {
    ELEMENTARY_CHARGE
}

fn default_mass() -> f64 {
    M_PROTON
}

fn default_iteration_budget() -> usize {
    100_000
}

fn default_completion_fraction() -> f64 {
    0.001
}

impl RunConfig {
    /// A proton run with sensible defaults; callers override fields as
    /// needed before validation.
    pub fn new(particle_count: usize, kinetic_energy_j: f64, max_theta_rad: f64) -> Self {
        RunConfig {
            particle_count,
            kinetic_energy_j,
            max_theta_rad,
            distribution: default_distribution(),
            charge_c: default_charge(),
            mass_kg: default_mass(),
            fixed_dt_s: None,
            dt_clamp_s: None,
            iteration_budget: default_iteration_budget(),
            completion_fraction: default_completion_fraction(),
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> TraceResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn distribution_mode(&self) -> TraceResult<DistributionMode> {
        DistributionMode::parse(&self.distribution)
    }

    /// Particle speed implied by the kinetic energy and rest mass (m/s).
    pub fn particle_speed(&self) -> f64 {
        (2.0 * self.kinetic_energy_j / self.mass_kg).sqrt()
    }

    /// Check every constraint the engine relies on. Called once before a
    /// run; the simulation state is untouched on failure.
    pub fn validate(&self) -> TraceResult<()> {
        if self.particle_count == 0 {
            return Err(TraceError::InvalidParameter(
                "particle_count must be >= 1".to_string(),
            ));
        }
        if !self.kinetic_energy_j.is_finite() || self.kinetic_energy_j <= 0.0 {
            return Err(TraceError::InvalidParameter(
                "kinetic_energy_j must be finite and > 0".to_string(),
            ));
        }
        if !self.max_theta_rad.is_finite()
            || self.max_theta_rad <= 0.0
            || self.max_theta_rad > PI
        {
            return Err(TraceError::InvalidParameter(
                "max_theta_rad must be in (0, π]".to_string(),
            ));
        }
        self.distribution_mode()?;
        if !self.charge_c.is_finite() || self.charge_c == 0.0 {
            return Err(TraceError::InvalidParameter(
                "charge_c must be finite and non-zero".to_string(),
            ));
        }
        if !self.mass_kg.is_finite() || self.mass_kg <= 0.0 {
            return Err(TraceError::InvalidParameter(
                "mass_kg must be finite and > 0".to_string(),
            ));
        }
        let speed = self.particle_speed();
        if speed >= SPEED_OF_LIGHT {
            return Err(TraceError::InvalidParameter(format!(
                "kinetic energy implies speed {speed:.3e} m/s >= c; \
                 the non-relativistic model does not apply"
            )));
        }
        if let Some(dt) = self.fixed_dt_s {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(TraceError::InvalidParameter(
                    "fixed_dt_s must be finite and > 0".to_string(),
                ));
            }
        }
        if let Some([lo, hi]) = self.dt_clamp_s {
            if !lo.is_finite() || !hi.is_finite() || lo <= 0.0 || hi < lo {
                return Err(TraceError::InvalidParameter(format!(
                    "dt_clamp_s must satisfy 0 < min <= max, got [{lo}, {hi}]"
                )));
            }
        }
        if self.iteration_budget == 0 {
            return Err(TraceError::InvalidParameter(
                "iteration_budget must be >= 1".to_string(),
            ));
        }
        if !self.completion_fraction.is_finite()
            || self.completion_fraction < 0.0
            || self.completion_fraction >= 1.0
        {
            return Err(TraceError::InvalidParameter(
                "completion_fraction must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}
