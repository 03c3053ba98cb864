// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Adaptive Timestep Controller
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! One Δt per stepped-loop iteration, small enough to resolve gyration
//! and field gradients, large enough to make progress, and clamped so
//! the loop always terminates.

use prad_types::config::RunConfig;
use prad_types::error::{TraceError, TraceResult};
use std::f64::consts::PI;

/// Fraction of the smallest grid cell a particle may cross per step.
const CELL_CROSSING_FRACTION: f64 = 0.25;

/// Fraction of a gyro-period resolved per step.
const GYRO_FRACTION: f64 = 0.5;

/// Largest fractional speed change the electric field may induce per step.
const E_KICK_FRACTION: f64 = 0.1;

/// Default clamp when the run config does not override it.
const DEFAULT_DT_MIN: f64 = 1.0e-16;
const DEFAULT_DT_MAX: f64 = 1.0e-6;

/// Computes the per-iteration Δt from grid spacing, particle speed and
/// field amplitudes. A user-supplied fixed Δt bypasses the adaptive path
/// entirely.
#[derive(Debug, Clone, Copy)]
pub struct TimestepController {
    fixed_dt: Option<f64>,
    dt_min: f64,
    dt_max: f64,
    min_cell_spacing: f64,
    charge_c: f64,
    mass_kg: f64,
}

impl TimestepController {
    pub fn new(config: &RunConfig, min_cell_spacing: f64) -> TraceResult<Self> {
        if !min_cell_spacing.is_finite() || min_cell_spacing <= 0.0 {
            return Err(TraceError::InvalidParameter(format!(
                "grid cell spacing must be finite and > 0, got {min_cell_spacing}"
            )));
        }
        let [dt_min, dt_max] = config
            .dt_clamp_s
            .unwrap_or([DEFAULT_DT_MIN, DEFAULT_DT_MAX]);
        Ok(TimestepController {
            fixed_dt: config.fixed_dt_s,
            dt_min,
            dt_max,
            min_cell_spacing,
            charge_c: config.charge_c,
            mass_kg: config.mass_kg,
        })
    }

    /// Δt for the current instant, from the representative field
    /// amplitudes and the fastest particle speed this iteration.
    ///
    /// Candidates: a fraction of the gyro-period (B), a bound on the
    /// electric velocity kick (E), and a cell-crossing bound (speed).
    /// The tightest applicable candidate wins, clamped to the configured
    /// range. Never returns zero, negative or non-finite values.
    pub fn compute(
        &self,
        max_speed: f64,
        e_max: f64,
        b_max: f64,
        iteration: usize,
        position: [f64; 3],
    ) -> TraceResult<f64> {
        if let Some(dt) = self.fixed_dt {
            return Ok(dt);
        }

        let mut dt = f64::INFINITY;
        if b_max > 0.0 {
            let gyro_period = 2.0 * PI * self.mass_kg / (self.charge_c.abs() * b_max);
            dt = dt.min(GYRO_FRACTION * gyro_period);
        }
        if e_max > 0.0 && max_speed > 0.0 {
            // Δv per step = (qE/m)Δt must stay a small fraction of v.
            let kick_bound =
                E_KICK_FRACTION * self.mass_kg * max_speed / (self.charge_c.abs() * e_max);
            dt = dt.min(kick_bound);
        }
        if max_speed > 0.0 {
            dt = dt.min(CELL_CROSSING_FRACTION * self.min_cell_spacing / max_speed);
        }

        if !dt.is_finite() {
            return Err(TraceError::NumericalInstability {
                iteration,
                position,
                message: format!(
                    "no usable timestep: speed = {max_speed}, |E|max = {e_max}, |B|max = {b_max}"
                ),
            });
        }
        let dt = dt.clamp(self.dt_min, self.dt_max);
        if dt <= 0.0 || !dt.is_finite() {
            return Err(TraceError::NumericalInstability {
                iteration,
                position,
                message: format!("timestep clamp produced {dt}"),
            });
        }
        Ok(dt)
    }
}
