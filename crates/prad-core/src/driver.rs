// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Simulation Driver
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Phase state machine orchestrating one tracing run.
//!
//! Particles move through four phases: rays that can never reach the
//! grid are excluded from stepping up front; the rest are bulk-advanced
//! to the earliest grid-entry time, pushed step by step while on the
//! grid, and finally coasted to the detector plane. The stepped loop is
//! parallel across particles: each particle's field query and push
//! depend only on its own state and the read-only sampler, with a
//! sequential synchronization point per iteration where the global
//! Δt and the on-grid count are refreshed.

use crate::ensemble::{Ensemble, ParticlePhase, PhaseCounts};
use crate::pusher::boris_push;
use crate::radiograph::{build_radiograph, HistogramExtent, Radiograph};
use crate::timestep::TimestepController;
use prad_fields::FieldSampler;
use prad_types::config::RunConfig;
use prad_types::constants::SPEED_OF_LIGHT;
use prad_types::error::{TraceError, TraceResult};
use prad_types::geometry::SourceDetectorGeometry;
use rand::Rng;
use rayon::prelude::*;

/// Per-iteration observation handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSnapshot {
    pub iteration: usize,
    pub counts: PhaseCounts,
}

/// Summary of a completed run.
///
/// `converged == false` means the iteration budget ran out before the
/// on-grid count fell below the completion threshold; the ensemble was
/// still advanced to the detector so the result stays interpretable,
/// but it must not be treated as a silent success.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub iterations: usize,
    pub final_counts: PhaseCounts,
    pub converged: bool,
    /// Maximum angle between any surviving particle's launch and final
    /// velocity directions (rad).
    pub max_deflection_rad: f64,
}

/// Owns the ensemble for the duration of a run and borrows the field
/// sampler read-only.
pub struct Tracer<'a> {
    sampler: &'a dyn FieldSampler,
    geometry: SourceDetectorGeometry,
    config: RunConfig,
    ensemble: Ensemble,
    timestep: TimestepController,
    /// Straight-line reachability of the grid volume, fixed at launch.
    reaches_grid: Vec<bool>,
    progress: Option<Box<dyn FnMut(ProgressSnapshot) + 'a>>,
    finished: bool,
}

impl<'a> Tracer<'a> {
    /// Validate the configuration, materialize the ensemble and derive
    /// the timestep controller from the sampler's grid spacing.
    pub fn new<R: Rng + ?Sized>(
        sampler: &'a dyn FieldSampler,
        geometry: SourceDetectorGeometry,
        config: RunConfig,
        rng: &mut R,
    ) -> TraceResult<Self> {
        let ensemble = Ensemble::initialize(&geometry, &config, rng)?;
        let timestep = TimestepController::new(&config, sampler.min_cell_spacing())?;
        let n = ensemble.len();
        Ok(Tracer {
            sampler,
            geometry,
            config,
            ensemble,
            timestep,
            reaches_grid: vec![false; n],
            progress: None,
            finished: false,
        })
    }

    /// Install a per-iteration observer of the on-grid count. Pure
    /// side-channel: the driver never depends on it.
    pub fn with_progress(mut self, callback: impl FnMut(ProgressSnapshot) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn geometry(&self) -> &SourceDetectorGeometry {
        &self.geometry
    }

    /// Execute the full phase sequence. Single-shot: a second call on
    /// the same tracer is rejected.
    pub fn run(&mut self) -> TraceResult<RunReport> {
        if self.finished {
            return Err(TraceError::InvalidParameter(
                "run() already completed on this tracer".to_string(),
            ));
        }

        self.classify_rays();
        self.advance_to_grid();
        let (iterations, converged) = self.stepped_push()?;
        self.advance_to_detector();
        self.finished = true;

        Ok(RunReport {
            iterations,
            final_counts: self.ensemble.phase_counts(),
            converged,
            max_deflection_rad: self.ensemble.max_deflection(),
        })
    }

    /// Build the radiograph from the completed run.
    pub fn radiograph(
        &self,
        extent: &HistogramExtent,
        bins: (usize, usize),
    ) -> TraceResult<Radiograph> {
        if !self.finished {
            return Err(TraceError::InvalidParameter(
                "radiograph requested before run() completed".to_string(),
            ));
        }
        build_radiograph(&self.ensemble, &self.geometry, extent, bins)
    }

    /// Transition 1: mark which straight-line rays can ever intersect
    /// the grid volume. The rest never see the field and simply coast
    /// to the detector at the end.
    fn classify_rays(&mut self) {
        let bounds = self.sampler.bounds();
        for (i, p) in self.ensemble.particles.iter().enumerate() {
            self.reaches_grid[i] = bounds
                .ray_entry_time(p.position, p.velocity)
                .is_some();
        }
    }

    /// Transition 2: one bulk straight-line advance of every reaching
    /// particle to the earliest grid-entry time. The field is zero
    /// before grid contact, so this skips per-step work in transit.
    fn advance_to_grid(&mut self) {
        let bounds = self.sampler.bounds();
        let mut t_first = f64::INFINITY;
        for (i, p) in self.ensemble.particles.iter().enumerate() {
            if !self.reaches_grid[i] {
                continue;
            }
            if let Some(t) = bounds.ray_entry_time(p.position, p.velocity) {
                t_first = t_first.min(t);
            }
        }
        if !t_first.is_finite() {
            return;
        }
        for (i, p) in self.ensemble.particles.iter_mut().enumerate() {
            if self.reaches_grid[i] {
                p.position += p.velocity * t_first;
            }
        }
    }

    /// Transition 3: the stepped push loop. One global Δt per iteration,
    /// derived from the grid-wide field extrema and the fastest active
    /// particle. Returns (iterations, converged).
    fn stepped_push(&mut self) -> TraceResult<(usize, bool)> {
        let bounds = self.sampler.bounds();
        let (e_max, b_max) = self.sampler.field_extrema();
        let q_over_m = self.ensemble.charge_to_mass();
        let n_candidates = self.reaches_grid.iter().filter(|&&r| r).count();
        let threshold =
            (self.config.completion_fraction * n_candidates as f64).floor() as usize;

        let mut iteration = 0usize;
        loop {
            let counts = self.ensemble.phase_counts();
            if let Some(cb) = self.progress.as_mut() {
                cb(ProgressSnapshot { iteration, counts });
            }

            let pending_candidates = self
                .ensemble
                .particles
                .iter()
                .zip(&self.reaches_grid)
                .filter(|(p, &r)| r && p.phase == ParticlePhase::Pending)
                .count();
            if pending_candidates == 0 && counts.on_grid <= threshold {
                return Ok((iteration, true));
            }
            if iteration >= self.config.iteration_budget {
                return Ok((iteration, false));
            }

            // Representative speed and position for the Δt computation
            // and its diagnostics: the fastest active particle.
            let mut max_speed = 0.0f64;
            let mut rep_position = self.geometry.source.0;
            for (p, &r) in self.ensemble.particles.iter().zip(&self.reaches_grid) {
                let active = p.phase == ParticlePhase::OnGrid
                    || (p.phase == ParticlePhase::Pending && r);
                if !active {
                    continue;
                }
                let speed = p.velocity.norm();
                if speed > max_speed {
                    max_speed = speed;
                    rep_position = p.position.0;
                }
            }
            let dt =
                self.timestep
                    .compute(max_speed, e_max, b_max, iteration, rep_position)?;

            let sampler = self.sampler;
            self.ensemble
                .particles
                .par_iter_mut()
                .zip(self.reaches_grid.par_iter_mut())
                .for_each(|(p, reaches)| match p.phase {
                    ParticlePhase::Pending => {
                        if !*reaches {
                            return;
                        }
                        p.position += p.velocity * dt;
                        if bounds.contains(p.position) {
                            p.phase = ParticlePhase::OnGrid;
                        } else if bounds
                            .ray_entry_time(p.position, p.velocity)
                            .is_none()
                        {
                            // A grazing ray can step clean over a corner
                            // of the volume; once the volume is behind it
                            // it stops being an entry candidate.
                            *reaches = false;
                        }
                    }
                    ParticlePhase::OnGrid => {
                        let sample = sampler.sample(p.position);
                        if !sample.in_bounds {
                            p.phase = ParticlePhase::LeftGrid;
                            return;
                        }
                        boris_push(
                            &mut p.position,
                            &mut p.velocity,
                            sample.e,
                            sample.b,
                            dt,
                            q_over_m,
                        );
                        // Anomaly isolation: a diverging particle is
                        // removed, never aborting the other trajectories.
                        if !p.position.is_finite()
                            || !p.velocity.is_finite()
                            || p.velocity.norm() >= SPEED_OF_LIGHT
                        {
                            p.phase = ParticlePhase::Removed;
                        }
                    }
                    ParticlePhase::LeftGrid | ParticlePhase::Removed => {}
                });

            iteration += 1;
        }
    }

    /// Transition 4: coast every surviving particle to the detector
    /// plane along its final velocity. Particles moving away from the
    /// detector can never be measured and are removed. Runs even after
    /// a budget abort so partial results stay interpretable.
    fn advance_to_detector(&mut self) {
        let axis = self.geometry.axis;
        let detector = self.geometry.detector;
        for p in self.ensemble.particles.iter_mut() {
            match p.phase {
                ParticlePhase::Removed => continue,
                // A run aborted mid-flight leaves stragglers on the grid;
                // they coast from wherever they stopped.
                ParticlePhase::OnGrid => p.phase = ParticlePhase::LeftGrid,
                _ => {}
            }
            let v_axial = p.velocity.dot(axis);
            if v_axial <= 0.0 {
                p.phase = ParticlePhase::Removed;
                continue;
            }
            let t = (detector - p.position).dot(axis) / v_axial;
            p.position += p.velocity * t;
            if !p.position.is_finite() {
                p.phase = ParticlePhase::Removed;
            }
        }
    }
}
