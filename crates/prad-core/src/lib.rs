// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Tracing Engine
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! The tracing engine: particles launched from a point source are pushed
//! through a 3D electromagnetic field volume with the Boris integrator
//! and adaptive timestep control, then projected onto the detector plane
//! and histogrammed into a synthetic radiograph.

pub mod driver;
pub mod ensemble;
pub mod pusher;
pub mod radiograph;
pub mod timestep;

pub use driver::{ProgressSnapshot, RunReport, Tracer};
pub use ensemble::{Ensemble, Particle, ParticlePhase, PhaseCounts};
pub use radiograph::{HistogramExtent, Radiograph};
pub use timestep::TimestepController;
