// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Field Volumes
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Axis-aligned 3D electromagnetic field volume with trilinear point
//! interpolation, plus analytic field builders for tests and demos.

pub mod analytic;
pub mod grid;

pub use grid::{FieldGrid, FieldSample, FieldSampler, GridBounds};
