// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Source/Detector Geometry
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Source point, detector plane and the derived detector-plane basis.
//!
//! Geometry may be given in Cartesian, spherical or cylindrical
//! coordinates (angles in radians, lengths in the run's length unit);
//! everything is converted to Cartesian once at ingestion.

use crate::error::{TraceError, TraceResult};
use crate::vector::{orthonormal_basis, Vec3};
use serde::{Deserialize, Serialize};

/// One position given in a named coordinate system.
///
/// Spherical uses the physics convention: `theta` is the polar angle from
/// +z, `phi` the azimuth from +x. Cylindrical `phi` is the azimuth from +x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum CoordinateTriple {
    Cartesian { x: f64, y: f64, z: f64 },
    Spherical { r: f64, theta: f64, phi: f64 },
    Cylindrical { rho: f64, phi: f64, z: f64 },
}

impl CoordinateTriple {
    pub fn to_cartesian(self) -> Vec3 {
        match self {
            CoordinateTriple::Cartesian { x, y, z } => Vec3::new(x, y, z),
            CoordinateTriple::Spherical { r, theta, phi } => Vec3::new(
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            ),
            CoordinateTriple::Cylindrical { rho, phi, z } => {
                Vec3::new(rho * phi.cos(), rho * phi.sin(), z)
            }
        }
    }
}

/// Source point, detector-plane point and the derived plane basis.
///
/// The detector plane passes through `detector` with normal along the
/// source→detector axis; `(plane_u, plane_v, axis)` form a right-handed
/// orthonormal triple, computed once at setup.
#[derive(Debug, Clone, Copy)]
pub struct SourceDetectorGeometry {
    pub source: Vec3,
    pub detector: Vec3,
    /// Unit vector from source towards the detector plane.
    pub axis: Vec3,
    /// Horizontal in-plane unit vector.
    pub plane_u: Vec3,
    /// Vertical in-plane unit vector.
    pub plane_v: Vec3,
    /// Source-to-detector distance along the axis.
    pub distance: f64,
}

impl SourceDetectorGeometry {
    pub fn new(source: Vec3, detector: Vec3) -> TraceResult<Self> {
        if !source.is_finite() || !detector.is_finite() {
            return Err(TraceError::InvalidParameter(
                "source and detector positions must be finite".to_string(),
            ));
        }
        let separation = detector - source;
        let distance = separation.norm();
        let axis = separation.normalized().ok_or_else(|| {
            TraceError::InvalidParameter(
                "source and detector positions must not coincide".to_string(),
            )
        })?;
        let (plane_u, plane_v) = orthonormal_basis(axis).ok_or_else(|| {
            TraceError::InvalidParameter("degenerate source-detector axis".to_string())
        })?;
        Ok(SourceDetectorGeometry {
            source,
            detector,
            axis,
            plane_u,
            plane_v,
            distance,
        })
    }

    pub fn from_coordinates(
        source: CoordinateTriple,
        detector: CoordinateTriple,
    ) -> TraceResult<Self> {
        Self::new(source.to_cartesian(), detector.to_cartesian())
    }

    /// Project a point onto the detector-plane basis, relative to the
    /// detector-plane point.
    pub fn plane_coordinates(&self, point: Vec3) -> (f64, f64) {
        let d = point - self.detector;
        (d.dot(self.plane_u), d.dot(self.plane_v))
    }
}
