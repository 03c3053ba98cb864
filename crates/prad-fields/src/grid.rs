// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Gridded Field Volume
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Axis-aligned uniform field volume with trilinear interpolation.
//!
//! The tracer only depends on the [`FieldSampler`] contract: evaluate
//! (E, B) at an arbitrary point, or report that the point lies outside
//! the volume. Queries are read-only and thread-safe.

use ndarray::{Array1, Array3};
use prad_types::error::{TraceError, TraceResult};
use prad_types::vector::Vec3;

/// Interpolated field values at one query point.
#[derive(Debug, Clone, Copy)]
pub struct FieldSample {
    pub e: Vec3,
    pub b: Vec3,
    /// `false` when the query point lies outside the volume; `e` and `b`
    /// are zero in that case.
    pub in_bounds: bool,
}

impl FieldSample {
    pub fn out_of_bounds() -> Self {
        FieldSample {
            e: Vec3::ZERO,
            b: Vec3::ZERO,
            in_bounds: false,
        }
    }
}

/// Axis-aligned bounding box of a field volume.
#[derive(Debug, Clone, Copy)]
pub struct GridBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl GridBounds {
    pub fn contains(&self, p: Vec3) -> bool {
        p.x() >= self.min.x()
            && p.x() <= self.max.x()
            && p.y() >= self.min.y()
            && p.y() <= self.max.y()
            && p.z() >= self.min.z()
            && p.z() <= self.max.z()
    }

    /// Earliest time t ≥ 0 at which the ray `origin + t·velocity` is
    /// inside the box, or `None` when the ray never reaches it.
    /// Slab intersection; an origin already inside yields `Some(0.0)`.
    pub fn ray_entry_time(&self, origin: Vec3, velocity: Vec3) -> Option<f64> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for axis in 0..3 {
            let o = origin.0[axis];
            let v = velocity.0[axis];
            let lo = self.min.0[axis];
            let hi = self.max.0[axis];
            if v == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (t1, t2) = {
                let a = (lo - o) / v;
                let b = (hi - o) / v;
                if a <= b {
                    (a, b)
                } else {
                    (b, a)
                }
            };
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
        }
        if t_enter > t_exit || t_exit < 0.0 {
            return None;
        }
        Some(t_enter.max(0.0))
    }
}

/// Point-wise field evaluation contract consumed by the tracer.
///
/// Implementations must be safe for concurrent read-only queries; the
/// stepped push loop samples from many threads at once.
pub trait FieldSampler: Sync {
    fn sample(&self, position: Vec3) -> FieldSample;
    fn bounds(&self) -> GridBounds;
    /// Smallest sample spacing across the three axes.
    fn min_cell_spacing(&self) -> f64;
    /// Grid-wide maxima of |E| and |B|, used by the timestep controller.
    fn field_extrema(&self) -> (f64, f64);
}

/// Uniform axis-aligned volume of E (and optionally B) samples.
///
/// Component arrays are indexed `[ix, iy, iz]`. A grid built without
/// B-field data degrades gracefully: B interpolates to zero everywhere
/// and [`FieldGrid::b_field_assumed_zero`] reports the substitution once
/// at setup rather than per query.
#[derive(Debug)]
pub struct FieldGrid {
    x: Array1<f64>,
    y: Array1<f64>,
    z: Array1<f64>,
    dx: f64,
    dy: f64,
    dz: f64,
    e: [Array3<f64>; 3],
    b: Option<[Array3<f64>; 3]>,
    e_max: f64,
    b_max: f64,
}

/// Relative tolerance for the uniform-spacing check.
const SPACING_RTOL: f64 = 1e-9;

fn axis_spacing(axis: &Array1<f64>, label: &str) -> TraceResult<f64> {
    if axis.len() < 2 {
        return Err(TraceError::InvalidParameter(format!(
            "{label} axis needs at least 2 samples, got {}",
            axis.len()
        )));
    }
    if axis.iter().any(|v| !v.is_finite()) {
        return Err(TraceError::InvalidParameter(format!(
            "{label} axis contains non-finite coordinates"
        )));
    }
    let d = axis[1] - axis[0];
    if d <= 0.0 {
        return Err(TraceError::InvalidParameter(format!(
            "{label} axis must be strictly increasing"
        )));
    }
    for i in 1..axis.len() {
        let step = axis[i] - axis[i - 1];
        if (step - d).abs() > SPACING_RTOL * d.abs() {
            return Err(TraceError::InvalidParameter(format!(
                "{label} axis spacing is not uniform: step {i} is {step}, expected {d}"
            )));
        }
    }
    Ok(d)
}

fn max_magnitude(components: &[Array3<f64>; 3]) -> f64 {
    let mut max = 0.0f64;
    for ((i, j, k), &cx) in components[0].indexed_iter() {
        let cy = components[1][[i, j, k]];
        let cz = components[2][[i, j, k]];
        let mag = (cx * cx + cy * cy + cz * cz).sqrt();
        if mag > max {
            max = mag;
        }
    }
    max
}

impl FieldGrid {
    /// Build a grid from axes and component volumes. `b` may be omitted
    /// when no magnetic-field data exists for the volume.
    pub fn new(
        x: Array1<f64>,
        y: Array1<f64>,
        z: Array1<f64>,
        e: [Array3<f64>; 3],
        b: Option<[Array3<f64>; 3]>,
    ) -> TraceResult<Self> {
        let dx = axis_spacing(&x, "x")?;
        let dy = axis_spacing(&y, "y")?;
        let dz = axis_spacing(&z, "z")?;
        let shape = (x.len(), y.len(), z.len());
        for (name, arr) in [("E_x", &e[0]), ("E_y", &e[1]), ("E_z", &e[2])] {
            if arr.dim() != shape {
                return Err(TraceError::InvalidParameter(format!(
                    "{name} shape {:?} does not match axes {:?}",
                    arr.dim(),
                    shape
                )));
            }
            if arr.iter().any(|v| !v.is_finite()) {
                return Err(TraceError::InvalidParameter(format!(
                    "{name} contains non-finite samples"
                )));
            }
        }
        if let Some(ref b) = b {
            for (name, arr) in [("B_x", &b[0]), ("B_y", &b[1]), ("B_z", &b[2])] {
                if arr.dim() != shape {
                    return Err(TraceError::InvalidParameter(format!(
                        "{name} shape {:?} does not match axes {:?}",
                        arr.dim(),
                        shape
                    )));
                }
                if arr.iter().any(|v| !v.is_finite()) {
                    return Err(TraceError::InvalidParameter(format!(
                        "{name} contains non-finite samples"
                    )));
                }
            }
        }

        let e_max = max_magnitude(&e);
        let b_max = b.as_ref().map(max_magnitude).unwrap_or(0.0);

        Ok(FieldGrid {
            x,
            y,
            z,
            dx,
            dy,
            dz,
            e,
            b,
            e_max,
            b_max,
        })
    }

    /// `true` when the grid was built without B-field data and substitutes
    /// zero vectors. Surfaced once at setup so callers can warn.
    pub fn b_field_assumed_zero(&self) -> bool {
        self.b.is_none()
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.x.len(), self.y.len(), self.z.len())
    }

    /// Fractional cell indices and in-cell weights for a point known to
    /// be inside the bounds.
    fn cell_of(&self, p: Vec3) -> ([usize; 3], [f64; 3]) {
        let fx = (p.x() - self.x[0]) / self.dx;
        let fy = (p.y() - self.y[0]) / self.dy;
        let fz = (p.z() - self.z[0]) / self.dz;
        let ix = (fx.floor() as isize).clamp(0, self.x.len() as isize - 2) as usize;
        let iy = (fy.floor() as isize).clamp(0, self.y.len() as isize - 2) as usize;
        let iz = (fz.floor() as isize).clamp(0, self.z.len() as isize - 2) as usize;
        let tx = (fx - ix as f64).clamp(0.0, 1.0);
        let ty = (fy - iy as f64).clamp(0.0, 1.0);
        let tz = (fz - iz as f64).clamp(0.0, 1.0);
        ([ix, iy, iz], [tx, ty, tz])
    }

    fn trilinear(arr: &Array3<f64>, idx: [usize; 3], t: [f64; 3]) -> f64 {
        let [ix, iy, iz] = idx;
        let [tx, ty, tz] = t;
        let mut acc = 0.0;
        for (di, wi) in [(0, 1.0 - tx), (1, tx)] {
            for (dj, wj) in [(0, 1.0 - ty), (1, ty)] {
                for (dk, wk) in [(0, 1.0 - tz), (1, tz)] {
                    acc += wi * wj * wk * arr[[ix + di, iy + dj, iz + dk]];
                }
            }
        }
        acc
    }

    fn interpolate(&self, components: &[Array3<f64>; 3], idx: [usize; 3], t: [f64; 3]) -> Vec3 {
        Vec3::new(
            Self::trilinear(&components[0], idx, t),
            Self::trilinear(&components[1], idx, t),
            Self::trilinear(&components[2], idx, t),
        )
    }
}

impl FieldSampler for FieldGrid {
    fn sample(&self, position: Vec3) -> FieldSample {
        if !position.is_finite() || !self.bounds().contains(position) {
            return FieldSample::out_of_bounds();
        }
        let (idx, t) = self.cell_of(position);
        let e = self.interpolate(&self.e, idx, t);
        let b = match &self.b {
            Some(b) => self.interpolate(b, idx, t),
            None => Vec3::ZERO,
        };
        FieldSample {
            e,
            b,
            in_bounds: true,
        }
    }

    fn bounds(&self) -> GridBounds {
        GridBounds {
            min: Vec3::new(self.x[0], self.y[0], self.z[0]),
            max: Vec3::new(
                self.x[self.x.len() - 1],
                self.y[self.y.len() - 1],
                self.z[self.z.len() - 1],
            ),
        }
    }

    fn min_cell_spacing(&self) -> f64 {
        self.dx.min(self.dy).min(self.dz)
    }

    fn field_extrema(&self) -> (f64, f64) {
        (self.e_max, self.b_max)
    }
}
