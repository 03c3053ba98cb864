// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Analytic Field Builders
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Small analytic field volumes used by tests, benchmarks and demos.
//! Production grids come from external solvers; these builders only
//! cover the control scenarios the engine is validated against.

use crate::grid::FieldGrid;
use ndarray::{Array1, Array3};
use prad_types::error::TraceResult;
use prad_types::vector::Vec3;

/// Sample `e_fn` and `b_fn` on a uniform grid spanning `[min, max]`.
pub fn from_functions<E, B>(
    min: Vec3,
    max: Vec3,
    shape: (usize, usize, usize),
    e_fn: E,
    b_fn: Option<B>,
) -> TraceResult<FieldGrid>
where
    E: Fn(Vec3) -> Vec3,
    B: Fn(Vec3) -> Vec3,
{
    let (nx, ny, nz) = shape;
    let x = Array1::linspace(min.x(), max.x(), nx);
    let y = Array1::linspace(min.y(), max.y(), ny);
    let z = Array1::linspace(min.z(), max.z(), nz);

    let fill = |f: &dyn Fn(Vec3) -> Vec3| -> [Array3<f64>; 3] {
        let mut cx = Array3::zeros(shape);
        let mut cy = Array3::zeros(shape);
        let mut cz = Array3::zeros(shape);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let v = f(Vec3::new(x[i], y[j], z[k]));
                    cx[[i, j, k]] = v.x();
                    cy[[i, j, k]] = v.y();
                    cz[[i, j, k]] = v.z();
                }
            }
        }
        [cx, cy, cz]
    };

    let e = fill(&e_fn);
    let b = match b_fn {
        Some(ref f) => Some(fill(f)),
        None => None,
    };
    FieldGrid::new(x, y, z, e, b)
}

/// Cube `[-half_extent, half_extent]^3` with E = B = 0 everywhere.
/// The control grid: particles must coast through it unperturbed.
pub fn zero_field(half_extent: f64, n: usize) -> TraceResult<FieldGrid> {
    let lo = Vec3::new(-half_extent, -half_extent, -half_extent);
    let hi = Vec3::new(half_extent, half_extent, half_extent);
    from_functions(lo, hi, (n, n, n), |_| Vec3::ZERO, None::<fn(Vec3) -> Vec3>)
}

/// Cube with zero E and a uniform magnetic field `b`.
pub fn uniform_b(half_extent: f64, n: usize, b: Vec3) -> TraceResult<FieldGrid> {
    let lo = Vec3::new(-half_extent, -half_extent, -half_extent);
    let hi = Vec3::new(half_extent, half_extent, half_extent);
    from_functions(lo, hi, (n, n, n), |_| Vec3::ZERO, Some(move |_| b))
}

/// Spherically symmetric outward radial E-field: magnitude ramps
/// linearly from 0 at the centre to `peak_e` at `radius`, zero beyond.
/// No magnetic-field data (degrades to B = 0).
pub fn radial_e_sphere(
    half_extent: f64,
    n: usize,
    radius: f64,
    peak_e: f64,
) -> TraceResult<FieldGrid> {
    let lo = Vec3::new(-half_extent, -half_extent, -half_extent);
    let hi = Vec3::new(half_extent, half_extent, half_extent);
    from_functions(
        lo,
        hi,
        (n, n, n),
        move |p| {
            let r = p.norm();
            if r > 0.0 && r <= radius {
                p * (peak_e / radius)
            } else {
                Vec3::ZERO
            }
        },
        None::<fn(Vec3) -> Vec3>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FieldSampler;

    #[test]
    fn test_zero_field_samples_zero() {
        let grid = zero_field(1.0e-3, 8).unwrap();
        let s = grid.sample(Vec3::new(2.0e-4, -5.0e-4, 0.0));
        assert!(s.in_bounds);
        assert_eq!(s.e, Vec3::ZERO);
        assert_eq!(s.b, Vec3::ZERO);
        assert_eq!(grid.field_extrema(), (0.0, 0.0));
    }

    #[test]
    fn test_uniform_b_everywhere() {
        let b = Vec3::new(0.0, 0.0, 2.5);
        let grid = uniform_b(1.0, 6, b).unwrap();
        for p in [Vec3::ZERO, Vec3::new(0.7, -0.3, 0.1)] {
            let s = grid.sample(p);
            assert!((s.b - b).norm() < 1e-12);
            assert_eq!(s.e, Vec3::ZERO);
        }
        assert!(!grid.b_field_assumed_zero());
        assert!((grid.field_extrema().1 - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_radial_sphere_points_outward() {
        let grid = radial_e_sphere(1.0e-3, 17, 5.0e-4, 1.0e7).unwrap();
        let p = Vec3::new(2.0e-4, 0.0, 0.0);
        let s = grid.sample(p);
        assert!(s.in_bounds);
        // Outward along +x, magnitude peak * r/R = 1e7 * 0.4 = 4e6.
        assert!(s.e.x() > 0.0);
        assert!(s.e.y().abs() < s.e.x() * 1e-6);
        assert!((s.e.x() - 4.0e6).abs() / 4.0e6 < 0.15, "E_x = {}", s.e.x());
        // Outside the sphere the field decays to zero within a cell.
        let far = grid.sample(Vec3::new(9.0e-4, 0.0, 0.0));
        assert!(far.e.norm() < 1.0e6);
    }
}
