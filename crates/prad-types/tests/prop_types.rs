// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Property-Based Tests (proptest)
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Covers: Vec3 algebra, coordinate conversions, source/detector
//! geometry basis invariants.

use prad_types::geometry::{CoordinateTriple, SourceDetectorGeometry};
use prad_types::vector::{orthonormal_basis, Vec3};
use proptest::prelude::*;

fn finite_coord() -> impl Strategy<Value = f64> {
    -100.0f64..100.0
}

proptest! {
    /// Cross product is perpendicular to both factors.
    #[test]
    fn cross_is_perpendicular(
        ax in finite_coord(), ay in finite_coord(), az in finite_coord(),
        bx in finite_coord(), by in finite_coord(), bz in finite_coord(),
    ) {
        let a = Vec3::new(ax, ay, az);
        let b = Vec3::new(bx, by, bz);
        let c = a.cross(b);
        let scale = (a.norm() * b.norm()).max(1.0);
        prop_assert!(c.dot(a).abs() / scale < 1e-9);
        prop_assert!(c.dot(b).abs() / scale < 1e-9);
    }

    /// Spherical → Cartesian preserves the radius.
    #[test]
    fn spherical_preserves_radius(
        r in 0.01f64..50.0,
        theta in 0.0f64..std::f64::consts::PI,
        phi in 0.0f64..(2.0 * std::f64::consts::PI),
    ) {
        let p = CoordinateTriple::Spherical { r, theta, phi }.to_cartesian();
        prop_assert!((p.norm() - r).abs() < 1e-9 * r.max(1.0));
    }

    /// Cylindrical → Cartesian preserves the axial distance.
    #[test]
    fn cylindrical_preserves_rho(
        rho in 0.01f64..50.0,
        phi in 0.0f64..(2.0 * std::f64::consts::PI),
        z in finite_coord(),
    ) {
        let p = CoordinateTriple::Cylindrical { rho, phi, z }.to_cartesian();
        let rho_back = (p.x() * p.x() + p.y() * p.y()).sqrt();
        prop_assert!((rho_back - rho).abs() < 1e-9 * rho.max(1.0));
        prop_assert!((p.z() - z).abs() < 1e-12);
    }

    /// The basis returned by orthonormal_basis is orthonormal and
    /// right-handed for arbitrary non-degenerate axes.
    #[test]
    fn basis_orthonormal(
        ax in finite_coord(), ay in finite_coord(), az in finite_coord(),
    ) {
        let axis = Vec3::new(ax, ay, az);
        prop_assume!(axis.norm() > 1e-6);
        let (u, v) = orthonormal_basis(axis).expect("non-degenerate axis");
        let n = axis.normalized().unwrap();
        prop_assert!((u.norm() - 1.0).abs() < 1e-10);
        prop_assert!((v.norm() - 1.0).abs() < 1e-10);
        prop_assert!(u.dot(v).abs() < 1e-10);
        prop_assert!(u.dot(n).abs() < 1e-10);
        prop_assert!((u.cross(v) - n).norm() < 1e-10);
    }

    /// Geometry axis always points from source towards the detector and
    /// the plane basis is perpendicular to it.
    #[test]
    fn geometry_axis_and_basis(
        sx in finite_coord(), sy in finite_coord(), sz in finite_coord(),
        dx in finite_coord(), dy in finite_coord(), dz in finite_coord(),
    ) {
        let source = Vec3::new(sx, sy, sz);
        let detector = Vec3::new(dx, dy, dz);
        prop_assume!((detector - source).norm() > 1e-6);
        let geom = SourceDetectorGeometry::new(source, detector).expect("valid geometry");
        prop_assert!(geom.axis.dot(detector - source) > 0.0);
        prop_assert!((geom.distance - (detector - source).norm()).abs() < 1e-9);
        prop_assert!(geom.axis.dot(geom.plane_u).abs() < 1e-10);
        prop_assert!(geom.axis.dot(geom.plane_v).abs() < 1e-10);
    }
}
