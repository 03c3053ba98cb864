// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Boris Pusher
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────

//! One-step Boris advance under the non-relativistic Lorentz force.
//!
//! Half electric kick, magnetic rotation over the full step, second half
//! kick, then a position update with the new velocity. The rotation step
//! preserves speed exactly (modulo floating point), which keeps energy
//! conserved over long trajectories through pure magnetic fields.

use prad_types::vector::Vec3;

/// Advance one particle's velocity and position by exactly one timestep.
///
/// `q_over_m` is the species charge-to-mass ratio. The caller supplies
/// finite fields; there are no error paths here.
pub fn boris_push(
    position: &mut Vec3,
    velocity: &mut Vec3,
    e: Vec3,
    b: Vec3,
    dt: f64,
    q_over_m: f64,
) {
    let half_kick = q_over_m * dt * 0.5;

    // First half of the electric impulse.
    let v_minus = *velocity + e * half_kick;

    // Rotation about B: t = (qB/m)(Δt/2), s = 2t/(1+|t|²).
    let t = b * half_kick;
    let t2 = t.dot(t);
    let s = t * (2.0 / (1.0 + t2));

    let v_prime = v_minus + v_minus.cross(t);
    let v_plus = v_minus + v_prime.cross(s);

    // Second half kick, then drift.
    *velocity = v_plus + e * half_kick;
    *position += *velocity * dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use prad_types::constants::{ELEMENTARY_CHARGE, M_PROTON};

    const Q_OVER_M: f64 = ELEMENTARY_CHARGE / M_PROTON;

    #[test]
    fn test_pure_magnetic_rotation_preserves_speed() {
        let mut pos = Vec3::ZERO;
        let mut vel = Vec3::new(8.0e4, 1.0e4, 5.0e3);
        let speed_0 = vel.norm();
        let b = Vec3::new(0.0, 0.0, 2.5);

        for _ in 0..5000 {
            boris_push(&mut pos, &mut vel, Vec3::ZERO, b, 5.0e-10, Q_OVER_M);
        }
        let rel = (vel.norm() - speed_0).abs() / speed_0;
        assert!(rel < 1e-10, "Speed drift under pure rotation: {rel}");
    }

    #[test]
    fn test_zero_field_is_straight_line() {
        let mut pos = Vec3::new(1.0, 2.0, 3.0);
        let mut vel = Vec3::new(10.0, -20.0, 5.0);
        let v0 = vel;
        for _ in 0..100 {
            boris_push(&mut pos, &mut vel, Vec3::ZERO, Vec3::ZERO, 0.01, Q_OVER_M);
        }
        assert!((vel - v0).norm() < 1e-12);
        let expected = Vec3::new(1.0, 2.0, 3.0) + v0 * 1.0;
        assert!((pos - expected).norm() < 1e-9);
    }

    #[test]
    fn test_electric_field_accelerates_along_e() {
        let mut pos = Vec3::ZERO;
        let mut vel = Vec3::ZERO;
        let e = Vec3::new(1.0e5, 0.0, 0.0);
        let dt = 1.0e-9;
        let steps = 1000;
        for _ in 0..steps {
            boris_push(&mut pos, &mut vel, e, Vec3::ZERO, dt, Q_OVER_M);
        }
        // With B = 0 the scheme reduces to leapfrog: Δv per step = (qE/m)Δt.
        let expected_v = Q_OVER_M * e.x() * dt * steps as f64;
        assert!(
            (vel.x() - expected_v).abs() / expected_v < 1e-12,
            "v_x = {}, expected {expected_v}",
            vel.x()
        );
        assert_eq!(vel.y(), 0.0);
        assert_eq!(vel.z(), 0.0);
    }

    #[test]
    fn test_gyroradius_matches_theory() {
        // Proton circling in a uniform B_z: r_L = m v⊥ / (q B).
        let b_mag = 1.0;
        let v_perp = 1.0e5;
        let r_larmor = M_PROTON * v_perp / (ELEMENTARY_CHARGE * b_mag);

        let mut pos = Vec3::new(r_larmor, 0.0, 0.0);
        let mut vel = Vec3::new(0.0, v_perp, 0.0);
        let period = 2.0 * std::f64::consts::PI * M_PROTON / (ELEMENTARY_CHARGE * b_mag);
        let steps = 20_000;
        let dt = period / steps as f64;
        let mut max_r = 0.0f64;
        let mut min_r = f64::INFINITY;
        for _ in 0..steps {
            boris_push(
                &mut pos,
                &mut vel,
                Vec3::ZERO,
                Vec3::new(0.0, 0.0, -b_mag),
                dt,
                Q_OVER_M,
            );
            let r = pos.norm();
            max_r = max_r.max(r);
            min_r = min_r.min(r);
        }
        // Orbit radius stays within a small tolerance of the Larmor radius.
        assert!((max_r - r_larmor).abs() / r_larmor < 1e-3, "max_r = {max_r}");
        assert!((min_r - r_larmor).abs() / r_larmor < 1e-3, "min_r = {min_r}");
    }
}
