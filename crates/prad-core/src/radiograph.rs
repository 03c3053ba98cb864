// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Radiograph Builder
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
//! Projects final particle positions onto the detector-plane basis and
//! bins them into a weighted 2D histogram. Pure function of a completed
//! ensemble: the ensemble is borrowed, never mutated.

use crate::ensemble::{Ensemble, ParticlePhase};
use ndarray::{Array1, Array2};
use prad_types::error::{TraceError, TraceResult};
use prad_types::geometry::SourceDetectorGeometry;

/// Histogram extent in detector-plane coordinates: lower-left and
/// upper-right corners along the horizontal and vertical basis vectors.
#[derive(Debug, Clone, Copy)]
pub struct HistogramExtent {
    pub h: [f64; 2],
    pub v: [f64; 2],
}

impl HistogramExtent {
    /// Square extent centred on the detector point.
    pub fn centered(half_width: f64) -> Self {
        HistogramExtent {
            h: [-half_width, half_width],
            v: [-half_width, half_width],
        }
    }

    fn validate(&self) -> TraceResult<()> {
        for (label, [lo, hi]) in [("h", self.h), ("v", self.v)] {
            if !lo.is_finite() || !hi.is_finite() || hi <= lo {
                return Err(TraceError::InvalidParameter(format!(
                    "{label} extent must satisfy lo < hi with finite bounds, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }
}

/// Synthetic radiograph: bin edges plus the weighted intensity array.
///
/// `intensity[[ih, iv]]`: row index runs over horizontal bins, column
/// index over vertical bins.
#[derive(Debug, Clone)]
pub struct Radiograph {
    pub h_edges: Array1<f64>,
    pub v_edges: Array1<f64>,
    pub intensity: Array2<f64>,
}

impl Radiograph {
    pub fn total_intensity(&self) -> f64 {
        self.intensity.sum()
    }
}

/// Histogram the final positions of all non-removed particles.
///
/// Particles projecting outside the extent are dropped, not clipped to
/// the edge bins. Deterministic given the ensemble state.
pub fn build_radiograph(
    ensemble: &Ensemble,
    geometry: &SourceDetectorGeometry,
    extent: &HistogramExtent,
    bins: (usize, usize),
) -> TraceResult<Radiograph> {
    extent.validate()?;
    let (nh, nv) = bins;
    if nh == 0 || nv == 0 {
        return Err(TraceError::InvalidParameter(format!(
            "bin counts must be >= 1, got ({nh}, {nv})"
        )));
    }

    let [h_lo, h_hi] = extent.h;
    let [v_lo, v_hi] = extent.v;
    let h_edges = Array1::linspace(h_lo, h_hi, nh + 1);
    let v_edges = Array1::linspace(v_lo, v_hi, nv + 1);
    let dh = (h_hi - h_lo) / nh as f64;
    let dv = (v_hi - v_lo) / nv as f64;

    let mut intensity = Array2::zeros((nh, nv));
    for p in &ensemble.particles {
        if p.phase == ParticlePhase::Removed {
            continue;
        }
        let (h, v) = geometry.plane_coordinates(p.position);
        if h < h_lo || h > h_hi || v < v_lo || v > v_hi {
            continue;
        }
        // Points on the upper edge fall into the last bin.
        let ih = (((h - h_lo) / dh) as usize).min(nh - 1);
        let iv = (((v - v_lo) / dv) as usize).min(nv - 1);
        intensity[[ih, iv]] += p.weight;
    }

    Ok(Radiograph {
        h_edges,
        v_edges,
        intensity,
    })
}
