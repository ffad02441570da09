//! Elastic warp.

use crate::canvas::{Canvas, Plane};
use crate::error::Result;
use crate::filters;
use crate::rng::DeterministicRng;
use crate::severity::Severity;

/// (peak displacement, field smoothness), both as fractions of the shorter side.
const ELASTIC: [(f64, f64); 5] = [
    (0.02, 0.08),
    (0.03, 0.07),
    (0.04, 0.06),
    (0.05, 0.05),
    (0.06, 0.04),
];

/// Warp every channel by one smooth random displacement field.
pub(super) fn elastic_transform(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let (amplitude, smoothness) = severity.pick(&ELASTIC);
    let side = x.width.min(x.height) as f64;
    let peak = amplitude * side;
    let sigma = (smoothness * side).max(1.0);

    let mut rng = DeterministicRng::new(seed);
    let dx = displacement_field(x.width, x.height, sigma, peak, &mut rng);
    let dy = displacement_field(x.width, x.height, sigma, peak, &mut rng);

    let mut out = x.map_channels(|plane| filters::displace(plane, &dx, &dy));
    out.clip();
    Ok(out)
}

/// Uniform noise in `[-1, 1)`, Gaussian-smoothed and rescaled so its largest
/// magnitude is `peak` pixels.
fn displacement_field(
    width: usize,
    height: usize,
    sigma: f64,
    peak: f64,
    rng: &mut DeterministicRng,
) -> Plane {
    let raw = Plane {
        width,
        height,
        data: (0..width * height).map(|_| rng.gen_signed_f64()).collect(),
    };
    let mut field = filters::gaussian_blur(&raw, sigma);

    let largest = field.data.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if largest > 0.0 {
        for v in &mut field.data {
            *v *= peak / largest;
        }
    }
    field
}
