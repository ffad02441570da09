//! Sensor noise: additive, photon, salt-and-pepper and multiplicative.
//!
//! Every value draws from one PCG stream seeded with the caller's seed, in
//! row-major interleaved order.

use crate::canvas::Canvas;
use crate::error::Result;
use crate::rng::DeterministicRng;
use crate::severity::Severity;

const GAUSSIAN_STD: [f64; 5] = [0.08, 0.12, 0.18, 0.26, 0.38];
const SHOT_PHOTONS: [f64; 5] = [60.0, 25.0, 12.0, 5.0, 3.0];
const IMPULSE_AMOUNT: [f64; 5] = [0.03, 0.06, 0.09, 0.17, 0.27];
const SPECKLE_STD: [f64; 5] = [0.15, 0.2, 0.35, 0.45, 0.6];

pub(super) fn gaussian_noise(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let std = severity.pick(&GAUSSIAN_STD);
    let mut rng = DeterministicRng::new(seed);
    let mut out = x.clone();
    for v in &mut out.data {
        *v += rng.gen_normal(0.0, std);
    }
    out.clip();
    Ok(out)
}

pub(super) fn shot_noise(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let photons = severity.pick(&SHOT_PHOTONS);
    let mut rng = DeterministicRng::new(seed);
    let mut out = x.clone();
    for v in &mut out.data {
        *v = rng.gen_poisson(*v * photons) / photons;
    }
    out.clip();
    Ok(out)
}

/// Each value independently becomes salt or pepper with probability `amount`.
pub(super) fn impulse_noise(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let amount = severity.pick(&IMPULSE_AMOUNT);
    let mut rng = DeterministicRng::new(seed);
    let mut out = x.clone();
    for v in &mut out.data {
        if rng.gen_f64() < amount {
            *v = if rng.gen_f64() < 0.5 { 1.0 } else { 0.0 };
        }
    }
    Ok(out)
}

pub(super) fn speckle_noise(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let std = severity.pick(&SPECKLE_STD);
    let mut rng = DeterministicRng::new(seed);
    let mut out = x.clone();
    for v in &mut out.data {
        *v += *v * rng.gen_normal(0.0, std);
    }
    out.clip();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid_gray() -> Canvas {
        Canvas::new(16, 16, 0.5)
    }

    fn sev(v: u8) -> Severity {
        Severity::new(v).unwrap()
    }

    #[test]
    fn test_gaussian_spread_grows_with_severity() {
        let spread = |s| {
            let out = gaussian_noise(&mid_gray(), sev(s), 3).unwrap();
            out.data.iter().map(|v| (v - 0.5).abs()).sum::<f64>() / out.data.len() as f64
        };
        assert!(spread(5) > spread(1));
    }

    #[test]
    fn test_shot_noise_keeps_black() {
        let black = Canvas::new(8, 8, 0.0);
        let out = shot_noise(&black, sev(5), 9).unwrap();
        assert!(out.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_impulse_only_emits_extremes() {
        let src = mid_gray();
        let out = impulse_noise(&src, sev(5), 4).unwrap();
        let changed: Vec<f64> = out
            .data
            .iter()
            .copied()
            .filter(|&v| v != 0.5)
            .collect();
        assert!(!changed.is_empty());
        assert!(changed.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn test_speckle_keeps_black() {
        let black = Canvas::new(8, 8, 0.0);
        let out = speckle_noise(&black, sev(3), 1).unwrap();
        assert!(out.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_seed_changes_noise() {
        let a = gaussian_noise(&mid_gray(), sev(2), 1).unwrap();
        let b = gaussian_noise(&mid_gray(), sev(2), 2).unwrap();
        assert_ne!(a.data, b.data);
    }
}
