//! RGB <-> HSV conversion for the color corruptions.

/// Convert RGB (each 0-1) to HSV.
/// Returns (hue in degrees 0-360, saturation 0-1, value 0-1).
pub fn rgb_to_hsv(rgb: [f64; 3]) -> (f64, f64, f64) {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;

    if delta < 1e-10 {
        return (0.0, 0.0, v);
    }

    let s = delta / max;

    let h = if (r - max).abs() < 1e-10 {
        (g - b) / delta
    } else if (g - max).abs() < 1e-10 {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };

    let h = h * 60.0;
    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

/// Convert HSV to RGB.
/// - h: hue in degrees (0-360)
/// - s: saturation (0-1)
/// - v: value/brightness (0-1)
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [f64; 3] {
    if s <= 0.0 {
        return [v, v, v];
    }

    let h = h % 360.0;
    let h = if h < 0.0 { h + 360.0 } else { h };
    let h = h / 60.0;

    let i = h.floor() as i32;
    let f = h - i as f64;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match i {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv([1.0, 0.0, 0.0]), (0.0, 1.0, 1.0));
        assert_eq!(rgb_to_hsv([0.0, 1.0, 0.0]), (120.0, 1.0, 1.0));
        assert_eq!(rgb_to_hsv([0.0, 0.0, 1.0]), (240.0, 1.0, 1.0));
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let (_, s, v) = rgb_to_hsv([0.4, 0.4, 0.4]);
        assert_eq!(s, 0.0);
        assert_eq!(v, 0.4);
    }

    #[test]
    fn test_round_trip() {
        for rgb in [[0.2, 0.5, 0.9], [0.9, 0.1, 0.3], [0.3, 0.8, 0.2]] {
            let (h, s, v) = rgb_to_hsv(rgb);
            assert!(approx(hsv_to_rgb(h, s, v), rgb), "{:?}", rgb);
        }
    }
}
