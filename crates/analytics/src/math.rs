//! Numerical helpers for the inferential statistics.

use std::f64::consts::SQRT_2;

/// Error function, Abramowitz & Stegun formula 7.1.26 (|error| <= 1.5e-7).
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Two-tailed p-value of a z-statistic under the standard normal.
pub fn two_tailed_p_value(z: f64) -> f64 {
    (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0)
}

/// Slope of the least-squares line through `(i, series[i])` divided by the
/// standard error of that slope.
///
/// `None` when fewer than three points are given or the line fits exactly.
pub fn k_ratio(series: &[f64]) -> Option<f64> {
    let n = series.len();
    if n < 3 {
        return None;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = series.iter().sum::<f64>() / nf;

    let (mut ss_xx, mut ss_xy, mut ss_yy) = (0.0, 0.0, 0.0);
    for (i, &y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        let dy = y - mean_y;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_yy += dy * dy;
    }
    if ss_xx <= 0.0 {
        return None;
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;
    let mut sse: f64 = series
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let residual = y - (intercept + slope * i as f64);
            residual * residual
        })
        .sum();
    // Rounding residue on an exact fit is not a real error term.
    if sse <= ss_yy * 1e-12 {
        sse = 0.0;
    }

    let std_error = (sse / ((nf - 2.0) * ss_xx)).sqrt();
    if !std_error.is_finite() || std_error <= 0.0 {
        return None;
    }
    let k = slope / std_error;
    k.is_finite().then_some(k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!(close(normal_cdf(0.0), 0.5, 1e-7));
        assert!(close(normal_cdf(1.96), 0.975_002, 1e-6));
        assert!(close(normal_cdf(-1.0), 0.158_655, 1e-6));
        assert!(close(normal_cdf(3.0), 0.998_650, 1e-6));
    }

    #[test]
    fn test_erf_is_odd() {
        assert!(close(erf(0.7), -erf(-0.7), 1e-15));
    }

    #[test]
    fn test_two_tailed_p_value() {
        assert!(close(two_tailed_p_value(1.96), 0.05, 1e-4));
        assert!(close(two_tailed_p_value(-1.96), 0.05, 1e-4));
        assert!(close(two_tailed_p_value(0.0), 1.0, 1e-6));
    }

    #[test]
    fn test_k_ratio_requires_three_points() {
        assert_eq!(k_ratio(&[1.0, 2.0]), None);
    }

    #[test]
    fn test_k_ratio_of_exact_line_is_undefined() {
        let series: Vec<f64> = (1..=20).map(|i| i as f64 * 10.0).collect();
        assert_eq!(k_ratio(&series), None);
    }

    #[test]
    fn test_k_ratio_matches_hand_computation() {
        // x = 0..4, y = [1, 3, 2, 5, 4]: slope 0.8, SSE 3.6, SSxx 10
        let k = k_ratio(&[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap();
        let std_error = (3.6_f64 / (3.0 * 10.0)).sqrt();
        assert!(close(k, 0.8 / std_error, 1e-9));
    }

    #[test]
    fn test_k_ratio_sign_follows_trend() {
        let k = k_ratio(&[5.0, 3.0, 4.0, 1.0, 2.0, 0.0]).unwrap();
        assert!(k < 0.0);
    }
}
