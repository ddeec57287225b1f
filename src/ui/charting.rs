use itertools::{Itertools, MinMaxResult};

/// Y-axis headroom rounding step, in ms
const Y_STEP: f64 = 50.0;

/// Compute X (game number) and Y (reaction ms) bounds for the trend chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let last_game = points.last().map_or(1.0, |p| p.0).max(2.0);

    let y_bounds = match points.iter().map(|p| p.1).minmax() {
        MinMaxResult::NoElements => [0.0, Y_STEP],
        MinMaxResult::OneElement(v) => [floor_step(v), ceil_step(v)],
        MinMaxResult::MinMax(lo, hi) => [floor_step(lo), ceil_step(hi)],
    };

    ([1.0, last_game], y_bounds)
}

fn floor_step(v: f64) -> f64 {
    ((v / Y_STEP).floor() - 1.0).max(0.0) * Y_STEP
}

fn ceil_step(v: f64) -> f64 {
    ((v / Y_STEP).ceil() + 1.0) * Y_STEP
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, [1.0, 2.0]);
        assert_eq!(y, [0.0, 50.0]);
    }

    #[test]
    fn test_compute_chart_params_pads_to_steps() {
        let (x, y) = compute_chart_params(&[(1.0, 212.0), (2.0, 180.0), (3.0, 260.0)]);
        assert_eq!(x, [1.0, 3.0]);
        assert_eq!(y, [100.0, 350.0]);
    }

    #[test]
    fn test_compute_chart_params_single_point() {
        let (x, y) = compute_chart_params(&[(1.0, 30.0)]);
        assert_eq!(x, [1.0, 2.0]);
        assert_eq!(y, [0.0, 100.0]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
