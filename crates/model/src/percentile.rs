use std::cmp::Ordering;

/// Percentile `p` (0..=100) with linear interpolation between closest ranks.
///
/// `rank = p / 100 * (n - 1)`; an empty sample yields 0.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    percentile_sorted(&sorted, p)
}

pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => return 0.0,
        1 => return sorted[0],
        _ => {}
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_basic() {
        let values = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert!((percentile(&values, 50.0) - 3.0).abs() < 1e-12);
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-12);
        assert!((percentile(&values, 100.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interpolates() {
        // rank = 0.1 * 9 = 0.9 → 1 + 0.9 * (2 - 1)
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!((percentile(&values, 10.0) - 1.9).abs() < 1e-12);
        // rank = 0.9 * 9 = 8.1 → 9 + 0.1
        assert!((percentile(&values, 90.0) - 9.1).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_degenerate() {
        assert_eq!(percentile(&[], 10.0), 0.0);
        assert_eq!(percentile(&[0.25], 90.0), 0.25);
        assert_eq!(percentile(&[0.5, 0.5, 0.5], 90.0), 0.5);
    }
}
