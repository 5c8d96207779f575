use crate::utils::constants::SERIES_DECIMALS;

/// Round to the number of decimals kept in reported series
pub fn round_series_value(value: f64) -> f64 {
    round_to(value, SERIES_DECIMALS)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Differences between consecutive values; one shorter than the input
pub fn successive_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(260.1249, 2), 260.12);
        assert_eq!(round_to(-1.4999, 2), -1.5);
        assert_eq!(round_series_value(0.8800000001), 0.88);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[50.0, 200.0]).unwrap(), 125.0);
    }

    #[test]
    fn test_successive_differences() {
        let diffs = successive_differences(&[260.12, 261.00, 259.50]);
        assert_eq!(diffs.len(), 2);
        assert_relative_eq!(diffs[0], 0.88, epsilon = 1e-9);
        assert_relative_eq!(diffs[1], -1.50, epsilon = 1e-9);

        assert!(successive_differences(&[1.0]).is_empty());
        assert!(successive_differences(&[]).is_empty());
    }
}
