//! Small numeric helpers shared by scoring code

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Clamp that maps NaN to the lower bound
pub fn clamp_or_min(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(48.0, 2), 48.0);
        assert_eq!(round_to(0.12345, 3), 0.123);
        assert_eq!(round_to(12.345678, 2), 12.35);
    }

    #[test]
    fn test_clamp_or_min() {
        assert_eq!(clamp_or_min(150.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp_or_min(-3.0, 0.0, 100.0), 0.0);
        assert_eq!(clamp_or_min(f64::NAN, 0.0, 1.0), 0.0);
    }
}
