//! Number formatting shared by the text encoder.

/// Minimal invariant decimal form: no exponent, no trailing zeros, and
/// `-0` written as `0`.
pub fn value(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

/// Command and element times are written as whole milliseconds.
pub fn time(t: f64) -> String {
    value(t.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_is_minimal() {
        assert_eq!(value(1.0), "1");
        assert_eq!(value(0.25), "0.25");
        assert_eq!(value(-12.5), "-12.5");
        assert_eq!(value(320.0), "320");
        assert_eq!(value(-0.0), "0");
        assert_eq!(value(0.0000001), "0.0000001");
    }

    #[test]
    fn test_time_rounds_to_integer() {
        assert_eq!(time(99.6), "100");
        assert_eq!(time(-0.4), "0");
        assert_eq!(time(1500.0), "1500");
    }
}
