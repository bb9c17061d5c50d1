//! Perceived-temperature helpers.

/// Heat index in °C from air temperature (°C) and relative humidity (%).
///
/// Uses the NOAA (Rothfusz) regression on Fahrenheit values, including the
/// low- and high-humidity adjustments. Below 80 °F the regression is not
/// valid and the air temperature is returned as is.
pub fn heat_index(temp_c: f64, rh: f64) -> f64 {
    let t = celsius_to_fahrenheit(temp_c);
    if t < 80.0 {
        return temp_c;
    }

    let mut hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 6.83783e-3 * t * t
        - 5.481717e-2 * rh * rh
        + 1.22874e-3 * t * t * rh
        + 8.5282e-4 * t * rh * rh
        - 1.99e-6 * t * t * rh * rh;

    if rh < 13.0 && t > 80.0 && t < 112.0 {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    }
    if rh > 85.0 && t > 80.0 && t < 87.0 {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }

    round2(fahrenheit_to_celsius(hi))
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Round to two decimals, the precision readings are stored and served with.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn identity_below_threshold() {
        assert_eq!(heat_index(26.0, 50.0), 26.0);
        assert_eq!(heat_index(-5.0, 95.0), -5.0);
    }

    #[test]
    fn regression_above_threshold() {
        let hi = heat_index(32.0, 70.0);
        assert!(close(hi, 40.41), "got {hi}");
        assert!(close(heat_index(27.0, 50.0), 27.42));
    }

    #[test]
    fn low_humidity_adjustment() {
        let hi = heat_index(35.0, 10.0);
        assert!(close(hi, 31.92), "got {hi}");
    }

    #[test]
    fn high_humidity_adjustment() {
        let hi = heat_index(28.0, 90.0);
        assert!(close(hi, 34.0), "got {hi}");
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(-3.14159), -3.14);
    }
}
