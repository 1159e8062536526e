// src/nmea/coordinate.rs
//! Degrees-minutes coordinate decoding

/// Convert an NMEA `(d)ddmm.mmmm` token plus hemisphere letter into signed
/// decimal degrees.
///
/// The degree/minute split is taken from the position of the decimal point:
/// the two digits before it are whole minutes, everything before those is
/// degrees. This handles both 2-digit latitude and 3-digit longitude degrees.
/// `S` and `W` negate the result.
///
/// Returns `None` for empty or malformed tokens.
pub fn nmea_to_decimal(coord: &str, hemisphere: &str) -> Option<f64> {
    let coord = coord.trim();
    if !coord.is_ascii() {
        return None;
    }
    let dot = coord.find('.')?;
    if dot < 3 {
        return None;
    }

    let (degrees, minutes) = coord.split_at(dot - 2);
    if !degrees.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (whole, fraction) = minutes.split_at(2);
    if !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction[1..].bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let degrees: f64 = degrees.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    let decimal = degrees + minutes / 60.0;

    match hemisphere.trim() {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Inverse of `nmea_to_decimal`, for round-trip checks
    fn encode(value: f64, degree_digits: usize, negative: char, positive: char) -> (String, char) {
        let abs = value.abs();
        let degrees = abs.trunc();
        let minutes = (abs - degrees) * 60.0;
        let token = format!(
            "{:0dw$}{:07.4}",
            degrees as u32,
            minutes,
            dw = degree_digits
        );
        let hemisphere = if value < 0.0 { negative } else { positive };
        (token, hemisphere)
    }

    #[test]
    fn test_latitude() {
        let lat = nmea_to_decimal("4807.038", "N").unwrap();
        assert!((lat - (48.0 + 7.038 / 60.0)).abs() < EPS);
        assert!((lat - 48.1173).abs() < 1e-4);
    }

    #[test]
    fn test_longitude_three_degree_digits() {
        let lon = nmea_to_decimal("01131.000", "E").unwrap();
        assert!((lon - (11.0 + 31.0 / 60.0)).abs() < EPS);

        let lon = nmea_to_decimal("12311.12", "W").unwrap();
        assert!((lon + (123.0 + 11.12 / 60.0)).abs() < EPS);
    }

    #[test]
    fn test_hemisphere_sign() {
        let north = nmea_to_decimal("4916.45", "N").unwrap();
        let south = nmea_to_decimal("4916.45", "S").unwrap();
        let none = nmea_to_decimal("4916.45", "").unwrap();
        assert!(north > 0.0);
        assert_eq!(south, -north);
        assert_eq!(none, north);
        assert!(nmea_to_decimal("01131.000", "W").unwrap() < 0.0);
        assert!(nmea_to_decimal("01131.000", "E").unwrap() > 0.0);
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(nmea_to_decimal("", "N"), None);
        assert_eq!(nmea_to_decimal("4807", "N"), None);
        assert_eq!(nmea_to_decimal("16.45", "N"), None);
        assert_eq!(nmea_to_decimal("48x7.038", "N"), None);
        assert_eq!(nmea_to_decimal("4807.0a8", "N"), None);
        assert_eq!(nmea_to_decimal("-4807.038", "N"), None);
        assert_eq!(nmea_to_decimal("4807.", "N"), Some(48.0 + 7.0 / 60.0));
    }

    #[test]
    fn test_decode_encode_decode_is_stable() {
        let cases = [
            ("4807.0380", "N", 2, 'S', 'N'),
            ("3351.5200", "S", 2, 'S', 'N'),
            ("01131.0000", "E", 3, 'W', 'E'),
            ("15112.3456", "W", 3, 'W', 'E'),
            ("0000.5000", "S", 2, 'S', 'N'),
        ];

        for (token, hemi, width, neg, pos) in cases {
            let first = nmea_to_decimal(token, hemi).unwrap();
            let (re_token, re_hemi) = encode(first, width, neg, pos);
            let second = nmea_to_decimal(&re_token, &re_hemi.to_string()).unwrap();
            assert!(
                (first - second).abs() < 1e-7,
                "{} {} -> {} -> {} {}",
                token,
                hemi,
                first,
                re_token,
                second
            );
        }
    }
}
