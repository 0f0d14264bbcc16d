//! Maidenhead locator conversion and great-circle distance.
//!
//! Locators are decoded to the center of the narrowest cell they describe:
//!
//! ```text
//! JO82     field J/O (20° x 10°), square 8/2 (2° x 1°)
//! JO82mh   plus subsquare m/h (5' x 2.5')
//! JO82mh35 plus extended square 3/5 (30" x 15")
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used for distance calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors produced when decoding a Maidenhead locator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error("Invalid locator length {0} (expected 2, 4, 6 or 8 characters)")]
    InvalidLength(usize),

    #[error("Invalid character '{found}' at position {position}")]
    InvalidCharacter { position: usize, found: char },
}

/// A point on the Earth's surface in decimal degrees, east and north positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Check a locator against the 4, 6 or 8 character Maidenhead forms.
///
/// Surrounding whitespace and letter case are ignored.
pub fn is_valid_locator(locator: &str) -> bool {
    let grid = locator.trim().to_ascii_uppercase();
    let bytes = grid.as_bytes();

    if !matches!(bytes.len(), 4 | 6 | 8) {
        return false;
    }

    bytes.iter().enumerate().all(|(i, &b)| match i {
        0 | 1 => (b'A'..=b'R').contains(&b),
        2 | 3 | 6 | 7 => b.is_ascii_digit(),
        _ => (b'A'..=b'X').contains(&b),
    })
}

/// Decode a Maidenhead locator into the center of its cell.
///
/// # Example
///
/// ```
/// use ham_wrapped::geo::locator_to_coords;
///
/// let c = locator_to_coords("JO82").unwrap();
/// assert_eq!((c.lat, c.lon), (52.5, 17.0));
/// ```
pub fn locator_to_coords(locator: &str) -> Result<Coordinates, LocatorError> {
    let grid = locator.trim().to_ascii_uppercase();
    let chars: Vec<char> = grid.chars().collect();

    if !matches!(chars.len(), 2 | 4 | 6 | 8) {
        return Err(LocatorError::InvalidLength(chars.len()));
    }

    let field_lon = letter_index(chars[0], 'R', 0)?;
    let field_lat = letter_index(chars[1], 'R', 1)?;
    let mut lon = f64::from(field_lon) * 20.0 - 180.0;
    let mut lat = f64::from(field_lat) * 10.0 - 90.0;

    // Cell size of the narrowest pair decoded so far
    let mut lon_step = 20.0;
    let mut lat_step = 10.0;

    if chars.len() >= 4 {
        lon += f64::from(digit_index(chars[2], 2)?) * 2.0;
        lat += f64::from(digit_index(chars[3], 3)?);
        lon_step = 2.0;
        lat_step = 1.0;
    }

    if chars.len() >= 6 {
        lon_step /= 24.0;
        lat_step /= 24.0;
        lon += f64::from(letter_index(chars[4], 'X', 4)?) * lon_step;
        lat += f64::from(letter_index(chars[5], 'X', 5)?) * lat_step;
    }

    if chars.len() == 8 {
        lon_step /= 10.0;
        lat_step /= 10.0;
        lon += f64::from(digit_index(chars[6], 6)?) * lon_step;
        lat += f64::from(digit_index(chars[7], 7)?) * lat_step;
    }

    Ok(Coordinates {
        lat: lat + lat_step / 2.0,
        lon: lon + lon_step / 2.0,
    })
}

/// Encode coordinates as a locator with `precision` characters (2, 4, 6 or 8).
///
/// Other precisions are rounded down to the nearest supported one, with a
/// minimum of 2. The subsquare pair is emitted in lower case.
pub fn coords_to_locator(coords: Coordinates, precision: usize) -> String {
    let precision = match precision {
        0..=3 => 2,
        4 | 5 => 4,
        6 | 7 => 6,
        _ => 8,
    };

    // Keep the point inside the grid; 180°E and 90°N are outside field R
    let lon = (coords.lon + 180.0).clamp(0.0, 360.0 - 1e-9);
    let lat = (coords.lat + 90.0).clamp(0.0, 180.0 - 1e-9);

    let mut out = String::with_capacity(precision);
    out.push(index_char('A', (lon / 20.0) as u32));
    out.push(index_char('A', (lat / 10.0) as u32));

    if precision >= 4 {
        out.push(index_char('0', ((lon % 20.0) / 2.0) as u32));
        out.push(index_char('0', (lat % 10.0) as u32));
    }

    if precision >= 6 {
        out.push(index_char('a', ((lon % 2.0) * 12.0) as u32));
        out.push(index_char('a', ((lat % 1.0) * 24.0) as u32));
    }

    if precision == 8 {
        out.push(index_char('0', ((lon % (2.0 / 24.0)) * 120.0) as u32));
        out.push(index_char('0', ((lat % (1.0 / 24.0)) * 240.0) as u32));
    }

    out
}

/// Great-circle distance between two points using the haversine formula.
///
/// The result is rounded to the nearest kilometer.
pub fn distance_km(from: Coordinates, to: Coordinates) -> u32 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c).round() as u32
}

fn letter_index(c: char, last: char, position: usize) -> Result<u32, LocatorError> {
    if ('A'..=last).contains(&c) {
        Ok(c as u32 - 'A' as u32)
    } else {
        Err(LocatorError::InvalidCharacter { position, found: c })
    }
}

fn digit_index(c: char, position: usize) -> Result<u32, LocatorError> {
    c.to_digit(10)
        .ok_or(LocatorError::InvalidCharacter { position, found: c })
}

fn index_char(base: char, index: u32) -> char {
    char::from_u32(base as u32 + index).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_decode_square() {
        let c = locator_to_coords("JO82").unwrap();
        assert!(close(c.lat, 52.5));
        assert!(close(c.lon, 17.0));
    }

    #[test]
    fn test_decode_subsquare() {
        let c = locator_to_coords("JO82mh").unwrap();
        // m = 12, h = 7
        assert!(close(c.lon, -180.0 + 9.0 * 20.0 + 16.0 + 12.0 / 12.0 + 1.0 / 24.0));
        assert!(close(c.lat, -90.0 + 14.0 * 10.0 + 2.0 + 7.0 / 24.0 + 1.0 / 48.0));
    }

    #[test]
    fn test_decode_field_only() {
        let c = locator_to_coords("AA").unwrap();
        assert!(close(c.lat, -85.0));
        assert!(close(c.lon, -170.0));
    }

    #[test]
    fn test_decode_extended_square_narrows_subsquare() {
        let six = locator_to_coords("FN31pr").unwrap();
        let eight = locator_to_coords("FN31pr55").unwrap();
        assert!((six.lat - eight.lat).abs() < 1.0 / 24.0);
        assert!((six.lon - eight.lon).abs() < 2.0 / 24.0);
    }

    #[test]
    fn test_decode_case_insensitive() {
        assert_eq!(
            locator_to_coords("jo82MH").unwrap(),
            locator_to_coords("JO82mh").unwrap()
        );
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            locator_to_coords("JO8"),
            Err(LocatorError::InvalidLength(3))
        );
        assert_eq!(
            locator_to_coords("ZZ00"),
            Err(LocatorError::InvalidCharacter {
                position: 0,
                found: 'Z'
            })
        );
        assert_eq!(
            locator_to_coords("JOAB"),
            Err(LocatorError::InvalidCharacter {
                position: 2,
                found: 'A'
            })
        );
        assert!(locator_to_coords("JO82ZZ").is_err());
        assert!(locator_to_coords("").is_err());
    }

    #[test]
    fn test_is_valid_locator() {
        assert!(is_valid_locator("JO82"));
        assert!(is_valid_locator("jo82mh"));
        assert!(is_valid_locator("  FN31pr  "));
        assert!(is_valid_locator("FN31pr55"));
        assert!(is_valid_locator("RR99XX99"));

        assert!(!is_valid_locator(""));
        assert!(!is_valid_locator("JO"));
        assert!(!is_valid_locator("JO8"));
        assert!(!is_valid_locator("SA00"));
        assert!(!is_valid_locator("JO82YA"));
        assert!(!is_valid_locator("JO82mh5"));
        assert!(!is_valid_locator("JO82mhAA"));
    }

    #[test]
    fn test_encode_known_points() {
        assert_eq!(coords_to_locator(Coordinates::new(52.5, 17.0), 4), "JO82");
        // Newington, CT
        assert_eq!(
            coords_to_locator(Coordinates::new(41.714775, -72.727260), 6),
            "FN31pr"
        );
        assert_eq!(coords_to_locator(Coordinates::new(90.0, 180.0), 4), "RR99");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for grid in ["JO82mh", "FN31pr", "AA00aa", "RR99xx", "PM95vq"] {
            let center = locator_to_coords(grid).unwrap();
            assert_eq!(coords_to_locator(center, 6), grid);
            assert_eq!(coords_to_locator(center, 4), &grid[..4]);
        }
    }

    #[test]
    fn test_distance_same_location() {
        let p = Coordinates::new(52.0, 21.0);
        assert_eq!(distance_km(p, p), 0);
    }

    #[test]
    fn test_distance_known_cities() {
        let london = Coordinates::new(51.5074, -0.1278);
        let paris = Coordinates::new(48.8566, 2.3522);
        assert!((distance_km(london, paris) as i64 - 343).abs() < 10);

        let warsaw = Coordinates::new(52.2297, 21.0122);
        let moscow = Coordinates::new(55.7558, 37.6173);
        assert!((distance_km(warsaw, moscow) as i64 - 1145).abs() < 20);
    }

    #[test]
    fn test_distance_across_equator_and_antipodes() {
        let d = distance_km(Coordinates::new(10.0, 0.0), Coordinates::new(-10.0, 0.0));
        assert!((2200..2240).contains(&d));

        let d = distance_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 179.0));
        assert!((19800..20000).contains(&d));
    }

    #[test]
    fn test_distance_symmetric() {
        let a = Coordinates::new(-33.86, 151.21);
        let b = Coordinates::new(40.71, -74.0);
        assert_eq!(distance_km(a, b), distance_km(b, a));
    }
}
