//! Defines the `CompassPoint` enum, the 16-point wind direction labels reported by the provider
//! (`winddir16Point`) and stored in the `wind_direction` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the sixteen compass points, clockwise from north.
///
/// # Examples
///
/// ```rust
/// use weather_sync::CompassPoint;
///
/// let direction: CompassPoint = "WSW".parse().unwrap();
/// assert_eq!(direction, CompassPoint::WestSouthWest);
/// assert_eq!(direction.degrees(), 247.5);
/// assert_eq!(direction.to_string(), "WSW");
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CompassPoint {
    North,
    NorthNorthEast,
    NorthEast,
    EastNorthEast,
    East,
    EastSouthEast,
    SouthEast,
    SouthSouthEast,
    South,
    SouthSouthWest,
    SouthWest,
    WestSouthWest,
    West,
    WestNorthWest,
    NorthWest,
    NorthNorthWest,
}

impl CompassPoint {
    /// All points in clockwise order starting at north.
    pub const ALL: [CompassPoint; 16] = [
        CompassPoint::North,
        CompassPoint::NorthNorthEast,
        CompassPoint::NorthEast,
        CompassPoint::EastNorthEast,
        CompassPoint::East,
        CompassPoint::EastSouthEast,
        CompassPoint::SouthEast,
        CompassPoint::SouthSouthEast,
        CompassPoint::South,
        CompassPoint::SouthSouthWest,
        CompassPoint::SouthWest,
        CompassPoint::WestSouthWest,
        CompassPoint::West,
        CompassPoint::WestNorthWest,
        CompassPoint::NorthWest,
        CompassPoint::NorthNorthWest,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompassPoint::North => "N",
            CompassPoint::NorthNorthEast => "NNE",
            CompassPoint::NorthEast => "NE",
            CompassPoint::EastNorthEast => "ENE",
            CompassPoint::East => "E",
            CompassPoint::EastSouthEast => "ESE",
            CompassPoint::SouthEast => "SE",
            CompassPoint::SouthSouthEast => "SSE",
            CompassPoint::South => "S",
            CompassPoint::SouthSouthWest => "SSW",
            CompassPoint::SouthWest => "SW",
            CompassPoint::WestSouthWest => "WSW",
            CompassPoint::West => "W",
            CompassPoint::WestNorthWest => "WNW",
            CompassPoint::NorthWest => "NW",
            CompassPoint::NorthNorthWest => "NNW",
        }
    }

    /// Bearing in degrees, north = 0, increasing clockwise in 22.5 degree steps.
    pub fn degrees(self) -> f64 {
        (self as u8) as f64 * 22.5
    }

    /// Parses a label, returning `None` for anything that isn't one of the 16 points.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|point| point.label().eq_ignore_ascii_case(label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a 16-point compass direction")]
pub struct InvalidCompassPoint(pub String);

impl FromStr for CompassPoint {
    type Err = InvalidCompassPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| InvalidCompassPoint(s.to_string()))
    }
}

impl TryFrom<String> for CompassPoint {
    type Error = InvalidCompassPoint;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompassPoint> for String {
    fn from(value: CompassPoint) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_label_round_trips() {
        for point in CompassPoint::ALL {
            assert_eq!(CompassPoint::from_label(point.label()), Some(point));
        }
    }

    #[test]
    fn test_parsing_is_case_insensitive_and_trims() {
        assert_eq!(" nne ".parse::<CompassPoint>(), Ok(CompassPoint::NorthNorthEast));
        assert!("NORTH".parse::<CompassPoint>().is_err());
        assert!("".parse::<CompassPoint>().is_err());
    }

    #[test]
    fn test_degrees() {
        assert_eq!(CompassPoint::North.degrees(), 0.0);
        assert_eq!(CompassPoint::East.degrees(), 90.0);
        assert_eq!(CompassPoint::NorthNorthWest.degrees(), 337.5);
    }
}
