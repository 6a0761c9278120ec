use crate::geometry::Vector2D;

/// Errors surfaced by the race core.
///
/// Everything except `TrackFormat` and `InvalidConfig` can occur while a race is running and
/// leaves the session untouched, so callers may re-prompt and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceError {
    /// Requested acceleration is not one of the nine legal directions.
    InvalidAcceleration(Vector2D),
    /// A queried point lies outside the grid.
    OutOfBounds(Vector2D),
    /// A car index outside `[0, car_count)`.
    IndexOutOfRange(usize),
    /// Angle requested against a zero-length vector.
    ZeroVector,
    /// Track or roster rejected while building a session.
    TrackFormat(String),
    /// Race rules rejected while building a session.
    InvalidConfig(String),
    /// A move strategy could not produce a direction.
    StrategyInput(String),
}

impl std::fmt::Display for RaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAcceleration(v) => write!(f, "invalid acceleration: {v}"),
            Self::OutOfBounds(p) => write!(f, "position out of bounds: {p}"),
            Self::IndexOutOfRange(i) => write!(f, "car index out of range: {i}"),
            Self::ZeroVector => write!(f, "angle is undefined for a zero-length vector"),
            Self::TrackFormat(m) => write!(f, "invalid track: {m}"),
            Self::InvalidConfig(m) => write!(f, "invalid race config: {m}"),
            Self::StrategyInput(m) => write!(f, "move input failed: {m}"),
        }
    }
}

impl std::error::Error for RaceError {}
