use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::geometry::Vector2D;
use crate::grid::{Grid, SpaceType};

/// Where a car starts the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarStart {
    pub id: char,
    pub position: Vector2D,
}

/// A grid plus its starting roster, in turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub grid: Grid,
    pub cars: Vec<CarStart>,
}

/// Parse the text track format.
///
/// One row per line. `#` wall, space track, `^ v < >` finish lines; any
/// other printable ASCII character places a car on a track cell. Cars are
/// ordered by reading order (row by row, left to right). Roster limits are
/// enforced later, when the session is built.
pub fn parse_track(text: &str) -> Result<Track, RaceError> {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut rows = Vec::with_capacity(lines.len());
    let mut cars = Vec::new();
    for (y, line) in lines.iter().enumerate() {
        let mut row = Vec::with_capacity(line.len());
        for (x, c) in line.chars().enumerate() {
            let space = match SpaceType::from_char(c) {
                Some(space) => space,
                None if c.is_ascii_graphic() => {
                    cars.push(CarStart {
                        id: c,
                        position: Vector2D::new(coordinate(x)?, coordinate(y)?),
                    });
                    SpaceType::Track
                },
                None => {
                    return Err(RaceError::TrackFormat(format!(
                        "unsupported character {c:?} at row {y}, column {x}"
                    )));
                },
            };
            row.push(space);
        }
        rows.push(row);
    }

    Ok(Track {
        grid: Grid::new(rows)?,
        cars,
    })
}

fn coordinate(value: usize) -> Result<i32, RaceError> {
    i32::try_from(value).map_err(|_| RaceError::TrackFormat("track is too large".into()))
}
