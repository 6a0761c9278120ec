use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::geometry::{Direction, Vector2D};

/// Category of a single track cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceType {
    Wall,
    Track,
    FinishUp,
    FinishDown,
    FinishLeft,
    FinishRight,
}

impl SpaceType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(Self::Wall),
            ' ' => Some(Self::Track),
            '^' => Some(Self::FinishUp),
            'v' => Some(Self::FinishDown),
            '<' => Some(Self::FinishLeft),
            '>' => Some(Self::FinishRight),
            _ => None,
        }
    }

    pub const fn to_char(self) -> char {
        match self {
            Self::Wall => '#',
            Self::Track => ' ',
            Self::FinishUp => '^',
            Self::FinishDown => 'v',
            Self::FinishLeft => '<',
            Self::FinishRight => '>',
        }
    }

    pub const fn is_finish(self) -> bool {
        matches!(
            self,
            Self::FinishUp | Self::FinishDown | Self::FinishLeft | Self::FinishRight
        )
    }

    /// Direction a car must travel to cross this finish line correctly.
    /// `Direction::None` for non-finish cells.
    pub const fn crossing_direction(self) -> Direction {
        match self {
            Self::FinishUp => Direction::Up,
            Self::FinishDown => Direction::Down,
            Self::FinishLeft => Direction::Left,
            Self::FinishRight => Direction::Right,
            Self::Wall | Self::Track => Direction::None,
        }
    }
}

/// Immutable rectangular track grid, addressed as `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<SpaceType>>,
}

impl Grid {
    /// Build a grid from rows, rejecting empty or ragged input.
    pub fn new(rows: Vec<Vec<SpaceType>>) -> Result<Self, RaceError> {
        let Some(first) = rows.first() else {
            return Err(RaceError::TrackFormat("track has no rows".into()));
        };
        let width = first.len();
        if width == 0 {
            return Err(RaceError::TrackFormat("track rows are empty".into()));
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(RaceError::TrackFormat(format!(
                "row {y} has width {} but the first row has width {width}",
                row.len()
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(rows.len()).is_err() {
            return Err(RaceError::TrackFormat("track is too large".into()));
        }
        Ok(Self {
            width,
            height: rows.len(),
            cells: rows,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, p: Vector2D) -> bool {
        self.index(p).is_some()
    }

    pub fn space_at(&self, p: Vector2D) -> Result<SpaceType, RaceError> {
        self.index(p)
            .map(|(x, y)| self.cells[y][x])
            .ok_or(RaceError::OutOfBounds(p))
    }

    /// The single collision predicate: leaving the grid counts as a wall hit.
    pub fn is_wall_or_out_of_bounds(&self, p: Vector2D) -> bool {
        match self.space_at(p) {
            Ok(space) => space == SpaceType::Wall,
            Err(_) => true,
        }
    }

    pub fn is_finish(&self, p: Vector2D) -> bool {
        self.space_at(p).is_ok_and(SpaceType::is_finish)
    }

    /// Required crossing vector at `p`; zero for non-finish or out-of-bounds cells.
    pub fn finish_direction(&self, p: Vector2D) -> Vector2D {
        self.space_at(p)
            .map_or(Vector2D::ZERO, |s| s.crossing_direction().vector())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[SpaceType]> {
        self.cells.iter().map(Vec::as_slice)
    }

    fn index(&self, p: Vector2D) -> Option<(usize, usize)> {
        let x = usize::try_from(p.x).ok()?;
        let y = usize::try_from(p.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }
}
