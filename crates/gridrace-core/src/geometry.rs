use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::error::RaceError;

/// Integer point or displacement on the track grid.
///
/// `x` grows to the right and `y` grows downward, matching row order in a
/// track file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: i32,
    pub y: i32,
}

impl Vector2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Self = Self::new(0, 0);

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    pub fn dot(self, other: Self) -> i64 {
        i64::from(self.x) * i64::from(other.x) + i64::from(self.y) * i64::from(other.y)
    }

    /// Angle between two vectors in radians, within `[0, π]`.
    pub fn angle_between(self, other: Self) -> Result<f64, RaceError> {
        if self.is_zero() || other.is_zero() {
            return Err(RaceError::ZeroVector);
        }
        let cos = self.dot(other) as f64 / (self.length() * other.length());
        Ok(cos.clamp(-1.0, 1.0).acos())
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::fmt::Display for Vector2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(X:{}, Y:{})", self.x, self.y)
    }
}

/// The nine legal accelerations: the eight neighbours plus standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    None,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Direction {
    /// All directions in keypad order (7 8 9 / 4 5 6 / 1 2 3 read top-down).
    pub const ALL: [Direction; 9] = [
        Direction::UpLeft,
        Direction::Up,
        Direction::UpRight,
        Direction::Left,
        Direction::None,
        Direction::Right,
        Direction::DownLeft,
        Direction::Down,
        Direction::DownRight,
    ];

    pub const fn vector(self) -> Vector2D {
        match self {
            Self::UpLeft => Vector2D::new(-1, -1),
            Self::Up => Vector2D::new(0, -1),
            Self::UpRight => Vector2D::new(1, -1),
            Self::Left => Vector2D::new(-1, 0),
            Self::None => Vector2D::new(0, 0),
            Self::Right => Vector2D::new(1, 0),
            Self::DownLeft => Vector2D::new(-1, 1),
            Self::Down => Vector2D::new(0, 1),
            Self::DownRight => Vector2D::new(1, 1),
        }
    }

    /// Name used in scripted move files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::UpLeft => "UP_LEFT",
            Self::Up => "UP",
            Self::UpRight => "UP_RIGHT",
            Self::Left => "LEFT",
            Self::None => "NONE",
            Self::Right => "RIGHT",
            Self::DownLeft => "DOWN_LEFT",
            Self::Down => "DOWN",
            Self::DownRight => "DOWN_RIGHT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl From<Direction> for Vector2D {
    fn from(direction: Direction) -> Self {
        direction.vector()
    }
}

impl TryFrom<Vector2D> for Direction {
    type Error = RaceError;

    fn try_from(v: Vector2D) -> Result<Self, RaceError> {
        Self::ALL
            .into_iter()
            .find(|d| d.vector() == v)
            .ok_or(RaceError::InvalidAcceleration(v))
    }
}
