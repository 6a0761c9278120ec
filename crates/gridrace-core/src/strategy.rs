//! Sources of per-turn accelerations.
//!
//! The engine only sees the [`MoveStrategy`] trait. Interactive input lives
//! in the front end; the variants here are the ones that need no I/O.

use std::collections::VecDeque;

use crate::car::Car;
use crate::error::RaceError;
use crate::geometry::{Direction, Vector2D};
use crate::grid::Grid;

/// Supplies the next requested acceleration for one car.
pub trait MoveStrategy {
    /// Short label for logs and the status line.
    fn name(&self) -> &'static str;

    /// Next acceleration for `car`. May block (interactive input) but must
    /// eventually return a direction or an error.
    fn next_move(&mut self, car: &Car, grid: &Grid) -> Result<Direction, RaceError>;
}

/// Never accelerates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoNotMoveStrategy;

impl MoveStrategy for DoNotMoveStrategy {
    fn name(&self) -> &'static str {
        "none"
    }

    fn next_move(&mut self, _car: &Car, _grid: &Grid) -> Result<Direction, RaceError> {
        Ok(Direction::None)
    }
}

/// Replays a fixed list of moves, then coasts.
#[derive(Debug, Clone, Default)]
pub struct MoveListStrategy {
    moves: VecDeque<Direction>,
}

impl MoveListStrategy {
    pub fn new(moves: impl IntoIterator<Item = Direction>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    /// Parse one direction name per line (`UP_LEFT`, `NONE`, ...).
    /// Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, RaceError> {
        let mut moves = VecDeque::new();
        for (number, line) in meaningful_lines(text) {
            let direction = Direction::from_name(line).ok_or_else(|| {
                RaceError::StrategyInput(format!("line {number}: unknown direction {line:?}"))
            })?;
            moves.push_back(direction);
        }
        Ok(Self { moves })
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl MoveStrategy for MoveListStrategy {
    fn name(&self) -> &'static str {
        "moves"
    }

    fn next_move(&mut self, _car: &Car, _grid: &Grid) -> Result<Direction, RaceError> {
        Ok(self.moves.pop_front().unwrap_or(Direction::None))
    }
}

/// Drives through a list of waypoints, stopping on each one before heading
/// for the next.
#[derive(Debug, Clone, Default)]
pub struct PathFollowerStrategy {
    waypoints: Vec<Vector2D>,
    next: usize,
}

impl PathFollowerStrategy {
    pub fn new(waypoints: Vec<Vector2D>) -> Self {
        Self { waypoints, next: 0 }
    }

    /// Parse one waypoint per line, either `x,y` or `(X:x, Y:y)`.
    pub fn parse(text: &str) -> Result<Self, RaceError> {
        let waypoints = meaningful_lines(text)
            .map(|(number, line)| {
                parse_point(line).ok_or_else(|| {
                    RaceError::StrategyInput(format!("line {number}: bad waypoint {line:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(waypoints))
    }

    pub fn current_target(&self) -> Option<Vector2D> {
        self.waypoints.get(self.next).copied()
    }
}

impl MoveStrategy for PathFollowerStrategy {
    fn name(&self) -> &'static str {
        "path"
    }

    fn next_move(&mut self, car: &Car, _grid: &Grid) -> Result<Direction, RaceError> {
        while self.current_target() == Some(car.position()) {
            self.next += 1;
        }
        let Some(target) = self.current_target() else {
            return Ok(Direction::None);
        };
        let remaining = target - car.position();
        let velocity = car.velocity();
        let accel = Vector2D::new(
            axis_acceleration(remaining.x, velocity.x),
            axis_acceleration(remaining.y, velocity.y),
        );
        Direction::try_from(accel)
    }
}

/// Accelerate toward the fastest speed that can still brake to a stop
/// exactly `distance` cells away.
fn axis_acceleration(distance: i32, velocity: i32) -> i32 {
    let desired = distance.signum() * stopping_speed(distance.unsigned_abs());
    (desired - velocity).signum()
}

/// Largest `s` with `s + (s-1) + ... + 1 <= distance`.
fn stopping_speed(distance: u32) -> i32 {
    let distance = u64::from(distance);
    let mut speed: u64 = 0;
    while (speed + 1) * (speed + 2) / 2 <= distance {
        speed += 1;
    }
    i32::try_from(speed).unwrap_or(i32::MAX)
}

fn meaningful_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_point(line: &str) -> Option<Vector2D> {
    let inner = line.trim_start_matches('(').trim_end_matches(')');
    let (x, y) = inner.split_once(',')?;
    let coordinate = |part: &str, label: &str| -> Option<i32> {
        let part = part.trim();
        let part = part
            .strip_prefix(label)
            .or_else(|| part.strip_prefix(&label.to_ascii_lowercase()))
            .unwrap_or(part);
        part.trim().parse().ok()
    };
    Some(Vector2D::new(coordinate(x, "X:")?, coordinate(y, "Y:")?))
}
