use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::geometry::{Direction, Vector2D};
use crate::grid::Grid;
use crate::strategy::MoveStrategy;

/// State of a single car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    id: char,
    position: Vector2D,
    velocity: Vector2D,
    /// Once set, never cleared.
    crashed: bool,
}

impl Car {
    pub fn new(id: char, position: Vector2D) -> Self {
        Self {
            id,
            position,
            velocity: Vector2D::ZERO,
            crashed: false,
        }
    }

    pub fn id(&self) -> char {
        self.id
    }

    pub fn position(&self) -> Vector2D {
        self.position
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// Position the car will reach this turn if nothing stops it.
    pub fn next_position(&self) -> Vector2D {
        self.position + self.velocity
    }

    /// Ask `strategy` for this car's next move. No validation happens here.
    pub fn request_acceleration(
        &self,
        strategy: &mut dyn MoveStrategy,
        grid: &Grid,
    ) -> Result<Direction, RaceError> {
        strategy.next_move(self, grid)
    }

    /// Add a legal acceleration to the velocity; anything else is rejected
    /// and leaves the car untouched.
    pub fn apply_acceleration(&mut self, acceleration: Vector2D) -> Result<(), RaceError> {
        let direction = Direction::try_from(acceleration)?;
        self.velocity += direction.vector();
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        self.position += self.velocity;
    }

    /// Stop the car at `at` without committing the rest of its move.
    pub(crate) fn stop_at(&mut self, at: Vector2D) {
        self.position = at;
    }

    pub(crate) fn mark_crashed(&mut self, at: Vector2D) {
        if self.crashed {
            tracing::warn!(car = %self.id, "Car marked crashed twice");
        }
        self.crashed = true;
        self.position = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::MoveListStrategy;

    #[test]
    fn new_car_is_stationary() {
        let car = Car::new('a', Vector2D::new(3, 4));
        assert_eq!(car.velocity(), Vector2D::ZERO);
        assert_eq!(car.next_position(), Vector2D::new(3, 4));
        assert!(!car.is_crashed());
    }

    #[test]
    fn acceleration_accumulates() {
        let mut car = Car::new('a', Vector2D::ZERO);
        car.apply_acceleration(Vector2D::new(1, 0)).unwrap();
        car.apply_acceleration(Vector2D::new(1, 1)).unwrap();
        assert_eq!(car.velocity(), Vector2D::new(2, 1));
        car.advance();
        assert_eq!(car.position(), Vector2D::new(2, 1));
    }

    #[test]
    fn invalid_acceleration_leaves_velocity() {
        let mut car = Car::new('a', Vector2D::ZERO);
        car.apply_acceleration(Vector2D::new(0, 1)).unwrap();
        let err = car.apply_acceleration(Vector2D::new(0, 2)).unwrap_err();
        assert_eq!(err, RaceError::InvalidAcceleration(Vector2D::new(0, 2)));
        assert_eq!(car.velocity(), Vector2D::new(0, 1));
    }

    #[test]
    fn crash_snaps_position() {
        let mut car = Car::new('b', Vector2D::new(1, 1));
        car.mark_crashed(Vector2D::new(0, 1));
        assert!(car.is_crashed());
        assert_eq!(car.position(), Vector2D::new(0, 1));
    }

    #[test]
    fn request_delegates_to_strategy() {
        let car = Car::new('a', Vector2D::new(1, 1));
        let grid = Grid::new(vec![vec![crate::grid::SpaceType::Track; 3]; 3]).unwrap();
        let mut strategy = MoveListStrategy::new(vec![Direction::Down, Direction::Left]);
        assert_eq!(car.request_acceleration(&mut strategy, &grid), Ok(Direction::Down));
        assert_eq!(car.request_acceleration(&mut strategy, &grid), Ok(Direction::Left));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn acceleration_validation(
                vx in -20i32..20,
                vy in -20i32..20,
                ax in -3i32..=3,
                ay in -3i32..=3,
            ) {
                let mut car = Car::new('p', Vector2D::ZERO);
                car.velocity = Vector2D::new(vx, vy);
                let result = car.apply_acceleration(Vector2D::new(ax, ay));

                if ax.abs() <= 1 && ay.abs() <= 1 {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(car.velocity(), Vector2D::new(vx + ax, vy + ay));
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(car.velocity(), Vector2D::new(vx, vy));
                }
            }
        }
    }
}
