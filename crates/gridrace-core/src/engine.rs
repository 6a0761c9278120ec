//! Turn resolution: acceleration, path rasterization, per-step collision
//! and finish-line evaluation, and active-car rotation.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::geometry::Vector2D;
use crate::session::RaceState;

/// Something that happened while resolving a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// The car ended its turn at `to` without crashing.
    Moved {
        car: usize,
        from: Vector2D,
        to: Vector2D,
    },
    /// The car stepped onto a finish line from off it.
    CrossedFinish {
        car: usize,
        at: Vector2D,
        correct: bool,
    },
    Crashed {
        car: usize,
        at: Vector2D,
    },
    /// The race is decided.
    Won {
        car: usize,
    },
}

/// Grid cells visited moving in a straight line from `start` to `end`,
/// both included.
///
/// Integer Bresenham walk: one step per iteration along the axis with the
/// larger delta, with an error term deciding when the other axis steps too.
/// Yields `max(|dx|, |dy|) + 1` points, each a king's move from the last.
pub fn calculate_path(start: Vector2D, end: Vector2D) -> Vec<Vector2D> {
    let delta = end - start;
    let (sx, sy) = (delta.x.signum(), delta.y.signum());
    let (adx, ady) = (delta.x.abs(), delta.y.abs());

    // (parallel step, diagonal step, fast distance, slow distance)
    let (parallel, diagonal, fast, slow) = if adx > ady {
        (Vector2D::new(sx, 0), Vector2D::new(sx, sy), adx, ady)
    } else {
        (Vector2D::new(0, sy), Vector2D::new(sx, sy), ady, adx)
    };

    let mut path = Vec::with_capacity(fast as usize + 1);
    let mut point = start;
    path.push(point);

    let mut error = fast / 2;
    for _ in 0..fast {
        error -= slow;
        if error < 0 {
            error += fast;
            point += diagonal;
        } else {
            point += parallel;
        }
        path.push(point);
    }
    path
}

/// How the walk along a path ended.
enum WalkEnd {
    Clear,
    Crashed(Vector2D),
    Finished(Vector2D),
}

/// Resolve one turn for the active car.
///
/// Returns no events (and changes nothing) once the race is decided or no
/// car can move. An illegal acceleration is rejected before any mutation.
pub(crate) fn resolve_turn(
    state: &mut RaceState,
    requested: Vector2D,
    laps: u32,
) -> Result<Vec<RaceEvent>, RaceError> {
    if state.winner.is_some() {
        return Ok(Vec::new());
    }
    let Some(index) = state.active else {
        return Ok(Vec::new());
    };
    if state.cars[index].is_crashed() {
        return Ok(Vec::new());
    }

    state.cars[index].apply_acceleration(requested)?;
    state.turn += 1;

    let car = &state.cars[index];
    let (id, start, velocity) = (car.id(), car.position(), car.velocity());
    let path = calculate_path(start, car.next_position());
    let mut events = Vec::new();

    tracing::debug!(
        turn = state.turn,
        car = %id,
        %start,
        %velocity,
        steps = path.len() - 1,
        "Resolving turn"
    );

    let mut end = WalkEnd::Clear;
    let mut previous = start;
    for &point in path.iter().skip(1) {
        let occupied = state
            .cars
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && !other.is_crashed() && other.position() == point);
        if occupied || state.grid.is_wall_or_out_of_bounds(point) {
            end = WalkEnd::Crashed(point);
            break;
        }

        if state.grid.is_finish(point) && !state.grid.is_finish(previous) {
            let correct = velocity
                .angle_between(state.grid.finish_direction(point))
                .is_ok_and(|angle| angle < FRAC_PI_2);
            let balance = state.penalties.record_crossing(id, correct, laps);
            tracing::info!(car = %id, at = %point, correct, balance, "Finish line crossed");
            events.push(RaceEvent::CrossedFinish {
                car: index,
                at: point,
                correct,
            });
            if correct && balance == 0 {
                end = WalkEnd::Finished(point);
                break;
            }
        }
        previous = point;
    }

    match end {
        WalkEnd::Clear => {
            state.cars[index].advance();
            events.push(RaceEvent::Moved {
                car: index,
                from: start,
                to: state.cars[index].position(),
            });
        },
        WalkEnd::Finished(at) => {
            state.cars[index].stop_at(at);
            events.push(RaceEvent::Moved {
                car: index,
                from: start,
                to: at,
            });
            declare_winner(state, index, &mut events);
        },
        WalkEnd::Crashed(at) => {
            state.cars[index].mark_crashed(at);
            tracing::info!(car = %id, %at, "Car crashed");
            events.push(RaceEvent::Crashed { car: index, at });

            let mut survivors = state
                .cars
                .iter()
                .enumerate()
                .filter(|(_, car)| !car.is_crashed())
                .map(|(i, _)| i);
            if let (Some(last), None) = (survivors.next(), survivors.next()) {
                declare_winner(state, last, &mut events);
            }
        },
    }

    if state.winner.is_none() {
        switch_to_next_active_car(state);
    }
    Ok(events)
}

fn declare_winner(state: &mut RaceState, index: usize, events: &mut Vec<RaceEvent>) {
    state.winner = Some(index);
    tracing::info!(car = %state.cars[index].id(), turn = state.turn, "Race decided");
    events.push(RaceEvent::Won { car: index });
}

/// Hand the turn to the next car after the active one that has not
/// crashed, wrapping around. The active car itself is never picked again:
/// if every other car has crashed there is no active car.
pub(crate) fn switch_to_next_active_car(state: &mut RaceState) {
    let Some(current) = state.active else {
        return;
    };
    let count = state.cars.len();
    state.active = (1..count)
        .map(|offset| (current + offset) % count)
        .find(|&i| !state.cars[i].is_crashed());
    if state.active.is_none() {
        tracing::info!("No car left to move");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Vector2D {
        Vector2D::new(x, y)
    }

    #[test]
    fn path_single_point() {
        assert_eq!(calculate_path(p(4, 7), p(4, 7)), vec![p(4, 7)]);
    }

    #[test]
    fn path_horizontal_and_vertical() {
        assert_eq!(
            calculate_path(p(1, 1), p(4, 1)),
            vec![p(1, 1), p(2, 1), p(3, 1), p(4, 1)]
        );
        assert_eq!(
            calculate_path(p(2, 3), p(2, 0)),
            vec![p(2, 3), p(2, 2), p(2, 1), p(2, 0)]
        );
    }

    #[test]
    fn path_diagonal() {
        assert_eq!(
            calculate_path(p(0, 0), p(-3, 3)),
            vec![p(0, 0), p(-1, 1), p(-2, 2), p(-3, 3)]
        );
    }

    #[test]
    fn path_shallow_slope() {
        assert_eq!(
            calculate_path(p(0, 0), p(4, 2)),
            vec![p(0, 0), p(1, 0), p(2, 1), p(3, 1), p(4, 2)]
        );
    }

    #[test]
    fn path_steep_slope() {
        assert_eq!(
            calculate_path(p(0, 0), p(1, 3)),
            vec![p(0, 0), p(0, 1), p(1, 2), p(1, 3)]
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn path_is_gapless_and_exact(
                sx in -50i32..50,
                sy in -50i32..50,
                ex in -50i32..50,
                ey in -50i32..50,
            ) {
                let (start, end) = (p(sx, sy), p(ex, ey));
                let path = calculate_path(start, end);
                let expected_len = (ex - sx).abs().max((ey - sy).abs()) as usize + 1;

                prop_assert_eq!(path.len(), expected_len);
                prop_assert_eq!(path[0], start);
                prop_assert_eq!(*path.last().unwrap(), end);
                for pair in path.windows(2) {
                    let step = pair[1] - pair[0];
                    prop_assert!(
                        step.x.abs() <= 1 && step.y.abs() <= 1 && !step.is_zero(),
                        "bad step {} between {} and {}", step, pair[0], pair[1]
                    );
                }
            }

            #[test]
            fn path_never_oversteps_an_axis(
                sx in -30i32..30,
                sy in -30i32..30,
                ex in -30i32..30,
                ey in -30i32..30,
            ) {
                let path = calculate_path(p(sx, sy), p(ex, ey));
                let (lo_x, hi_x) = (sx.min(ex), sx.max(ex));
                let (lo_y, hi_y) = (sy.min(ey), sy.max(ey));
                for point in &path {
                    prop_assert!((lo_x..=hi_x).contains(&point.x));
                    prop_assert!((lo_y..=hi_y).contains(&point.y));
                }
            }
        }
    }
}
