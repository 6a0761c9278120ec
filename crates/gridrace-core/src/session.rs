use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::car::Car;
use crate::config::RaceConfig;
use crate::engine::{self, RaceEvent};
use crate::error::RaceError;
use crate::geometry::Vector2D;
use crate::grid::{Grid, SpaceType};
use crate::ledger::PenaltyLedger;
use crate::strategy::{DoNotMoveStrategy, MoveStrategy};
use crate::track::Track;

/// Fewest cars a race may start with.
pub const MIN_CARS: usize = 2;
/// Most cars a race may start with.
pub const MAX_CARS: usize = 9;

/// Mutable race state, touched only by the turn engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RaceState {
    pub(crate) grid: Grid,
    /// Arena of cars; index order is turn order.
    pub(crate) cars: Vec<Car>,
    pub(crate) active: Option<usize>,
    pub(crate) winner: Option<usize>,
    pub(crate) penalties: PenaltyLedger,
    /// Turns resolved so far.
    pub(crate) turn: u32,
}

/// Where the race stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceOutcome {
    InProgress,
    Won { winner: usize },
    /// Every car crashed without anyone being declared the winner.
    Stalled,
}

/// Final (or current) standings for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub outcome: RaceOutcome,
    pub winner_id: Option<char>,
    pub turns: u32,
    pub cars: Vec<CarSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSummary {
    pub id: char,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub crashed: bool,
    pub finish_balance: Option<i32>,
}

/// One race: the track, its cars, and the move strategy driving each car.
pub struct RaceSession {
    state: RaceState,
    strategies: Vec<Box<dyn MoveStrategy>>,
    config: RaceConfig,
}

impl RaceSession {
    /// Build a session from a parsed track. Every car starts without a
    /// strategy of its own (it never accelerates) until one is assigned.
    pub fn new(track: Track, config: RaceConfig) -> Result<Self, RaceError> {
        config.validate()?;
        let Track { grid, cars: starts } = track;

        if !(MIN_CARS..=MAX_CARS).contains(&starts.len()) {
            return Err(RaceError::TrackFormat(format!(
                "a race needs {MIN_CARS} to {MAX_CARS} cars, found {}",
                starts.len()
            )));
        }

        let mut ids = HashSet::new();
        let mut positions = HashSet::new();
        for start in &starts {
            if !start.id.is_ascii_graphic() || SpaceType::from_char(start.id).is_some() {
                return Err(RaceError::TrackFormat(format!(
                    "{:?} cannot be used as a car id",
                    start.id
                )));
            }
            if !ids.insert(start.id) {
                return Err(RaceError::TrackFormat(format!(
                    "duplicate car id {:?}",
                    start.id
                )));
            }
            if grid.is_wall_or_out_of_bounds(start.position) {
                return Err(RaceError::TrackFormat(format!(
                    "car {:?} starts off the track at {}",
                    start.id, start.position
                )));
            }
            if !positions.insert(start.position) {
                return Err(RaceError::TrackFormat(format!(
                    "two cars start at {}",
                    start.position
                )));
            }
        }

        let cars: Vec<Car> = starts.iter().map(|s| Car::new(s.id, s.position)).collect();
        let strategies = cars
            .iter()
            .map(|_| Box::new(DoNotMoveStrategy) as Box<dyn MoveStrategy>)
            .collect();

        tracing::info!(
            cars = cars.len(),
            width = grid.width(),
            height = grid.height(),
            laps = config.laps,
            "Race session created"
        );

        Ok(Self {
            state: RaceState {
                grid,
                cars,
                active: Some(0),
                winner: None,
                penalties: PenaltyLedger::default(),
                turn: 0,
            },
            strategies,
            config,
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    pub fn cars(&self) -> &[Car] {
        &self.state.cars
    }

    pub fn car_count(&self) -> usize {
        self.state.cars.len()
    }

    pub fn car(&self, index: usize) -> Result<&Car, RaceError> {
        self.state
            .cars
            .get(index)
            .ok_or(RaceError::IndexOutOfRange(index))
    }

    /// Index of the car whose turn is next, `None` once no car can move.
    pub fn active_car_index(&self) -> Option<usize> {
        self.state.active
    }

    pub fn active_car(&self) -> Option<&Car> {
        self.state.active.map(|i| &self.state.cars[i])
    }

    pub fn winner(&self) -> Option<usize> {
        self.state.winner
    }

    pub fn outcome(&self) -> RaceOutcome {
        match (self.state.winner, self.state.active) {
            (Some(winner), _) => RaceOutcome::Won { winner },
            (None, None) => RaceOutcome::Stalled,
            (None, Some(_)) => RaceOutcome::InProgress,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome() != RaceOutcome::InProgress
    }

    pub fn turn_number(&self) -> u32 {
        self.state.turn
    }

    pub fn car_id(&self, index: usize) -> Result<char, RaceError> {
        self.car(index).map(Car::id)
    }

    pub fn car_position(&self, index: usize) -> Result<Vector2D, RaceError> {
        self.car(index).map(Car::position)
    }

    pub fn car_velocity(&self, index: usize) -> Result<Vector2D, RaceError> {
        self.car(index).map(Car::velocity)
    }

    pub fn is_crashed(&self, index: usize) -> Result<bool, RaceError> {
        self.car(index).map(Car::is_crashed)
    }

    pub fn space_type_at(&self, position: Vector2D) -> Result<SpaceType, RaceError> {
        self.state.grid.space_at(position)
    }

    /// Cars that have not crashed.
    pub fn active_car_count(&self) -> usize {
        self.state.cars.iter().filter(|c| !c.is_crashed()).count()
    }

    /// Finish-line balance for a car, `None` before its first crossing.
    pub fn finish_balance(&self, index: usize) -> Result<Option<i32>, RaceError> {
        let id = self.car_id(index)?;
        Ok(self.state.penalties.balance(id))
    }

    /// Index of the car with the given id.
    pub fn index_of(&self, id: char) -> Option<usize> {
        self.state.cars.iter().position(|c| c.id() == id)
    }

    /// Replace the move strategy for one car.
    pub fn set_strategy(
        &mut self,
        index: usize,
        strategy: Box<dyn MoveStrategy>,
    ) -> Result<(), RaceError> {
        let slot = self
            .strategies
            .get_mut(index)
            .ok_or(RaceError::IndexOutOfRange(index))?;
        tracing::debug!(car = index, strategy = strategy.name(), "Strategy assigned");
        *slot = strategy;
        Ok(())
    }

    pub fn strategy_name(&self, index: usize) -> Result<&'static str, RaceError> {
        self.strategies
            .get(index)
            .map(|s| s.name())
            .ok_or(RaceError::IndexOutOfRange(index))
    }

    /// Resolve the active car's turn with an explicit acceleration.
    ///
    /// An illegal acceleration returns `InvalidAcceleration` and leaves the
    /// session unchanged. After the race is over this is a no-op.
    pub fn resolve_turn(
        &mut self,
        requested: impl Into<Vector2D>,
    ) -> Result<Vec<RaceEvent>, RaceError> {
        engine::resolve_turn(&mut self.state, requested.into(), self.config.laps)
    }

    /// Ask the active car's strategy for a move and resolve it.
    ///
    /// A strategy error is returned as-is with the session untouched.
    pub fn play_turn(&mut self) -> Result<Vec<RaceEvent>, RaceError> {
        if self.is_over() {
            return Ok(Vec::new());
        }
        let Some(index) = self.state.active else {
            return Ok(Vec::new());
        };
        let direction = self.state.cars[index]
            .request_acceleration(self.strategies[index].as_mut(), &self.state.grid)?;
        self.resolve_turn(direction)
    }

    /// Move the turn to the next car that has not crashed.
    pub fn switch_to_next_active_car(&mut self) {
        engine::switch_to_next_active_car(&mut self.state);
    }

    pub fn summary(&self) -> RaceSummary {
        RaceSummary {
            outcome: self.outcome(),
            winner_id: self.state.winner.map(|i| self.state.cars[i].id()),
            turns: self.state.turn,
            cars: self
                .state
                .cars
                .iter()
                .map(|car| CarSummary {
                    id: car.id(),
                    position: car.position(),
                    velocity: car.velocity(),
                    crashed: car.is_crashed(),
                    finish_balance: self.state.penalties.balance(car.id()),
                })
                .collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn crash_car(&mut self, index: usize) {
        let at = self.state.cars[index].position();
        self.state.cars[index].mark_crashed(at);
    }
}

impl std::fmt::Debug for RaceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceSession")
            .field("state", &self.state)
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::strategy::MoveListStrategy;
    use crate::test_helpers::session_from;
    use crate::track::{CarStart, parse_track};

    const OVAL: &str = "\
##########
#        #
#  ####  #
#ab#  #  #
#>>####  #
#        #
##########";

    #[test]
    fn rejects_too_few_and_too_many_cars() {
        let one = parse_track("####\n#a #\n####").unwrap();
        assert!(matches!(
            RaceSession::new(one, RaceConfig::default()),
            Err(RaceError::TrackFormat(_))
        ));
        let ten = parse_track("############\n#0123456789#\n############").unwrap();
        assert!(matches!(
            RaceSession::new(ten, RaceConfig::default()),
            Err(RaceError::TrackFormat(_))
        ));
        let nine = parse_track("###########\n#123456789#\n###########").unwrap();
        assert!(RaceSession::new(nine, RaceConfig::default()).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let track = parse_track("#####\n#a a#\n#####").unwrap();
        let err = RaceSession::new(track, RaceConfig::default()).unwrap_err();
        assert!(matches!(err, RaceError::TrackFormat(m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_cars_starting_in_walls() {
        let mut track = parse_track("#####\n#a b#\n#####").unwrap();
        track.cars.push(CarStart {
            id: 'c',
            position: Vector2D::new(0, 0),
        });
        assert!(RaceSession::new(track, RaceConfig::default()).is_err());
    }

    #[test]
    fn rejects_zero_laps() {
        let track = parse_track(OVAL).unwrap();
        let config = RaceConfig {
            laps: 0,
            ..RaceConfig::default()
        };
        assert!(matches!(
            RaceSession::new(track, config),
            Err(RaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn query_surface_bounds() {
        let session = session_from(OVAL);
        assert_eq!(session.car_count(), 2);
        assert_eq!(session.active_car_index(), Some(0));
        assert_eq!(session.winner(), None);
        assert_eq!(session.car_position(1), Ok(Vector2D::new(2, 3)));
        assert_eq!(session.car_velocity(0), Ok(Vector2D::ZERO));
        assert_eq!(session.is_crashed(0), Ok(false));
        assert_eq!(session.car_position(2), Err(RaceError::IndexOutOfRange(2)));
        assert_eq!(session.is_crashed(7), Err(RaceError::IndexOutOfRange(7)));
        assert_eq!(
            session.space_type_at(Vector2D::new(1, 4)),
            Ok(SpaceType::FinishRight)
        );
        assert_eq!(
            session.space_type_at(Vector2D::new(10, 0)),
            Err(RaceError::OutOfBounds(Vector2D::new(10, 0)))
        );
        assert_eq!(session.active_car_count(), 2);
        assert_eq!(session.index_of('b'), Some(1));
        assert_eq!(session.finish_balance(0), Ok(None));
    }

    #[test]
    fn rotation_skips_crashed_cars() {
        let mut session = session_from("#######\n#abc d#\n#######");
        session.crash_car(1);
        session.crash_car(2);
        session.switch_to_next_active_car();
        assert_eq!(session.active_car_index(), Some(3));
        session.switch_to_next_active_car();
        assert_eq!(session.active_car_index(), Some(0));
    }

    #[test]
    fn rotation_never_returns_to_the_active_car() {
        let mut session = session_from("#######\n#abc  #\n#######");
        session.crash_car(1);
        session.crash_car(2);
        assert_eq!(session.active_car_index(), Some(0));
        session.switch_to_next_active_car();
        assert_eq!(session.active_car_index(), None);
        assert_eq!(session.winner(), None);
    }

    #[test]
    fn rotation_on_all_crashed_roster_stays_empty() {
        let mut session = session_from("#####\n#a b#\n#####");
        session.crash_car(0);
        session.crash_car(1);
        session.switch_to_next_active_car();
        assert_eq!(session.active_car_index(), None);
        assert_eq!(session.outcome(), RaceOutcome::Stalled);
        for _ in 0..3 {
            session.switch_to_next_active_car();
            assert_eq!(session.active_car_index(), None);
        }
        assert_eq!(session.resolve_turn(Direction::Right), Ok(Vec::new()));
        assert_eq!(session.play_turn(), Ok(Vec::new()));
    }

    #[test]
    fn play_turn_uses_active_car_strategy() {
        let mut session = session_from(OVAL);
        session
            .set_strategy(0, Box::new(MoveListStrategy::new([Direction::Up])))
            .unwrap();
        assert_eq!(session.strategy_name(0), Ok("moves"));
        assert_eq!(session.strategy_name(1), Ok("none"));

        let events = session.play_turn().unwrap();
        assert_eq!(
            events,
            vec![RaceEvent::Moved {
                car: 0,
                from: Vector2D::new(1, 3),
                to: Vector2D::new(1, 2),
            }]
        );
        assert_eq!(session.active_car_index(), Some(1));

        // Car b has the default do-nothing strategy.
        session.play_turn().unwrap();
        assert_eq!(session.car_position(1), Ok(Vector2D::new(2, 3)));
        assert_eq!(session.active_car_index(), Some(0));
        assert_eq!(session.turn_number(), 2);
    }

    #[test]
    fn set_strategy_rejects_bad_index() {
        let mut session = session_from(OVAL);
        assert_eq!(
            session.set_strategy(5, Box::new(DoNotMoveStrategy)),
            Err(RaceError::IndexOutOfRange(5))
        );
    }

    #[test]
    fn summary_reports_standings() {
        let mut session = session_from(OVAL);
        session.resolve_turn(Direction::Left).unwrap();
        let summary = session.summary();
        assert_eq!(summary.outcome, RaceOutcome::Won { winner: 1 });
        assert_eq!(summary.winner_id, Some('b'));
        assert_eq!(summary.turns, 1);
        assert!(summary.cars[0].crashed);
        assert_eq!(summary.cars[0].position, Vector2D::new(0, 3));
    }
}
