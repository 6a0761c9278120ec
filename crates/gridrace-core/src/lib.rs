pub mod car;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod ledger;
pub mod session;
pub mod strategy;
pub mod track;

pub use car::Car;
pub use config::RaceConfig;
pub use engine::{RaceEvent, calculate_path};
pub use error::RaceError;
pub use geometry::{Direction, Vector2D};
pub use grid::{Grid, SpaceType};
pub use ledger::PenaltyLedger;
pub use session::{RaceOutcome, RaceSession, RaceSummary};
pub use strategy::{DoNotMoveStrategy, MoveListStrategy, MoveStrategy, PathFollowerStrategy};
pub use track::{CarStart, Track, parse_track};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::RaceConfig;
    use crate::geometry::Direction;
    use crate::session::RaceSession;
    use crate::strategy::MoveListStrategy;
    use crate::track::parse_track;

    /// Build a session with default config from track text. Panics on a
    /// bad track, so only use it with literals.
    pub fn session_from(track: &str) -> RaceSession {
        session_with_config(track, RaceConfig::default())
    }

    pub fn session_with_config(track: &str, config: RaceConfig) -> RaceSession {
        let track = parse_track(track).expect("test track must parse");
        RaceSession::new(track, config).expect("test track must form a valid race")
    }

    /// Build a session where each listed car replays a fixed move list.
    pub fn scripted_session(track: &str, scripts: &[(char, &[Direction])]) -> RaceSession {
        let mut session = session_from(track);
        for &(id, moves) in scripts {
            let index = session
                .index_of(id)
                .unwrap_or_else(|| panic!("no car {id:?} on test track"));
            session
                .set_strategy(index, Box::new(MoveListStrategy::new(moves.iter().copied())))
                .expect("index came from the session");
        }
        session
    }

    /// Play turns until the race is over or `max_turns` is reached.
    /// Returns the number of turns played.
    pub fn run_turns(session: &mut RaceSession, max_turns: usize) -> usize {
        for played in 0..max_turns {
            if session.is_over() {
                return played;
            }
            session.play_turn().expect("scripted turns must not fail");
        }
        max_turns
    }
}
