//! Keypad-driven strategy for human players.
//!
//! The digits are laid out like a numeric keypad: `8` is up, `2` is down,
//! `5` keeps the current velocity.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use gridrace_core::{Car, Direction, Grid, MoveStrategy, RaceError};

/// Input shared by every interactive car, so hot-seat players read from a
/// single buffered stream.
pub type SharedInput<R> = Rc<RefCell<R>>;

pub fn key_to_direction(key: &str) -> Option<Direction> {
    Some(match key {
        "7" => Direction::UpLeft,
        "8" => Direction::Up,
        "9" => Direction::UpRight,
        "4" => Direction::Left,
        "5" => Direction::None,
        "6" => Direction::Right,
        "1" => Direction::DownLeft,
        "2" => Direction::Down,
        "3" => Direction::DownRight,
        _ => return None,
    })
}

pub struct InteractiveStrategy<R, W> {
    input: SharedInput<R>,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveStrategy<R, W> {
    pub fn new(input: SharedInput<R>, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, car: &Car) -> std::io::Result<()> {
        write!(
            self.output,
            "car {} at {} velocity {} | 7 8 9 / 4 5 6 / 1 2 3, q quits > ",
            car.id(),
            car.position(),
            car.velocity()
        )?;
        self.output.flush()
    }
}

fn io_error(e: std::io::Error) -> RaceError {
    RaceError::StrategyInput(e.to_string())
}

impl<R: BufRead, W: Write> MoveStrategy for InteractiveStrategy<R, W> {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn next_move(&mut self, car: &Car, _grid: &Grid) -> Result<Direction, RaceError> {
        loop {
            self.prompt(car).map_err(io_error)?;
            let mut line = String::new();
            let read = self
                .input
                .borrow_mut()
                .read_line(&mut line)
                .map_err(io_error)?;
            if read == 0 {
                return Err(RaceError::StrategyInput("input closed".into()));
            }

            let key = line.trim();
            if key.eq_ignore_ascii_case("q") {
                return Err(RaceError::StrategyInput("player quit".into()));
            }
            match key_to_direction(key) {
                Some(direction) => return Ok(direction),
                None => {
                    writeln!(self.output, "unknown key {key:?}").map_err(io_error)?;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use gridrace_core::Vector2D;

    use super::*;

    fn strategy(input: &str) -> InteractiveStrategy<Cursor<Vec<u8>>, Vec<u8>> {
        InteractiveStrategy::new(
            Rc::new(RefCell::new(Cursor::new(input.as_bytes().to_vec()))),
            Vec::new(),
        )
    }

    fn grid() -> Grid {
        gridrace_core::parse_track("####\n#a #\n####").unwrap().grid
    }

    #[test]
    fn keypad_layout() {
        assert_eq!(key_to_direction("8"), Some(Direction::Up));
        assert_eq!(key_to_direction("1"), Some(Direction::DownLeft));
        assert_eq!(key_to_direction("5"), Some(Direction::None));
        assert_eq!(key_to_direction("0"), None);
        for (i, key) in ["7", "8", "9", "4", "5", "6", "1", "2", "3"].iter().enumerate() {
            assert_eq!(key_to_direction(key), Some(Direction::ALL[i]));
        }
    }

    #[test]
    fn reads_one_move_per_line() {
        let mut s = strategy("6\n 2 \n");
        let car = Car::new('a', Vector2D::new(1, 1));
        assert_eq!(s.next_move(&car, &grid()), Ok(Direction::Right));
        assert_eq!(s.next_move(&car, &grid()), Ok(Direction::Down));
        let prompt = String::from_utf8(s.output.clone()).unwrap();
        assert!(prompt.contains("car a at (X:1, Y:1)"));
    }

    #[test]
    fn reprompts_on_bad_key() {
        let mut s = strategy("x\n\n9\n");
        let car = Car::new('a', Vector2D::new(1, 1));
        assert_eq!(s.next_move(&car, &grid()), Ok(Direction::UpRight));
        let out = String::from_utf8(s.output).unwrap();
        assert_eq!(out.matches("unknown key").count(), 2);
    }

    #[test]
    fn quit_and_eof_are_input_errors() {
        let car = Car::new('a', Vector2D::new(1, 1));
        assert!(matches!(
            strategy("Q\n").next_move(&car, &grid()),
            Err(RaceError::StrategyInput(_))
        ));
        assert!(matches!(
            strategy("").next_move(&car, &grid()),
            Err(RaceError::StrategyInput(_))
        ));
    }

    #[test]
    fn cars_share_one_input() {
        let input = Rc::new(RefCell::new(Cursor::new(b"4\n6\n".to_vec())));
        let mut first = InteractiveStrategy::new(Rc::clone(&input), Vec::new());
        let mut second = InteractiveStrategy::new(input, Vec::new());
        let car = Car::new('a', Vector2D::new(1, 1));
        assert_eq!(first.next_move(&car, &grid()), Ok(Direction::Left));
        assert_eq!(second.next_move(&car, &grid()), Ok(Direction::Right));
    }
}
