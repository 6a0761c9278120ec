use gridrace_core::{RaceEvent, RaceOutcome, RaceSession};

/// Marker drawn where a crashed car stopped.
pub const WRECK: char = 'X';

/// The track with every car drawn at its position.
pub fn render_board(session: &RaceSession) -> String {
    let mut board: Vec<Vec<char>> = session
        .grid()
        .rows()
        .map(|row| row.iter().map(|space| space.to_char()).collect())
        .collect();

    // Live cars are drawn last so they cover any wreck on the same cell.
    let mut cars: Vec<_> = session.cars().iter().collect();
    cars.sort_by_key(|car| !car.is_crashed());
    for car in cars {
        let p = car.position();
        let (Ok(x), Ok(y)) = (usize::try_from(p.x), usize::try_from(p.y)) else {
            continue;
        };
        if let Some(cell) = board.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = if car.is_crashed() { WRECK } else { car.id() };
        }
    }

    board
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn status_line(session: &RaceSession) -> String {
    match session.outcome() {
        RaceOutcome::Won { winner } => format!(
            "car {} wins after {} turns",
            car_label(session, winner),
            session.turn_number()
        ),
        RaceOutcome::Stalled => format!(
            "every car crashed after {} turns, no winner",
            session.turn_number()
        ),
        RaceOutcome::InProgress => match session.active_car() {
            Some(car) => format!(
                "turn {}: car {} ({}) at {} velocity {}",
                session.turn_number() + 1,
                car.id(),
                session
                    .active_car_index()
                    .and_then(|i| session.strategy_name(i).ok())
                    .unwrap_or("?"),
                car.position(),
                car.velocity()
            ),
            None => "no car can move".to_string(),
        },
    }
}

pub fn describe_event(session: &RaceSession, event: &RaceEvent) -> String {
    match *event {
        RaceEvent::Moved { car, from, to } => {
            format!("car {} moved {from} -> {to}", car_label(session, car))
        },
        RaceEvent::CrossedFinish { car, at, correct } => format!(
            "car {} crossed the finish line at {at}{}",
            car_label(session, car),
            if correct { "" } else { " the wrong way" }
        ),
        RaceEvent::Crashed { car, at } => {
            format!("car {} crashed at {at}", car_label(session, car))
        },
        RaceEvent::Won { car } => format!("car {} wins", car_label(session, car)),
    }
}

fn car_label(session: &RaceSession, index: usize) -> char {
    session.car_id(index).unwrap_or('?')
}
