mod args;
mod error;
mod interactive;
mod render;

use std::cell::RefCell;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;

use gridrace_core::{
    DoNotMoveStrategy, MoveListStrategy, MoveStrategy, PathFollowerStrategy, RaceConfig,
    RaceSession, parse_track,
};

use args::{CliArgs, StrategyKind, USAGE};
use error::{CliError, read_file};
use interactive::{InteractiveStrategy, SharedInput};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gridrace: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(argv: impl Iterator<Item = String>) -> Result<(), CliError> {
    let args = args::parse_args(argv)?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => RaceConfig::from_toml_str(&read_file(path)?)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?,
        None => RaceConfig::load(),
    };
    tracing::debug!(laps = config.laps, max_turns = config.max_turns, "Config loaded");

    let track = parse_track(&read_file(&args.track)?)?;
    let mut session = RaceSession::new(track, config)?;
    assign_strategies(&mut session, &args, &Rc::new(RefCell::new(io::stdin().lock())))?;

    println!("{}", render::render_board(&session));
    let limit_reached = play(&mut session)?;

    println!("{}", render::render_board(&session));
    if limit_reached {
        println!("turn limit reached after {} turns", session.turn_number());
    } else {
        println!("{}", render::status_line(&session));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.summary())?);
    }
    Ok(())
}

/// Play turns until the race is decided. Returns `true` if the configured
/// turn limit stopped it first.
fn play(session: &mut RaceSession) -> Result<bool, CliError> {
    let max_turns = session.config().max_turns;
    while !session.is_over() {
        if max_turns > 0 && session.turn_number() >= max_turns {
            tracing::info!(max_turns, "Turn limit reached");
            return Ok(true);
        }
        println!("{}", render::status_line(session));

        for event in &session.play_turn()? {
            println!("  {}", render::describe_event(session, event));
        }
        println!("{}", render::render_board(session));
    }
    Ok(false)
}

fn assign_strategies<R: BufRead + 'static>(
    session: &mut RaceSession,
    args: &CliArgs,
    console: &SharedInput<R>,
) -> Result<(), CliError> {
    for car in &args.cars {
        if session.index_of(car.id).is_none() {
            return Err(CliError::Usage(format!("no car {:?} on this track", car.id)));
        }
    }

    for index in 0..session.car_count() {
        let id = session.car_id(index)?;
        let strategy: Box<dyn MoveStrategy> = match args.kind_for(id) {
            StrategyKind::Interactive => {
                Box::new(InteractiveStrategy::new(Rc::clone(console), io::stdout()))
            },
            StrategyKind::DoNotMove => Box::new(DoNotMoveStrategy),
            StrategyKind::MoveList(path) => Box::new(MoveListStrategy::parse(&read_file(&path)?)?),
            StrategyKind::PathFollower(path) => {
                Box::new(PathFollowerStrategy::parse(&read_file(&path)?)?)
            },
        };
        session.set_strategy(index, strategy)?;
    }
    Ok(())
}
