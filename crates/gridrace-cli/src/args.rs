use std::path::PathBuf;

use crate::error::CliError;

pub const USAGE: &str = "\
usage: gridrace <track-file> [--car=<id>:<kind>[:<file>]]... [--config=<path>] [--json]

  kinds: interactive (default)  keypad prompt on stdin
         none                   never accelerates
         moves:<file>           one direction name per line (UP, DOWN_LEFT, NONE, ...)
         path:<file>            one waypoint per line (x,y)

  Set RUST_LOG=gridrace_core=debug for turn-by-turn logs on stderr.";

/// How one car picks its moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyKind {
    Interactive,
    DoNotMove,
    MoveList(PathBuf),
    PathFollower(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarArg {
    pub id: char,
    pub kind: StrategyKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub track: PathBuf,
    pub cars: Vec<CarArg>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub help: bool,
}

impl CliArgs {
    /// Strategy for a car id; unlisted cars are driven interactively.
    pub fn kind_for(&self, id: char) -> StrategyKind {
        self.cars
            .iter()
            .find(|c| c.id == id)
            .map_or(StrategyKind::Interactive, |c| c.kind.clone())
    }
}

/// Parse arguments (without the program name).
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, CliError> {
    let mut parsed = CliArgs::default();
    let mut track = None;

    for arg in args {
        if let Some(spec) = arg.strip_prefix("--car=") {
            let car = parse_car(spec)?;
            if parsed.cars.iter().any(|c| c.id == car.id) {
                return Err(CliError::Usage(format!(
                    "car {:?} given more than once",
                    car.id
                )));
            }
            parsed.cars.push(car);
        } else if let Some(path) = arg.strip_prefix("--config=") {
            parsed.config = Some(PathBuf::from(path));
        } else if arg == "--json" {
            parsed.json = true;
        } else if arg == "--help" || arg == "-h" {
            parsed.help = true;
        } else if arg.starts_with('-') {
            return Err(CliError::Usage(format!("unknown option {arg}\n\n{USAGE}")));
        } else if track.is_none() {
            track = Some(PathBuf::from(arg));
        } else {
            return Err(CliError::Usage(format!(
                "unexpected argument {arg}\n\n{USAGE}"
            )));
        }
    }

    match track {
        Some(track) => parsed.track = track,
        None if parsed.help => {},
        None => return Err(CliError::Usage(USAGE.to_string())),
    }
    Ok(parsed)
}

fn parse_car(spec: &str) -> Result<CarArg, CliError> {
    let mut parts = spec.splitn(3, ':');
    let id_part = parts.next().unwrap_or_default();
    let mut chars = id_part.chars();
    let (Some(id), None) = (chars.next(), chars.next()) else {
        return Err(CliError::Usage(format!(
            "car id must be a single character, got {id_part:?}"
        )));
    };

    let file = |kind: &str, file: Option<&str>| -> Result<PathBuf, CliError> {
        file.filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| CliError::Usage(format!("--car={id}:{kind} needs a file")))
    };

    let kind = match (parts.next(), parts.next()) {
        (None, _) | (Some("interactive"), None) => StrategyKind::Interactive,
        (Some("none"), None) => StrategyKind::DoNotMove,
        (Some("moves"), f) => StrategyKind::MoveList(file("moves", f)?),
        (Some("path"), f) => StrategyKind::PathFollower(file("path", f)?),
        (Some(other), _) => {
            return Err(CliError::Usage(format!(
                "bad strategy {other:?} for car {id}\n\n{USAGE}"
            )));
        },
    };
    Ok(CarArg { id, kind })
}
