use std::path::PathBuf;

use gridrace_core::RaceError;

#[derive(Debug)]
pub enum CliError {
    Usage(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Config(String),
    Race(RaceError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(m) => write!(f, "{m}"),
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Config(m) => write!(f, "bad config: {m}"),
            Self::Race(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "cannot encode summary: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Race(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Usage(_) | Self::Config(_) => None,
        }
    }
}

impl From<RaceError> for CliError {
    fn from(e: RaceError) -> Self {
        Self::Race(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Read a whole file, tagging errors with the path.
pub fn read_file(path: &std::path::Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
