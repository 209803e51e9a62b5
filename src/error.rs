use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its input/output glue.
///
/// Library code propagates these instead of panicking. Each variant carries enough
/// context to point at the offending value or input line.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (degenerate particle, bad arena, bad duration).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical or geometric issue (e.g. coincident centres at a contact).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Malformed or truncated initial-state input. `line` is 1-based.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The event queue ran dry while the simulation was still running.
    ///
    /// The termination event bounds every run, so this only happens if an engine
    /// invariant has been broken.
    #[error("event queue exhausted before the termination event")]
    EmptyQueue,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
