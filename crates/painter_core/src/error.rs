//! # Painter Error Types
//!
//! All errors that can occur while building, queueing or applying operations.

use thiserror::Error;

/// Errors produced by the painter.
#[derive(Error, Debug)]
pub enum PainterError {
    /// An operation builder received the wrong number of arguments.
    #[error("{command}: expected {expected} arguments, got {actual}")]
    InvalidArgumentCount {
        /// Operation or command name.
        command: &'static str,
        /// Number of arguments the operation takes.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// Coordinates must come in (x, y) pairs.
    #[error("coordinates must come in pairs, got {0} values")]
    OddCoordinateCount(usize),

    /// An argument is not a finite number.
    #[error("invalid number {value:?}")]
    InvalidNumber {
        /// The offending argument text.
        value: String,
    },

    /// The command name is not part of the language.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    /// A script line failed to parse.
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong on that line.
        #[source]
        source: Box<PainterError>,
    },

    /// Scaled coordinates do not describe a usable shape.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The loop no longer accepts operations.
    #[error("execution loop is stopped")]
    LoopStopped,

    /// `stop_and_wait` was called from the loop thread itself.
    #[error("stop_and_wait called from the execution loop thread")]
    StopFromLoopThread,

    /// The consumer thread could not be started.
    #[error("failed to spawn thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The consumer thread died outside of an operation's panic boundary.
    #[error("execution loop thread panicked")]
    ConsumerPanicked,

    /// The display thread died.
    #[error("display thread panicked")]
    DisplayPanicked,

    /// IO failure (script or config files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PainterError {
    /// Attaches a 1-based script line number to this error.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        Self::Parse {
            line,
            source: Box::new(self),
        }
    }
}

/// Result type for painter operations.
pub type PainterResult<T> = Result<T, PainterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_annotation() {
        let err = PainterError::UnknownCommand("blue".to_string()).at_line(3);
        assert_eq!(err.to_string(), "line 3: unknown command \"blue\"");
        assert!(matches!(err, PainterError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_argument_count_message() {
        let err = PainterError::InvalidArgumentCount {
            command: "figure",
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.to_string(), "figure: expected 2 arguments, got 3");
    }
}
