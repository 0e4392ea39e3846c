use std::io;

/// Everything that can abort a run. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An alive agent needed a position for a day its trajectory does not cover.
    #[error("trajectory of entity {id} has no position for day {day}")]
    TrajectoryExhausted { id: i64, day: usize },

    #[error("entity id {id} is declared more than once")]
    DuplicateIdentity { id: i64 },

    #[error("entity {id} is at {x}x{y} on day {day}, outside the 1..={size} grid")]
    OutOfBounds {
        id: i64,
        day: usize,
        x: i32,
        y: i32,
        size: i32,
    },

    #[error("grid size {size} is outside 1..={}", crate::board::MAX_SIZE)]
    InvalidSize { size: i32 },

    #[error("scenario line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SimError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SimError::Parse {
            line,
            message: message.into(),
        }
    }
}
