use thiserror::Error;

/// Failures surfaced by the maze pipeline. None of them are transient, so
/// nothing in this crate retries on them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("cell ({x}, {y}) is outside of the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("could not find both an entrance and an exit on the maze perimeter")]
    NoOpeningFound,

    #[error("no path connects the entrance with the exit")]
    Unsolvable,

    #[error("malformed input: {0}")]
    MalformedInput(String),
}

pub type Result<T> = std::result::Result<T, MazeError>;
