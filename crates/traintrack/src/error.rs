//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<_, TrackError>`; nothing is
//! retried and analyzer routines surface oracle failures unchanged.

use thiserror::Error;

/// Errors raised by the word algebra, the graph layer and the analyzer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TrackError {
    /// A symbol outside the alphabet was used.
    #[error("the letter {0} is not in the alphabet")]
    UnknownLetter(String),

    /// Positive and negative alphabets overlap or differ in size.
    #[error("positive and negative letters conflict: {0}")]
    AlphabetConflict(String),

    /// Default negative letters cannot be inferred from the positives.
    #[error("not able to determine default inverse letters")]
    AmbiguousInverse,

    /// A fixed-length constructor received data of the wrong length.
    #[error("expected {expected} letters, got {got}")]
    WrongLength { expected: usize, got: usize },

    /// Word slicing supports only steps 1 and -1.
    #[error("step can only be 1 or -1, got {0}")]
    UnsupportedStep(isize),

    /// The analyzer requires an expanding train-track map.
    #[error("the train-track map is not expanding")]
    NotExpanding,

    /// The analyzer requires an irreducible representative, or the matrix
    /// oracle found a degenerate dominant eigenvalue.
    #[error("the representative is not irreducible")]
    NotIrreducible,

    /// `fold_inp` was invoked on an essential INP and would not terminate.
    #[error("cannot fold an essential indivisible Nielsen path")]
    EssentialInpLoop,

    /// An edge path breaks continuity (mismatched endpoints) or is empty
    /// where a non-trivial path is required.
    #[error("not an edge path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, TrackError>;
