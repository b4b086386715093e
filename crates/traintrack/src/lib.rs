//! Free groups of finite rank and train-track representatives of their
//! outer automorphisms.
//!
//! The layers, leaves first: `alphabet` (letters with involution), `word`
//! (reduced words, the free-group elements), `graph` (finite graphs with
//! involutive edges, folds and blow-ups), `ttmap` (train-track maps and the
//! analyzer: Nielsen paths, Whitehead graphs, stabilization, the iwip
//! test), `perron` (the exact matrix oracle).

pub mod alphabet;
pub mod error;
pub mod graph;
pub mod perron;
pub mod ttmap;
pub mod word;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::alphabet::{Alphabet, Letter};
    pub use crate::error::{Result, TrackError};
    pub use crate::graph::{EdgeSubst, GraphWithInverses, Path, Turn, VertexId};
    pub use crate::perron::Perron;
    pub use crate::ttmap::{NielsenLoop, PeriodicPoint, Pnp, PnpEnd, TrainTrackMap};
    pub use crate::word::{rand::random_reduced, Word};
}
