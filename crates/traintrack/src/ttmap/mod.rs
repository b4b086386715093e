//! Train-track maps and their analyzer.
//!
//! Purpose
//! - Decide structural properties of the outer automorphism carried by a
//!   graph self-map: expansion, irreducibility, Perron-Frobenius, Nielsen
//!   paths and loops, the ideal Whitehead graph and index, stabilization,
//!   and the iwip test.
//!
//! The module is split by concern, mirroring the analyzer pipeline:
//! `types` (data model), `expanding` (matrix-level tests), `nielsen`
//! (INP/pNP searches), `loops` (periodic points and Nielsen loops),
//! `whitehead` (graphs and index), `fold` (rewrites), `stabilize`, `iwip`.

mod expanding;
mod fold;
mod iwip;
mod loops;
mod nielsen;
mod stabilize;
mod types;
mod whitehead;

pub use loops::{NielsenLoop, PeriodicPoint, PnpEnd};
pub use nielsen::Pnp;
pub use types::TrainTrackMap;
pub use whitehead::{Germ, GermGraph};

#[cfg(test)]
mod tests;
