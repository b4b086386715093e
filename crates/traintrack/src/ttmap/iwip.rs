//! The iwip test.

use crate::error::Result;

use super::TrainTrackMap;

impl TrainTrackMap {
    /// `true` if `self` represents a fully irreducible (iwip) outer
    /// automorphism.
    ///
    /// The decision sequence:
    /// 1. reduce; a stratified representative is reducible;
    /// 2. the transition matrix must have a strictly positive power;
    /// 3. every local Whitehead graph must be connected;
    /// 4. no periodic Nielsen loop means an atoroidal iwip;
    /// 5. two or more loops rule iwip out;
    /// 6. a single loop must not lie in a proper free factor.
    pub fn is_iwip(&mut self) -> Result<bool> {
        self.reduce()?;
        tracing::debug!(map = %self, "reduced representative");
        if self.stratify().len() > 1 {
            tracing::debug!("reducible: more than one stratum");
            return Ok(false);
        }
        if !self.is_perron_frobenius() {
            tracing::debug!("transition matrix has no strictly positive power");
            return Ok(false);
        }
        if !self.has_connected_local_whitehead_graphs() {
            tracing::debug!("disconnected local Whitehead graph");
            return Ok(false);
        }
        let pnps = self.periodic_nielsen_paths()?;
        let loops = self.periodic_nielsen_loops(&pnps)?;
        match loops.len() {
            0 => {
                tracing::debug!("no Nielsen loops: atoroidal iwip");
                Ok(true)
            }
            1 => {
                let separable = self.graph.lies_in_a_free_factor(&loops[0].path)?;
                tracing::debug!(separable, "one Nielsen loop");
                Ok(!separable)
            }
            n => {
                tracing::debug!(count = n, "several Nielsen loops");
                Ok(false)
            }
        }
    }
}
