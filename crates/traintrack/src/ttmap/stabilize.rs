//! Stabilization: folding inessential INPs.
//!
//! An INP is essential when the Perron weight of its tightened common prefix
//! equals the critic `(lambda - 1) * sum(nu)`; essential INPs survive every
//! fold. Everything else gets folded away, and the lexicographic complexity
//! `(lambda, edges, INP count)` strictly drops at each round.

use crate::error::Result;
use crate::graph::{EdgeSubst, Turn};
use crate::perron::Perron;

use super::TrainTrackMap;

impl TrainTrackMap {
    /// Weight coefficients of a path: occurrences per positive letter.
    fn weight_counts(&self, path: &crate::graph::Path) -> Vec<i64> {
        let mut counts = vec![0i64; self.alphabet().rank()];
        for l in path.iter() {
            counts[l.positive_index()] += 1;
        }
        counts
    }

    /// Fold inessential INPs (and, where none fold, auxiliary illegal
    /// turns) until the representative is stable or a reduction appears.
    ///
    /// Returns the composed substitution witness; the identity when the map
    /// was already stable.
    pub fn stabilize(&mut self) -> Result<EdgeSubst> {
        let mut result = EdgeSubst::identity(self.alphabet());
        loop {
            let inps = self.indivisible_nielsen_paths()?;
            tracing::debug!(count = inps.len(), "stabilize round");
            if inps.is_empty() {
                return Ok(result);
            }

            let perron = Perron::compute(&self.transition_matrix())?;
            let critic = perron.critic();

            let mut folded = false;
            for inp in &inps {
                let iu = self.map_path(&inp.0);
                let iv = self.map_path(&inp.1);
                let p = iu.common_prefix_length(&iv);
                let prefix = iu.prefix(p);
                let weight = perron.combo(&self.weight_counts(&prefix));
                if !perron.weights_equal(&weight, &critic) {
                    tracing::debug!(
                        t0 = %inp.0.display(self.alphabet()),
                        t1 = %inp.1.display(self.alphabet()),
                        "non-essential INP"
                    );
                    let morph = self.fold_inp((inp.0.clone(), inp.1.clone()))?;
                    result = result.then(&morph);
                    folded = true;
                    break;
                }
            }

            if !folded {
                // Every INP is essential. Fold a foldable turn that is not
                // the initial turn of an INP; failing that, fold the image
                // turn of a turn landing on an INP's initial turn.
                let is_inp_turn = |t: Turn| {
                    inps.iter()
                        .any(|inp| Turn::new(inp.0[0], inp.1[0]) == t)
                };
                let mut target: Option<Turn> = None;
                for turn in self.graph.turns() {
                    if self.image_turn(turn).is_degenerate() && !is_inp_turn(turn) {
                        target = Some(turn);
                        break;
                    }
                }
                if target.is_none() {
                    for turn in self.graph.turns() {
                        let tt = self.image_turn(turn);
                        if is_inp_turn(tt) {
                            target = Some(tt);
                            break;
                        }
                    }
                }
                match target {
                    Some(turn) => {
                        tracing::debug!(?turn, "folding illegal turn");
                        let iu = self.image(turn.a);
                        let iv = self.image(turn.b);
                        let p = iu.common_prefix_length(&iv);
                        let morph = self.fold(&[turn.a, turn.b], &iu.prefix(p))?;
                        result = result.then(&morph);
                    }
                    None => return Ok(result),
                }
            }

            let morph = self.reduce()?;
            result = result.then(&morph);
            if self.stratify().len() > 1 {
                tracing::debug!("stabilization found a reduction");
                return Ok(result);
            }
        }
    }
}
