//! Folding and reduction of train-track maps.
//!
//! The graph layer rewrites edges; this module keeps the edge map in step.
//! `fold` performs the standard fold of germs along a common image prefix,
//! `fold_inp` drives the full-fold/partial-fold loop that kills an
//! inessential INP, `reduce` contracts invariant forests and low-valence
//! vertices, and `blow_up_vertices` refines vertices along germ classes.

use std::collections::HashMap;

use crate::alphabet::Letter;
use crate::error::{Result, TrackError};
use crate::graph::{EdgeSubst, Path};
use crate::word::Word;

use super::TrainTrackMap;

/// Folding an essential INP never terminates; the caller must check
/// essentiality first. This cap turns a violated precondition into an error.
const FOLD_INP_MAX_ROUNDS: usize = 1000;

impl TrainTrackMap {
    /// Rebuild the image table after a graph rewrite: surviving letters keep
    /// the substituted image of their old letter; entries in `special`
    /// override.
    fn rebuild_images(
        &mut self,
        graph: crate::graph::GraphWithInverses,
        subst: &EdgeSubst,
        special: HashMap<Letter, Path>,
    ) {
        let mut survivors: HashMap<Letter, Letter> = HashMap::new();
        for p in self.alphabet().positive_letters() {
            let w = subst.apply_letter(p);
            if w.len() == 1 && w[0].is_positive() {
                survivors.insert(w[0], p);
            }
        }
        let mut images: Vec<Path> = Vec::with_capacity(graph.alphabet().rank());
        for n in graph.alphabet().positive_letters() {
            if let Some(w) = special.get(&n) {
                images.push(w.clone());
            } else {
                let old = survivors[&n];
                images.push(subst.apply(&self.image(old)));
            }
        }
        self.graph = graph;
        self.images = images;
    }

    /// Fold the germs of `edges` along the common prefix `prefix` of their
    /// images: the new edge maps to the substituted prefix, residual edges
    /// to the substituted remainders.
    pub fn fold(&mut self, edges: &[Letter], prefix: &Path) -> Result<EdgeSubst> {
        if prefix.is_empty() {
            return Err(TrackError::InvalidPath(
                "cannot fold along an empty prefix".to_string(),
            ));
        }
        let mut full: Vec<Letter> = Vec::new();
        let mut partial: Vec<Letter> = Vec::new();
        for &e in edges {
            let w = self.image(e);
            if !prefix.is_prefix_of(&w) {
                return Err(TrackError::InvalidPath(
                    "prefix is not a common prefix of the folded images".to_string(),
                ));
            }
            if w.len() == prefix.len() {
                full.push(e);
            } else {
                partial.push(e);
            }
        }
        let (graph, subst) = self.graph.fold(&full, &partial)?;

        let mut special: HashMap<Letter, Path> = HashMap::new();
        let c = subst.apply_letter(edges[0])[0];
        special.insert(c, subst.apply(prefix));
        for &g in &partial {
            let rest = self.image(g).suffix_from(prefix.len());
            let mid = subst.apply_letter(g)[1];
            if partial.contains(&g.inverse()) {
                // loop folded at both ends: strip the mirrored prefix too
                let len = self.image(g).len();
                let body = self
                    .image(g)
                    .slice(prefix.len(), len - prefix.len(), 1)?;
                let w = subst.apply(&body);
                if mid.is_positive() {
                    special.insert(mid, w);
                } else {
                    special.insert(mid.to_positive(), w.inverse());
                }
            } else {
                special.insert(mid, subst.apply(&rest));
            }
        }
        self.rebuild_images(graph, &subst, special);
        tracing::debug!(map = %self, "after fold");
        Ok(subst)
    }

    /// Fold an inessential INP until a partial fold removes it.
    ///
    /// While one side's image is the whole common prefix the fold is full
    /// and the INP is carried through the substitution; otherwise the two
    /// leading edges split at the prefix length and the new shared edge
    /// takes the image dictated by the pre-image of the tightening point.
    pub fn fold_inp(&mut self, inp: (Path, Path)) -> Result<EdgeSubst> {
        let mut inp = inp;
        let mut result: Option<EdgeSubst> = None;
        for _ in 0..FOLD_INP_MAX_ROUNDS {
            let e0 = inp.0.first().ok_or(TrackError::EssentialInpLoop)?;
            let e1 = inp.1.first().ok_or(TrackError::EssentialInpLoop)?;
            let im0 = self.image(e0);
            let im1 = self.image(e1);
            let p = im0.common_prefix_length(&im1);
            if p == im0.len() || p == im1.len() {
                tracing::debug!(
                    t0 = %inp.0.display(self.alphabet()),
                    t1 = %inp.1.display(self.alphabet()),
                    "full fold"
                );
                let morph = self.fold(&[e0, e1], &im0.prefix(p))?;
                result = Some(match result {
                    Some(r) => r.then(&morph),
                    None => morph.clone(),
                });
                let u = morph.apply(&inp.0);
                let v = morph.apply(&inp.1);
                let q = u.common_prefix_length(&v);
                inp = (u.suffix_from(q), v.suffix_from(q));
                continue;
            }

            tracing::debug!(
                t0 = %inp.0.display(self.alphabet()),
                t1 = %inp.1.display(self.alphabet()),
                "partial fold"
            );
            // The germ whose image is one letter longer than the prefix is
            // identified whole; at most one side may be.
            let mut full: Vec<Letter> = Vec::new();
            let mut partial: Vec<Letter> = Vec::new();
            for e in [e0, e1] {
                if full.is_empty() && self.image(e).len() == p + 1 {
                    full.push(e);
                } else {
                    partial.push(e);
                }
            }
            let (graph, subst) = self.graph.fold(&full, &partial)?;

            let mut special: HashMap<Letter, Path> = HashMap::new();
            if partial.len() == 2 && subst.apply_letter(partial[0]).len() == 3 {
                let a = partial[0];
                let len = self.image(a).len();
                let body = self.image(a).slice(p, len - p, 1)?;
                let w = subst.apply(&body);
                let w = w.slice(1, w.len().saturating_sub(1), 1)?;
                let mid = subst.apply_letter(a)[1];
                if mid.is_positive() {
                    special.insert(mid, w);
                } else {
                    special.insert(mid.to_positive(), w.inverse());
                }
            } else {
                for &a in &partial {
                    let rest = subst.apply(&self.image(a).suffix_from(p));
                    let b = subst.apply_letter(a)[1];
                    special.insert(b, rest.suffix_from(1));
                }
            }
            let c = subst.apply_letter(e0)[0];
            let head = subst.apply(&self.image(e0).prefix(p));
            special.insert(c, head.product(&Word::letter(c)));

            self.rebuild_images(graph, &subst, special);
            tracing::debug!(map = %self, "after partial fold");
            return Ok(match result {
                Some(r) => r.then(&subst),
                None => subst,
            });
        }
        Err(TrackError::EssentialInpLoop)
    }

    /// Blow up vertices along germ classes, keeping the edge map in step:
    /// a class edge maps to the class edge of the image germs.
    ///
    /// Assumes consecutive edges in iterated images always lie in a common
    /// class.
    pub fn blow_up_vertices(&mut self, germ_components: &[Vec<Letter>]) -> Result<EdgeSubst> {
        let (graph, subst) = self.graph.blow_up_vertices(germ_components)?;
        // Old positive letters keep their ids across a blow-up, so the whole
        // image table can be assembled directly.
        let mut special: HashMap<Letter, Path> = HashMap::new();
        for p in self.alphabet().positive_letters() {
            special.insert(p, subst.apply(&self.image(p)));
        }
        for comp in germ_components {
            let ec = subst.apply_letter(comp[0])[0];
            let f = self.image(comp[0])[0];
            let fc = subst.apply_letter(f)[0];
            special.insert(ec, Word::letter(fc));
        }
        self.rebuild_images(graph, &subst, special);
        Ok(subst)
    }

    /// `true` if the images of the letters of `stratum` use only letters of
    /// the stratum, so the spanned subgraph is `f`-invariant.
    fn stratum_is_closed(&self, stratum: &[Letter]) -> bool {
        stratum.iter().all(|&p| {
            self.images[p.positive_index()]
                .iter()
                .all(|l| stratum.contains(&l.to_positive()))
        })
    }

    /// Contract the given edges and rebuild the edge map; edges whose image
    /// becomes trivial are contracted in turn. A loop with trivial image
    /// means the map cannot be expanding.
    fn contract_and_clean(&mut self, edges: &[Letter]) -> Result<EdgeSubst> {
        let mut result = EdgeSubst::identity(self.alphabet());
        let mut pending: Vec<Letter> = edges.to_vec();
        while !pending.is_empty() {
            let (graph, subst) = self.graph.contract_edges(&pending)?;
            self.rebuild_images(graph, &subst, HashMap::new());
            result = result.then(&subst);
            pending = self
                .alphabet()
                .positive_letters()
                .filter(|&p| self.images[p.positive_index()].is_empty())
                .collect();
            for &p in &pending {
                if self.graph.initial_vertex(p) == self.graph.terminal_vertex(p) {
                    return Err(TrackError::NotExpanding);
                }
            }
        }
        Ok(result)
    }

    /// Reduce the representative: contract invariant forest strata, contract
    /// the edges at valence-one vertices, and fuse valence-two vertices
    /// whose two sides agree on the image vertex.
    pub fn reduce(&mut self) -> Result<EdgeSubst> {
        let mut result = EdgeSubst::identity(self.alphabet());
        'restart: loop {
            // invariant forests, lowest strata first
            for stratum in self.stratify() {
                if self.stratum_is_closed(&stratum)
                    && self.graph.spans_forest(&stratum)
                    && !stratum.is_empty()
                    && self.alphabet().rank() > stratum.len()
                {
                    tracing::debug!(?stratum, "contracting invariant forest");
                    let morph = self.contract_and_clean(&stratum)?;
                    result = result.then(&morph);
                    continue 'restart;
                }
            }
            // valence-one vertices
            for v in self.graph.vertices() {
                let germs = self.graph.outgoing(v);
                if germs.len() == 1 && self.alphabet().rank() > 1 {
                    let e = germs[0].to_positive();
                    tracing::debug!(vertex = v.0, "contracting valence-one edge");
                    let morph = self.contract_and_clean(&[e])?;
                    result = result.then(&morph);
                    continue 'restart;
                }
            }
            // valence-two vertices: fuse when the two sides map compatibly
            for v in self.graph.vertices() {
                let germs = self.graph.outgoing(v);
                if germs.len() != 2 || self.alphabet().rank() <= 1 {
                    continue;
                }
                let candidate = germs
                    .iter()
                    .find(|&&g| self.graph.initial_vertex(g) != self.graph.terminal_vertex(g));
                if let Some(&g) = candidate {
                    let w = self.graph.terminal_vertex(g);
                    if self.map_vertex(v) == self.map_vertex(w) {
                        tracing::debug!(vertex = v.0, "fusing valence-two vertex");
                        let morph = self.contract_and_clean(&[g.to_positive()])?;
                        result = result.then(&morph);
                        continue 'restart;
                    }
                }
            }
            break;
        }
        Ok(result)
    }
}
