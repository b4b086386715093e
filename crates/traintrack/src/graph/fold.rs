//! Graph rewrites: folding, vertex blow-up, forest contraction.
//!
//! Each rewrite builds a fresh graph (letter ids are dense, so removed edges
//! force a renumbering) and returns it together with the `EdgeSubst` witness
//! from old letters to new paths.

use std::collections::{HashMap, HashSet};

use crate::alphabet::{Alphabet, Letter};
use crate::error::{Result, TrackError};
use crate::word::Word;

use super::{EdgeSubst, GraphWithInverses, UnionFind, VertexId};

/// Pick a fresh positive/negative symbol pair: the first unused lower-case
/// ASCII letter, falling back to `e0, e1, …`.
fn fresh_symbol_pair(used: &mut HashSet<String>) -> (String, String) {
    for c in b'a'..=b'z' {
        let pos = (c as char).to_string();
        let neg = (c as char).to_ascii_uppercase().to_string();
        if !used.contains(&pos) && !used.contains(&neg) {
            used.insert(pos.clone());
            used.insert(neg.clone());
            return (pos, neg);
        }
    }
    let mut n = 0usize;
    loop {
        let pos = format!("e{}", n);
        let neg = format!("E{}", n);
        if !used.contains(&pos) && !used.contains(&neg) {
            used.insert(pos.clone());
            used.insert(neg.clone());
            return (pos, neg);
        }
        n += 1;
    }
}

/// Dense renumbering of union-find roots over `0..n`.
fn renumber(uf: &mut UnionFind, n: usize) -> (Vec<usize>, usize) {
    let mut map: HashMap<usize, usize> = HashMap::new();
    let mut table = vec![0usize; n];
    for o in 0..n {
        let r = uf.find(o);
        let next = map.len();
        let id = *map.entry(r).or_insert(next);
        table[o] = id;
    }
    (table, map.len())
}

impl GraphWithInverses {
    /// Fold germs sharing an initial vertex.
    ///
    /// `full` germs are identified with the new edge entirely (their far
    /// endpoints merge with its tip); `partial` germs only along an initial
    /// segment and keep a residual edge. A loop subdivided at both ends
    /// (both `e` and `inv(e)` listed in `partial`) becomes
    /// `c . m . inv(c)`.
    ///
    /// Returns the rewritten graph and the witness old-letter -> new-path.
    /// The new edge is the first letter after the surviving old ones.
    pub fn fold(
        &self,
        full: &[Letter],
        partial: &[Letter],
    ) -> Result<(GraphWithInverses, EdgeSubst)> {
        let germs: Vec<Letter> = full.iter().chain(partial.iter()).copied().collect();
        if germs.len() < 2 {
            return Err(TrackError::InvalidPath(
                "fold needs at least two germs".to_string(),
            ));
        }
        let v = self.initial_vertex(germs[0]);
        for &g in &germs {
            if self.initial_vertex(g) != v {
                return Err(TrackError::InvalidPath(
                    "folded germs must share their initial vertex".to_string(),
                ));
            }
        }
        for (i, &g) in germs.iter().enumerate() {
            if germs[i + 1..].contains(&g) {
                return Err(TrackError::InvalidPath(
                    "a germ may be folded only once".to_string(),
                ));
            }
        }
        for &g in full {
            if germs.contains(&g.inverse()) {
                return Err(TrackError::InvalidPath(
                    "cannot fully fold both ends of a loop".to_string(),
                ));
            }
        }

        let folded: HashSet<Letter> = germs.iter().map(|g| g.to_positive()).collect();

        // Vertex classes: the tip of the new edge is either the merged far
        // endpoint of the full germs or a fresh vertex.
        let mut uf = UnionFind::new(self.num_vertices + 1);
        let w_raw = if let Some(&g) = full.first() {
            self.terminal_vertex(g).0
        } else {
            self.num_vertices
        };
        for &g in full.iter().skip(1) {
            uf.union(w_raw, self.terminal_vertex(g).0);
        }

        // New alphabet: survivors keep their symbols, then the new edge,
        // then residuals in `partial` order (one per loop pair).
        let mut used: HashSet<String> = self.alphabet.letters().map(|l| self.alphabet.symbol(l).to_string()).collect();
        let mut pos_syms: Vec<String> = Vec::new();
        let mut neg_syms: Vec<String> = Vec::new();
        let mut new_id: HashMap<Letter, Letter> = HashMap::new();
        for p in self.alphabet.positive_letters() {
            if !folded.contains(&p) {
                new_id.insert(p, Letter(2 * pos_syms.len() as u32));
                pos_syms.push(self.alphabet.symbol(p).to_string());
                neg_syms.push(self.alphabet.symbol(p.inverse()).to_string());
            }
        }
        let c = Letter(2 * pos_syms.len() as u32);
        {
            let (ps, ns) = fresh_symbol_pair(&mut used);
            pos_syms.push(ps);
            neg_syms.push(ns);
        }
        let mut residual: HashMap<Letter, Letter> = HashMap::new();
        let mut middle: HashMap<Letter, Letter> = HashMap::new();
        for &g in partial {
            let p = g.to_positive();
            if partial.contains(&g.inverse()) {
                if !middle.contains_key(&p) {
                    let m = Letter(2 * pos_syms.len() as u32);
                    let (ps, ns) = fresh_symbol_pair(&mut used);
                    pos_syms.push(ps);
                    neg_syms.push(ns);
                    middle.insert(p, m);
                }
            } else {
                let r = Letter(2 * pos_syms.len() as u32);
                let (ps, ns) = fresh_symbol_pair(&mut used);
                pos_syms.push(ps);
                neg_syms.push(ns);
                residual.insert(g, r);
            }
        }
        let alphabet = Alphabet::with_inverses(&pos_syms, &neg_syms)?;

        // The fresh tip slot participates in the renumbering only when no
        // full germ supplied a tip.
        let raw_count = if full.is_empty() {
            self.num_vertices + 1
        } else {
            self.num_vertices
        };
        let (vmap, num_vertices) = renumber(&mut uf, raw_count);
        let vert = |o: VertexId| VertexId(vmap[o.0]);
        let tip = VertexId(vmap[w_raw]);

        let mut initial = vec![VertexId(0); alphabet.len()];
        for p in self.alphabet.positive_letters() {
            if let Some(&np) = new_id.get(&p) {
                initial[np.index()] = vert(self.initial_vertex(p));
                initial[np.inverse().index()] = vert(self.terminal_vertex(p));
            }
        }
        initial[c.index()] = vert(v);
        initial[c.inverse().index()] = tip;
        for (&g, &r) in &residual {
            initial[r.index()] = tip;
            initial[r.inverse().index()] = vert(self.terminal_vertex(g));
        }
        for &m in middle.values() {
            initial[m.index()] = tip;
            initial[m.inverse().index()] = tip;
        }

        // Substitution on old positive letters.
        let mut images: Vec<Word> = Vec::with_capacity(self.alphabet.rank());
        for p in self.alphabet.positive_letters() {
            let w = if let Some(&np) = new_id.get(&p) {
                Word::letter(np)
            } else if let Some(&m) = middle.get(&p) {
                Word::from_reduced(vec![c, m, c.inverse()])
            } else if full.contains(&p) {
                Word::letter(c)
            } else if full.contains(&p.inverse()) {
                Word::letter(c.inverse())
            } else if let Some(&r) = residual.get(&p) {
                Word::from_reduced(vec![c, r])
            } else {
                let r = residual[&p.inverse()];
                Word::from_reduced(vec![r.inverse(), c.inverse()])
            };
            images.push(w);
        }

        let graph = GraphWithInverses {
            alphabet,
            initial,
            num_vertices,
        };
        Ok((graph, EdgeSubst::new(images)))
    }

    /// Blow up vertices along classes of germs.
    ///
    /// Every class gets a fresh vertex and a fresh edge from the old vertex
    /// to it; the germs of the class are re-rooted at the fresh vertex. The
    /// witness maps an old edge to (class edge) . edge . (class edge)^-1
    /// with the factors present exactly when the respective germ is listed.
    pub fn blow_up_vertices(
        &self,
        germ_components: &[Vec<Letter>],
    ) -> Result<(GraphWithInverses, EdgeSubst)> {
        let mut class_of: HashMap<Letter, usize> = HashMap::new();
        for (i, comp) in germ_components.iter().enumerate() {
            if comp.is_empty() {
                return Err(TrackError::InvalidPath("empty germ class".to_string()));
            }
            let v = self.initial_vertex(comp[0]);
            for &g in comp {
                if self.initial_vertex(g) != v {
                    return Err(TrackError::InvalidPath(
                        "germ class must share its vertex".to_string(),
                    ));
                }
                if class_of.insert(g, i).is_some() {
                    return Err(TrackError::InvalidPath(
                        "germ listed in two classes".to_string(),
                    ));
                }
            }
        }

        let mut used: HashSet<String> = self.alphabet.letters().map(|l| self.alphabet.symbol(l).to_string()).collect();
        let mut pos_syms: Vec<String> = self
            .alphabet
            .positive_letters()
            .map(|p| self.alphabet.symbol(p).to_string())
            .collect();
        let mut neg_syms: Vec<String> = self
            .alphabet
            .positive_letters()
            .map(|p| self.alphabet.symbol(p.inverse()).to_string())
            .collect();
        let first_new = pos_syms.len();
        let class_edge: Vec<Letter> = (0..germ_components.len())
            .map(|i| Letter(2 * (first_new + i) as u32))
            .collect();
        for _ in germ_components {
            let (ps, ns) = fresh_symbol_pair(&mut used);
            pos_syms.push(ps);
            neg_syms.push(ns);
        }
        let alphabet = Alphabet::with_inverses(&pos_syms, &neg_syms)?;

        let num_vertices = self.num_vertices + germ_components.len();
        let class_vertex = |i: usize| VertexId(self.num_vertices + i);

        let mut initial = vec![VertexId(0); alphabet.len()];
        for e in self.alphabet.letters() {
            initial[e.index()] = match class_of.get(&e) {
                Some(&i) => class_vertex(i),
                None => self.initial_vertex(e),
            };
        }
        for (i, comp) in germ_components.iter().enumerate() {
            let b = class_edge[i];
            initial[b.index()] = self.initial_vertex(comp[0]);
            initial[b.inverse().index()] = class_vertex(i);
        }

        let mut images: Vec<Word> = Vec::with_capacity(self.alphabet.rank());
        for p in self.alphabet.positive_letters() {
            let mut letters = Vec::with_capacity(3);
            if let Some(&i) = class_of.get(&p) {
                letters.push(class_edge[i]);
            }
            letters.push(p);
            if let Some(&j) = class_of.get(&p.inverse()) {
                letters.push(class_edge[j].inverse());
            }
            images.push(Word::from_reduced(letters));
        }

        let graph = GraphWithInverses {
            alphabet,
            initial,
            num_vertices,
        };
        Ok((graph, EdgeSubst::new(images)))
    }

    /// Contract a forest of edges (given by positive letters): endpoints
    /// merge and the edges vanish from the alphabet.
    pub fn contract_edges(&self, edges: &[Letter]) -> Result<(GraphWithInverses, EdgeSubst)> {
        if !self.spans_forest(edges) {
            return Err(TrackError::InvalidPath(
                "contracted edges must span a forest".to_string(),
            ));
        }
        let contracted: HashSet<Letter> = edges.iter().map(|e| e.to_positive()).collect();

        let mut uf = UnionFind::new(self.num_vertices);
        for &e in edges {
            uf.union(self.initial_vertex(e).0, self.terminal_vertex(e).0);
        }
        let (vmap, num_vertices) = renumber(&mut uf, self.num_vertices);

        let mut pos_syms: Vec<String> = Vec::new();
        let mut neg_syms: Vec<String> = Vec::new();
        let mut new_id: HashMap<Letter, Letter> = HashMap::new();
        for p in self.alphabet.positive_letters() {
            if !contracted.contains(&p) {
                new_id.insert(p, Letter(2 * pos_syms.len() as u32));
                pos_syms.push(self.alphabet.symbol(p).to_string());
                neg_syms.push(self.alphabet.symbol(p.inverse()).to_string());
            }
        }
        let alphabet = Alphabet::with_inverses(&pos_syms, &neg_syms)?;

        let mut initial = vec![VertexId(0); alphabet.len()];
        for (p, np) in &new_id {
            initial[np.index()] = VertexId(vmap[self.initial_vertex(*p).0]);
            initial[np.inverse().index()] = VertexId(vmap[self.terminal_vertex(*p).0]);
        }

        let images: Vec<Word> = self
            .alphabet
            .positive_letters()
            .map(|p| match new_id.get(&p) {
                Some(&np) => Word::letter(np),
                None => Word::one(),
            })
            .collect();

        let graph = GraphWithInverses {
            alphabet,
            initial,
            num_vertices,
        };
        Ok((graph, EdgeSubst::new(images)))
    }
}
