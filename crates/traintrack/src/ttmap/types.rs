//! Train-track map data model.
//!
//! A self-map of a graph with involutive edges: every positive edge carries a
//! non-empty reduced edge path, the map extends to negatives by
//! `f(inv(e)) = reverse(inv(f(e)))` and to vertices through first letters of
//! images. Analyzer routines live in the sibling modules.

use std::collections::HashMap;
use std::fmt;

use nalgebra::DMatrix;

use crate::alphabet::{Alphabet, Letter};
use crate::error::{Result, TrackError};
use crate::graph::{GraphWithInverses, Path, Turn, UnionFind, VertexId};
use crate::word::Word;

/// A topological self-map of a graph, edge by edge.
///
/// Owns its graph; analyzer routines that rewrite the graph consume the map
/// in place and return substitution witnesses.
#[derive(Clone, Debug)]
pub struct TrainTrackMap {
    pub(crate) graph: GraphWithInverses,
    /// `images[k]` is the image path of the k-th positive letter.
    pub(crate) images: Vec<Path>,
}

impl TrainTrackMap {
    /// Checked construction: one non-empty image path per positive letter,
    /// continuity on paths and a well-defined vertex map.
    pub fn new(graph: GraphWithInverses, images: Vec<Path>) -> Result<TrainTrackMap> {
        if images.len() != graph.alphabet().rank() {
            return Err(TrackError::WrongLength {
                expected: graph.alphabet().rank(),
                got: images.len(),
            });
        }
        for w in &images {
            if w.is_empty() {
                return Err(TrackError::InvalidPath(
                    "every edge needs a non-empty image".to_string(),
                ));
            }
            if !graph.is_path(w) {
                return Err(TrackError::InvalidPath(
                    "edge image is not an edge path".to_string(),
                ));
            }
        }
        let f = TrainTrackMap { graph, images };
        // The vertex map must not depend on the germ used to compute it.
        for v in f.graph.vertices() {
            let mut image_vertex = None;
            for germ in f.graph.outgoing(v) {
                let w = f.graph.initial_vertex(f.image(germ).first().unwrap());
                if *image_vertex.get_or_insert(w) != w {
                    return Err(TrackError::InvalidPath(format!(
                        "the germs at vertex {} disagree on its image",
                        v.0
                    )));
                }
            }
        }
        Ok(f)
    }

    /// Build from an edge-map string like `"a->ab,b->ac,c->a"`.
    ///
    /// The positive letters are the left-hand sides (in order); the graph is
    /// the biggest one on which the map is continuous: edge ends are
    /// identified only when forced by path continuity inside the images,
    /// closed under the induced end map.
    pub fn from_edge_map(rules: &str) -> Result<TrainTrackMap> {
        let mut lhs: Vec<String> = Vec::new();
        let mut rhs: Vec<String> = Vec::new();
        for rule in rules.split(',') {
            let rule = rule.trim();
            if rule.is_empty() {
                continue;
            }
            let (l, r) = rule
                .split_once("->")
                .ok_or_else(|| TrackError::InvalidPath(format!("bad rule: {}", rule)))?;
            lhs.push(l.trim().to_string());
            rhs.push(r.trim().to_string());
        }
        let alphabet = Alphabet::from_positive(&lhs)?;
        let images: Vec<Path> = rhs
            .iter()
            .map(|w| Word::parse(&alphabet, w))
            .collect::<Result<_>>()?;
        for w in &images {
            if w.is_empty() {
                return Err(TrackError::InvalidPath(
                    "every edge needs a non-empty image".to_string(),
                ));
            }
        }

        // Identify edge ends: continuity inside images, then closure under
        // the end map induced by f.
        let n = alphabet.len();
        let mut uf = UnionFind::new(n);
        let image_of = |l: Letter| -> Word {
            let w = &images[l.positive_index()];
            if l.is_positive() {
                w.clone()
            } else {
                w.inverse()
            }
        };
        for p in alphabet.positive_letters() {
            let w = &images[p.positive_index()];
            for pair in w.as_slice().windows(2) {
                uf.union(pair[0].inverse().index(), pair[1].index());
            }
        }
        let end_map = |l: Letter| -> usize { image_of(l).first().unwrap().index() };
        loop {
            let mut changed = false;
            let mut rep: HashMap<usize, usize> = HashMap::new();
            for l in alphabet.letters() {
                let root = uf.find(l.index());
                let fe = end_map(l);
                match rep.get(&root) {
                    Some(&other) => {
                        if uf.find(other) != uf.find(fe) {
                            uf.union(other, fe);
                            changed = true;
                        }
                    }
                    None => {
                        rep.insert(root, fe);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let mut class_id: HashMap<usize, usize> = HashMap::new();
        let mut initial = Vec::with_capacity(n);
        for l in alphabet.letters() {
            let root = uf.find(l.index());
            let next = class_id.len();
            let id = *class_id.entry(root).or_insert(next);
            initial.push(VertexId(id));
        }
        let graph = GraphWithInverses::new(alphabet, initial)?;
        TrainTrackMap::new(graph, images)
    }

    /// Build on the rose: a single vertex, one loop per positive letter.
    pub fn rose_map(alphabet: Alphabet, rules: &[&str]) -> Result<TrainTrackMap> {
        let images: Vec<Path> = rules
            .iter()
            .map(|w| Word::parse(&alphabet, w))
            .collect::<Result<_>>()?;
        let graph = GraphWithInverses::rose(alphabet);
        TrainTrackMap::new(graph, images)
    }

    #[inline]
    pub fn graph(&self) -> &GraphWithInverses {
        &self.graph
    }

    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        self.graph.alphabet()
    }

    /// Image of an edge of either sign.
    pub fn image(&self, e: Letter) -> Path {
        let w = &self.images[e.positive_index()];
        if e.is_positive() {
            w.clone()
        } else {
            w.inverse()
        }
    }

    /// Image of a path, tightened by free reduction.
    pub fn map_path(&self, path: &Path) -> Path {
        path.iter().flat_map(|e| self.image(e)).collect()
    }

    /// `f^n(e)` as a tightened path.
    pub fn image_iter(&self, e: Letter, n: usize) -> Path {
        let mut w = Word::letter(e);
        for _ in 0..n {
            w = self.map_path(&w);
        }
        w
    }

    /// Image of a vertex.
    pub fn map_vertex(&self, v: VertexId) -> VertexId {
        let germ = self.graph.outgoing(v)[0];
        self.graph.initial_vertex(self.image(germ).first().unwrap())
    }

    /// The turn of first letters of the images.
    pub fn image_turn(&self, t: Turn) -> Turn {
        Turn::new(
            self.image(t.a).first().unwrap(),
            self.image(t.b).first().unwrap(),
        )
    }

    /// Transition matrix on positive letters: `M[a, b]` counts occurrences
    /// of `a` and `inv(a)` in the image of `b`.
    pub fn transition_matrix(&self) -> DMatrix<u64> {
        let r = self.alphabet().rank();
        DMatrix::from_fn(r, r, |a, b| {
            self.images[b]
                .iter()
                .filter(|l| l.positive_index() == a)
                .count() as u64
        })
    }

    /// Turns used by iterated edge images: the turns crossed by the images
    /// themselves, closed under the induced turn map.
    ///
    /// Computing over positive letters already yields a set closed under the
    /// involution on both components: the reversed image crosses the same
    /// turns.
    pub fn edge_turns(&self) -> Vec<Turn> {
        let mut set: Vec<Turn> = Vec::new();
        for p in self.alphabet().positive_letters() {
            let w = &self.images[p.positive_index()];
            for pair in w.as_slice().windows(2) {
                let t = Turn::new(pair[0].inverse(), pair[1]);
                if !set.contains(&t) {
                    set.push(t);
                }
            }
        }
        let mut i = 0;
        while i < set.len() {
            let t = self.image_turn(set[i]);
            if !t.is_degenerate() && !set.contains(&t) {
                set.push(t);
            }
            i += 1;
        }
        set.sort();
        set
    }

    /// Turns whose germs map to a common first letter; these can be folded
    /// in one step.
    pub fn fold_turns(&self) -> Vec<Turn> {
        self.graph
            .turns()
            .into_iter()
            .filter(|t| self.image_turn(*t).is_degenerate())
            .collect()
    }

    /// `true` if the turn eventually degenerates under the induced germ map.
    pub fn is_illegal_turn(&self, t: Turn) -> bool {
        let mut seen = vec![t];
        let mut cur = t;
        loop {
            cur = self.image_turn(cur);
            if cur.is_degenerate() {
                return true;
            }
            if seen.contains(&cur) {
                return false;
            }
            seen.push(cur);
        }
    }

    /// All illegal turns of the graph.
    pub fn illegal_turns(&self) -> Vec<Turn> {
        self.graph
            .turns()
            .into_iter()
            .filter(|t| self.is_illegal_turn(*t))
            .collect()
    }

    /// Illegal turns based at `v`.
    pub fn illegal_turns_at(&self, v: VertexId) -> Vec<Turn> {
        self.illegal_turns()
            .into_iter()
            .filter(|t| self.graph.initial_vertex(t.a) == v)
            .collect()
    }

    /// Gates at `v`: germs grouped by pairwise illegal turns.
    pub fn gates(&self, v: VertexId) -> Vec<Vec<Letter>> {
        let illegal = self.illegal_turns_at(v);
        let mut gates: Vec<Vec<Letter>> = Vec::new();
        for e in self.graph.outgoing(v) {
            match gates
                .iter_mut()
                .find(|g| illegal.contains(&Turn::new(g[0], e)))
            {
                Some(g) => g.push(e),
                None => gates.push(vec![e]),
            }
        }
        gates
    }

    /// Number of gates at `v`.
    pub fn number_of_gates(&self, v: VertexId) -> usize {
        self.gates(v).len()
    }

    /// `true` if no edge image crosses an illegal turn, so no cancellation
    /// ever occurs in iterated images.
    pub fn is_train_track(&self) -> bool {
        self.edge_turns().into_iter().all(|t| !self.is_illegal_turn(t))
    }
}

impl fmt::Display for TrainTrackMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Train-track map:")?;
        writeln!(f, "{}", self.graph)?;
        write!(f, "Edge map: ")?;
        for (k, a) in self.alphabet().positive_letters().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(
                f,
                "{}->{}",
                self.alphabet().symbol(a),
                self.images[k].display(self.alphabet())
            )?;
        }
        Ok(())
    }
}
