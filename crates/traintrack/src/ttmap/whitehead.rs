//! Whitehead graphs and the stabilized index.
//!
//! The local Whitehead graph at a vertex records the turns taken by iterated
//! edge images; its stable subgraph keeps only periodic germs. The ideal
//! Whitehead graph glues the stable graphs along pNP endpoint germs and
//! decorates components carrying a Nielsen loop; the index list reads off
//! `|C| - 2` over its large components.

use std::collections::{HashMap, HashSet};

use crate::alphabet::Letter;
use crate::error::Result;
use crate::graph::VertexId;

use super::loops::{PeriodicPoint, PnpEnd};
use super::nielsen::Pnp;
use super::TrainTrackMap;

/// A vertex of the ideal Whitehead graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Germ {
    /// The germ of an edge at its initial vertex.
    Edge(Letter),
    /// A germ at a periodic point inside an edge, oriented along the edge.
    Interior(PeriodicPoint),
    /// Decoration for the k-th Nielsen loop.
    LoopAnchor(usize),
    /// Second decoration vertex for the k-th Nielsen loop.
    LoopBody(usize),
}

/// Small undirected graph on germs.
#[derive(Clone, Debug, Default)]
pub struct GermGraph {
    adj: HashMap<Germ, HashSet<Germ>>,
}

impl GermGraph {
    pub fn add_vertex(&mut self, v: Germ) {
        self.adj.entry(v).or_default();
    }

    pub fn add_edge(&mut self, a: Germ, b: Germ) {
        self.adj.entry(a).or_default().insert(b);
        self.adj.entry(b).or_default().insert(a);
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Germ> {
        self.adj.keys()
    }

    pub fn num_vertices(&self) -> usize {
        self.adj.len()
    }

    pub fn contains(&self, v: &Germ) -> bool {
        self.adj.contains_key(v)
    }

    /// Merge vertex `from` into `to`, redirecting every incident edge.
    pub fn identify(&mut self, from: Germ, to: Germ) {
        if from == to {
            return;
        }
        if let Some(nbrs) = self.adj.remove(&from) {
            self.add_vertex(to);
            for n in nbrs {
                if let Some(set) = self.adj.get_mut(&n) {
                    set.remove(&from);
                }
                let target = if n == from { to } else { n };
                if target != to {
                    self.add_edge(to, target);
                }
            }
        }
    }

    /// Connected components as sorted-by-size-desc lists of germs.
    pub fn connected_components(&self) -> Vec<Vec<Germ>> {
        let mut seen: HashSet<Germ> = HashSet::new();
        let mut comps = Vec::new();
        for &start in self.adj.keys() {
            if seen.contains(&start) {
                continue;
            }
            let mut comp = vec![start];
            seen.insert(start);
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                for &n in &self.adj[&v] {
                    if seen.insert(n) {
                        comp.push(n);
                        stack.push(n);
                    }
                }
            }
            comps.push(comp);
        }
        comps.sort_by_key(|c| std::cmp::Reverse(c.len()));
        comps
    }
}

impl TrainTrackMap {
    /// The local Whitehead graph at `v`: germs at `v`, joined when some edge
    /// image crosses the turn.
    pub fn local_whitehead_graph(&self, v: VertexId) -> GermGraph {
        let mut g = GermGraph::default();
        for t in self.edge_turns() {
            if self.graph.initial_vertex(t.a) == v {
                g.add_edge(Germ::Edge(t.a), Germ::Edge(t.b));
            }
        }
        g
    }

    /// The stable local Whitehead graph at `v`: the subgraph of the local
    /// Whitehead graph spanned by the germs that are periodic under the germ
    /// map. Empty when `v` itself is not periodic.
    pub fn stable_local_whitehead_graph(&self, v: VertexId) -> GermGraph {
        let lwg = self.local_whitehead_graph(v);
        let mut directions: Vec<Letter> = lwg
            .vertices()
            .filter_map(|g| match g {
                Germ::Edge(e) => Some(*e),
                _ => None,
            })
            .collect();
        directions.sort();
        let mut images = directions.clone();

        // find the return of v under the vertex map, dragging the germ
        // images along
        let mut reached = HashSet::new();
        reached.insert(v);
        let mut w = v;
        loop {
            w = self.map_vertex(w);
            images = images
                .iter()
                .map(|e| self.image(*e).first().unwrap())
                .collect();
            if !reached.insert(w) {
                break;
            }
        }
        if w != v {
            return GermGraph::default();
        }

        // keep only germs hit by the stabilized germ-image set
        loop {
            let keep: Vec<bool> = directions.iter().map(|e| images.contains(e)).collect();
            if keep.iter().all(|&k| k) {
                break;
            }
            let mut di = Vec::new();
            let mut im = Vec::new();
            for (k, &keep_it) in keep.iter().enumerate() {
                if keep_it {
                    di.push(directions[k]);
                    im.push(images[k]);
                }
            }
            directions = di;
            images = im;
        }

        let mut out = GermGraph::default();
        for t in self.edge_turns() {
            if self.graph.initial_vertex(t.a) == v
                && directions.contains(&t.a)
                && directions.contains(&t.b)
            {
                out.add_edge(Germ::Edge(t.a), Germ::Edge(t.b));
            }
        }
        out
    }

    /// Connected components of the local Whitehead graphs, as classes of
    /// germs. One class per vertex means every local graph is connected.
    pub fn whitehead_connected_components(&self) -> Vec<Vec<Letter>> {
        let letters: Vec<Letter> = self.alphabet().letters().collect();
        let mut component: HashMap<Letter, Letter> =
            letters.iter().map(|&a| (a, a)).collect();
        for t in self.edge_turns() {
            let k = component[&t.a];
            let kk = component[&t.b];
            if k != kk {
                for a in &letters {
                    if component[a] == kk {
                        component.insert(*a, k);
                    }
                }
            }
        }
        let mut classes: HashMap<Letter, Vec<Letter>> = HashMap::new();
        for &a in &letters {
            classes.entry(component[&a]).or_default().push(a);
        }
        let mut out: Vec<Vec<Letter>> = classes.into_values().collect();
        out.sort();
        out
    }

    /// `true` if the local Whitehead graph at every vertex is connected.
    pub fn has_connected_local_whitehead_graphs(&self) -> bool {
        self.whitehead_connected_components().len() == self.graph.num_vertices()
    }

    /// The germ at the far end of a pNP side: the reversed germ at a vertex
    /// endpoint, the opposite interior germ at an interior endpoint.
    fn end_germ(&self, raw: PeriodicPoint, right: i64) -> (Germ, Option<(Germ, Germ)>) {
        if right > 0 {
            let n = self.periodic_point_normal_form(raw, true);
            let opposite = PeriodicPoint {
                e: n.e.inverse(),
                period: n.period,
                left: n.right,
                right: n.left,
            };
            (
                Germ::Interior(opposite),
                Some((Germ::Interior(n), Germ::Interior(opposite))),
            )
        } else {
            (Germ::Edge(raw.e.inverse()), None)
        }
    }

    /// Base point of a germ, in the loop endpoint convention (interior
    /// points oriented along a positive edge).
    fn germ_base(&self, germ: &Germ) -> Option<PnpEnd> {
        match germ {
            Germ::Edge(e) => Some(PnpEnd::Vertex(self.graph.initial_vertex(*e))),
            Germ::Interior(p) => {
                let q = if p.e.is_negative() {
                    PeriodicPoint {
                        e: p.e.inverse(),
                        period: p.period,
                        left: p.right,
                        right: p.left,
                    }
                } else {
                    *p
                };
                Some(PnpEnd::Interior(q))
            }
            _ => None,
        }
    }

    /// The ideal Whitehead graph of `self`.
    ///
    /// Connected components with a non-trivial stabilizer (detected through
    /// their Nielsen loop) receive two extra vertices, so the index can be
    /// read off as `|C| - 2` uniformly.
    pub fn ideal_whitehead_graph(&self, pnps: &[Pnp]) -> Result<GermGraph> {
        let mut iwg = GermGraph::default();
        let mut germ_classes: Vec<Vec<Germ>> = Vec::new();

        for pnp in pnps {
            let ((raw1, right1), (raw2, right2)) = self.pnp_endpoints(pnp);
            let (vv1, aux1) = self.end_germ(raw1, right1);
            let (vv2, aux2) = self.end_germ(raw2, right2);
            for (a, b) in [aux1, aux2].into_iter().flatten() {
                iwg.add_edge(a, b);
            }
            tracing::debug!(?vv1, ?vv2, "pnp end germs");

            let i1 = match germ_classes.iter().position(|c| c.contains(&vv1)) {
                Some(i) => i,
                None => {
                    germ_classes.push(vec![vv1]);
                    germ_classes.len() - 1
                }
            };
            match germ_classes.iter().position(|c| c.contains(&vv2)) {
                Some(j) if j == i1 => {}
                Some(j) => {
                    let moved = germ_classes.remove(j);
                    let i1 = if j < i1 { i1 - 1 } else { i1 };
                    germ_classes[i1].extend(moved);
                }
                None => germ_classes[i1].push(vv2),
            }
        }

        // union of stable local Whitehead graphs
        for v in self.graph.vertices() {
            let slwg = self.stable_local_whitehead_graph(v);
            for g in slwg.vertices() {
                iwg.add_vertex(*g);
            }
            for g in slwg.vertices() {
                for h in slwg.adj[g].iter() {
                    iwg.add_edge(*g, *h);
                }
            }
        }

        // quotient by the pNP end identifications
        for c in &germ_classes {
            if let Some(&c0) = c.first() {
                for &ci in &c[1..] {
                    iwg.identify(ci, c0);
                }
            }
        }

        // decorate components carrying a Nielsen loop
        let loops = self.periodic_nielsen_loops(pnps)?;
        for (k, l) in loops.iter().enumerate() {
            'outer: for c in &germ_classes {
                for germ in c {
                    if self.germ_base(germ) == Some(l.base) {
                        let anchor = if iwg.contains(&c[0]) { c[0] } else { *germ };
                        iwg.add_edge(anchor, Germ::LoopAnchor(k));
                        iwg.add_edge(Germ::LoopAnchor(k), Germ::LoopBody(k));
                        break 'outer;
                    }
                }
            }
        }
        Ok(iwg)
    }

    /// The index list: `|C| - 2` over components of the ideal Whitehead
    /// graph with more than two vertices.
    pub fn index_list(&self) -> Result<Vec<usize>> {
        let pnps = self.periodic_nielsen_paths()?;
        let iwg = self.ideal_whitehead_graph(&pnps)?;
        Ok(iwg
            .connected_components()
            .into_iter()
            .filter(|c| c.len() > 2)
            .map(|c| c.len() - 2)
            .collect())
    }

    /// The stabilized (Gaboriau-Jaeger-Levitt-Lustig) index: the sum of the
    /// index list.
    pub fn index(&self) -> Result<usize> {
        Ok(self.index_list()?.into_iter().sum())
    }
}
