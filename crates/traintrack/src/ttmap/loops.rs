//! Periodic points and periodic Nielsen loops.
//!
//! Endpoints of pNPs are either vertices or periodic points inside edges,
//! written `(e, period, left, right)`: the fixed point of `f^period` carried
//! by the occurrence of `e` in `f^period(e) = u e v` with `|u| = left`,
//! `|v| = right`. Gluing pNPs along shared endpoints grows a forest of
//! Nielsen paths; a pNP closing a cycle emits a Nielsen loop.

use std::collections::HashMap;

use crate::alphabet::Letter;
use crate::error::Result;
use crate::graph::{Path, VertexId};
use crate::word::Word;

use super::nielsen::Pnp;
use super::TrainTrackMap;

/// A periodic point inside an edge, in the `(e, period, left, right)`
/// notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeriodicPoint {
    pub e: Letter,
    pub period: usize,
    pub left: usize,
    pub right: usize,
}

/// An endpoint of a periodic Nielsen path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PnpEnd {
    Vertex(VertexId),
    Interior(PeriodicPoint),
}

/// A loop of periodic Nielsen paths, based at a periodic point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NielsenLoop {
    pub path: Path,
    pub base: PnpEnd,
    pub period: usize,
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        0
    } else {
        a / gcd(a, b) * b
    }
}

impl TrainTrackMap {
    /// Normal form of a periodic point inside an edge: the smallest divisor
    /// of the period exhibiting the same point. Unless `keep_orientation`,
    /// the representative with a positive edge is chosen (swapping left and
    /// right).
    pub fn periodic_point_normal_form(
        &self,
        point: PeriodicPoint,
        keep_orientation: bool,
    ) -> PeriodicPoint {
        let PeriodicPoint {
            mut e,
            mut period,
            mut left,
            mut right,
        } = point;

        let mut simplified = false;
        for d in 1..period {
            if period % d != 0 {
                continue;
            }
            let w = self.image_iter(e, d);
            // occurrences of e in f^d(e), from the right
            for ii in (0..w.len()).rev() {
                if w[ii] != e {
                    continue;
                }
                let r_small = w.len() - ii - 1;
                // right offset of the candidate point inside f^period(e)
                let mut vv = w.suffix_from(ii + 1);
                let mut big_r = 0usize;
                for _ in 0..period / d {
                    big_r += vv.len();
                    for _ in 0..d {
                        vv = self.map_path(&vv);
                    }
                }
                if big_r == right {
                    period = d;
                    right = r_small;
                    simplified = true;
                    break;
                }
                if big_r > right {
                    break;
                }
            }
            if simplified {
                break;
            }
        }
        if simplified {
            left = self.image_iter(e, period).len() - right - 1;
        }
        if !keep_orientation && e.is_negative() {
            e = e.inverse();
            std::mem::swap(&mut left, &mut right);
        }
        PeriodicPoint {
            e,
            period,
            left,
            right,
        }
    }

    /// The two endpoints of a pNP, as raw interior descriptors together with
    /// the signed right offsets used by the loop bookkeeping.
    pub(crate) fn pnp_endpoints(&self, pnp: &Pnp) -> ((PeriodicPoint, i64), (PeriodicPoint, i64)) {
        let mut uu = pnp.u.clone();
        let mut vv = pnp.v.clone();
        for _ in 0..pnp.period {
            uu = self.map_path(&uu);
            vv = self.map_path(&vv);
        }
        let p = uu.common_prefix_length(&vv) as i64;
        let right1 = uu.len() as i64 - p - pnp.u.len() as i64;
        let right2 = vv.len() as i64 - p - pnp.v.len() as i64;
        let e1 = pnp.u.last().unwrap();
        let e2 = pnp.v.last().unwrap();
        let len1 = self.image_iter(e1, pnp.period).len() as i64;
        let len2 = self.image_iter(e2, pnp.period).len() as i64;
        let p1 = PeriodicPoint {
            e: e1,
            period: pnp.period,
            left: (len1 - right1 - 1).max(0) as usize,
            right: right1.max(0) as usize,
        };
        let p2 = PeriodicPoint {
            e: e2,
            period: pnp.period,
            left: (len2 - right2 - 1).max(0) as usize,
            right: right2.max(0) as usize,
        };
        ((p1, right1), (p2, right2))
    }

    /// Periodic Nielsen loops generated by the given pNPs.
    ///
    /// Endpoints already connected by earlier pNPs sit in a components tree
    /// with witness Nielsen paths from the component root; a pNP joining two
    /// endpoints of one component closes a reduced Nielsen loop at the root,
    /// one joining two components fuses them and rebases the witnesses.
    /// Loops are canonicalized to their smallest cyclic rotation and
    /// deduplicated.
    pub fn periodic_nielsen_loops(&self, pnps: &[Pnp]) -> Result<Vec<NielsenLoop>> {
        let g = &self.graph;
        // endpoint -> (root, witness path root->endpoint, period)
        let mut tree: HashMap<PnpEnd, (PnpEnd, Path, usize)> = HashMap::new();
        let mut loops: Vec<NielsenLoop> = Vec::new();

        for pnp in pnps {
            let u = &pnp.u;
            let v = &pnp.v;
            let ((raw1, right1), (raw2, right2)) = self.pnp_endpoints(pnp);

            let v1 = if right1 > 0 {
                PnpEnd::Interior(self.periodic_point_normal_form(raw1, false))
            } else {
                PnpEnd::Vertex(g.terminal_vertex(u.last().unwrap()))
            };
            let v2 = if right2 > 0 {
                PnpEnd::Interior(self.periodic_point_normal_form(raw2, false))
            } else {
                PnpEnd::Vertex(g.terminal_vertex(v.last().unwrap()))
            };
            tracing::debug!(
                u = %u.display(self.alphabet()),
                v = %v.display(self.alphabet()),
                ?v1,
                ?v2,
                "pnp endpoints"
            );

            if v1 == v2 {
                let path = if right1 > 0 {
                    g.reduce_path(&g.reverse_path(u).product(&v.drop_last()))
                } else {
                    g.reverse_path(u).product(v)
                };
                if !path.is_empty() {
                    loops.push(NielsenLoop {
                        path,
                        base: v1,
                        period: pnp.period,
                    });
                }
            } else if tree.contains_key(&v1) && tree.contains_key(&v2) {
                let (vv1, w1, period1) = tree[&v1].clone();
                let (vv2, w2, period2) = tree[&v2].clone();
                let period = lcm(lcm(pnp.period, period1), period2);
                let link1 = if right1 > 0 && !w1.is_empty() && w1.last() != u.last() {
                    w1.product(&g.reverse_path(&u.drop_last()))
                } else {
                    w1.product(&g.reverse_path(u))
                };
                let link2 = if right2 == 0 || (!w2.is_empty() && w2.last() == v.last()) {
                    v.product(&g.reverse_path(&w2))
                } else {
                    v.drop_last().product(&g.reverse_path(&w2))
                };
                let mut link = g.reduce_path(&link1.product(&link2));
                if vv1 == vv2 {
                    if matches!(vv1, PnpEnd::Interior(_))
                        && !link.is_empty()
                        && link.first() == link.last()
                    {
                        link = link.drop_last();
                    }
                    if !link.is_empty() {
                        loops.push(NielsenLoop {
                            path: link,
                            base: vv1,
                            period,
                        });
                    }
                } else {
                    // fuse the two components, rebasing every witness of vv2
                    for (_, entry) in tree.iter_mut() {
                        if entry.0 != vv2 {
                            continue;
                        }
                        let w = entry.1.clone();
                        let rebased = if matches!(vv2, PnpEnd::Interior(_))
                            && !link.is_empty()
                            && !w.is_empty()
                            && w.first() == link.last()
                        {
                            g.reduce_path(&link.drop_last().product(&w))
                        } else {
                            g.reduce_path(&link.product(&w))
                        };
                        *entry = (vv1, rebased, lcm(entry.2, period));
                    }
                }
            } else if tree.contains_key(&v1) {
                let (vv1, w1, p1) = tree[&v1].clone();
                let witness = if right1 > 0 && !w1.is_empty() && w1.last() != u.last() {
                    g.reduce_path(&w1.drop_last().product(&g.reverse_path(u)).product(v))
                } else {
                    g.reduce_path(&w1.product(&g.reverse_path(u)).product(v))
                };
                tree.insert(v2, (vv1, witness, lcm(p1, pnp.period)));
            } else if tree.contains_key(&v2) {
                let (vv2, w2, p2) = tree[&v2].clone();
                let witness = if right2 > 0 && !w2.is_empty() && w2.last() != v.last() {
                    g.reduce_path(&w2.drop_last().product(&g.reverse_path(v)).product(u))
                } else {
                    g.reduce_path(&w2.product(&g.reverse_path(v)).product(u))
                };
                tree.insert(v1, (vv2, witness, lcm(p2, pnp.period)));
            } else {
                tree.insert(v1, (v1, Word::one(), 1));
                tree.insert(v2, (v1, g.reverse_path(u).product(v), pnp.period));
            }
        }

        // canonical form: smallest cyclic rotation in the letter order
        for l in &mut loops {
            let w = l.path.clone();
            let n = w.len();
            let mut best = 0usize;
            for j in 1..n {
                for k in 0..n {
                    let a = w[(best + k) % n];
                    let b = w[(j + k) % n];
                    if b < a {
                        best = j;
                        break;
                    }
                    if a < b {
                        break;
                    }
                }
            }
            l.path = (0..n).map(|k| w[(best + k) % n]).collect();
        }
        let mut unique: Vec<NielsenLoop> = Vec::new();
        for l in loops {
            if !unique.iter().any(|m| m.path == l.path) {
                unique.push(l);
            }
        }
        tracing::debug!(count = unique.len(), "periodic nielsen loops");
        Ok(unique)
    }

    /// Compute pNPs and the loops they generate in one call.
    pub fn nielsen_loops(&self) -> Result<Vec<NielsenLoop>> {
        let pnps = self.periodic_nielsen_paths()?;
        self.periodic_nielsen_loops(&pnps)
    }
}
