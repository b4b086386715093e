//! Nielsen path searches.
//!
//! Purpose
//! - Detect indivisible Nielsen paths (INPs) and periodic Nielsen paths
//!   (pNPs) of an expanding train-track map.
//!
//! Both searches walk candidates `(t0, t1)`: a pair of legal paths leaving a
//! common vertex through an illegal turn, together with the tightened image
//! pair (the images of the sides with their common prefix removed). A side
//! with empty tightened image is extended through the `extension` table (the
//! legal continuations read off the taken turns); prefix comparisons decide
//! whether a candidate is fixed, needs extension, or dies. Tightened images
//! are bounded by the longest edge image, which bounds the whole search.

use std::collections::{HashMap, VecDeque};

use crate::alphabet::Letter;
use crate::error::{Result, TrackError};
use crate::graph::{Path, Turn};
use crate::word::Word;

use super::TrainTrackMap;

/// A periodic Nielsen path `(u, v)` of the given period; the fixed points of
/// `f^period` lie inside the last edges of the two sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pnp {
    pub u: Path,
    pub v: Path,
    pub period: usize,
}

/// One INP candidate: the sides, their tightened images, and the letters
/// pending on each side.
#[derive(Clone, Debug)]
struct Candidate {
    t0: Path,
    t1: Path,
    tt0: Path,
    tt1: Path,
    ext: (Option<Letter>, Option<Letter>),
}

impl TrainTrackMap {
    /// Legal continuations: `extension[x]` lists the letters that may follow
    /// a path ending with `x`, read off the turns taken by edge images.
    pub(crate) fn extension_table(&self) -> HashMap<Letter, Vec<Letter>> {
        let mut table: HashMap<Letter, Vec<Letter>> =
            self.alphabet().letters().map(|a| (a, Vec::new())).collect();
        for t in self.edge_turns() {
            table.get_mut(&t.a.inverse()).unwrap().push(t.b);
            table.get_mut(&t.b.inverse()).unwrap().push(t.a);
        }
        table
    }

    /// Positive letters the INP walk can touch: the germs of the seed
    /// turns, closed under legal continuations and under the letters of
    /// their images. The search never leaves this set, so the expansion
    /// precondition is checked on it.
    fn search_support(
        &self,
        seeds: &[Turn],
        extension: &HashMap<Letter, Vec<Letter>>,
    ) -> Vec<Letter> {
        let mut germs: Vec<Letter> = Vec::new();
        for t in seeds {
            for g in [t.a, t.b] {
                if !germs.contains(&g) {
                    germs.push(g);
                }
            }
        }
        let mut i = 0;
        while i < germs.len() {
            for &y in &extension[&germs[i]] {
                if !germs.contains(&y) {
                    germs.push(y);
                }
            }
            i += 1;
        }
        let mut support: Vec<Letter> = germs.iter().map(|g| g.to_positive()).collect();
        support.sort();
        support.dedup();
        let mut i = 0;
        while i < support.len() {
            for l in self.images[support[i].positive_index()].iter() {
                let p = l.to_positive();
                if !support.contains(&p) {
                    support.push(p);
                }
            }
            i += 1;
        }
        support.sort();
        support
    }

    /// The indivisible Nielsen paths of `self`.
    ///
    /// Each INP is a pair of paths `(t0, t1)`; the fixed points lie inside
    /// the last edges of the two sides. Fails with `NotExpanding` when the
    /// letters reachable by the search are not eventually expanded (the
    /// termination bound needs expansion only along that part).
    pub fn indivisible_nielsen_paths(&self) -> Result<Vec<(Path, Path)>> {
        let extension = self.extension_table();
        let seeds = self.fold_turns();
        let support = self.search_support(&seeds, &extension);
        if !self.is_expanding_within(&support) {
            return Err(TrackError::NotExpanding);
        }
        let mut found: Vec<(Path, Path)> = Vec::new();
        let mut queue: VecDeque<Candidate> = seeds
            .into_iter()
            .map(|t| Candidate {
                t0: Word::one(),
                t1: Word::one(),
                tt0: Word::one(),
                tt1: Word::one(),
                ext: (Some(t.a), Some(t.b)),
            })
            .collect();

        while let Some(cand) = queue.pop_front() {
            let u0 = match cand.ext.0 {
                Some(a) => cand.t0.product(&Word::letter(a)),
                None => cand.t0.clone(),
            };
            let u1 = match cand.ext.1 {
                Some(a) => cand.t1.product(&Word::letter(a)),
                None => cand.t1.clone(),
            };
            let uu0 = match cand.ext.0 {
                Some(a) => cand.tt0.product(&self.image(a)),
                None => cand.tt0.clone(),
            };
            let uu1 = match cand.ext.1 {
                Some(a) => cand.tt1.product(&self.image(a)),
                None => cand.tt1.clone(),
            };
            let p = uu0.common_prefix_length(&uu1);
            let tt0 = uu0.suffix_from(p);
            let tt1 = uu1.suffix_from(p);
            tracing::trace!(
                t0 = %u0.display(self.alphabet()),
                t1 = %u1.display(self.alphabet()),
                "inp candidate"
            );

            if tt0.is_empty() {
                for &a in &extension[&u0.last().unwrap()] {
                    queue.push_back(Candidate {
                        t0: u0.clone(),
                        t1: u1.clone(),
                        tt0: tt0.clone(),
                        tt1: tt1.clone(),
                        ext: (Some(a), None),
                    });
                }
            } else if tt1.is_empty() {
                for &a in &extension[&u1.last().unwrap()] {
                    queue.push_back(Candidate {
                        t0: u0.clone(),
                        t1: u1.clone(),
                        tt0: tt0.clone(),
                        tt1: tt1.clone(),
                        ext: (None, Some(a)),
                    });
                }
            } else if u0.is_prefix_of(&tt0) && u1.is_prefix_of(&tt1) {
                found.push((u0, u1));
            } else if tt0.is_prefix_of(&u0) && (u1.is_prefix_of(&tt1) || tt1.is_prefix_of(&u1)) {
                for &a in &extension[&u0.last().unwrap()] {
                    queue.push_back(Candidate {
                        t0: u0.clone(),
                        t1: u1.clone(),
                        tt0: tt0.clone(),
                        tt1: tt1.clone(),
                        ext: (Some(a), None),
                    });
                }
            } else if tt1.is_prefix_of(&u1) && u0.is_prefix_of(&tt0) {
                for &a in &extension[&u1.last().unwrap()] {
                    queue.push_back(Candidate {
                        t0: u0.clone(),
                        t1: u1.clone(),
                        tt0: tt0.clone(),
                        tt1: tt1.clone(),
                        ext: (None, Some(a)),
                    });
                }
            }
            // otherwise the candidate dies
        }
        tracing::debug!(count = found.len(), "indivisible nielsen paths");
        Ok(found)
    }

    /// The periodic Nielsen paths of `self`, with their periods.
    ///
    /// Candidates seed from every illegal turn; a candidate survives as long
    /// as its tightened image is a prefix-extension of some surviving
    /// candidate. The surviving set maps into itself; its cycles are the
    /// pNPs, with the period doubled when the orientation flip around the
    /// cycle is -1. Fails with `NotExpanding` unless the map is expanding.
    pub fn periodic_nielsen_paths(&self) -> Result<Vec<Pnp>> {
        if !self.is_expanding() {
            return Err(TrackError::NotExpanding);
        }
        let extension = self.extension_table();

        let mut sides: Vec<(Path, Path)> = Vec::new();
        let mut images: Vec<(Path, Path)> = Vec::new();
        let mut next: Vec<(Path, Path)> = Vec::new();
        for t in self.illegal_turns() {
            let uu = self.image(t.a);
            let vv = self.image(t.b);
            let p = uu.common_prefix_length(&vv);
            sides.push((Word::letter(t.a), Word::letter(t.b)));
            images.push((uu.suffix_from(p), vv.suffix_from(p)));
            next.push((Word::one(), Word::one()));
        }

        let mut i = 0usize;
        let mut done = false;
        while (!done || i > 0) && !sides.is_empty() {
            if i == 0 {
                done = true;
            }
            let t = sides[i].clone();
            let n = next.remove(i);
            let im = images.remove(i);

            if !n.0.is_empty() || !n.1.is_empty() {
                done = false;
            }
            let u = t.0.product(&n.0);
            let v = t.1.product(&n.1);
            let uu_raw = im.0.product(&self.map_path(&n.0));
            let vv_raw = im.1.product(&self.map_path(&n.1));
            let p = uu_raw.common_prefix_length(&vv_raw);
            let uu = uu_raw.suffix_from(p);
            let vv = vv_raw.suffix_from(p);
            tracing::trace!(
                u = %u.display(self.alphabet()),
                v = %v.display(self.alphabet()),
                "pnp candidate"
            );

            if uu.is_empty() {
                done = false;
                sides.remove(i);
                for &a in &extension[&u.last().unwrap()] {
                    sides.insert(i, (u.clone(), v.clone()));
                    images.insert(i, (uu.clone(), vv.clone()));
                    next.insert(i, (Word::letter(a), Word::one()));
                }
            } else if vv.is_empty() {
                done = false;
                sides.remove(i);
                for &a in &extension[&v.last().unwrap()] {
                    sides.insert(i, (u.clone(), v.clone()));
                    images.insert(i, (uu.clone(), vv.clone()));
                    next.insert(i, (Word::one(), Word::letter(a)));
                }
            } else {
                // Compatibility: the tightened image must prefix-extend some
                // surviving candidate (in either orientation). The first
                // match decides which side, if any, has to grow.
                let mut verdict = None;
                'scan: for tt in &sides {
                    for (ttj, ttk) in [(&tt.0, &tt.1), (&tt.1, &tt.0)] {
                        let p = ttj.common_prefix_length(&uu);
                        let q = ttk.common_prefix_length(&vv);
                        if (p == uu.len() || p == ttj.len()) && (q == vv.len() || q == ttk.len()) {
                            verdict = Some((p < ttj.len(), q < ttk.len()));
                            break 'scan;
                        }
                    }
                }
                match verdict {
                    Some((true, _)) => {
                        // uu is a strict prefix of the matched side: extend u
                        done = false;
                        sides.remove(i);
                        for &a in &extension[&u.last().unwrap()] {
                            sides.insert(i, (u.clone(), v.clone()));
                            images.insert(i, (uu.clone(), vv.clone()));
                            next.insert(i, (Word::letter(a), Word::one()));
                        }
                    }
                    Some((false, true)) => {
                        // vv is a strict prefix of the matched side: extend v
                        done = false;
                        sides.remove(i);
                        for &a in &extension[&v.last().unwrap()] {
                            sides.insert(i, (u.clone(), v.clone()));
                            images.insert(i, (uu.clone(), vv.clone()));
                            next.insert(i, (Word::one(), Word::letter(a)));
                        }
                    }
                    Some((false, false)) => {
                        // nothing to extend yet; keep the candidate
                        sides[i] = (u.clone(), v.clone());
                        images.insert(i, (uu.clone(), vv.clone()));
                        next.insert(i, (Word::one(), Word::one()));
                        i += 1;
                    }
                    None => {
                        sides.remove(i);
                        done = false;
                    }
                }
            }
            if i >= sides.len() {
                i = 0;
            }
        }

        tracing::debug!(count = sides.len(), "surviving pnp candidates");

        // Map every surviving candidate to the candidate its image extends,
        // recording the orientation flip.
        let mut succ: HashMap<usize, (usize, i8)> = HashMap::new();
        for (idx, im) in images.iter().enumerate() {
            'find: for (j, tt) in sides.iter().enumerate() {
                for (k, (ttj, ttk)) in [(&tt.0, &tt.1), (&tt.1, &tt.0)].into_iter().enumerate() {
                    let p = im.0.common_prefix_length(ttj);
                    let q = im.1.common_prefix_length(ttk);
                    if p == ttj.len() && q == ttk.len() {
                        succ.insert(idx, (j, if k == 0 { 1 } else { -1 }));
                        break 'find;
                    }
                }
            }
        }

        // Shrink to the eventual image: the candidates lying on cycles.
        let mut stable: Vec<usize> = succ.keys().copied().collect();
        loop {
            let mut shrunk: Vec<usize> = stable
                .iter()
                .filter_map(|&i| {
                    let j = succ[&i].0;
                    succ.contains_key(&j).then_some(j)
                })
                .collect();
            shrunk.sort_unstable();
            shrunk.dedup();
            if shrunk.len() >= stable.len() {
                stable = shrunk;
                break;
            }
            stable = shrunk;
        }

        let mut pnps: Vec<Pnp> = Vec::new();
        let mut remaining = stable;
        while let Some(start) = remaining.pop() {
            let mut period = 1usize;
            let mut j = start;
            let mut sign = 1i8;
            while succ[&j].0 != start {
                sign *= succ[&j].1;
                j = succ[&j].0;
                period += 1;
            }
            if sign * succ[&j].1 == -1 {
                period *= 2;
            }
            pnps.push(Pnp {
                u: sides[start].0.clone(),
                v: sides[start].1.clone(),
                period,
            });
            let mut j = start;
            while succ[&j].0 != start {
                j = succ[&j].0;
                pnps.push(Pnp {
                    u: sides[j].0.clone(),
                    v: sides[j].1.clone(),
                    period,
                });
                remaining.retain(|&x| x != j);
            }
        }
        tracing::debug!(count = pnps.len(), "periodic nielsen paths");
        Ok(pnps)
    }
}
