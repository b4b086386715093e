//! Expansion, stratification and Perron-Frobenius tests.

use std::collections::HashSet;

use crate::alphabet::Letter;

use super::TrainTrackMap;

impl TrainTrackMap {
    /// `true` if every edge eventually has an image of length at least two.
    pub fn is_expanding(&self) -> bool {
        let all: Vec<Letter> = self.alphabet().positive_letters().collect();
        self.is_expanding_within(&all)
    }

    /// Expansion restricted to an image-closed set of positive letters.
    ///
    /// Prune the letters whose image is already long, then repeatedly prune
    /// letters whose single-letter image points at a pruned letter; the set
    /// is expanding iff nothing survives.
    pub(crate) fn is_expanding_within(&self, support: &[Letter]) -> bool {
        let mut edges: Vec<Letter> = support
            .iter()
            .copied()
            .filter(|p| self.images[p.positive_index()].len() == 1)
            .collect();
        let mut done = false;
        while !done {
            done = true;
            let mut i = 0;
            while i < edges.len() {
                let e = edges[i];
                let target = self.images[e.positive_index()].first().unwrap().to_positive();
                if !edges.contains(&target) {
                    // e is eventually expanded
                    edges.remove(i);
                    done = false;
                } else {
                    i += 1;
                }
            }
        }
        edges.is_empty()
    }

    /// Support digraph on positive letters: `b` uses `a` when `a` or
    /// `inv(a)` occurs in the image of `b`.
    fn support(&self) -> Vec<Vec<usize>> {
        let r = self.alphabet().rank();
        (0..r)
            .map(|b| {
                let mut row: Vec<usize> = self.images[b]
                    .iter()
                    .map(|l| l.positive_index())
                    .collect();
                row.sort_unstable();
                row.dedup();
                row
            })
            .collect()
    }

    /// Strata of the transition matrix: strongly connected components of the
    /// support digraph, in a topological order with lower strata first.
    ///
    /// One stratum means the representative is irreducible. Only the count
    /// and membership are computed; relative train-track structure beyond
    /// that is out of scope.
    pub fn stratify(&self) -> Vec<Vec<Letter>> {
        let support = self.support();
        let r = support.len();
        // Tarjan's algorithm, iterative to keep the stack shallow.
        let mut index = vec![usize::MAX; r];
        let mut low = vec![0usize; r];
        let mut on_stack = vec![false; r];
        let mut stack: Vec<usize> = Vec::new();
        let mut next_index = 0usize;
        let mut components: Vec<Vec<Letter>> = Vec::new();

        for start in 0..r {
            if index[start] != usize::MAX {
                continue;
            }
            // call stack of (node, next child position)
            let mut call: Vec<(usize, usize)> = vec![(start, 0)];
            while let Some(&(v, ci)) = call.last() {
                if ci == 0 {
                    index[v] = next_index;
                    low[v] = next_index;
                    next_index += 1;
                    stack.push(v);
                    on_stack[v] = true;
                }
                if ci < support[v].len() {
                    let w = support[v][ci];
                    call.last_mut().unwrap().1 += 1;
                    if index[w] == usize::MAX {
                        call.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(index[w]);
                    }
                } else {
                    if low[v] == index[v] {
                        let mut comp = Vec::new();
                        loop {
                            let w = stack.pop().unwrap();
                            on_stack[w] = false;
                            comp.push(Letter(2 * w as u32));
                            if w == v {
                                break;
                            }
                        }
                        comp.sort();
                        components.push(comp);
                    }
                    call.pop();
                    if let Some(&(parent, _)) = call.last() {
                        low[parent] = low[parent].min(low[v]);
                    }
                }
            }
        }
        // Tarjan emits components in reverse topological order of the
        // condensation; lower strata (used by the others) come first.
        components
    }

    /// `true` if the representative has a single stratum.
    pub fn is_irreducible(&self) -> bool {
        self.stratify().len() == 1
    }

    /// `true` if some power of the transition matrix is strictly positive.
    ///
    /// Fix the first letter `a`, iterate the set-valued image map until `a`
    /// occurs in its own image, close the resulting power under further
    /// iteration, and require that forward and backward reachability from
    /// `a` both cover the alphabet.
    pub fn is_perron_frobenius(&self) -> bool {
        if self.stratify().len() > 1 {
            return false;
        }
        // Now the support digraph is strongly connected.
        let r = self.alphabet().rank();
        if r == 0 {
            return false;
        }
        let support = self.support();
        let step = |sets: &[HashSet<usize>]| -> Vec<HashSet<usize>> {
            (0..r)
                .map(|b| {
                    sets[b]
                        .iter()
                        .flat_map(|&c| support[c].iter().copied())
                        .collect()
                })
                .collect()
        };

        let image: Vec<HashSet<usize>> = support
            .iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        let mut stable = image.clone();
        while !stable[0].contains(&0) {
            // terminates because the support digraph is strongly connected
            stable = step(&stable);
        }
        // Work with the power for which 0 occurs in its own image; close it.
        let image = stable.clone();
        let compose = |sets: &[HashSet<usize>]| -> Vec<HashSet<usize>> {
            (0..r)
                .map(|b| {
                    sets[b]
                        .iter()
                        .flat_map(|&c| image[c].iter().copied())
                        .collect()
                })
                .collect()
        };
        loop {
            let next = compose(&stable);
            if (0..r).all(|b| next[b].len() <= stable[b].len()) {
                stable = next;
                break;
            }
            stable = next;
        }

        if stable[0].len() < r {
            return false;
        }
        // Backward reachability: letters from which 0 is seen.
        let mut good: HashSet<usize> = (0..r).filter(|&b| stable[b].contains(&0)).collect();
        loop {
            let grown: Vec<usize> = (0..r)
                .filter(|b| !good.contains(b))
                .filter(|&b| stable[b].iter().any(|c| good.contains(c)))
                .collect();
            if grown.is_empty() {
                break;
            }
            good.extend(grown);
        }
        good.len() == r
    }
}
