//! Substitution witnesses.
//!
//! `fold` and `blow_up_vertices` rewrite the edge alphabet; the witness maps
//! every old positive letter to an edge path over the new alphabet and is
//! extended to negatives antisymmetrically. Witnesses compose, so a chain of
//! folds yields a single substitution from the original alphabet.

use crate::alphabet::{Alphabet, Letter};
use crate::word::Word;

/// A map `old letter -> new path`, one entry per old positive letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSubst {
    images: Vec<Word>,
}

impl EdgeSubst {
    /// The identity substitution on `alphabet`.
    pub fn identity(alphabet: &Alphabet) -> EdgeSubst {
        EdgeSubst {
            images: alphabet.positive_letters().map(Word::letter).collect(),
        }
    }

    /// Build from images of the positive letters, in order.
    pub fn new(images: Vec<Word>) -> EdgeSubst {
        EdgeSubst { images }
    }

    /// Number of positive letters in the domain.
    #[inline]
    pub fn domain_rank(&self) -> usize {
        self.images.len()
    }

    /// Image of a letter of either sign.
    pub fn apply_letter(&self, a: Letter) -> Word {
        let w = &self.images[a.positive_index()];
        if a.is_positive() {
            w.clone()
        } else {
            w.inverse()
        }
    }

    /// Image of a path, freely reduced.
    pub fn apply(&self, path: &Word) -> Word {
        path.iter().flat_map(|a| self.apply_letter(a)).collect()
    }

    /// Composition `next . self`: first this witness, then `next`.
    pub fn then(&self, next: &EdgeSubst) -> EdgeSubst {
        EdgeSubst {
            images: self.images.iter().map(|w| next.apply(w)).collect(),
        }
    }

    /// `true` if every positive letter maps to itself.
    pub fn is_identity(&self) -> bool {
        self.images
            .iter()
            .enumerate()
            .all(|(k, w)| w.len() == 1 && w[0] == Letter(2 * k as u32))
    }

    /// Render as `a->path` pairs using the two alphabets.
    pub fn display(&self, old: &Alphabet, new: &Alphabet) -> String {
        let mut out = String::new();
        for (k, a) in old.positive_letters().enumerate() {
            if k > 0 {
                out.push_str(", ");
            }
            out.push_str(old.symbol(a));
            out.push_str("->");
            out.push_str(&self.images[k].display(new));
        }
        out
    }
}
