//! Alphabet with involution.
//!
//! Purpose
//! - Provide the letter type and the finite alphabet underlying free groups
//!   and graphs with involutive edges: positive letters paired with their
//!   inverses by a fixed-point-free involution.
//!
//! Representation
//! - Letters are interned ids into a per-alphabet symbol table. The positive
//!   letter of index `k` gets id `2k`, its inverse id `2k + 1`, so the
//!   involution is a bit flip and needs no table lookup.
//!
//! Code cross-refs: `word::Word`, `graph::GraphWithInverses`.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;

use crate::error::{Result, TrackError};

/// An interned letter of an alphabet with involution.
///
/// Ids pair positives and negatives: `2k` is positive, `2k + 1` is its
/// inverse. The fixed total order on letters is the id order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Letter(pub u32);

impl Letter {
    /// The inverse letter. `inv(inv(a)) == a` and `inv(a) != a`.
    #[inline]
    pub fn inverse(self) -> Letter {
        Letter(self.0 ^ 1)
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 & 1 == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 & 1 == 1
    }

    /// The positive letter of the pair `{a, inv(a)}`.
    #[inline]
    pub fn to_positive(self) -> Letter {
        Letter(self.0 & !1)
    }

    /// Index of this letter in the full alphabet (id as usize).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Index of the pair `{a, inv(a)}` among positive letters.
    #[inline]
    pub fn positive_index(self) -> usize {
        (self.0 >> 1) as usize
    }
}

/// A finite alphabet partitioned into positive letters and their inverses.
#[derive(Clone, Debug)]
pub struct Alphabet {
    /// Symbol per letter id; length is always even.
    symbols: Vec<String>,
    index: HashMap<String, Letter>,
}

impl Alphabet {
    /// Build from explicit positive symbols, inferring negatives by ASCII
    /// case flip.
    ///
    /// Fails with `AmbiguousInverse` unless the positives are uniformly
    /// lower-case or uniformly upper-case ASCII.
    pub fn from_positive<S: AsRef<str>>(positive: &[S]) -> Result<Alphabet> {
        let pos: Vec<&str> = positive.iter().map(|s| s.as_ref()).collect();
        let all_lower = pos
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) && s.starts_with(|c: char| c.is_ascii_lowercase()));
        let all_upper = pos
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) && s.starts_with(|c: char| c.is_ascii_uppercase()));
        let neg: Vec<String> = if all_lower {
            pos.iter().map(|s| s.to_ascii_uppercase()).collect()
        } else if all_upper {
            pos.iter().map(|s| s.to_ascii_lowercase()).collect()
        } else {
            return Err(TrackError::AmbiguousInverse);
        };
        Self::with_inverses(&pos, &neg)
    }

    /// Build from a string of single-character positive symbols, e.g. `"abc"`.
    pub fn from_chars(positive: &str) -> Result<Alphabet> {
        let pos: Vec<String> = positive.chars().map(|c| c.to_string()).collect();
        Self::from_positive(&pos)
    }

    /// Build from explicit positive and negative symbols.
    ///
    /// The two sets must have the same size, be internally distinct and be
    /// disjoint from each other; otherwise `AlphabetConflict`.
    pub fn with_inverses<S: AsRef<str>, T: AsRef<str>>(
        positive: &[S],
        negative: &[T],
    ) -> Result<Alphabet> {
        if positive.len() != negative.len() {
            return Err(TrackError::AlphabetConflict(format!(
                "{} positive letters but {} negative letters",
                positive.len(),
                negative.len()
            )));
        }
        let mut symbols = Vec::with_capacity(2 * positive.len());
        for (p, n) in positive.iter().zip(negative.iter()) {
            symbols.push(p.as_ref().to_string());
            symbols.push(n.as_ref().to_string());
        }
        let mut index = HashMap::with_capacity(symbols.len());
        for (id, s) in symbols.iter().enumerate() {
            if index.insert(s.clone(), Letter(id as u32)).is_some() {
                return Err(TrackError::AlphabetConflict(format!(
                    "the letter {} is both positive and negative",
                    s
                )));
            }
        }
        Ok(Alphabet { symbols, index })
    }

    /// Generated alphabet `a0, …, a{n-1}` with case-flipped inverses.
    pub fn with_rank(n: usize) -> Result<Alphabet> {
        Self::with_rank_named(n, "a", None)
    }

    /// Generated alphabet `name0, …, name{n-1}`; `negname` defaults to the
    /// case flip of `name`.
    pub fn with_rank_named(n: usize, name: &str, negname: Option<&str>) -> Result<Alphabet> {
        let negname = match negname {
            Some(s) => s.to_string(),
            None => {
                if name.chars().all(|c| c.is_ascii_lowercase()) {
                    name.to_ascii_uppercase()
                } else if name.chars().all(|c| c.is_ascii_uppercase()) {
                    name.to_ascii_lowercase()
                } else {
                    return Err(TrackError::AmbiguousInverse);
                }
            }
        };
        let pos: Vec<String> = (0..n).map(|i| format!("{}{}", name, i)).collect();
        let neg: Vec<String> = (0..n).map(|i| format!("{}{}", negname, i)).collect();
        Self::with_inverses(&pos, &neg)
    }

    /// Number of positive letters.
    #[inline]
    pub fn rank(&self) -> usize {
        self.symbols.len() / 2
    }

    /// Total number of letters (positives and negatives).
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Intern a symbol, failing with `UnknownLetter`.
    pub fn letter(&self, symbol: &str) -> Result<Letter> {
        self.index
            .get(symbol)
            .copied()
            .ok_or_else(|| TrackError::UnknownLetter(symbol.to_string()))
    }

    /// The symbol of a letter.
    #[inline]
    pub fn symbol(&self, a: Letter) -> &str {
        &self.symbols[a.index()]
    }

    /// `true` if `a` comes before or equals `b` in the fixed letter order.
    #[inline]
    pub fn less_letter(&self, a: Letter, b: Letter) -> bool {
        a.0 <= b.0
    }

    /// All letters in order.
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (0..self.symbols.len() as u32).map(Letter)
    }

    /// Positive letters in order.
    pub fn positive_letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (0..self.symbols.len() as u32).step_by(2).map(Letter)
    }

    /// Negative letters in order.
    pub fn negative_letters(&self) -> impl Iterator<Item = Letter> + '_ {
        (1..self.symbols.len() as u32).step_by(2).map(Letter)
    }

    /// A uniformly random letter.
    pub fn random_letter<R: Rng + ?Sized>(&self, rng: &mut R) -> Letter {
        Letter(rng.gen_range(0..self.symbols.len() as u32))
    }

    /// A uniformly random letter outside `forbidden`.
    ///
    /// Panics if every letter is forbidden.
    pub fn random_letter_avoiding<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        forbidden: &[Letter],
    ) -> Letter {
        assert!(
            self.letters().any(|l| !forbidden.contains(&l)),
            "every letter is forbidden"
        );
        loop {
            let a = self.random_letter(rng);
            if !forbidden.contains(&a) {
                return a;
            }
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, a) in self.positive_letters().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.symbol(a))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests;
