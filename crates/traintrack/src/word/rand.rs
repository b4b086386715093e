//! Random reduced words.
//!
//! Uniform over the sphere of given length: the first letter is uniform,
//! every further letter is uniform among the `2r - 1` non-cancelling
//! continuations.

use ::rand::Rng;

use crate::alphabet::Alphabet;
use crate::word::Word;

/// Draw a uniformly random reduced word of exactly `len` letters.
///
/// Panics if the alphabet is empty and `len > 0`.
pub fn random_reduced<R: Rng + ?Sized>(alphabet: &Alphabet, len: usize, rng: &mut R) -> Word {
    if len == 0 {
        return Word::one();
    }
    let mut letters = Vec::with_capacity(len);
    let mut prev = alphabet.random_letter(rng);
    letters.push(prev);
    while letters.len() < len {
        let next = alphabet.random_letter_avoiding(rng, &[prev.inverse()]);
        letters.push(next);
        prev = next;
    }
    Word::from_reduced(letters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_words_have_requested_length_and_are_reduced() {
        let a = Alphabet::from_chars("abc").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for len in [0usize, 1, 2, 17, 100] {
            let w = random_reduced(&a, len, &mut rng);
            assert_eq!(w.len(), len);
            let again = Word::from_letters(&a, w.iter()).unwrap();
            assert_eq!(again, w);
        }
    }
}
