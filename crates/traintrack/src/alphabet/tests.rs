use super::*;

#[test]
fn involution_pairs_letters() {
    let a = Alphabet::from_chars("abc").unwrap();
    assert_eq!(a.rank(), 3);
    assert_eq!(a.len(), 6);
    let b = a.letter("b").unwrap();
    let bb = b.inverse();
    assert_eq!(a.symbol(bb), "B");
    assert_eq!(bb.inverse(), b);
    assert_ne!(bb, b);
    assert!(b.is_positive());
    assert!(bb.is_negative());
    assert_eq!(bb.to_positive(), b);
}

#[test]
fn case_flip_defaults() {
    let lower = Alphabet::from_chars("xyz").unwrap();
    assert_eq!(lower.symbol(lower.letter("x").unwrap().inverse()), "X");
    let upper = Alphabet::from_positive(&["X", "Y"]).unwrap();
    assert_eq!(upper.symbol(upper.letter("X").unwrap().inverse()), "x");
}

#[test]
fn ambiguous_inverse_rejected() {
    assert_eq!(
        Alphabet::from_positive(&["a", "B"]).unwrap_err(),
        TrackError::AmbiguousInverse
    );
}

#[test]
fn conflicting_alphabets_rejected() {
    let err = Alphabet::with_inverses(&["a", "b"], &["A"]).unwrap_err();
    assert!(matches!(err, TrackError::AlphabetConflict(_)));
    let err = Alphabet::with_inverses(&["a", "b"], &["b", "A"]).unwrap_err();
    assert!(matches!(err, TrackError::AlphabetConflict(_)));
}

#[test]
fn generated_alphabet() {
    let a = Alphabet::with_rank(3).unwrap();
    assert_eq!(a.rank(), 3);
    let a1 = a.letter("a1").unwrap();
    assert_eq!(a.symbol(a1.inverse()), "A1");
    assert_eq!(
        Alphabet::with_rank_named(2, "x", None).unwrap().symbol(Letter(1)),
        "X0"
    );
}

#[test]
fn unknown_letter_reported() {
    let a = Alphabet::from_chars("ab").unwrap();
    assert_eq!(
        a.letter("c").unwrap_err(),
        TrackError::UnknownLetter("c".to_string())
    );
}

#[test]
fn random_letter_avoids_forbidden() {
    use rand::{rngs::StdRng, SeedableRng};
    let a = Alphabet::from_chars("ab").unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let x = a.letter("a").unwrap();
    let forbidden = [x, x.inverse()];
    for _ in 0..50 {
        let l = a.random_letter_avoiding(&mut rng, &forbidden);
        assert!(!forbidden.contains(&l));
    }
}

#[test]
#[should_panic(expected = "every letter is forbidden")]
fn random_letter_avoiding_rejects_full_exclusion() {
    use rand::{rngs::StdRng, SeedableRng};
    let a = Alphabet::from_chars("a").unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let all: Vec<Letter> = a.letters().collect();
    a.random_letter_avoiding(&mut rng, &all);
}
