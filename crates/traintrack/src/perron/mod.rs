//! Matrix oracle: exact dominant eigenvalue and left eigenvector.
//!
//! Purpose
//! - Given the non-negative integer transition matrix of a train-track map,
//!   expose the Perron eigenvalue `lambda` and a non-negative left
//!   eigenvector `nu` with arithmetic exact enough to compare nu-weighted
//!   integer combinations, as the stabilization loop requires.
//!
//! Representation
//! - `lambda` is the largest real root of the characteristic polynomial,
//!   held as a Sturm-isolated interval of its squarefree part.
//! - `nu` entries are integer polynomials in `lambda`: a non-zero column of
//!   `adj(lambda I - M^T)`, computed by fraction-free Bareiss elimination.
//! - Zero and sign decisions go through polynomial gcds and Sturm root
//!   counts on the isolating interval; nothing is ever rounded.

use nalgebra::DMatrix;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};

use crate::error::{Result, TrackError};

mod poly;

use poly::{
    charpoly, count_roots, det_polymat, eval_rat, gcd_rat, int_to_rat, root_bound, squarefree_rat,
    sturm_chain, trim_int, IntPoly, RatPoly,
};

/// A `nu`-weighted value: an integer polynomial in the Perron eigenvalue.
#[derive(Clone, Debug)]
pub struct EigenWeight {
    poly: IntPoly,
}

/// Exact spectral data of a non-negative integer matrix.
#[derive(Clone, Debug)]
pub struct Perron {
    /// Squarefree part of the characteristic polynomial, monic.
    charpoly_sf: RatPoly,
    sturm: Vec<RatPoly>,
    /// Isolating interval `(lo, hi]` of the largest real root.
    lo: BigRational,
    hi: BigRational,
    /// Left eigenvector entries as integer polynomials in `lambda`.
    nu: Vec<IntPoly>,
}

impl Perron {
    /// Compute the dominant eigenvalue and a left eigenvector of `m`.
    ///
    /// Fails with `NotIrreducible` when the dominant eigenvalue is not
    /// simple (the adjugate of `lambda I - M^T` vanishes).
    pub fn compute(m: &DMatrix<u64>) -> Result<Perron> {
        let n = m.nrows();
        if n == 0 || m.ncols() != n {
            return Err(TrackError::NotIrreducible);
        }
        // left eigenvector of m = right eigenvector of b = m^T
        let b: Vec<Vec<BigInt>> = (0..n)
            .map(|i| (0..n).map(|j| BigInt::from(m[(j, i)])).collect())
            .collect();
        let cp = charpoly(&b);
        let cp_rat = int_to_rat(&cp);
        let charpoly_sf = squarefree_rat(&cp_rat);
        let sturm = sturm_chain(&charpoly_sf);
        let bound = root_bound(&charpoly_sf);

        // isolate the largest real root in (lo, hi]
        let mut lo = -bound.clone() - BigRational::one();
        let mut hi = bound;
        if count_roots(&sturm, &lo, &hi) == 0 {
            return Err(TrackError::NotIrreducible);
        }
        while count_roots(&sturm, &lo, &hi) > 1 {
            let mid = (&lo + &hi) / BigRational::from_integer(BigInt::from(2));
            if count_roots(&sturm, &mid, &hi) >= 1 {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let mut oracle = Perron {
            charpoly_sf,
            sturm,
            lo,
            hi,
            nu: Vec::new(),
        };

        // adjugate column of xI - b: entries adj[i][j] = (-1)^{i+j} times
        // the minor with row j and column i removed
        let x_minus_b = |i: usize, j: usize| -> IntPoly {
            let mut p = vec![-&b[i][j]];
            if i == j {
                p.push(BigInt::one());
            }
            trim_int(p)
        };
        for j in 0..n {
            let mut column: Vec<IntPoly> = Vec::with_capacity(n);
            for i in 0..n {
                let minor: Vec<Vec<IntPoly>> = (0..n)
                    .filter(|&r| r != j)
                    .map(|r| {
                        (0..n)
                            .filter(|&c| c != i)
                            .map(|c| x_minus_b(r, c))
                            .collect()
                    })
                    .collect();
                let mut d = det_polymat(&minor);
                if (i + j) % 2 == 1 {
                    d = poly::neg_int(&d);
                }
                column.push(d);
            }
            if column.iter().any(|g| oracle.sign_at_lambda(g) != 0) {
                // normalize: the first non-vanishing entry positive
                let flip = column
                    .iter()
                    .map(|g| oracle.sign_at_lambda(g))
                    .find(|&s| s != 0)
                    .unwrap()
                    < 0;
                if flip {
                    column = column.iter().map(|g| poly::neg_int(g)).collect();
                }
                oracle.nu = column;
                return Ok(oracle);
            }
        }
        Err(TrackError::NotIrreducible)
    }

    /// Exact test `g(lambda) == 0`: lambda is a root of `g` iff it is a
    /// root of `gcd(g, charpoly_sf)`, decided by a root count on the
    /// isolating interval.
    fn vanishes_at_lambda(&self, g: &[BigInt]) -> bool {
        let g = trim_int(g.to_vec());
        if g.is_empty() {
            return true;
        }
        let h = gcd_rat(&int_to_rat(&g), &self.charpoly_sf);
        match poly::degree_rat(&h) {
            None | Some(0) => false,
            _ => count_roots(&sturm_chain(&h), &self.lo, &self.hi) == 1,
        }
    }

    /// Exact sign of `g(lambda)`.
    fn sign_at_lambda(&self, g: &[BigInt]) -> i8 {
        if self.vanishes_at_lambda(g) {
            return 0;
        }
        let g_rat = int_to_rat(&trim_int(g.to_vec()));
        let g_chain = sturm_chain(&squarefree_rat(&g_rat));
        let mut lo = self.lo.clone();
        let mut hi = self.hi.clone();
        let two = BigRational::from_integer(BigInt::from(2));
        while count_roots(&g_chain, &lo, &hi) > 0 {
            let mid = (&lo + &hi) / &two;
            if count_roots(&self.sturm, &mid, &hi) == 1 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        // no root of g in (lo, hi], so the sign at hi is the sign at lambda
        let v = eval_rat(&g_rat, &hi);
        if v.is_positive() {
            1
        } else {
            -1
        }
    }

    /// The weight `sum_a coeffs[a] * nu[a]`.
    pub fn combo(&self, coeffs: &[i64]) -> EigenWeight {
        let mut poly: IntPoly = Vec::new();
        for (a, &c) in coeffs.iter().enumerate() {
            if c == 0 {
                continue;
            }
            let scaled: IntPoly = self.nu[a].iter().map(|q| q * BigInt::from(c)).collect();
            poly = poly::add_int(&poly, &scaled);
        }
        EigenWeight {
            poly: trim_int(poly),
        }
    }

    /// The critic `(lambda - 1) * sum(nu)` as a weight: multiplication by
    /// `lambda` happens at the polynomial level.
    pub fn critic(&self) -> EigenWeight {
        let mut total: IntPoly = Vec::new();
        for g in &self.nu {
            total = poly::add_int(&total, g);
        }
        // (x - 1) * total
        let shifted = poly::mul_int(&[-BigInt::one(), BigInt::one()], &total);
        EigenWeight {
            poly: trim_int(shifted),
        }
    }

    /// Exact equality of two weights at lambda.
    pub fn weights_equal(&self, a: &EigenWeight, b: &EigenWeight) -> bool {
        let diff = poly::add_int(&a.poly, &poly::neg_int(&b.poly));
        self.vanishes_at_lambda(&diff)
    }

    /// Exact ordering of two weights at lambda.
    pub fn weights_cmp(&self, a: &EigenWeight, b: &EigenWeight) -> std::cmp::Ordering {
        let diff = poly::add_int(&a.poly, &poly::neg_int(&b.poly));
        match self.sign_at_lambda(&diff) {
            0 => std::cmp::Ordering::Equal,
            s if s > 0 => std::cmp::Ordering::Greater,
            _ => std::cmp::Ordering::Less,
        }
    }

    /// A floating-point approximation of the eigenvalue, for reporting.
    pub fn eigenvalue_approx(&self) -> f64 {
        let mut lo = self.lo.clone();
        let mut hi = self.hi.clone();
        let two = BigRational::from_integer(BigInt::from(2));
        for _ in 0..64 {
            let mid = (&lo + &hi) / &two;
            if count_roots(&self.sturm, &mid, &hi) == 1 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        ((&lo + &hi) / &two).to_f64().unwrap_or(f64::NAN)
    }

    /// A floating-point approximation of the eigenvector, normalized to sum
    /// one, for reporting.
    pub fn eigenvector_approx(&self) -> Vec<f64> {
        let x = BigRational::from_float(self.eigenvalue_approx())
            .unwrap_or_else(|| self.hi.clone());
        let vals: Vec<f64> = self
            .nu
            .iter()
            .map(|g| eval_rat(&int_to_rat(g), &x).to_f64().unwrap_or(f64::NAN))
            .collect();
        let sum: f64 = vals.iter().sum();
        if sum != 0.0 {
            vals.into_iter().map(|v| v / sum).collect()
        } else {
            vals
        }
    }

    /// `true` if lambda is larger than the given integer.
    pub fn eigenvalue_exceeds(&self, k: i64) -> bool {
        // sign of (x - k) at lambda
        self.sign_at_lambda(&trim_int(vec![BigInt::from(-k), BigInt::one()])) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;

    #[test]
    fn tribonacci_spectral_data() {
        // a->ab, b->ac, c->a on the rose
        let m = dmatrix![1u64, 1, 1; 1, 0, 0; 0, 1, 0];
        let p = Perron::compute(&m).unwrap();
        let lambda = p.eigenvalue_approx();
        // largest root of x^3 - x^2 - x - 1
        assert!((lambda - 1.8392867552141612).abs() < 1e-9);
        assert!(p.eigenvalue_exceeds(1));
        assert!(!p.eigenvalue_exceeds(2));
        let nu = p.eigenvector_approx();
        assert_eq!(nu.len(), 3);
        assert!(nu.iter().all(|&v| v > 0.0));
        // left eigenvector: nu M = lambda nu, approximately
        let lhs0 = nu[0] * 1.0 + nu[1] * 1.0 + nu[2] * 0.0;
        assert!((lhs0 - lambda * nu[0]).abs() < 1e-6);
    }

    #[test]
    fn weight_comparisons_are_exact() {
        let m = dmatrix![1u64, 1, 1; 1, 0, 0; 0, 1, 0];
        let p = Perron::compute(&m).unwrap();
        let w1 = p.combo(&[1, 1, 1]);
        let w2 = p.combo(&[1, 1, 1]);
        assert!(p.weights_equal(&w1, &w2));
        let w3 = p.combo(&[2, 1, 1]);
        assert_eq!(p.weights_cmp(&w3, &w1), std::cmp::Ordering::Greater);
        assert_eq!(p.weights_cmp(&w1, &w3), std::cmp::Ordering::Less);
        // critic = (lambda - 1) sum(nu) is strictly positive
        let zero = p.combo(&[0, 0, 0]);
        assert_eq!(p.weights_cmp(&p.critic(), &zero), std::cmp::Ordering::Greater);
    }

    #[test]
    fn identity_matrix_is_degenerate() {
        let m = dmatrix![1u64, 0; 0, 1];
        assert_eq!(
            Perron::compute(&m).unwrap_err(),
            TrackError::NotIrreducible
        );
    }

    #[test]
    fn fibonacci_matrix() {
        let m = dmatrix![1u64, 1; 1, 0];
        let p = Perron::compute(&m).unwrap();
        let golden = (1.0 + 5.0_f64.sqrt()) / 2.0;
        assert!((p.eigenvalue_approx() - golden).abs() < 1e-9);
    }
}
