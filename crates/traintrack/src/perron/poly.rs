//! Integer and rational polynomial arithmetic for the matrix oracle.
//!
//! Coefficients are stored low degree first. The integer side carries the
//! characteristic polynomial and the adjugate entries (Faddeev-LeVerrier and
//! Bareiss never leave the integers); the rational side does Euclidean gcds
//! and Sturm chains for root isolation.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

pub type IntPoly = Vec<BigInt>;
pub type RatPoly = Vec<BigRational>;

pub fn trim_int(mut p: IntPoly) -> IntPoly {
    while p.last().is_some_and(|c| c.is_zero()) {
        p.pop();
    }
    p
}

pub fn trim_rat(mut p: RatPoly) -> RatPoly {
    while p.last().is_some_and(|c| c.is_zero()) {
        p.pop();
    }
    p
}

pub fn int_to_rat(p: &[BigInt]) -> RatPoly {
    p.iter()
        .map(|c| BigRational::from_integer(c.clone()))
        .collect()
}

pub fn add_int(a: &[BigInt], b: &[BigInt]) -> IntPoly {
    let mut out = vec![BigInt::zero(); a.len().max(b.len())];
    for (i, c) in a.iter().enumerate() {
        out[i] += c;
    }
    for (i, c) in b.iter().enumerate() {
        out[i] += c;
    }
    trim_int(out)
}

pub fn mul_int(a: &[BigInt], b: &[BigInt]) -> IntPoly {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![BigInt::zero(); a.len() + b.len() - 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            out[i + j] += ca * cb;
        }
    }
    trim_int(out)
}

pub fn neg_int(a: &[BigInt]) -> IntPoly {
    a.iter().map(|c| -c).collect()
}

/// Exact division `a / b` in Z[x]; the caller guarantees divisibility
/// (Bareiss pivots). Panics on inexact division only through debug checks.
pub fn div_exact_int(a: &[BigInt], b: &[BigInt]) -> IntPoly {
    let a = trim_int(a.to_vec());
    let b = trim_int(b.to_vec());
    if a.is_empty() {
        return Vec::new();
    }
    debug_assert!(!b.is_empty(), "division by the zero polynomial");
    let mut rem = a;
    let mut quo = vec![BigInt::zero(); rem.len() - b.len() + 1];
    let lead = b.last().unwrap().clone();
    for k in (0..quo.len()).rev() {
        let c = &rem[k + b.len() - 1] / &lead;
        quo[k] = c.clone();
        if c.is_zero() {
            continue;
        }
        for (j, cb) in b.iter().enumerate() {
            let t = &c * cb;
            rem[k + j] -= t;
        }
    }
    debug_assert!(rem.iter().all(|c| c.is_zero()), "inexact division");
    trim_int(quo)
}

pub fn degree_rat(p: &[BigRational]) -> Option<usize> {
    let t = trim_rat(p.to_vec());
    if t.is_empty() {
        None
    } else {
        Some(t.len() - 1)
    }
}

pub fn eval_rat(p: &[BigRational], x: &BigRational) -> BigRational {
    let mut acc = BigRational::zero();
    for c in p.iter().rev() {
        acc = acc * x + c;
    }
    acc
}

pub fn derivative_rat(p: &[BigRational]) -> RatPoly {
    p.iter()
        .enumerate()
        .skip(1)
        .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
        .collect()
}

/// Remainder of `a / b` over the rationals.
pub fn rem_rat(a: &[BigRational], b: &[BigRational]) -> RatPoly {
    let mut rem = trim_rat(a.to_vec());
    let b = trim_rat(b.to_vec());
    assert!(!b.is_empty(), "division by the zero polynomial");
    let lead = b.last().unwrap().clone();
    while rem.len() >= b.len() {
        let c = rem.last().unwrap() / &lead;
        let shift = rem.len() - b.len();
        for (j, cb) in b.iter().enumerate() {
            let t = &c * cb;
            rem[shift + j] -= t;
        }
        rem = trim_rat(rem);
        if rem.is_empty() {
            break;
        }
        if rem.len() < b.len() {
            break;
        }
        // loop continues with strictly smaller degree
    }
    rem
}

/// Monic gcd over the rationals.
pub fn gcd_rat(a: &[BigRational], b: &[BigRational]) -> RatPoly {
    let mut a = trim_rat(a.to_vec());
    let mut b = trim_rat(b.to_vec());
    while !b.is_empty() {
        let r = rem_rat(&a, &b);
        a = b;
        b = r;
    }
    if let Some(lead) = a.last().cloned() {
        for c in &mut a {
            *c /= &lead;
        }
    }
    a
}

/// Squarefree part `p / gcd(p, p')`, monic.
pub fn squarefree_rat(p: &[BigRational]) -> RatPoly {
    let g = gcd_rat(p, &derivative_rat(p));
    if degree_rat(&g) == Some(0) || g.is_empty() {
        let mut q = trim_rat(p.to_vec());
        if let Some(lead) = q.last().cloned() {
            for c in &mut q {
                *c /= &lead;
            }
        }
        return q;
    }
    // exact division over the rationals
    let mut num = trim_rat(p.to_vec());
    let mut quo: RatPoly = vec![BigRational::zero(); num.len() - g.len() + 1];
    let lead = g.last().unwrap().clone();
    while num.len() >= g.len() {
        let c = num.last().unwrap() / &lead;
        let shift = num.len() - g.len();
        quo[shift] = c.clone();
        for (j, cb) in g.iter().enumerate() {
            let t = &c * cb;
            num[shift + j] -= t;
        }
        num = trim_rat(num);
    }
    let mut quo = trim_rat(quo);
    if let Some(lead) = quo.last().cloned() {
        for c in &mut quo {
            *c /= &lead;
        }
    }
    quo
}

/// Sturm chain of a squarefree polynomial.
pub fn sturm_chain(p: &[BigRational]) -> Vec<RatPoly> {
    let mut chain = vec![trim_rat(p.to_vec()), trim_rat(derivative_rat(p))];
    loop {
        let n = chain.len();
        if chain[n - 1].is_empty() {
            chain.pop();
            break;
        }
        let r = rem_rat(&chain[n - 2], &chain[n - 1]);
        if r.is_empty() {
            break;
        }
        chain.push(r.iter().map(|c| -c).collect());
    }
    chain
}

fn sign_variations(chain: &[RatPoly], x: &BigRational) -> usize {
    let mut count = 0;
    let mut last: Option<bool> = None;
    for p in chain {
        let v = eval_rat(p, x);
        if v.is_zero() {
            continue;
        }
        let pos = v.is_positive();
        if let Some(l) = last {
            if l != pos {
                count += 1;
            }
        }
        last = Some(pos);
    }
    count
}

/// Number of distinct real roots of the chain's polynomial in `(lo, hi]`.
pub fn count_roots(chain: &[RatPoly], lo: &BigRational, hi: &BigRational) -> usize {
    sign_variations(chain, lo).saturating_sub(sign_variations(chain, hi))
}

/// Cauchy bound: every real root lies in `[-b, b]`.
pub fn root_bound(p: &[BigRational]) -> BigRational {
    let q = trim_rat(p.to_vec());
    let lead = q.last().expect("zero polynomial has no root bound").abs();
    let max = q
        .iter()
        .take(q.len() - 1)
        .map(|c| c.abs())
        .fold(BigRational::zero(), |a, b| if a > b { a } else { b });
    BigRational::one() + max / lead
}

/// Characteristic polynomial of an integer matrix, monic, by the
/// Faddeev-LeVerrier recurrence (all divisions are exact).
pub fn charpoly(a: &[Vec<BigInt>]) -> IntPoly {
    let n = a.len();
    let mut coeffs = vec![BigInt::zero(); n + 1];
    coeffs[n] = BigInt::one();
    // m starts as the identity; c_k = -tr(a m_k)/k, m_{k+1} = a m_k + c_k I
    let mut m: Vec<Vec<BigInt>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { BigInt::one() } else { BigInt::zero() })
                .collect()
        })
        .collect();
    for k in 1..=n {
        let mut am = vec![vec![BigInt::zero(); n]; n];
        for i in 0..n {
            for j in 0..n {
                let mut s = BigInt::zero();
                for l in 0..n {
                    s += &a[i][l] * &m[l][j];
                }
                am[i][j] = s;
            }
        }
        let mut tr = BigInt::zero();
        for (i, row) in am.iter().enumerate() {
            tr += &row[i];
        }
        let c = -tr / BigInt::from(k);
        coeffs[n - k] = c.clone();
        for (i, row) in am.iter_mut().enumerate() {
            row[i] += &c;
        }
        m = am;
    }
    coeffs
}

/// Determinant of a square matrix over Z[x] by fraction-free Bareiss
/// elimination.
pub fn det_polymat(mat: &[Vec<IntPoly>]) -> IntPoly {
    let n = mat.len();
    if n == 0 {
        return vec![BigInt::one()];
    }
    let mut m: Vec<Vec<IntPoly>> = mat.to_vec();
    let mut sign = 1i32;
    let mut prev: IntPoly = vec![BigInt::one()];
    for k in 0..n - 1 {
        if trim_int(m[k][k].clone()).is_empty() {
            // pivot: swap with a row whose entry is non-zero
            match (k + 1..n).find(|&r| !trim_int(m[r][k].clone()).is_empty()) {
                Some(r) => {
                    m.swap(k, r);
                    sign = -sign;
                }
                None => return Vec::new(),
            }
        }
        for i in k + 1..n {
            for j in k + 1..n {
                let lhs = mul_int(&m[k][k], &m[i][j]);
                let rhs = mul_int(&m[i][k], &m[k][j]);
                let num = add_int(&lhs, &neg_int(&rhs));
                m[i][j] = div_exact_int(&num, &prev);
            }
        }
        for i in k + 1..n {
            m[i][k] = Vec::new();
        }
        prev = m[k][k].clone();
    }
    let det = m[n - 1][n - 1].clone();
    if sign < 0 {
        neg_int(&det)
    } else {
        det
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(v: &[i64]) -> IntPoly {
        trim_int(v.iter().map(|&c| BigInt::from(c)).collect())
    }

    fn rp(v: &[i64]) -> RatPoly {
        int_to_rat(&ip(v))
    }

    #[test]
    fn charpoly_of_companion_like_matrix() {
        // Tribonacci transition matrix: charpoly x^3 - x^2 - x - 1
        let a: Vec<Vec<BigInt>> = vec![
            vec![BigInt::from(1), BigInt::from(1), BigInt::from(1)],
            vec![BigInt::from(1), BigInt::from(0), BigInt::from(0)],
            vec![BigInt::from(0), BigInt::from(1), BigInt::from(0)],
        ];
        assert_eq!(charpoly(&a), ip(&[-1, -1, -1, 1]));
    }

    #[test]
    fn sturm_isolates_roots() {
        // (x^2 - 2): one root in (1, 2], none in (2, 3]
        let p = rp(&[-2, 0, 1]);
        let chain = sturm_chain(&p);
        let one = BigRational::from_integer(BigInt::from(1));
        let two = BigRational::from_integer(BigInt::from(2));
        let three = BigRational::from_integer(BigInt::from(3));
        assert_eq!(count_roots(&chain, &one, &two), 1);
        assert_eq!(count_roots(&chain, &two, &three), 0);
        assert_eq!(count_roots(&chain, &(-three.clone()), &three), 2);
    }

    #[test]
    fn gcd_and_squarefree() {
        // p = (x-1)^2 (x+2); squarefree part (x-1)(x+2)
        let p = mul_int(&mul_int(&ip(&[-1, 1]), &ip(&[-1, 1])), &ip(&[2, 1]));
        let sf = squarefree_rat(&int_to_rat(&p));
        assert_eq!(degree_rat(&sf), Some(2));
        let g = gcd_rat(&int_to_rat(&p), &rp(&[-1, 1]));
        assert_eq!(degree_rat(&g), Some(1));
    }

    #[test]
    fn bareiss_determinant_matches_expansion() {
        // det [[x, 1], [2, x]] = x^2 - 2
        let mat = vec![
            vec![ip(&[0, 1]), ip(&[1])],
            vec![ip(&[2]), ip(&[0, 1])],
        ];
        assert_eq!(det_polymat(&mat), ip(&[-2, 0, 1]));
    }

    #[test]
    fn exact_division() {
        let num = mul_int(&ip(&[1, 2, 3]), &ip(&[-4, 5]));
        assert_eq!(div_exact_int(&num, &ip(&[-4, 5])), ip(&[1, 2, 3]));
    }
}
