//! Partial-fraction expansion of rational functions.
//!
//! Poles are located numerically (see [`crate::roots`]) and residues are
//! recovered from a local Taylor expansion, which handles repeated poles
//! without symbolic differentiation.

use num_complex::Complex;

use crate::error::{Error, Result};
use crate::ratfun::RatFun;
use crate::roots::{cluster_roots, poly_roots};

/// One `coeff / (s - pole)^order` term.
#[derive(Debug, Clone, Copy)]
pub struct PoleTerm {
    pub pole: Complex<f64>,
    pub order: u32,
    pub coeff: Complex<f64>,
}

/// A rational function split into a polynomial part and pole terms.
#[derive(Debug, Clone)]
pub struct PartialFractions {
    /// Ascending coefficients of the polynomial (improper) part.
    pub poly_part: Vec<Complex<f64>>,
    /// Proper-part pole terms.
    pub terms: Vec<PoleTerm>,
}

/// Expand `f` into partial fractions.
pub fn expand(f: &RatFun) -> Result<PartialFractions> {
    if f.is_zero() {
        return Ok(PartialFractions {
            poly_part: Vec::new(),
            terms: Vec::new(),
        });
    }

    let num = f.num().to_complex_coeffs();
    let den = f.den().to_complex_coeffs();

    // Split off the polynomial part so the remainder is strictly proper.
    let (poly_part, proper_num) = complex_div_rem(&num, &den);
    if proper_num.iter().all(|c| c.norm() == 0.0) {
        return Ok(PartialFractions {
            poly_part,
            terms: Vec::new(),
        });
    }

    let poles = cluster_roots(&poly_roots(f.den())?);

    let mut terms = Vec::new();
    for &(pole, mult) in &poles {
        // Deflate the denominator by (s - pole)^mult.
        let mut q = den.clone();
        for _ in 0..mult {
            q = deflate(&q, pole);
        }

        // Taylor coefficients of numerator and deflated denominator at the
        // pole, then a series division gives the coefficients of
        // F(s)*(s-pole)^mult in powers of (s - pole).
        let n_series = taylor_at(&proper_num, pole, mult);
        let q_series = taylor_at(&q, pole, mult);
        if q_series[0].norm() < 1e-12 {
            return Err(Error::RootFinding(format!(
                "pole multiplicity misdetected near {pole}"
            )));
        }

        let mut t = vec![Complex::new(0.0, 0.0); mult];
        for j in 0..mult {
            let mut acc = n_series[j];
            for i in 1..=j {
                acc -= q_series[i] * t[j - i];
            }
            t[j] = acc / q_series[0];
        }

        for (j, &c) in t.iter().enumerate() {
            if c.norm() > 1e-12 {
                terms.push(PoleTerm {
                    pole,
                    order: (mult - j) as u32,
                    coeff: c,
                });
            }
        }
    }

    Ok(PartialFractions { poly_part, terms })
}

/// Complex polynomial division: returns `(quotient, remainder)`.
fn complex_div_rem(num: &[Complex<f64>], den: &[Complex<f64>]) -> (Vec<Complex<f64>>, Vec<Complex<f64>>) {
    if num.len() < den.len() {
        return (Vec::new(), num.to_vec());
    }
    let mut rem = num.to_vec();
    let dlen = den.len();
    let lead = den[dlen - 1];
    let qlen = rem.len() - dlen + 1;
    let mut quot = vec![Complex::new(0.0, 0.0); qlen];
    for i in (0..qlen).rev() {
        let factor = rem[i + dlen - 1] / lead;
        for (j, &dc) in den.iter().enumerate() {
            rem[i + j] -= dc * factor;
        }
        quot[i] = factor;
    }
    rem.truncate(dlen - 1);
    (quot, rem)
}

/// Synthetic division by `(s - r)`, dropping the remainder.
fn deflate(p: &[Complex<f64>], r: Complex<f64>) -> Vec<Complex<f64>> {
    let n = p.len();
    if n <= 1 {
        return Vec::new();
    }
    let mut out = vec![Complex::new(0.0, 0.0); n - 1];
    let mut carry = p[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = carry;
        carry = p[i] + carry * r;
    }
    out
}

/// First `count` Taylor coefficients of `p` around `x0` (repeated synthetic
/// division; the remainder of each pass is the next coefficient).
fn taylor_at(p: &[Complex<f64>], x0: Complex<f64>, count: usize) -> Vec<Complex<f64>> {
    let mut work = p.to_vec();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        if work.is_empty() {
            out.push(Complex::new(0.0, 0.0));
            continue;
        }
        let n = work.len();
        let mut carry = work[n - 1];
        let mut next = vec![Complex::new(0.0, 0.0); n.saturating_sub(1)];
        for i in (0..n - 1).rev() {
            next[i] = carry;
            carry = work[i] + carry * x0;
        }
        out.push(carry);
        work = next;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::Poly;

    fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-8
    }

    #[test]
    fn test_simple_poles() {
        // 1/((s+1)(s+2)) = 1/(s+1) - 1/(s+2)
        let f = RatFun::new(
            Poly::one(),
            (Poly::var() + Poly::one()) * (Poly::var() + Poly::from_integer(2)),
        );
        let pf = expand(&f).unwrap();
        assert!(pf.poly_part.is_empty());
        assert_eq!(pf.terms.len(), 2);
        for term in &pf.terms {
            assert_eq!(term.order, 1);
            if close(term.pole, Complex::new(-1.0, 0.0)) {
                assert!(close(term.coeff, Complex::new(1.0, 0.0)));
            } else {
                assert!(close(term.pole, Complex::new(-2.0, 0.0)));
                assert!(close(term.coeff, Complex::new(-1.0, 0.0)));
            }
        }
    }

    #[test]
    fn test_repeated_pole() {
        // (s+2)/(s+1)^2 = 1/(s+1) + 1/(s+1)^2
        let f = RatFun::new(
            Poly::var() + Poly::from_integer(2),
            (Poly::var() + Poly::one()).pow(2),
        );
        let pf = expand(&f).unwrap();
        assert_eq!(pf.terms.len(), 2);
        let first = pf.terms.iter().find(|t| t.order == 2).unwrap();
        let second = pf.terms.iter().find(|t| t.order == 1).unwrap();
        assert!(close(first.coeff, Complex::new(1.0, 0.0)));
        assert!(close(second.coeff, Complex::new(1.0, 0.0)));
    }

    #[test]
    fn test_improper_part() {
        // (s^2 + 1)/(s + 1) = s - 1 + 2/(s+1)
        let f = RatFun::new(Poly::var().pow(2) + Poly::one(), Poly::var() + Poly::one());
        let pf = expand(&f).unwrap();
        assert_eq!(pf.poly_part.len(), 2);
        assert!(close(pf.poly_part[0], Complex::new(-1.0, 0.0)));
        assert!(close(pf.poly_part[1], Complex::new(1.0, 0.0)));
        assert_eq!(pf.terms.len(), 1);
        assert!(close(pf.terms[0].coeff, Complex::new(2.0, 0.0)));
    }

    #[test]
    fn test_step_through_rc() {
        // 20/(s(50s+1)) = 20/s - 1000/(50s+1) = 20/s - 20/(s+0.02)
        let f = RatFun::new(
            Poly::from_integer(20),
            Poly::var()
                * Poly::from_coeffs(vec![
                    num_rational::BigRational::from_integer(1.into()),
                    num_rational::BigRational::from_integer(50.into()),
                ]),
        );
        let pf = expand(&f).unwrap();
        assert_eq!(pf.terms.len(), 2);
        let at_zero = pf
            .terms
            .iter()
            .find(|t| t.pole.norm() < 1e-9)
            .unwrap();
        assert!(close(at_zero.coeff, Complex::new(20.0, 0.0)));
        let at_tau = pf
            .terms
            .iter()
            .find(|t| t.pole.norm() > 1e-9)
            .unwrap();
        assert!(close(at_tau.pole, Complex::new(-0.02, 0.0)));
        assert!(close(at_tau.coeff, Complex::new(-20.0, 0.0)));
    }
}
