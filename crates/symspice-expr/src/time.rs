//! Time-domain waveforms produced by the inverse Laplace transform.
//!
//! A [`TimeFunction`] is a causal sum of `c * t^k * e^{p*t}` terms (plus
//! impulse terms from any improper polynomial part). Conjugate pole pairs
//! keep the evaluated waveform real; the display folds such pairs into
//! damped cosines.

use std::f64::consts::PI;
use std::fmt;

use num_complex::Complex;

use crate::error::Result;
use crate::partfrac::{self, PartialFractions};
use crate::ratfun::RatFun;

/// One additive term of a time-domain waveform.
#[derive(Debug, Clone, Copy)]
pub enum TimeTerm {
    /// `coeff * delta^(order)(t)` - an impulse or its derivative.
    Impulse { coeff: Complex<f64>, order: u32 },
    /// `coeff * t^tpow * e^(pole*t) * u(t)`.
    Exp {
        coeff: Complex<f64>,
        tpow: u32,
        pole: Complex<f64>,
    },
}

/// A causal time-domain waveform.
#[derive(Debug, Clone, Default)]
pub struct TimeFunction {
    terms: Vec<TimeTerm>,
}

impl TimeFunction {
    /// The identically zero waveform.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant `a * u(t)`.
    pub fn constant(a: f64) -> Self {
        Self {
            terms: vec![TimeTerm::Exp {
                coeff: Complex::new(a, 0.0),
                tpow: 0,
                pole: Complex::new(0.0, 0.0),
            }],
        }
    }

    /// `amp * cos(omega*t + phase) * u(t)` as a conjugate exponential pair.
    pub fn cosine(amp: f64, omega: f64, phase: f64) -> Self {
        let half = Complex::from_polar(amp / 2.0, phase);
        Self {
            terms: vec![
                TimeTerm::Exp {
                    coeff: half,
                    tpow: 0,
                    pole: Complex::new(0.0, omega),
                },
                TimeTerm::Exp {
                    coeff: half.conj(),
                    tpow: 0,
                    pole: Complex::new(0.0, -omega),
                },
            ],
        }
    }

    /// The individual terms.
    pub fn terms(&self) -> &[TimeTerm] {
        &self.terms
    }

    /// True if no terms are present.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Append all terms of `other`.
    pub fn extend(&mut self, other: TimeFunction) {
        self.terms.extend(other.terms);
    }

    /// Evaluate at time `t`. Causal: zero for `t < 0`; impulse terms are
    /// ignored (they carry no pointwise value away from `t = 0`).
    pub fn eval(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        let mut acc = Complex::new(0.0, 0.0);
        for term in &self.terms {
            if let TimeTerm::Exp { coeff, tpow, pole } = term {
                acc += coeff * t.powi(*tpow as i32) * (pole * t).exp();
            }
        }
        acc.re
    }
}

/// Inverse Laplace transform of a rational function of `s`, assuming a
/// causal (one-sided) signal.
pub fn inverse_laplace(f: &RatFun) -> Result<TimeFunction> {
    let pf = partfrac::expand(f)?;
    Ok(from_partial_fractions(&pf))
}

fn from_partial_fractions(pf: &PartialFractions) -> TimeFunction {
    let mut terms = Vec::new();
    for (order, &coeff) in pf.poly_part.iter().enumerate() {
        if coeff.norm() > 0.0 {
            terms.push(TimeTerm::Impulse {
                coeff,
                order: order as u32,
            });
        }
    }
    for pt in &pf.terms {
        // c/(s-p)^k  ->  c * t^(k-1) * e^(p t) / (k-1)!
        let k = pt.order;
        let fact: f64 = (1..k).map(|i| i as f64).product();
        terms.push(TimeTerm::Exp {
            coeff: pt.coeff / fact,
            tpow: k - 1,
            pole: pt.pole,
        });
    }
    TimeFunction { terms }
}

fn fmt_num(x: f64) -> String {
    // Trim float noise for readable waveforms.
    let rounded = (x * 1e9).round() / 1e9;
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

impl fmt::Display for TimeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        let mut parts: Vec<String> = Vec::new();
        let mut used = vec![false; self.terms.len()];

        for i in 0..self.terms.len() {
            if used[i] {
                continue;
            }
            match self.terms[i] {
                TimeTerm::Impulse { coeff, order } => {
                    used[i] = true;
                    let base = if order == 0 {
                        "delta(t)".to_string()
                    } else {
                        format!("delta^({order})(t)")
                    };
                    parts.push(format!("{}*{}", fmt_num(coeff.re), base));
                }
                TimeTerm::Exp { coeff, tpow, pole } => {
                    used[i] = true;
                    if pole.im.abs() > 1e-12 {
                        // Look for the conjugate partner to fold into a cosine.
                        let partner = (i + 1..self.terms.len()).find(|&j| {
                            !used[j]
                                && matches!(self.terms[j], TimeTerm::Exp { coeff: c2, tpow: k2, pole: p2 }
                                    if k2 == tpow
                                        && (p2 - pole.conj()).norm() < 1e-9
                                        && (c2 - coeff.conj()).norm() < 1e-9)
                        });
                        if let Some(j) = partner {
                            used[j] = true;
                            let amp = 2.0 * coeff.norm();
                            let (omega, phase) = if pole.im >= 0.0 {
                                (pole.im, coeff.arg())
                            } else {
                                (-pole.im, -coeff.arg())
                            };
                            let mut s = fmt_num(amp);
                            if tpow > 0 {
                                s.push_str(&format!("*t^{tpow}"));
                            }
                            if pole.re.abs() > 1e-12 {
                                s.push_str(&format!("*exp({}*t)", fmt_num(pole.re)));
                            }
                            let ph = if phase.abs() < 1e-9 {
                                String::new()
                            } else {
                                format!(" + {}", fmt_num(phase * 180.0 / PI))
                            };
                            if ph.is_empty() {
                                s.push_str(&format!("*cos({}*t)", fmt_num(omega)));
                            } else {
                                s.push_str(&format!("*cos({}*t{ph} deg)", fmt_num(omega)));
                            }
                            parts.push(s);
                            continue;
                        }
                    }
                    // Real pole (or unpaired): render the real part directly.
                    let mut s = fmt_num(coeff.re);
                    if tpow > 0 {
                        s.push_str(&format!("*t^{tpow}"));
                    }
                    if pole.norm() > 1e-12 {
                        s.push_str(&format!("*exp({}*t)", fmt_num(pole.re)));
                    }
                    parts.push(s);
                }
            }
        }

        let mut out = String::new();
        for (k, p) in parts.iter().enumerate() {
            if k == 0 {
                out.push_str(p);
            } else if let Some(stripped) = p.strip_prefix('-') {
                out.push_str(" - ");
                out.push_str(stripped);
            } else {
                out.push_str(" + ");
                out.push_str(p);
            }
        }
        write!(f, "{out}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::Poly;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_step_response_rc() {
        // 20/(s(50s+1)) -> 20 - 20*exp(-t/50)
        let f = RatFun::new(
            Poly::from_integer(20),
            Poly::var() * Poly::from_coeffs(vec![rat(1), rat(50)]),
        );
        let w = inverse_laplace(&f).unwrap();

        assert!(w.eval(0.0).abs() < 1e-8);
        let expected = |t: f64| 20.0 * (1.0 - (-t / 50.0).exp());
        for t in [1.0, 10.0, 50.0, 200.0] {
            assert!((w.eval(t) - expected(t)).abs() < 1e-6, "t={t}");
        }
        // t -> inf approaches 20
        assert!((w.eval(1e4) - 20.0).abs() < 1e-6);
        // causal
        assert_eq!(w.eval(-1.0), 0.0);
    }

    #[test]
    fn test_oscillatory() {
        // 1/(s^2+1) -> sin(t)
        let f = RatFun::new(Poly::one(), Poly::var().pow(2) + Poly::one());
        let w = inverse_laplace(&f).unwrap();
        for t in [0.0, 0.5, 1.0, 2.0, 3.1] {
            assert!((w.eval(t) - t.sin()).abs() < 1e-8, "t={t}");
        }
    }

    #[test]
    fn test_repeated_pole_ramp() {
        // 1/(s+1)^2 -> t*exp(-t)
        let f = RatFun::new(Poly::one(), (Poly::var() + Poly::one()).pow(2));
        let w = inverse_laplace(&f).unwrap();
        for t in [0.1, 1.0, 5.0] {
            assert!((w.eval(t) - t * (-t).exp()).abs() < 1e-5, "t={t}");
        }
    }

    #[test]
    fn test_cosine_helper() {
        let w = TimeFunction::cosine(2.0, 3.0, PI / 4.0);
        for t in [0.0, 0.3, 1.7] {
            assert!((w.eval(t) - 2.0 * (3.0 * t + PI / 4.0).cos()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_display_step_response() {
        let f = RatFun::new(
            Poly::from_integer(20),
            Poly::var() * Poly::from_coeffs(vec![rat(1), rat(50)]),
        );
        let w = inverse_laplace(&f).unwrap();
        let s = w.to_string();
        assert!(s.contains("20"), "display: {s}");
        assert!(s.contains("exp("), "display: {s}");
    }

    #[test]
    fn test_constant_display() {
        let w = TimeFunction::constant(5.0);
        assert_eq!(w.to_string(), "5");
        assert_eq!(w.eval(2.0), 5.0);
    }
}
