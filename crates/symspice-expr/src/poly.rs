//! Dense univariate polynomials over exact rationals.
//!
//! Coefficients are stored in ascending order of the power of the transform
//! variable `s`. The zero polynomial is represented by an empty coefficient
//! vector; all other polynomials carry no trailing zero coefficients.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_complex::Complex;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A polynomial in `s` with `BigRational` coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Poly {
    coeffs: Vec<BigRational>,
}

impl Poly {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: Vec::new() }
    }

    /// The constant polynomial 1.
    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    /// A constant polynomial.
    pub fn constant(c: BigRational) -> Self {
        let mut p = Self { coeffs: vec![c] };
        p.trim();
        p
    }

    /// A constant polynomial from an integer.
    pub fn from_integer(n: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(n)))
    }

    /// The variable `s` itself.
    pub fn var() -> Self {
        Self {
            coeffs: vec![BigRational::zero(), BigRational::one()],
        }
    }

    /// Build from ascending coefficients, trimming trailing zeros.
    pub fn from_coeffs(coeffs: Vec<BigRational>) -> Self {
        let mut p = Self { coeffs };
        p.trim();
        p
    }

    fn trim(&mut self) {
        while self.coeffs.last().is_some_and(|c| c.is_zero()) {
            self.coeffs.pop();
        }
    }

    /// True for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Degree; the zero polynomial reports degree 0.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Ascending coefficients (empty for the zero polynomial).
    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// Coefficient of `s^k` (zero if absent).
    pub fn coeff(&self, k: usize) -> BigRational {
        self.coeffs.get(k).cloned().unwrap_or_else(BigRational::zero)
    }

    /// Leading coefficient (zero for the zero polynomial).
    pub fn leading(&self) -> BigRational {
        self.coeffs
            .last()
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// True if the polynomial is a constant (degree 0 or zero).
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    /// Constant value if this polynomial is a constant.
    pub fn as_constant(&self) -> Option<BigRational> {
        if self.is_constant() {
            Some(self.coeff(0))
        } else {
            None
        }
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, k: &BigRational) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        Self::from_coeffs(self.coeffs.iter().map(|c| c * k).collect())
    }

    /// Divide every coefficient by the leading coefficient.
    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let lead = self.leading();
        Self::from_coeffs(self.coeffs.iter().map(|c| c / &lead).collect())
    }

    /// Formal derivative with respect to `s`.
    pub fn derivative(&self) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero();
        }
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(k, c)| c * BigRational::from_integer(BigInt::from(k as i64)))
            .collect();
        Self::from_coeffs(coeffs)
    }

    /// Integer power.
    pub fn pow(&self, n: u32) -> Self {
        let mut acc = Self::one();
        for _ in 0..n {
            acc = &acc * self;
        }
        acc
    }

    /// Euclidean division: `self = q * div + r` with `deg r < deg div`.
    ///
    /// Panics if `div` is the zero polynomial; callers check first.
    pub fn div_rem(&self, div: &Poly) -> (Poly, Poly) {
        assert!(!div.is_zero(), "polynomial division by zero");
        if self.degree() < div.degree() || self.is_zero() {
            return (Poly::zero(), self.clone());
        }
        let mut rem = self.coeffs.clone();
        let dlen = div.coeffs.len();
        let lead = div.leading();
        let qlen = rem.len() - dlen + 1;
        let mut quot = vec![BigRational::zero(); qlen];
        for i in (0..qlen).rev() {
            let factor = &rem[i + dlen - 1] / &lead;
            if factor.is_zero() {
                continue;
            }
            for (j, dc) in div.coeffs.iter().enumerate() {
                let delta = dc * &factor;
                rem[i + j] -= delta;
            }
            quot[i] = factor;
        }
        (Poly::from_coeffs(quot), Poly::from_coeffs(rem))
    }

    /// Monic greatest common divisor via the Euclidean algorithm.
    pub fn gcd(&self, other: &Poly) -> Poly {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            // Normalizing each remainder keeps the rational coefficients small.
            let (_, r) = a.div_rem(&b);
            a = b;
            b = r.monic();
        }
        if a.is_zero() { a } else { a.monic() }
    }

    /// Evaluate at an exact rational point.
    pub fn eval_rational(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Evaluate at a complex point (Horner, lossy rational-to-float).
    pub fn eval_complex(&self, x: Complex<f64>) -> Complex<f64> {
        let mut acc = Complex::new(0.0, 0.0);
        for c in self.coeffs.iter().rev() {
            acc = acc * x + Complex::new(c.to_f64().unwrap_or(f64::NAN), 0.0);
        }
        acc
    }

    /// Lossy conversion of the coefficients to complex floats, ascending.
    pub fn to_complex_coeffs(&self) -> Vec<Complex<f64>> {
        self.coeffs
            .iter()
            .map(|c| Complex::new(c.to_f64().unwrap_or(f64::NAN), 0.0))
            .collect()
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for k in 0..n {
            coeffs.push(self.coeff(k) + rhs.coeff(k));
        }
        Poly::from_coeffs(coeffs)
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        let n = self.coeffs.len().max(rhs.coeffs.len());
        let mut coeffs = Vec::with_capacity(n);
        for k in 0..n {
            coeffs.push(self.coeff(k) - rhs.coeff(k));
        }
        Poly::from_coeffs(coeffs)
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        if self.is_zero() || rhs.is_zero() {
            return Poly::zero();
        }
        let mut coeffs =
            vec![BigRational::zero(); self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Poly::from_coeffs(coeffs)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        Poly::from_coeffs(self.coeffs.iter().map(|c| -c).collect())
    }
}

impl Add for Poly {
    type Output = Poly;
    fn add(self, rhs: Poly) -> Poly {
        &self + &rhs
    }
}

impl Sub for Poly {
    type Output = Poly;
    fn sub(self, rhs: Poly) -> Poly {
        &self - &rhs
    }
}

impl Mul for Poly {
    type Output = Poly;
    fn mul(self, rhs: Poly) -> Poly {
        &self * &rhs
    }
}

impl Neg for Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        -&self
    }
}

/// Render a rational coefficient, omitting unit denominators.
fn fmt_rational(c: &BigRational) -> String {
    if c.denom().is_one() {
        format!("{}", c.numer())
    } else {
        format!("{}/{}", c.numer(), c.denom())
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut first = true;
        for (k, c) in self.coeffs.iter().enumerate().rev() {
            if c.is_zero() {
                continue;
            }
            let mag = c.abs();
            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
                first = false;
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            let unit = mag.is_one();
            match (k, unit) {
                (0, _) => write!(f, "{}", fmt_rational(&mag))?,
                (1, true) => write!(f, "s")?,
                (1, false) => write!(f, "{}*s", fmt_rational(&mag))?,
                (_, true) => write!(f, "s^{k}")?,
                (_, false) => write!(f, "{}*s^{k}", fmt_rational(&mag))?,
            }
        }
        Ok(())
    }
}
