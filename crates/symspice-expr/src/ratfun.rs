//! Rational functions of the transform variable `s`.
//!
//! A `RatFun` is a normalized quotient of two [`Poly`]s: the denominator is
//! monic and shares no common factor with the numerator. All arithmetic is
//! exact; lossy float conversion happens only at evaluation points.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_complex::Complex;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::poly::Poly;

/// A rational function `num / den` in `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatFun {
    num: Poly,
    den: Poly,
}

impl RatFun {
    /// Build from numerator and denominator, normalizing.
    ///
    /// Panics if `den` is the zero polynomial; callers validate first.
    pub fn new(num: Poly, den: Poly) -> Self {
        assert!(!den.is_zero(), "rational function with zero denominator");
        let mut f = Self { num, den };
        f.normalize();
        f
    }

    fn normalize(&mut self) {
        if self.num.is_zero() {
            self.den = Poly::one();
            return;
        }
        let g = self.num.gcd(&self.den);
        if !g.is_constant() {
            self.num = self.num.div_rem(&g).0;
            self.den = self.den.div_rem(&g).0;
        }
        let lead = self.den.leading();
        self.num = self.num.scale(&(BigRational::one() / &lead));
        self.den = self.den.monic();
    }

    /// The zero function.
    pub fn zero() -> Self {
        Self {
            num: Poly::zero(),
            den: Poly::one(),
        }
    }

    /// The constant 1.
    pub fn one() -> Self {
        Self {
            num: Poly::one(),
            den: Poly::one(),
        }
    }

    /// A rational constant.
    pub fn constant(c: BigRational) -> Self {
        Self {
            num: Poly::constant(c),
            den: Poly::one(),
        }
    }

    /// An integer constant.
    pub fn from_integer(n: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(n)))
    }

    /// The variable `s`.
    pub fn var() -> Self {
        Self {
            num: Poly::var(),
            den: Poly::one(),
        }
    }

    /// A polynomial promoted to a rational function.
    pub fn from_poly(p: Poly) -> Self {
        Self {
            num: p,
            den: Poly::one(),
        }
    }

    /// Numerator.
    pub fn num(&self) -> &Poly {
        &self.num
    }

    /// Denominator (monic).
    pub fn den(&self) -> &Poly {
        &self.den
    }

    /// True for the zero function.
    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// Constant value, if this function is a constant.
    pub fn as_constant(&self) -> Option<BigRational> {
        if self.num.is_constant() && self.den.is_one_poly() {
            Some(self.num.coeff(0))
        } else {
            None
        }
    }

    /// Multiplicative inverse.
    ///
    /// Panics on the zero function; callers check `is_zero` first.
    pub fn recip(&self) -> Self {
        assert!(!self.is_zero(), "reciprocal of zero rational function");
        Self::new(self.den.clone(), self.num.clone())
    }

    /// Multiply by a rational scalar.
    pub fn scale(&self, k: &BigRational) -> Self {
        Self {
            num: self.num.scale(k),
            den: if k.is_zero() {
                Poly::one()
            } else {
                self.den.clone()
            },
        }
    }

    /// Evaluate at a complex point. Returns `None` on a pole.
    pub fn eval_complex(&self, x: Complex<f64>) -> Option<Complex<f64>> {
        let d = self.den.eval_complex(x);
        if d.norm() < 1e-300 {
            return None;
        }
        Some(self.num.eval_complex(x) / d)
    }

    /// The value at `s = 0`, if zero is not a pole.
    pub fn at_zero(&self) -> Option<BigRational> {
        let d0 = self.den.coeff(0);
        if d0.is_zero() {
            return None;
        }
        Some(self.num.coeff(0) / d0)
    }
}

// Poly helper used only here; a monic check on the unit polynomial.
impl Poly {
    fn is_one_poly(&self) -> bool {
        self.is_constant() && self.coeff(0).is_one()
    }
}

impl Add for &RatFun {
    type Output = RatFun;

    fn add(self, rhs: &RatFun) -> RatFun {
        RatFun::new(
            &(&self.num * &rhs.den) + &(&rhs.num * &self.den),
            &self.den * &rhs.den,
        )
    }
}

impl Sub for &RatFun {
    type Output = RatFun;

    fn sub(self, rhs: &RatFun) -> RatFun {
        RatFun::new(
            &(&self.num * &rhs.den) - &(&rhs.num * &self.den),
            &self.den * &rhs.den,
        )
    }
}

impl Mul for &RatFun {
    type Output = RatFun;

    fn mul(self, rhs: &RatFun) -> RatFun {
        if self.is_zero() || rhs.is_zero() {
            return RatFun::zero();
        }
        RatFun::new(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}

impl Div for &RatFun {
    type Output = RatFun;

    fn div(self, rhs: &RatFun) -> RatFun {
        assert!(!rhs.is_zero(), "division by zero rational function");
        RatFun::new(&self.num * &rhs.den, &self.den * &rhs.num)
    }
}

impl Neg for &RatFun {
    type Output = RatFun;

    fn neg(self) -> RatFun {
        RatFun {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}

impl Add for RatFun {
    type Output = RatFun;
    fn add(self, rhs: RatFun) -> RatFun {
        &self + &rhs
    }
}

impl Sub for RatFun {
    type Output = RatFun;
    fn sub(self, rhs: RatFun) -> RatFun {
        &self - &rhs
    }
}

impl Mul for RatFun {
    type Output = RatFun;
    fn mul(self, rhs: RatFun) -> RatFun {
        &self * &rhs
    }
}

impl Div for RatFun {
    type Output = RatFun;
    fn div(self, rhs: RatFun) -> RatFun {
        &self / &rhs
    }
}

impl Neg for RatFun {
    type Output = RatFun;
    fn neg(self) -> RatFun {
        -&self
    }
}

impl AddAssign for RatFun {
    fn add_assign(&mut self, rhs: RatFun) {
        *self = &*self + &rhs;
    }
}

impl SubAssign for RatFun {
    fn sub_assign(&mut self, rhs: RatFun) {
        *self = &*self - &rhs;
    }
}

impl Zero for RatFun {
    fn zero() -> Self {
        RatFun::zero()
    }

    fn is_zero(&self) -> bool {
        RatFun::is_zero(self)
    }
}

impl One for RatFun {
    fn one() -> Self {
        RatFun::one()
    }
}

impl fmt::Display for RatFun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one_poly() {
            if self.num.is_constant() || self.num.is_zero() {
                write!(f, "{}", self.num)
            } else {
                write!(f, "({})", self.num)
            }
        } else {
            write!(f, "({})/({})", self.num, self.den)
        }
    }
}
