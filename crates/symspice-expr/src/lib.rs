//! Rational-function algebra for Symspice.
//!
//! This crate is the symbolic-math collaborator of the circuit core: it
//! provides univariate polynomials and rational functions of the transform
//! variable `s` over exact rational coefficients, root finding (closed-form
//! up to degree two, companion-matrix eigenvalues as the numeric fallback),
//! partial-fraction expansion, and the inverse Laplace transform to causal
//! time-domain waveforms.
//!
//! All polynomial arithmetic is exact; float conversion happens only at
//! root finding and waveform evaluation, and is documented where it occurs.

pub mod error;
pub mod parse;
pub mod partfrac;
pub mod poly;
pub mod ratfun;
pub mod roots;
pub mod time;

pub use error::{Error, Result};
pub use parse::{parse_sexpr, rational_from_decimal};
pub use partfrac::{PartialFractions, PoleTerm};
pub use poly::Poly;
pub use ratfun::RatFun;
pub use roots::{cluster_roots, poly_roots};
pub use time::{TimeFunction, TimeTerm, inverse_laplace};
