//! Linear system solving for assembled MNA matrices.
//!
//! Exact scalar domains (rationals, rational functions) always use
//! Gaussian elimination with partial pivoting over the field; the
//! complex AC path can additionally select nalgebra's LU factorization
//! or an adjugate solve for very small systems.

use std::fmt;

use log::trace;
use nalgebra::{Complex, DMatrix, DVector};
use num_traits::Zero;
use symspice_core::MnaScalar;

/// Which factorization the numeric (complex) path uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverMethod {
    /// Adjugate below dimension 3, LU otherwise.
    #[default]
    Auto,
    Lu,
    GaussianElimination,
    /// Cramer-style adjugate solve; only sensible for tiny systems.
    Adjugate,
}

impl SolverMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "lu" => Some(Self::Lu),
            "gauss" | "gaussian" => Some(Self::GaussianElimination),
            "adjugate" => Some(Self::Adjugate),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Lu => "lu",
            Self::GaussianElimination => "gaussian",
            Self::Adjugate => "adjugate",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gaussian elimination with partial pivoting over any MNA scalar.
///
/// Returns `None` when no nonzero pivot exists in some column, i.e. the
/// system is singular. Exact over `BigRational` and `RatFun`.
pub(crate) fn solve_gaussian<T: MnaScalar>(
    mut a: DMatrix<T>,
    mut b: DVector<T>,
) -> Option<DVector<T>> {
    let n = a.nrows();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[(i, col)]
                    .pivot_weight()
                    .partial_cmp(&a[(j, col)].pivot_weight())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        if a[(pivot_row, col)].is_zero() {
            trace!("no pivot in column {col}");
            return None;
        }
        if pivot_row != col {
            a.swap_rows(pivot_row, col);
            b.swap_rows(pivot_row, col);
        }
        let pivot = a[(col, col)].clone();
        for row in (col + 1)..n {
            if a[(row, col)].is_zero() {
                continue;
            }
            let factor = a[(row, col)].clone() / pivot.clone();
            for k in col..n {
                let delta = factor.clone() * a[(col, k)].clone();
                a[(row, k)] -= delta;
            }
            let delta = factor * b[col].clone();
            b[row] -= delta;
        }
    }

    // Back substitution.
    let mut x = DVector::from_element(n, T::zero());
    for row in (0..n).rev() {
        let mut acc = b[row].clone();
        for col in (row + 1)..n {
            acc -= a[(row, col)].clone() * x[col].clone();
        }
        x[row] = acc / a[(row, row)].clone();
    }
    Some(x)
}

/// Adjugate (Cramer) solve for dimensions up to 3.
fn solve_adjugate(
    a: &DMatrix<Complex<f64>>,
    b: &DVector<Complex<f64>>,
) -> Option<DVector<Complex<f64>>> {
    let n = a.nrows();
    debug_assert!(n <= 3);
    let det = a.determinant();
    if det.norm() == 0.0 {
        return None;
    }
    let mut x = DVector::from_element(n, Complex::zero());
    for col in 0..n {
        let mut m = a.clone();
        m.set_column(col, b);
        x[col] = m.determinant() / det;
    }
    Some(x)
}

/// Solve the complex numeric system with the selected method.
pub(crate) fn solve_complex(
    a: DMatrix<Complex<f64>>,
    b: DVector<Complex<f64>>,
    method: SolverMethod,
) -> Option<DVector<Complex<f64>>> {
    let n = a.nrows();
    let method = match method {
        SolverMethod::Auto if n <= 2 => SolverMethod::Adjugate,
        SolverMethod::Auto => SolverMethod::Lu,
        other => other,
    };
    trace!("complex solve: dim {n}, method {method}");
    match method {
        SolverMethod::Lu => a.lu().solve(&b),
        SolverMethod::GaussianElimination => solve_gaussian(a, b),
        SolverMethod::Adjugate if n <= 3 => solve_adjugate(&a, &b),
        // Adjugate requested for a larger system: fall back to LU.
        _ => a.lu().solve(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_gaussian_exact_2x2() {
        // 2x + y = 5, x - y = 1  =>  x = 2, y = 1
        let a = DMatrix::from_row_slice(
            2,
            2,
            &[rat(2, 1), rat(1, 1), rat(1, 1), rat(-1, 1)],
        );
        let b = DVector::from_vec(vec![rat(5, 1), rat(1, 1)]);
        let x = solve_gaussian(a, b).unwrap();
        assert_eq!(x[0], rat(2, 1));
        assert_eq!(x[1], rat(1, 1));
    }

    #[test]
    fn test_gaussian_exact_fractions_stay_exact() {
        // (1/3)x = 1  =>  x = 3 exactly
        let a = DMatrix::from_row_slice(1, 1, &[rat(1, 3)]);
        let b = DVector::from_vec(vec![rat(1, 1)]);
        let x = solve_gaussian(a, b).unwrap();
        assert_eq!(x[0], rat(3, 1));
    }

    #[test]
    fn test_gaussian_singular_returns_none() {
        let a = DMatrix::from_row_slice(
            2,
            2,
            &[rat(1, 1), rat(2, 1), rat(2, 1), rat(4, 1)],
        );
        let b = DVector::from_vec(vec![rat(1, 1), rat(2, 1)]);
        assert!(solve_gaussian(a, b).is_none());
    }

    #[test]
    fn test_gaussian_needs_pivoting() {
        // Zero on the initial diagonal; must swap rows.
        let a = DMatrix::from_row_slice(
            2,
            2,
            &[rat(0, 1), rat(1, 1), rat(1, 1), rat(0, 1)],
        );
        let b = DVector::from_vec(vec![rat(7, 1), rat(3, 1)]);
        let x = solve_gaussian(a, b).unwrap();
        assert_eq!(x[0], rat(3, 1));
        assert_eq!(x[1], rat(7, 1));
    }

    #[test]
    fn test_complex_methods_agree() {
        let j = Complex::new(0.0, 1.0);
        let a = DMatrix::from_row_slice(
            2,
            2,
            &[
                Complex::new(2.0, 0.0),
                j,
                -j,
                Complex::new(1.0, 0.0),
            ],
        );
        let b = DVector::from_vec(vec![Complex::new(1.0, 0.0), Complex::new(0.0, 1.0)]);
        let lu = solve_complex(a.clone(), b.clone(), SolverMethod::Lu).unwrap();
        let ge = solve_complex(a.clone(), b.clone(), SolverMethod::GaussianElimination).unwrap();
        let adj = solve_complex(a, b, SolverMethod::Adjugate).unwrap();
        for i in 0..2 {
            assert!((lu[i] - ge[i]).norm() < 1e-12);
            assert!((lu[i] - adj[i]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_method_names_round_trip() {
        for m in [
            SolverMethod::Auto,
            SolverMethod::Lu,
            SolverMethod::GaussianElimination,
            SolverMethod::Adjugate,
        ] {
            assert_eq!(SolverMethod::from_name(m.name()), Some(m));
        }
        assert_eq!(SolverMethod::from_name("qr"), None);
    }
}
