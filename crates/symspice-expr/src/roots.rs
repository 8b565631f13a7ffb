//! Polynomial root finding.
//!
//! Degrees one and two are solved in closed form; higher degrees fall back
//! to the eigenvalues of the companion matrix (the numeric fallback the
//! symbolic-engine contract allows when exact factoring is unavailable).

use nalgebra::DMatrix;
use num_complex::Complex;
use num_traits::ToPrimitive;

use crate::error::{Error, Result};
use crate::poly::Poly;

/// All complex roots of `p`, with multiplicity (listed repeatedly).
pub fn poly_roots(p: &Poly) -> Result<Vec<Complex<f64>>> {
    if p.is_zero() {
        return Err(Error::RootFinding(
            "zero polynomial has no well-defined roots".into(),
        ));
    }
    let monic = p.monic();
    let n = monic.degree();
    match n {
        0 => Ok(Vec::new()),
        1 => {
            // s + c = 0
            let c = monic.coeff(0).to_f64().ok_or_else(too_large)?;
            Ok(vec![Complex::new(-c, 0.0)])
        }
        2 => {
            // s^2 + bs + c = 0
            let b = monic.coeff(1).to_f64().ok_or_else(too_large)?;
            let c = monic.coeff(0).to_f64().ok_or_else(too_large)?;
            let disc = Complex::new(b * b - 4.0 * c, 0.0).sqrt();
            let b = Complex::new(b, 0.0);
            let two = Complex::new(2.0, 0.0);
            Ok(vec![(-b + disc) / two, (-b - disc) / two])
        }
        _ => companion_roots(&monic),
    }
}

fn too_large() -> Error {
    Error::RootFinding("coefficient exceeds f64 range".into())
}

/// Eigenvalues of the companion matrix of a monic polynomial.
fn companion_roots(monic: &Poly) -> Result<Vec<Complex<f64>>> {
    let n = monic.degree();
    let mut m = DMatrix::<f64>::zeros(n, n);
    for i in 1..n {
        m[(i, i - 1)] = 1.0;
    }
    for i in 0..n {
        let c = monic.coeff(i).to_f64().ok_or_else(too_large)?;
        m[(i, n - 1)] = -c;
    }
    let eig = m.complex_eigenvalues();
    Ok(eig.iter().copied().collect())
}

/// Cluster numerically close roots into `(root, multiplicity)` pairs.
///
/// Roots within `tol` (relative to the overall root magnitude scale) are
/// merged and averaged, so a repeated pole found by the eigenvalue solver
/// is reported once with its multiplicity.
pub fn cluster_roots(roots: &[Complex<f64>]) -> Vec<(Complex<f64>, usize)> {
    let scale = roots
        .iter()
        .map(|r| r.norm())
        .fold(1.0_f64, f64::max);
    let tol = 1e-6 * scale;

    let mut clusters: Vec<(Complex<f64>, usize)> = Vec::new();
    for &r in roots {
        if let Some((center, count)) = clusters
            .iter_mut()
            .find(|(center, _)| (*center - r).norm() <= tol)
        {
            // Running average keeps the cluster centered.
            let n = *count as f64;
            *center = (*center * n + r) / (n + 1.0);
            *count += 1;
        } else {
            clusters.push((r, 1));
        }
    }
    clusters
}
