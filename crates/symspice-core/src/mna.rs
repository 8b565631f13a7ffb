//! Modified Nodal Analysis system, generic over the scalar domain.
//!
//! The same assembly code serves three instantiations: exact rationals
//! for DC, complex phasors for AC, and rational functions of `s` for
//! Laplace-domain analysis. Unknowns are the non-ground node voltages
//! followed by one auxiliary branch current per voltage-source-like
//! element.
//!
//! All stamps are additive: assembling an element contributes to the
//! existing entries, so element order never changes the system. Ground
//! is represented as `None` in stamp positions and its row/column is
//! simply omitted.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use nalgebra::{Complex, DMatrix, DVector};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use symspice_expr::RatFun;

/// Scalar types an MNA system can be assembled and solved over.
pub trait MnaScalar:
    Clone
    + PartialEq
    + fmt::Debug
    + fmt::Display
    + 'static
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    /// Relative weight used for pivot selection during elimination.
    /// Zero means the entry cannot be a pivot.
    fn pivot_weight(&self) -> f64 {
        if self.is_zero() { 0.0 } else { 1.0 }
    }
}

impl MnaScalar for BigRational {
    fn pivot_weight(&self) -> f64 {
        self.to_f64().map(f64::abs).unwrap_or(1.0)
    }
}

impl MnaScalar for Complex<f64> {
    fn pivot_weight(&self) -> f64 {
        self.norm()
    }
}

// Exact arithmetic: any nonzero rational function is an acceptable pivot.
impl MnaScalar for RatFun {}

/// The assembled system `A x = b`.
///
/// Rows `0..num_nodes` are the KCL equations for non-ground nodes; rows
/// `num_nodes..` are the auxiliary branch equations.
#[derive(Debug, Clone)]
pub struct MnaSystem<T: MnaScalar> {
    num_nodes: usize,
    num_branches: usize,
    matrix: DMatrix<T>,
    rhs: DVector<T>,
}

impl<T: MnaScalar> MnaSystem<T> {
    /// Create an all-zero system for the given unknown counts.
    pub fn new(num_nodes: usize, num_branches: usize) -> Self {
        let dim = num_nodes + num_branches;
        Self {
            num_nodes,
            num_branches,
            matrix: DMatrix::from_element(dim, dim, T::zero()),
            rhs: DVector::from_element(dim, T::zero()),
        }
    }

    /// Total number of unknowns.
    pub fn dim(&self) -> usize {
        self.num_nodes + self.num_branches
    }

    /// Number of non-ground node voltage unknowns.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of auxiliary branch current unknowns.
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    /// Row index of the k-th auxiliary branch equation.
    pub fn branch_row(&self, branch: usize) -> usize {
        debug_assert!(branch < self.num_branches);
        self.num_nodes + branch
    }

    /// Add a contribution to a matrix entry.
    pub fn add(&mut self, row: usize, col: usize, value: T) {
        self.matrix[(row, col)] += value;
    }

    /// Add a contribution to a right-hand-side entry.
    pub fn add_rhs(&mut self, row: usize, value: T) {
        self.rhs[row] += value;
    }

    /// Stamp an admittance `y` between two nodes (`None` = ground).
    pub fn stamp_admittance(&mut self, a: Option<usize>, b: Option<usize>, y: T) {
        if let Some(i) = a {
            self.matrix[(i, i)] += y.clone();
        }
        if let Some(j) = b {
            self.matrix[(j, j)] += y.clone();
        }
        if let (Some(i), Some(j)) = (a, b) {
            self.matrix[(i, j)] -= y.clone();
            self.matrix[(j, i)] -= y;
        }
    }

    /// Stamp an independent current source driving current `i` from node
    /// `a` through the source into node `b`.
    pub fn stamp_current_source(&mut self, a: Option<usize>, b: Option<usize>, i: T) {
        if let Some(p) = a {
            self.rhs[p] -= i.clone();
        }
        if let Some(n) = b {
            self.rhs[n] += i;
        }
    }

    /// Stamp an independent voltage source `v(a) - v(b) = v` with the
    /// given auxiliary branch. The branch current flows from `a` to `b`
    /// inside the source.
    pub fn stamp_voltage_source(
        &mut self,
        a: Option<usize>,
        b: Option<usize>,
        branch: usize,
        v: T,
    ) {
        let row = self.branch_row(branch);
        if let Some(p) = a {
            self.matrix[(p, row)] += T::one();
            self.matrix[(row, p)] += T::one();
        }
        if let Some(n) = b {
            self.matrix[(n, row)] -= T::one();
            self.matrix[(row, n)] -= T::one();
        }
        self.rhs[row] += v;
    }

    /// Stamp a series impedance `z` into an existing branch equation,
    /// turning it into `v(a) - v(b) - z*i = v_source`.
    pub fn stamp_branch_impedance(&mut self, branch: usize, z: T) {
        let row = self.branch_row(branch);
        self.matrix[(row, row)] -= z;
    }

    /// Stamp a voltage-controlled current source: current `gm * v(cp, cn)`
    /// flows from `op` through the source into `on`.
    pub fn stamp_vccs(
        &mut self,
        op: Option<usize>,
        on: Option<usize>,
        cp: Option<usize>,
        cn: Option<usize>,
        gm: T,
    ) {
        for (out, sign_flip) in [(op, false), (on, true)] {
            let Some(row) = out else { continue };
            for (ctrl, ctrl_neg) in [(cp, false), (cn, true)] {
                let Some(col) = ctrl else { continue };
                let negate = sign_flip != ctrl_neg;
                if negate {
                    self.matrix[(row, col)] -= gm.clone();
                } else {
                    self.matrix[(row, col)] += gm.clone();
                }
            }
        }
    }

    /// The assembled matrix.
    pub fn matrix(&self) -> &DMatrix<T> {
        &self.matrix
    }

    /// The assembled right-hand side.
    pub fn rhs(&self) -> &DVector<T> {
        &self.rhs
    }

    /// Consume the system, yielding matrix and right-hand side.
    pub fn into_parts(self) -> (DMatrix<T>, DVector<T>) {
        (self.matrix, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_admittance_stamp_four_corners() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(2, 0);
        sys.stamp_admittance(Some(0), Some(1), rat(1, 10));
        assert_eq!(sys.matrix()[(0, 0)], rat(1, 10));
        assert_eq!(sys.matrix()[(1, 1)], rat(1, 10));
        assert_eq!(sys.matrix()[(0, 1)], rat(-1, 10));
        assert_eq!(sys.matrix()[(1, 0)], rat(-1, 10));
    }

    #[test]
    fn test_admittance_to_ground_stamps_diagonal_only() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(1, 0);
        sys.stamp_admittance(Some(0), None, rat(1, 4));
        assert_eq!(sys.matrix()[(0, 0)], rat(1, 4));
    }

    #[test]
    fn test_stamps_are_additive() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(1, 0);
        sys.stamp_admittance(Some(0), None, rat(1, 2));
        sys.stamp_admittance(Some(0), None, rat(1, 3));
        assert_eq!(sys.matrix()[(0, 0)], rat(5, 6));
    }

    #[test]
    fn test_voltage_source_stamp() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(2, 1);
        sys.stamp_voltage_source(Some(0), Some(1), 0, rat(6, 1));
        let row = sys.branch_row(0);
        assert_eq!(row, 2);
        assert_eq!(sys.matrix()[(0, row)], rat(1, 1));
        assert_eq!(sys.matrix()[(row, 0)], rat(1, 1));
        assert_eq!(sys.matrix()[(1, row)], rat(-1, 1));
        assert_eq!(sys.matrix()[(row, 1)], rat(-1, 1));
        assert_eq!(sys.rhs()[row], rat(6, 1));
    }

    #[test]
    fn test_branch_impedance_subtracts_diagonal() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(1, 1);
        sys.stamp_voltage_source(Some(0), None, 0, rat(0, 1));
        sys.stamp_branch_impedance(0, rat(20, 1));
        assert_eq!(sys.matrix()[(1, 1)], rat(-20, 1));
    }

    #[test]
    fn test_current_source_rhs_signs() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(2, 0);
        sys.stamp_current_source(Some(0), Some(1), rat(2, 1));
        assert_eq!(sys.rhs()[0], rat(-2, 1));
        assert_eq!(sys.rhs()[1], rat(2, 1));
    }

    #[test]
    fn test_vccs_stamp_signs() {
        let mut sys: MnaSystem<BigRational> = MnaSystem::new(4, 0);
        sys.stamp_vccs(Some(0), Some(1), Some(2), Some(3), rat(1, 5));
        assert_eq!(sys.matrix()[(0, 2)], rat(1, 5));
        assert_eq!(sys.matrix()[(0, 3)], rat(-1, 5));
        assert_eq!(sys.matrix()[(1, 2)], rat(-1, 5));
        assert_eq!(sys.matrix()[(1, 3)], rat(1, 5));
    }

    #[test]
    fn test_ratfun_system() {
        let s = RatFun::var();
        let mut sys: MnaSystem<RatFun> = MnaSystem::new(1, 0);
        // Capacitor admittance s*C with C = 1/10.
        sys.stamp_admittance(Some(0), None, s.scale(&rat(1, 10)));
        assert_eq!(sys.matrix()[(0, 0)], RatFun::var().scale(&rat(1, 10)));
    }
}
