//! # Symspice
//!
//! Symbolic analysis of linear time-invariant circuits.
//!
//! Symspice solves lumped LTI networks exactly: DC answers are exact
//! rationals, AC answers are phasors per excitation frequency, and
//! transients are rational functions of the Laplace variable `s` with a
//! closed-form inverse transform. Sources are classified by excitation,
//! the circuit is decomposed into one sub-circuit per excitation class,
//! each class is solved in its own scalar domain, and the contributions
//! are recombined by superposition.
//!
//! ## Quick Start
//!
//! ```
//! use symspice::prelude::*;
//!
//! let netlist = parse(r#"
//! Voltage Divider
//! V1 1 0 10
//! R1 1 2 6
//! R2 2 0 4
//! .end
//! "#).unwrap();
//!
//! let mut analysis = Analysis::new(netlist);
//! let v2 = analysis.solve_node_voltage("2").unwrap();
//! assert_eq!(v2.dc().unwrap(), &BigRational::from_integer(4.into()));
//! ```
//!
//! ## Transient response
//!
//! ```
//! use symspice::prelude::*;
//!
//! let netlist = parse(r#"
//! RC Step
//! V1 1 0 step 20
//! R1 1 2 5
//! C1 2 0 10
//! .end
//! "#).unwrap();
//!
//! let mut analysis = Analysis::new(netlist);
//! let vc = analysis.solve_node_voltage("2").unwrap();
//! let v_of_t = vc.transient().unwrap();
//! // v(t) = 20 * (1 - exp(-t/50))
//! assert!((v_of_t.eval(50.0) - 20.0 * (1.0 - (-1.0f64).exp())).abs() < 1e-9);
//! ```

// Re-export member crates
pub use symspice_core as core;
pub use symspice_expr as expr;
pub use symspice_parser as parser;
pub use symspice_solver as solver;

// ============================================================================
// Convenient re-exports from symspice_core
// ============================================================================

pub use symspice_core::{
    Component,
    ComponentKind,
    ComponentSpec,
    // Errors
    Error as CoreError,
    Excitation,
    // MNA assembly
    MnaScalar,
    MnaSystem,
    // Netlist representation
    Netlist,
    Node,
    NodeId,
    Tone,
    Transient,
    Value,
    parse_value,
};

// ============================================================================
// Convenient re-exports from symspice_expr
// ============================================================================

pub use symspice_expr::{
    Error as ExprError,
    // Polynomials and rational functions of s
    Poly,
    RatFun,
    // Time-domain reconstruction
    TimeFunction,
    TimeTerm,
    inverse_laplace,
    parse_sexpr,
};

// ============================================================================
// Convenient re-exports from symspice_parser
// ============================================================================

pub use symspice_parser::{Error as ParseError, parse};

// ============================================================================
// Convenient re-exports from symspice_solver
// ============================================================================

pub use symspice_solver::{
    // Cached query interface
    Analysis,
    Classification,
    // Superposition
    CompositeResult,
    // Source classification and decomposition
    DomainTag,
    // Errors
    Error as SolverError,
    // Assembly policy
    Formulation,
    Quantity,
    // Singularity diagnostics
    Reason,
    SolvedContribution,
    // Linear solve strategy
    SolverMethod,
    SubCircuit,
    classify,
    combine,
    decompose,
    diagnose,
    solve_ac,
    solve_dc,
    solve_laplace,
};

// ============================================================================
// Re-export commonly used external types
// ============================================================================

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Re-export of nalgebra's dynamic vector type.
pub use nalgebra::DVector;

/// Re-export of num_complex's Complex type.
pub use num_complex::Complex;

/// Re-export of num_rational's arbitrary-precision rational type.
pub use num_rational::BigRational;

/// Re-export of num_bigint's integer type, the numerator and
/// denominator of [`BigRational`].
pub use num_bigint::BigInt;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module containing commonly used types and traits.
///
/// ```
/// use symspice::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::{ComponentSpec, Excitation, Netlist, NodeId, Value};

    // Parser
    pub use crate::parse;

    // Solver
    pub use crate::{Analysis, CompositeResult, DomainTag, Formulation, SolverMethod};

    // Expressions
    pub use crate::{RatFun, TimeFunction};

    // Common external types
    pub use crate::{BigInt, BigRational, Complex};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_parse_and_solve() {
        let netlist = parse("Test\nV1 1 0 10\nR1 1 0 1k\n.end\n").unwrap();
        let mut analysis = Analysis::new(netlist);
        let v1 = analysis.solve_node_voltage("1").unwrap();
        assert_eq!(v1.dc().unwrap(), &BigRational::from_integer(BigInt::from(10)));
    }

    #[test]
    fn test_prelude_covers_workflow() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::current_source(
                "I1",
                "0",
                "1",
                Excitation::dc(BigRational::from_integer(2.into())),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 3))
            .unwrap();
        let mut analysis = Analysis::new(netlist).with_formulation(Formulation::Auto);
        let v1 = analysis.solve_node_voltage("1").unwrap();
        assert_eq!(v1.dc().unwrap(), &BigRational::from_integer(6.into()));
    }
}
