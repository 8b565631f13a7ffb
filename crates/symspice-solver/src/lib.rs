//! Symbolic circuit solving for Symspice.
//!
//! The pipeline: [`classify`] groups independent sources by excitation
//! class, [`decompose`] builds one sub-circuit per class with the other
//! sources killed, each sub-circuit is assembled and solved in its own
//! scalar domain (exact rationals for DC, complex phasors for AC,
//! rational functions of `s` for transients), and [`superpose::combine`]
//! recombines the per-domain contributions. [`Analysis`] wraps the whole
//! pipeline behind a cached query interface.
//!
//! [`classify`]: classify::classify
//! [`decompose`]: decompose::decompose

pub mod ac;
pub mod analysis;
mod assemble;
pub mod cache;
pub mod classify;
pub mod dc;
pub mod decompose;
pub mod diagnose;
pub mod error;
pub mod laplace;
pub mod linear;
pub mod superpose;

pub use ac::{solve_ac, AcSolution};
pub use analysis::Analysis;
pub use assemble::{Formulation, UnknownLayout};
pub use cache::{Quantity, ResultCache};
pub use classify::{classify, Classification, DomainTag};
pub use dc::{solve_dc, DcSolution};
pub use decompose::{decompose, SubCircuit};
pub use diagnose::{diagnose, Reason};
pub use error::{Error, Result};
pub use laplace::{solve_laplace, LaplaceSolution};
pub use linear::SolverMethod;
pub use superpose::{combine, CompositeResult, SolvedContribution};
