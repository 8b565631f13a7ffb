//! Core circuit model: netlists, components, excitations, and the
//! scalar-generic Modified Nodal Analysis system.
//!
//! This crate owns the data model only. Domain-specific stamping and
//! solving live in `symspice-solver`; text netlist parsing lives in
//! `symspice-parser`.

pub mod component;
pub mod error;
pub mod excitation;
pub mod mna;
pub mod netlist;
pub mod node;
pub mod units;

pub use component::{Component, ComponentKind, ComponentSpec, Value};
pub use error::{Error, Result};
pub use excitation::{Excitation, Tone, Transient};
pub use mna::{MnaScalar, MnaSystem};
pub use netlist::Netlist;
pub use node::{Node, NodeId};
pub use units::parse_value;
