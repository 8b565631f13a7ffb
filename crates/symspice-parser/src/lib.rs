//! Netlist text parser for symspice.
//!
//! Parses a small SPICE-flavored card language into a
//! [`Netlist`](symspice_core::Netlist).
//!
//! # Example
//!
//! ```
//! use symspice_parser::parse;
//!
//! let netlist = parse(r#"
//! Voltage Divider
//! V1 1 0 10
//! R1 1 2 1k
//! R2 2 0 1k
//! .end
//! "#).unwrap();
//!
//! assert_eq!(netlist.num_components(), 3);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{Error, Result};
pub use parser::parse;
