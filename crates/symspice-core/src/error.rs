//! Error types for symspice-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A component referenced a node the netlist does not track.
    /// Unreachable through the public API; treated as a programming error.
    #[error("unresolved node {node} referenced by {component}")]
    UnresolvedNode { component: String, node: String },

    /// A stamp cannot be formed for this component.
    #[error("degenerate component {name}: {reason}")]
    DegenerateComponent { name: String, reason: String },

    /// A component's value is still an unbound symbol at solve time.
    #[error("component {component} has unbound symbolic value {symbol}")]
    UnboundSymbol { component: String, symbol: String },

    #[error("duplicate component name: {0}")]
    DuplicateComponent(String),

    #[error("no component named {0}")]
    UnknownComponent(String),

    #[error("invalid component {name}: {reason}")]
    InvalidComponent { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
