use thiserror::Error;

use crate::classify::DomainTag;
use crate::diagnose::Reason;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] symspice_core::Error),

    #[error(transparent)]
    Expr(#[from] symspice_expr::Error),

    /// The assembled system has no unique solution. `reasons` carries the
    /// structural diagnosis of the offending netlist, in detection order.
    #[error("singular system in {domain} analysis: {}", format_reasons(.reasons))]
    Singular {
        domain: DomainTag,
        reasons: Vec<Reason>,
    },

    /// A source excitation cannot be assigned to a single analysis class.
    #[error("cannot classify source '{component}': {detail}")]
    ClassificationAmbiguity { component: String, detail: String },

    /// Two superposition contributions carry the same domain tag.
    #[error("duplicate contribution for domain {0}")]
    DuplicateDomain(DomainTag),

    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// The component kind has no well-defined branch current.
    #[error("component '{0}' has no branch current")]
    NoBranchCurrent(String),
}

fn format_reasons(reasons: &[Reason]) -> String {
    if reasons.is_empty() {
        return "no structural cause identified".into();
    }
    reasons
        .iter()
        .map(Reason::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
