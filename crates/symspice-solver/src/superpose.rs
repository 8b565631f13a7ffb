//! Recombination of per-domain contributions into one result.
//!
//! Each solved sub-circuit contributes one value for the queried
//! quantity; superposition is the domain-tagged union of those values.
//! Multiple Laplace contributions sum as rational functions; a repeated
//! DC or AC tag indicates a decomposition bug and is rejected.

use std::fmt;

use indexmap::IndexMap;
use nalgebra::Complex;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use symspice_expr::{inverse_laplace, RatFun, TimeFunction};

use crate::classify::DomainTag;
use crate::error::{Error, Result};

/// The value of one quantity in one solved sub-circuit.
#[derive(Debug, Clone)]
pub enum SolvedContribution {
    Dc(BigRational),
    Ac {
        omega: BigRational,
        phasor: Complex<f64>,
    },
    Laplace(RatFun),
}

impl SolvedContribution {
    pub fn tag(&self) -> DomainTag {
        match self {
            SolvedContribution::Dc(_) => DomainTag::Dc,
            SolvedContribution::Ac { omega, .. } => DomainTag::Ac(omega.clone()),
            SolvedContribution::Laplace(_) => DomainTag::Laplace,
        }
    }
}

/// A quantity recombined across all analysis domains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeResult {
    dc: Option<BigRational>,
    ac: IndexMap<BigRational, Complex<f64>>,
    laplace: Option<RatFun>,
}

/// Combine per-domain contributions into a composite result.
pub fn combine(contributions: Vec<SolvedContribution>) -> Result<CompositeResult> {
    let mut result = CompositeResult::default();
    for contribution in contributions {
        match contribution {
            SolvedContribution::Dc(v) => {
                if result.dc.replace(v).is_some() {
                    return Err(Error::DuplicateDomain(DomainTag::Dc));
                }
            }
            SolvedContribution::Ac { omega, phasor } => {
                if result.ac.insert(omega.clone(), phasor).is_some() {
                    return Err(Error::DuplicateDomain(DomainTag::Ac(omega)));
                }
            }
            SolvedContribution::Laplace(f) => {
                let sum = match result.laplace.take() {
                    Some(existing) => existing + f,
                    None => f,
                };
                result.laplace = Some(sum);
            }
        }
    }
    Ok(result)
}

impl CompositeResult {
    /// The DC part, if any sub-circuit produced one.
    pub fn dc(&self) -> Option<&BigRational> {
        self.dc.as_ref()
    }

    /// The phasor at one angular frequency.
    pub fn ac(&self, omega: &BigRational) -> Option<Complex<f64>> {
        self.ac.get(omega).copied()
    }

    /// All AC parts in frequency-first-seen order.
    pub fn ac_parts(&self) -> impl Iterator<Item = (&BigRational, Complex<f64>)> {
        self.ac.iter().map(|(w, p)| (w, *p))
    }

    /// The Laplace-domain part `F(s)`.
    pub fn laplace(&self) -> Option<&RatFun> {
        self.laplace.as_ref()
    }

    /// The domain tags present, in DC, AC, Laplace order.
    pub fn domains(&self) -> Vec<DomainTag> {
        let mut tags = Vec::new();
        if self.dc.is_some() {
            tags.push(DomainTag::Dc);
        }
        for omega in self.ac.keys() {
            tags.push(DomainTag::Ac(omega.clone()));
        }
        if self.laplace.is_some() {
            tags.push(DomainTag::Laplace);
        }
        tags
    }

    pub fn is_zero(&self) -> bool {
        self.domains().is_empty()
    }

    /// Reconstruct the time-domain waveform: the DC constant, one
    /// cosine per AC part, and the inverse Laplace transform of the
    /// transient part.
    pub fn transient(&self) -> Result<TimeFunction> {
        let mut f = TimeFunction::zero();
        if let Some(dc) = &self.dc {
            f.extend(TimeFunction::constant(dc.to_f64().unwrap_or(0.0)));
        }
        for (omega, phasor) in self.ac_parts() {
            f.extend(TimeFunction::cosine(
                phasor.norm(),
                omega.to_f64().unwrap_or(0.0),
                phasor.arg(),
            ));
        }
        if let Some(transform) = &self.laplace {
            f.extend(inverse_laplace(transform)?);
        }
        Ok(f)
    }
}

impl fmt::Display for CompositeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
            if first {
                first = false;
                Ok(())
            } else {
                write!(f, " + ")
            }
        };
        if let Some(dc) = &self.dc {
            sep(f)?;
            write!(f, "{dc}")?;
        }
        for (omega, phasor) in &self.ac {
            sep(f)?;
            write!(
                f,
                "{}*cos({}*t + {:.4})",
                phasor.norm(),
                omega,
                phasor.arg()
            )?;
        }
        if let Some(transform) = &self.laplace {
            sep(f)?;
            write!(f, "ilt[{transform}]")?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}
