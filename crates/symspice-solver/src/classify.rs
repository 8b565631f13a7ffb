//! Grouping of independent sources by excitation class.
//!
//! Superposition splits the analysis into one sub-circuit per class:
//! a single DC class, one AC class per distinct angular frequency, and
//! a single Laplace class for every transient excitation. Initial
//! conditions on reactive elements also demand a Laplace sub-circuit
//! (the source-free response), even when no source is transient.

use std::fmt;

use indexmap::IndexMap;
use num_rational::BigRational;
use num_traits::Zero;
use symspice_core::{ComponentKind, Netlist};

use crate::error::{Error, Result};

/// Identifies the analysis domain of one sub-circuit or contribution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainTag {
    Dc,
    /// AC steady state at the given angular frequency (rad/s, exact).
    Ac(BigRational),
    Laplace,
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainTag::Dc => write!(f, "dc"),
            DomainTag::Ac(omega) => write!(f, "ac(omega={omega})"),
            DomainTag::Laplace => write!(f, "laplace"),
        }
    }
}

/// The classification of a netlist's independent sources.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Names of sources with a nonzero DC part.
    pub dc: Vec<String>,
    /// Per distinct angular frequency, the sources with a tone there.
    /// Frequencies appear in first-encounter order.
    pub ac: IndexMap<BigRational, Vec<String>>,
    /// Names of sources with a transient (step or s-domain) part.
    pub laplace: Vec<String>,
    /// Whether any reactive element carries an initial condition.
    pub has_initial_conditions: bool,
}

impl Classification {
    /// Whether a Laplace sub-circuit is required.
    pub fn needs_laplace(&self) -> bool {
        !self.laplace.is_empty() || self.has_initial_conditions
    }

    /// The domain tags of the sub-circuits this classification yields,
    /// in DC, AC (frequency order), Laplace order.
    pub fn domains(&self) -> Vec<DomainTag> {
        let mut tags = Vec::new();
        if !self.dc.is_empty() {
            tags.push(DomainTag::Dc);
        }
        for omega in self.ac.keys() {
            tags.push(DomainTag::Ac(omega.clone()));
        }
        if self.needs_laplace() {
            tags.push(DomainTag::Laplace);
        }
        tags
    }

    /// True when no source is excited and no initial condition is set.
    pub fn is_empty(&self) -> bool {
        self.domains().is_empty()
    }
}

/// Classify every independent source in the netlist.
///
/// A source with both a DC offset and AC tones is split across the
/// matching groups. A tone at zero or negative angular frequency is
/// ambiguous and rejected.
pub fn classify(netlist: &Netlist) -> Result<Classification> {
    let mut classification = Classification::default();

    for component in netlist.components() {
        match &component.kind {
            ComponentKind::Capacitor { ic: Some(_), .. }
            | ComponentKind::Inductor { ic: Some(_), .. } => {
                classification.has_initial_conditions = true;
            }
            _ => {}
        }

        let Some(excitation) = component.excitation() else {
            continue;
        };
        if excitation.dc_part().is_some() {
            classification.dc.push(component.name.clone());
        }
        for tone in &excitation.tones {
            if tone.amplitude.is_zero() {
                continue;
            }
            if tone.omega <= BigRational::zero() {
                return Err(Error::ClassificationAmbiguity {
                    component: component.name.clone(),
                    detail: format!(
                        "tone at angular frequency {} is not a proper AC class; \
                         use a dc part for omega = 0",
                        tone.omega
                    ),
                });
            }
            let group = classification.ac.entry(tone.omega.clone()).or_default();
            if !group.contains(&component.name) {
                group.push(component.name.clone());
            }
        }
        if excitation.transient_part().is_some() {
            classification.laplace.push(component.name.clone());
        }
    }

    // With initial conditions present, a DC steady-state solve cannot be
    // superposed with the zero-input response: the sum would not honor
    // v(0+) = v0. Those sources join the Laplace class instead, driven
    // as V/s, so the whole circuit is solved as one initial-value
    // problem.
    if classification.has_initial_conditions && !classification.dc.is_empty() {
        for name in std::mem::take(&mut classification.dc) {
            if !classification.laplace.contains(&name) {
                classification.laplace.push(name);
            }
        }
    }

    Ok(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use symspice_core::{ComponentSpec, Excitation};

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_initial_conditions_pull_dc_sources_into_laplace() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(5)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "2", 1))
            .unwrap();
        netlist
            .add(ComponentSpec::capacitor("C1", "2", "0", 1).with_ic(rat(3)))
            .unwrap();

        let c = classify(&netlist).unwrap();
        assert!(c.dc.is_empty());
        assert_eq!(c.laplace, vec!["V1"]);
        assert_eq!(c.domains(), vec![DomainTag::Laplace]);
    }

    #[test]
    fn test_dc_and_ac_source_is_split() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(6)).with_tone(symspice_core::Tone {
                    amplitude: rat(2),
                    omega: rat(100),
                    phase_deg: rat(0),
                }),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 4))
            .unwrap();

        let c = classify(&netlist).unwrap();
        assert_eq!(c.dc, vec!["V1"]);
        assert_eq!(c.ac.len(), 1);
        assert_eq!(c.ac[&rat(100)], vec!["V1"]);
        assert!(c.laplace.is_empty());
        assert_eq!(
            c.domains(),
            vec![DomainTag::Dc, DomainTag::Ac(rat(100))]
        );
    }

    #[test]
    fn test_distinct_frequencies_get_distinct_groups() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::ac(rat(5), rat(100)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::current_source(
                "I1",
                "1",
                "0",
                Excitation::ac(rat(1), rat(200)),
            ))
            .unwrap();

        let c = classify(&netlist).unwrap();
        assert_eq!(c.ac.len(), 2);
        assert_eq!(c.domains().len(), 2);
    }

    #[test]
    fn test_zero_frequency_tone_is_ambiguous() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::ac(rat(5), rat(0)),
            ))
            .unwrap();
        assert!(matches!(
            classify(&netlist),
            Err(Error::ClassificationAmbiguity { .. })
        ));
    }

    #[test]
    fn test_initial_condition_demands_laplace() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::capacitor("C1", "1", "0", 10).with_ic(rat(5)))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 4))
            .unwrap();

        let c = classify(&netlist).unwrap();
        assert!(c.laplace.is_empty());
        assert!(c.needs_laplace());
        assert_eq!(c.domains(), vec![DomainTag::Laplace]);
    }

    #[test]
    fn test_step_source_is_laplace() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::step(rat(20)),
            ))
            .unwrap();
        let c = classify(&netlist).unwrap();
        assert!(c.dc.is_empty());
        assert_eq!(c.laplace, vec!["V1"]);
    }
}
