//! Sub-circuit construction for superposition.
//!
//! Each domain tag gets a copy of the netlist in which sources outside
//! the class are killed: voltage sources become 0 V branches (the branch
//! current unknown is retained), current sources are removed entirely
//! (open circuit). Sources inside the class keep only the excitation
//! part matching the class.

use log::debug;
use symspice_core::{Excitation, Netlist};
use symspice_expr::RatFun;

use crate::classify::{Classification, DomainTag};
use crate::error::Result;

/// One sub-circuit of the superposition decomposition.
#[derive(Debug, Clone)]
pub struct SubCircuit {
    pub domain: DomainTag,
    pub netlist: Netlist,
    /// The surviving excited sources, in netlist order. Empty for a
    /// pure initial-condition (source-free) Laplace sub-circuit.
    pub sources: Vec<String>,
}

/// Decompose a netlist into one sub-circuit per source class.
///
/// A single-class netlist yields exactly one sub-circuit.
pub fn decompose(netlist: &Netlist, classification: &Classification) -> Result<Vec<SubCircuit>> {
    let mut subs = Vec::new();
    for domain in classification.domains() {
        subs.push(restrict(netlist, &domain, classification.has_initial_conditions)?);
    }
    debug!(
        "decomposed netlist v{} into {} sub-circuit(s)",
        netlist.version(),
        subs.len()
    );
    Ok(subs)
}

/// Build the sub-circuit for one domain tag. With `fold_dc` set, DC
/// excitation parts ride along in the Laplace class as `V/s`.
fn restrict(netlist: &Netlist, domain: &DomainTag, fold_dc: bool) -> Result<SubCircuit> {
    let mut sub = netlist.clone();
    let mut sources = Vec::new();
    let mut dead_current_sources = Vec::new();

    let names: Vec<String> = netlist
        .independent_sources()
        .map(|c| c.name.clone())
        .collect();
    for name in names {
        let component = sub
            .component(&name)
            .ok_or_else(|| crate::error::Error::UnknownComponent(name.clone()))?;
        let is_current = matches!(
            component.kind,
            symspice_core::ComponentKind::CurrentSource { .. }
        );
        let excitation = component
            .excitation()
            .ok_or_else(|| crate::error::Error::UnknownComponent(name.clone()))?;

        let kept = part_for(excitation, domain, fold_dc);
        match kept {
            Some(part) => {
                sub.set_excitation(&name, part)?;
                sources.push(name);
            }
            None if is_current => dead_current_sources.push(name),
            None => sub.set_excitation(&name, Excitation::killed())?,
        }
    }

    for name in dead_current_sources {
        sub.remove(&name)?;
    }

    Ok(SubCircuit {
        domain: domain.clone(),
        netlist: sub,
        sources,
    })
}

/// The part of an excitation belonging to a domain, or `None` if the
/// source is silent there.
fn part_for(excitation: &Excitation, domain: &DomainTag, fold_dc: bool) -> Option<Excitation> {
    match domain {
        DomainTag::Dc => excitation.dc_part().map(Excitation::dc),
        DomainTag::Ac(omega) => {
            let tones: Vec<_> = excitation.tones_at(omega).into_iter().cloned().collect();
            if tones.is_empty() {
                None
            } else {
                Some(Excitation {
                    dc: None,
                    tones,
                    transient: None,
                })
            }
        }
        DomainTag::Laplace if fold_dc => {
            let mut f = excitation
                .transient_part()
                .map(|t| t.transform())
                .unwrap_or_else(RatFun::zero);
            if let Some(v) = excitation.dc_part() {
                f += RatFun::constant(v) / RatFun::var();
            }
            if f == RatFun::zero() {
                None
            } else {
                Some(Excitation::laplace(f))
            }
        }
        DomainTag::Laplace => excitation.transient_part().map(|t| Excitation {
            dc: None,
            tones: Vec::new(),
            transient: Some(t.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use num_bigint::BigInt;
    use num_rational::BigRational;
    use symspice_core::{ComponentKind, ComponentSpec};

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn dc_ac_netlist() -> Netlist {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(6)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::current_source(
                "I1",
                "2",
                "0",
                Excitation::ac(rat(1), rat(100)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "2", 2))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R2", "2", "0", 4))
            .unwrap();
        netlist
    }

    #[test]
    fn test_two_classes_two_subcircuits() {
        let netlist = dc_ac_netlist();
        let c = classify(&netlist).unwrap();
        let subs = decompose(&netlist, &c).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].domain, DomainTag::Dc);
        assert_eq!(subs[1].domain, DomainTag::Ac(rat(100)));
    }

    #[test]
    fn test_killed_current_source_is_removed() {
        let netlist = dc_ac_netlist();
        let c = classify(&netlist).unwrap();
        let subs = decompose(&netlist, &c).unwrap();
        let dc_sub = &subs[0].netlist;
        assert!(dc_sub.component("I1").is_none());
        assert!(dc_sub.component("V1").is_some());
    }

    #[test]
    fn test_killed_voltage_source_keeps_branch() {
        let netlist = dc_ac_netlist();
        let c = classify(&netlist).unwrap();
        let subs = decompose(&netlist, &c).unwrap();
        let ac_sub = &subs[1].netlist;
        let v1 = ac_sub.component("V1").unwrap();
        match &v1.kind {
            ComponentKind::VoltageSource { excitation } => assert!(excitation.is_zero()),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_single_class_yields_one_subcircuit() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(6)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 3))
            .unwrap();
        let c = classify(&netlist).unwrap();
        let subs = decompose(&netlist, &c).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].sources, vec!["V1"]);
    }

    #[test]
    fn test_mixed_source_split_across_domains() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(6)).with_tone(symspice_core::Tone {
                    amplitude: rat(2),
                    omega: rat(50),
                    phase_deg: rat(0),
                }),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 3))
            .unwrap();
        let c = classify(&netlist).unwrap();
        let subs = decompose(&netlist, &c).unwrap();
        assert_eq!(subs.len(), 2);
        for sub in &subs {
            assert_eq!(sub.sources, vec!["V1"]);
        }
        let dc_exc = subs[0].netlist.component("V1").unwrap().excitation().unwrap();
        assert!(dc_exc.tones.is_empty());
        assert_eq!(dc_exc.dc_part(), Some(rat(6)));
    }
}
