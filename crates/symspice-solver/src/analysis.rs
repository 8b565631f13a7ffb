//! The top-level analysis entry point.
//!
//! [`Analysis`] owns a netlist and a result cache. Each query runs the
//! full pipeline on a cache miss: classify sources, decompose into
//! sub-circuits, assemble and solve each one in its domain, and
//! recombine by superposition. Results stay valid until the netlist
//! version changes.

use indexmap::IndexMap;
use log::debug;
use symspice_core::{Netlist, NodeId};
use symspice_expr::RatFun;

use crate::assemble::Formulation;
use crate::cache::{Quantity, ResultCache};
use crate::classify::{classify, DomainTag};
use crate::decompose::decompose;
use crate::error::{Error, Result};
use crate::linear::SolverMethod;
use crate::superpose::{combine, CompositeResult, SolvedContribution};
use crate::{ac, dc, laplace};

pub struct Analysis {
    netlist: Netlist,
    formulation: Formulation,
    method: SolverMethod,
    cache: ResultCache,
    impedances: IndexMap<(NodeId, NodeId), RatFun>,
    impedance_version: u64,
    assemblies: u64,
}

impl Analysis {
    pub fn new(netlist: Netlist) -> Self {
        Self {
            netlist,
            formulation: Formulation::default(),
            method: SolverMethod::default(),
            cache: ResultCache::new(),
            impedances: IndexMap::new(),
            impedance_version: 0,
            assemblies: 0,
        }
    }

    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.method = method;
        self
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Mutable access to the netlist. Any edit bumps its version and
    /// invalidates cached results on the next query.
    pub fn netlist_mut(&mut self) -> &mut Netlist {
        &mut self.netlist
    }

    /// How many sub-circuit systems have been assembled so far. Cached
    /// queries do not assemble anything (test probe).
    pub fn assembly_count(&self) -> u64 {
        self.assemblies
    }

    /// Solve the voltage at a named node across all domains.
    pub fn solve_node_voltage(&mut self, node: &str) -> Result<CompositeResult> {
        let id = self
            .netlist
            .node_id(node)
            .ok_or_else(|| Error::UnknownNode(node.to_string()))?;
        if id.is_ground() {
            return Ok(CompositeResult::default());
        }
        let version = self.netlist.version();
        let netlist = &self.netlist;
        let formulation = self.formulation;
        let method = self.method;
        let assemblies = &mut self.assemblies;
        self.cache
            .get_or_compute(version, Quantity::NodeVoltage(id), || {
                solve_quantity(
                    netlist,
                    formulation,
                    method,
                    assemblies,
                    &Target::NodeVoltage(id),
                )
            })
    }

    /// Solve the current through a named component across all domains.
    pub fn solve_branch_current(&mut self, name: &str) -> Result<CompositeResult> {
        if self.netlist.component(name).is_none() {
            return Err(Error::UnknownComponent(name.to_string()));
        }
        let version = self.netlist.version();
        let netlist = &self.netlist;
        let formulation = self.formulation;
        let method = self.method;
        let assemblies = &mut self.assemblies;
        self.cache
            .get_or_compute(version, Quantity::BranchCurrent(name.to_string()), || {
                solve_quantity(
                    netlist,
                    formulation,
                    method,
                    assemblies,
                    &Target::BranchCurrent(name.to_string()),
                )
            })
    }

    /// The driving-point impedance `Z(s)` between two nodes: every
    /// independent source killed, initial conditions cleared, a unit
    /// `s`-domain test current driven into `node_a` and out of `node_b`.
    pub fn impedance(&mut self, node_a: &str, node_b: &str) -> Result<RatFun> {
        let a = self
            .netlist
            .node_id(node_a)
            .ok_or_else(|| Error::UnknownNode(node_a.to_string()))?;
        let b = self
            .netlist
            .node_id(node_b)
            .ok_or_else(|| Error::UnknownNode(node_b.to_string()))?;

        let version = self.netlist.version();
        if self.impedance_version != version {
            self.impedances.clear();
            self.impedance_version = version;
        }
        if let Some(hit) = self.impedances.get(&(a, b)) {
            return Ok(hit.clone());
        }

        let mut probed = self.netlist.clone();
        probed.clear_initial_conditions();
        let sources: Vec<String> = probed
            .independent_sources()
            .map(|c| c.name.clone())
            .collect();
        for name in sources {
            let is_current = matches!(
                probed.component(&name).map(|c| &c.kind),
                Some(symspice_core::ComponentKind::CurrentSource { .. })
            );
            if is_current {
                probed.remove(&name)?;
            } else {
                probed.set_excitation(&name, symspice_core::Excitation::killed())?;
            }
        }
        // Pick an injection-source name the netlist does not use yet.
        let mut probe = String::from("Iprobe");
        let mut suffix = 1;
        while probed.component(&probe).is_some() {
            probe = format!("Iprobe{suffix}");
            suffix += 1;
        }
        probed.add(symspice_core::ComponentSpec::current_source(
            &probe,
            node_b,
            node_a,
            symspice_core::Excitation::laplace(RatFun::one()),
        ))?;

        self.assemblies += 1;
        let solution = laplace::solve_laplace(&probed, self.formulation)?;
        let z = solution.voltage(a) - solution.voltage(b);
        self.impedances.insert((a, b), z.clone());
        Ok(z)
    }

    /// One entry per sub-circuit the current netlist decomposes into:
    /// the analysis method and the sources (or initial conditions)
    /// driving it.
    pub fn describe(&self) -> Result<Vec<(String, String)>> {
        let classification = classify(&self.netlist)?;
        let mut entries = Vec::new();
        for tag in classification.domains() {
            let sources = match &tag {
                DomainTag::Dc => classification.dc.join(","),
                DomainTag::Ac(omega) => classification.ac[omega].join(","),
                DomainTag::Laplace if classification.laplace.is_empty() => {
                    "initial conditions".to_string()
                }
                DomainTag::Laplace => classification.laplace.join(","),
            };
            entries.push((tag.to_string(), sources));
        }
        Ok(entries)
    }
}

enum Target {
    NodeVoltage(NodeId),
    BranchCurrent(String),
}

fn solve_quantity(
    netlist: &Netlist,
    formulation: Formulation,
    method: SolverMethod,
    assemblies: &mut u64,
    target: &Target,
) -> Result<CompositeResult> {
    let classification = classify(netlist)?;
    let subs = decompose(netlist, &classification)?;
    debug!("solving {} sub-circuit(s)", subs.len());

    let mut contributions = Vec::with_capacity(subs.len());
    for sub in subs {
        *assemblies += 1;
        let contribution = match &sub.domain {
            DomainTag::Dc => {
                let solution = dc::solve_dc(&sub.netlist, formulation)?;
                match target {
                    Target::NodeVoltage(id) => SolvedContribution::Dc(solution.voltage(*id)),
                    Target::BranchCurrent(name) => {
                        SolvedContribution::Dc(solution.current(name)?)
                    }
                }
            }
            DomainTag::Ac(omega) => {
                let solution = ac::solve_ac(&sub.netlist, omega.clone(), formulation, method)?;
                let phasor = match target {
                    Target::NodeVoltage(id) => solution.voltage(*id),
                    Target::BranchCurrent(name) => solution.current(name)?,
                };
                SolvedContribution::Ac {
                    omega: omega.clone(),
                    phasor,
                }
            }
            DomainTag::Laplace => {
                let solution = laplace::solve_laplace(&sub.netlist, formulation)?;
                match target {
                    Target::NodeVoltage(id) => {
                        SolvedContribution::Laplace(solution.voltage(*id))
                    }
                    Target::BranchCurrent(name) => {
                        SolvedContribution::Laplace(solution.current(name)?)
                    }
                }
            }
        };
        contributions.push(contribution);
    }
    combine(contributions)
}
