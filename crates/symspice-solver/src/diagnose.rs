//! Structural diagnosis of singular netlists.
//!
//! When a solve hits a singular matrix, the numeric failure says nothing
//! about which part of the circuit is ill-posed. These checks walk the
//! netlist graph and name every structural cause they can find, in a
//! fixed order: floating nodes, capacitor-blocked DC paths, shorted
//! voltage sources, open current sources, and DC current forced through
//! capacitors.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use num_traits::Zero;
use symspice_core::{Component, ComponentKind, Netlist, NodeId, Value};

use crate::classify::DomainTag;

/// One structural cause of a singular system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// The node has no path to ground at all.
    UnreachableNode { node: String },
    /// Every path from the node to ground crosses a capacitor, so its
    /// DC operating point is undefined.
    CapacitiveDcPath { node: String },
    /// A zero-impedance loop closes across the voltage source.
    ShortedVoltageSource { name: String },
    /// The current source has no return path for its current.
    OpenCurrentSource { name: String },
    /// A DC current source can only close its loop through capacitors.
    DcCurrentThroughCapacitor { name: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::UnreachableNode { node } => {
                write!(f, "node '{node}' is not connected to ground")
            }
            Reason::CapacitiveDcPath { node } => {
                write!(f, "node '{node}' reaches ground only through capacitors")
            }
            Reason::ShortedVoltageSource { name } => {
                write!(f, "voltage source '{name}' is short-circuited")
            }
            Reason::OpenCurrentSource { name } => {
                write!(f, "current source '{name}' drives an open branch")
            }
            Reason::DcCurrentThroughCapacitor { name } => {
                write!(
                    f,
                    "dc current source '{name}' is in series with capacitors only \
                     (a step source may be intended)"
                )
            }
        }
    }
}

/// Which conducting pairs a component contributes to the circuit graph.
fn conducting_pairs(component: &Component, include_caps: bool) -> Vec<(NodeId, NodeId)> {
    let n = &component.nodes;
    match &component.kind {
        ComponentKind::Capacitor { .. } if !include_caps => Vec::new(),
        ComponentKind::Resistor { .. }
        | ComponentKind::Conductor { .. }
        | ComponentKind::Capacitor { .. }
        | ComponentKind::Inductor { .. }
        | ComponentKind::VoltageSource { .. }
        | ComponentKind::Wire => vec![(n[0], n[1])],
        // The output port of a controlled source and the ports of the
        // coupling elements pin their node pair; control pins conduct
        // nothing.
        ComponentKind::Vcvs { .. } => vec![(n[0], n[1])],
        ComponentKind::Transformer { .. }
        | ComponentKind::Gyrator { .. }
        | ComponentKind::TwoPort { .. } => vec![(n[0], n[1]), (n[2], n[3])],
        ComponentKind::CurrentSource { .. } | ComponentKind::MutualInductance { .. } => Vec::new(),
    }
}

/// Pairs connected by an ideal zero-impedance branch. An inductor is a
/// short only at DC; at any finite frequency it carries impedance.
fn zero_impedance_pairs(component: &Component, dc: bool) -> Vec<(NodeId, NodeId)> {
    let n = &component.nodes;
    match &component.kind {
        ComponentKind::Inductor { .. } if dc => vec![(n[0], n[1])],
        ComponentKind::Inductor {
            value: Value::Num(l),
            ..
        } if l.is_zero() => vec![(n[0], n[1])],
        ComponentKind::Wire | ComponentKind::VoltageSource { .. } => vec![(n[0], n[1])],
        ComponentKind::Resistor {
            value: Value::Num(r),
        } if r.is_zero() => vec![(n[0], n[1])],
        _ => Vec::new(),
    }
}

struct Graph {
    adjacency: HashMap<NodeId, Vec<NodeId>>,
}

impl Graph {
    fn build<'a>(
        components: impl Iterator<Item = &'a Component>,
        pairs: impl Fn(&Component) -> Vec<(NodeId, NodeId)>,
    ) -> Self {
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for component in components {
            for (a, b) in pairs(component) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }
        Graph { adjacency }
    }

    fn reachable_from(&self, start: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in self.adjacency.get(&node).into_iter().flatten() {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    fn connected(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.reachable_from(a).contains(&b)
    }
}

/// Diagnose the structural causes of a singular system in the given
/// domain. Every matching reason is returned, in detection order.
pub fn diagnose(netlist: &Netlist, domain: &DomainTag) -> Vec<Reason> {
    let mut reasons = Vec::new();
    let dc = matches!(domain, DomainTag::Dc);

    let full = Graph::build(netlist.components(), |c| conducting_pairs(c, true));
    let dc_graph = Graph::build(netlist.components(), |c| conducting_pairs(c, false));
    let grounded = full.reachable_from(NodeId::GROUND);
    let dc_grounded = dc_graph.reachable_from(NodeId::GROUND);

    for node in netlist.nodes() {
        if !grounded.contains(&node.id()) {
            reasons.push(Reason::UnreachableNode {
                node: node.name().to_string(),
            });
        }
    }

    if dc {
        for node in netlist.nodes() {
            if grounded.contains(&node.id()) && !dc_grounded.contains(&node.id()) {
                reasons.push(Reason::CapacitiveDcPath {
                    node: node.name().to_string(),
                });
            }
        }
    }

    for component in netlist.components() {
        if !matches!(component.kind, ComponentKind::VoltageSource { .. }) {
            continue;
        }
        let shorts = Graph::build(
            netlist.components().filter(|c| c.name != component.name),
            |c| zero_impedance_pairs(c, dc),
        );
        if shorts.connected(component.nodes[0], component.nodes[1]) {
            reasons.push(Reason::ShortedVoltageSource {
                name: component.name.clone(),
            });
        }
    }

    for component in netlist.components() {
        let ComponentKind::CurrentSource { excitation } = &component.kind else {
            continue;
        };
        let others = Graph::build(
            netlist
                .components()
                .filter(|c| !matches!(c.kind, ComponentKind::CurrentSource { .. })),
            |c| conducting_pairs(c, true),
        );
        let others_dc = Graph::build(
            netlist
                .components()
                .filter(|c| !matches!(c.kind, ComponentKind::CurrentSource { .. })),
            |c| conducting_pairs(c, false),
        );
        let (a, b) = (component.nodes[0], component.nodes[1]);
        if !others.connected(a, b) {
            reasons.push(Reason::OpenCurrentSource {
                name: component.name.clone(),
            });
        } else if dc && excitation.dc_part().is_some() && !others_dc.connected(a, b) {
            reasons.push(Reason::DcCurrentThroughCapacitor {
                name: component.name.clone(),
            });
        }
    }

    reasons
}
