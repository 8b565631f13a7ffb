//! Netlist: the component graph under analysis.
//!
//! Nodes are created implicitly when a component first references them and
//! are garbage-collected when their last incident component is removed.
//! Node `0` (aliases: `gnd`) is the ground reference and always exists.
//!
//! Every topology mutation bumps a monotonic version counter; cached
//! results are keyed by that counter, so a single edit invalidates every
//! result derived from the old topology.

use indexmap::IndexMap;

use crate::component::{Component, ComponentSpec, Value};
use crate::error::{Error, Result};
use crate::node::{Node, NodeId};

/// A complete netlist ready for analysis.
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    /// Circuit title.
    title: Option<String>,
    /// Components in insertion order, keyed by name.
    components: IndexMap<String, Component>,
    /// Nodes keyed by canonical name. Ground is always present.
    nodes: IndexMap<String, Node>,
    /// Next node id to hand out; ids are never reused.
    next_node_id: u32,
    /// Monotonic mutation counter.
    version: u64,
}

fn canonical_node_name(name: &str) -> &str {
    if name == "0" || name.eq_ignore_ascii_case("gnd") {
        "0"
    } else {
        name
    }
}

impl Netlist {
    /// Create a new empty netlist with only the ground node.
    pub fn new() -> Self {
        let mut netlist = Self {
            next_node_id: 1,
            ..Default::default()
        };
        netlist
            .nodes
            .insert("0".into(), Node::new(NodeId::GROUND, "0"));
        netlist
    }

    /// Create a netlist with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        let mut netlist = Self::new();
        netlist.title = Some(title.into());
        netlist
    }

    /// Get the netlist title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The mutation version counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    /// Resolve a node name to its id, creating the node if unseen.
    pub fn get_or_create_node(&mut self, name: &str) -> NodeId {
        let name = canonical_node_name(name);
        if let Some(node) = self.nodes.get(name) {
            return node.id();
        }
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(name.to_string(), Node::new(id, name));
        id
    }

    /// Look up a node id by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(canonical_node_name(name)).map(Node::id)
    }

    /// Look up a node name by id.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes
            .values()
            .find(|n| n.id() == id)
            .map(Node::name)
    }

    /// Iterate over all nodes excluding ground.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| !n.is_ground())
    }

    /// Iterate over all nodes including ground.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes excluding ground.
    pub fn node_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Add a component, implicitly creating any unseen nodes.
    pub fn add(&mut self, spec: ComponentSpec) -> Result<()> {
        if self.components.contains_key(&spec.name) {
            return Err(Error::DuplicateComponent(spec.name));
        }
        let expected = spec.kind.num_terminals();
        if spec.nodes.len() != expected {
            return Err(Error::InvalidComponent {
                name: spec.name,
                reason: format!(
                    "{} expects {expected} terminals, got {}",
                    spec.kind.tag(),
                    spec.nodes.len()
                ),
            });
        }
        let nodes = spec
            .nodes
            .iter()
            .map(|n| self.get_or_create_node(n))
            .collect();
        let component = Component {
            name: spec.name.clone(),
            kind: spec.kind,
            nodes,
        };
        self.components.insert(spec.name, component);
        self.bump();
        Ok(())
    }

    /// Remove a component by name. Nodes left with no incident component
    /// are removed as well (never ground).
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.components.shift_remove(name).is_none() {
            return Err(Error::UnknownComponent(name.to_string()));
        }
        self.collect_orphan_nodes();
        self.bump();
        Ok(())
    }

    /// Remove every component matching the predicate; returns the number
    /// removed. Bumps the version only if something was removed.
    pub fn remove_where(&mut self, pred: impl Fn(&Component) -> bool) -> usize {
        let before = self.components.len();
        self.components.retain(|_, c| !pred(c));
        let removed = before - self.components.len();
        if removed > 0 {
            self.collect_orphan_nodes();
            self.bump();
        }
        removed
    }

    fn collect_orphan_nodes(&mut self) {
        let mut referenced: Vec<NodeId> = Vec::new();
        for c in self.components.values() {
            referenced.extend(&c.nodes);
        }
        self.nodes
            .retain(|_, n| n.is_ground() || referenced.contains(&n.id()));
    }

    /// Rebind the value of a value-carrying component (same identity).
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<()> {
        use crate::component::ComponentKind::*;
        let component = self
            .components
            .get_mut(name)
            .ok_or_else(|| Error::UnknownComponent(name.to_string()))?;
        match &mut component.kind {
            Resistor { value: slot }
            | Conductor { value: slot }
            | Capacitor { value: slot, .. }
            | Inductor { value: slot, .. }
            | Vcvs { gain: slot }
            | MutualInductance { coupling: slot, .. }
            | Transformer { ratio: slot }
            | Gyrator { resistance: slot } => *slot = value,
            _ => {
                return Err(Error::InvalidComponent {
                    name: name.to_string(),
                    reason: format!("{} carries no substitutable value", component.kind.tag()),
                });
            }
        }
        self.bump();
        Ok(())
    }

    /// Drop every initial condition (zero-state copy of the netlist).
    pub fn clear_initial_conditions(&mut self) {
        use crate::component::ComponentKind::*;
        let mut changed = false;
        for component in self.components.values_mut() {
            match &mut component.kind {
                Capacitor { ic: ic @ Some(_), .. } | Inductor { ic: ic @ Some(_), .. } => {
                    *ic = None;
                    changed = true;
                }
                _ => {}
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Replace the excitation of an independent source.
    pub fn set_excitation(
        &mut self,
        name: &str,
        excitation: crate::excitation::Excitation,
    ) -> Result<()> {
        use crate::component::ComponentKind::*;
        let component = self
            .components
            .get_mut(name)
            .ok_or_else(|| Error::UnknownComponent(name.to_string()))?;
        match &mut component.kind {
            VoltageSource { excitation: slot } | CurrentSource { excitation: slot } => {
                *slot = excitation;
            }
            _ => {
                return Err(Error::InvalidComponent {
                    name: name.to_string(),
                    reason: format!("{} is not an independent source", component.kind.tag()),
                });
            }
        }
        self.bump();
        Ok(())
    }

    /// Get a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Iterate over components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Number of components.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Components incident on a node.
    pub fn incident(&self, node: NodeId) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| c.nodes.contains(&node))
            .collect()
    }

    /// Independent sources in insertion order.
    pub fn independent_sources(&self) -> impl Iterator<Item = &Component> {
        self.components
            .values()
            .filter(|c| c.is_independent_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excitation::Excitation;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_new_netlist_has_ground() {
        let netlist = Netlist::new();
        assert_eq!(netlist.node_count(), 0);
        assert_eq!(netlist.node_id("0"), Some(NodeId::GROUND));
        assert_eq!(netlist.node_id("gnd"), Some(NodeId::GROUND));
    }

    #[test]
    fn test_implicit_node_creation() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::resistor("R1", "in", "out", 1000))
            .unwrap();
        assert_eq!(netlist.node_count(), 2);
        assert!(netlist.node_id("in").is_some());
        assert!(netlist.node_id("out").is_some());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 5))
            .unwrap();
        let err = netlist.add(ComponentSpec::resistor("R1", "2", "0", 5));
        assert!(matches!(err, Err(Error::DuplicateComponent(_))));
    }

    #[test]
    fn test_terminal_count_validated() {
        let mut netlist = Netlist::new();
        let mut spec = ComponentSpec::resistor("R1", "1", "0", 5);
        spec.nodes.push("2".into());
        assert!(matches!(
            netlist.add(spec),
            Err(Error::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_remove_collects_orphan_nodes() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "2", 5))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R2", "2", "0", 5))
            .unwrap();
        assert_eq!(netlist.node_count(), 2);

        netlist.remove("R1").unwrap();
        // Node 1 had only R1 incident; node 2 still has R2.
        assert_eq!(netlist.node_count(), 1);
        assert!(netlist.node_id("1").is_none());
        assert!(netlist.node_id("2").is_some());

        // Ground survives even with everything removed.
        netlist.remove("R2").unwrap();
        assert_eq!(netlist.node_count(), 0);
        assert_eq!(netlist.node_id("0"), Some(NodeId::GROUND));
    }

    #[test]
    fn test_version_bumps() {
        let mut netlist = Netlist::new();
        let v0 = netlist.version();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 5))
            .unwrap();
        let v1 = netlist.version();
        assert!(v1 > v0);
        netlist.set_value("R1", Value::Num(rat(10))).unwrap();
        assert!(netlist.version() > v1);
    }

    #[test]
    fn test_remove_where() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "0", 5))
            .unwrap();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(10)),
            ))
            .unwrap();
        let removed = netlist.remove_where(|c| c.is_independent_source());
        assert_eq!(removed, 1);
        assert!(netlist.component("V1").is_none());
        assert!(netlist.component("R1").is_some());
    }

    #[test]
    fn test_set_value_rejects_sources() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(10)),
            ))
            .unwrap();
        assert!(matches!(
            netlist.set_value("V1", Value::Num(rat(5))),
            Err(Error::InvalidComponent { .. })
        ));
    }
}
