//! Circuit components: the closed element enumeration and its values.

use std::fmt;

use num_rational::BigRational;
use symspice_expr::RatFun;

use crate::excitation::Excitation;
use crate::node::NodeId;

/// A component value: an exact number or a still-unbound symbol.
///
/// Symbols are per-netlist: the netlist's symbol table guarantees one
/// identity per name within an analysis context. A symbolic value must be
/// bound with `Netlist::set_value` before a solve.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An exact rational number.
    Num(BigRational),
    /// A named symbol, to be substituted before solving.
    Symbol(String),
}

impl Value {
    /// The numeric value, if bound.
    pub fn number(&self) -> Option<&BigRational> {
        match self {
            Value::Num(v) => Some(v),
            Value::Symbol(_) => None,
        }
    }

    /// Convert a float to an exact rational value.
    ///
    /// The conversion is exact with respect to the binary double but lossy
    /// with respect to the decimal the caller may have started from: `0.1`
    /// becomes the rational equal to the nearest double, not 1/10. Netlist
    /// text avoids this path entirely (decimal strings parse exactly).
    pub fn from_f64(x: f64) -> Option<Value> {
        BigRational::from_float(x).map(Value::Num)
    }
}

impl From<BigRational> for Value {
    fn from(v: BigRational) -> Self {
        Value::Num(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Num(BigRational::from_integer(v.into()))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::from(v as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(v) => write!(f, "{v}"),
            Value::Symbol(name) => write!(f, "{name}"),
        }
    }
}

/// The closed component-type enumeration.
///
/// One stamp rule exists per variant; the assembler dispatches on the tag
/// rather than an open trait-object hierarchy so the set of element types
/// is checked exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    /// Resistance in ohms.
    Resistor { value: Value },
    /// Conductance in siemens.
    Conductor { value: Value },
    /// Capacitance in farads, optional initial voltage.
    Capacitor {
        value: Value,
        ic: Option<BigRational>,
    },
    /// Inductance in henries, optional initial current.
    Inductor {
        value: Value,
        ic: Option<BigRational>,
    },
    /// Independent voltage source.
    VoltageSource { excitation: Excitation },
    /// Independent current source.
    CurrentSource { excitation: Excitation },
    /// Voltage-controlled voltage source: V(out) = gain * V(ctrl).
    Vcvs { gain: Value },
    /// Magnetic coupling between two named inductors.
    MutualInductance {
        inductor1: String,
        inductor2: String,
        coupling: Value,
    },
    /// Ideal transformer with turns ratio `a` (primary : secondary).
    Transformer { ratio: Value },
    /// Gyrator with gyration resistance R: v1 = -R*i2, v2 = R*i1.
    Gyrator { resistance: Value },
    /// Generic two-port defined by its ABCD (chain) parameters.
    TwoPort {
        a: RatFun,
        b: RatFun,
        c: RatFun,
        d: RatFun,
    },
    /// Ideal connection (0 V source).
    Wire,
}

impl ComponentKind {
    /// Number of terminal nodes this kind connects.
    pub fn num_terminals(&self) -> usize {
        match self {
            ComponentKind::Vcvs { .. }
            | ComponentKind::Transformer { .. }
            | ComponentKind::Gyrator { .. }
            | ComponentKind::TwoPort { .. } => 4,
            ComponentKind::MutualInductance { .. } => 0,
            _ => 2,
        }
    }

    /// Short tag used in descriptions and diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::Resistor { .. } => "resistor",
            ComponentKind::Conductor { .. } => "conductor",
            ComponentKind::Capacitor { .. } => "capacitor",
            ComponentKind::Inductor { .. } => "inductor",
            ComponentKind::VoltageSource { .. } => "voltage source",
            ComponentKind::CurrentSource { .. } => "current source",
            ComponentKind::Vcvs { .. } => "VCVS",
            ComponentKind::MutualInductance { .. } => "mutual inductance",
            ComponentKind::Transformer { .. } => "transformer",
            ComponentKind::Gyrator { .. } => "gyrator",
            ComponentKind::TwoPort { .. } => "two-port",
            ComponentKind::Wire => "wire",
        }
    }
}

/// A component as stored in a netlist, with resolved node ids.
#[derive(Debug, Clone)]
pub struct Component {
    /// Device name (e.g. "R1", "V1").
    pub name: String,
    /// Type tag and per-type data.
    pub kind: ComponentKind,
    /// Terminal node ids in netlist order (2 or 4; empty for K elements).
    pub nodes: Vec<NodeId>,
}

impl Component {
    /// True for independent sources (V and I).
    pub fn is_independent_source(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::VoltageSource { .. } | ComponentKind::CurrentSource { .. }
        )
    }

    /// The excitation of an independent source.
    pub fn excitation(&self) -> Option<&Excitation> {
        match &self.kind {
            ComponentKind::VoltageSource { excitation }
            | ComponentKind::CurrentSource { excitation } => Some(excitation),
            _ => None,
        }
    }
}

/// A component record before node-name resolution, as the parser emits it.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub name: String,
    pub kind: ComponentKind,
    pub nodes: Vec<String>,
}

impl ComponentSpec {
    fn new(name: impl Into<String>, kind: ComponentKind, nodes: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind,
            nodes: nodes.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn resistor(name: impl Into<String>, np: &str, nn: &str, value: impl Into<Value>) -> Self {
        Self::new(
            name,
            ComponentKind::Resistor {
                value: value.into(),
            },
            &[np, nn],
        )
    }

    pub fn conductor(name: impl Into<String>, np: &str, nn: &str, value: impl Into<Value>) -> Self {
        Self::new(
            name,
            ComponentKind::Conductor {
                value: value.into(),
            },
            &[np, nn],
        )
    }

    pub fn capacitor(name: impl Into<String>, np: &str, nn: &str, value: impl Into<Value>) -> Self {
        Self::new(
            name,
            ComponentKind::Capacitor {
                value: value.into(),
                ic: None,
            },
            &[np, nn],
        )
    }

    pub fn inductor(name: impl Into<String>, np: &str, nn: &str, value: impl Into<Value>) -> Self {
        Self::new(
            name,
            ComponentKind::Inductor {
                value: value.into(),
                ic: None,
            },
            &[np, nn],
        )
    }

    /// Set the initial condition on a capacitor or inductor.
    /// No effect on other kinds.
    pub fn with_ic(mut self, ic: BigRational) -> Self {
        match &mut self.kind {
            ComponentKind::Capacitor { ic: slot, .. }
            | ComponentKind::Inductor { ic: slot, .. } => *slot = Some(ic),
            _ => {}
        }
        self
    }

    pub fn voltage_source(
        name: impl Into<String>,
        np: &str,
        nn: &str,
        excitation: Excitation,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::VoltageSource { excitation },
            &[np, nn],
        )
    }

    pub fn current_source(
        name: impl Into<String>,
        np: &str,
        nn: &str,
        excitation: Excitation,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::CurrentSource { excitation },
            &[np, nn],
        )
    }

    pub fn vcvs(
        name: impl Into<String>,
        out_pos: &str,
        out_neg: &str,
        ctrl_pos: &str,
        ctrl_neg: &str,
        gain: impl Into<Value>,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::Vcvs { gain: gain.into() },
            &[out_pos, out_neg, ctrl_pos, ctrl_neg],
        )
    }

    pub fn mutual_inductance(
        name: impl Into<String>,
        inductor1: impl Into<String>,
        inductor2: impl Into<String>,
        coupling: impl Into<Value>,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::MutualInductance {
                inductor1: inductor1.into(),
                inductor2: inductor2.into(),
                coupling: coupling.into(),
            },
            &[],
        )
    }

    pub fn transformer(
        name: impl Into<String>,
        p1: &str,
        n1: &str,
        p2: &str,
        n2: &str,
        ratio: impl Into<Value>,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::Transformer {
                ratio: ratio.into(),
            },
            &[p1, n1, p2, n2],
        )
    }

    pub fn gyrator(
        name: impl Into<String>,
        p1: &str,
        n1: &str,
        p2: &str,
        n2: &str,
        resistance: impl Into<Value>,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::Gyrator {
                resistance: resistance.into(),
            },
            &[p1, n1, p2, n2],
        )
    }

    pub fn two_port(
        name: impl Into<String>,
        p1: &str,
        n1: &str,
        p2: &str,
        n2: &str,
        a: RatFun,
        b: RatFun,
        c: RatFun,
        d: RatFun,
    ) -> Self {
        Self::new(
            name,
            ComponentKind::TwoPort { a, b, c, d },
            &[p1, n1, p2, n2],
        )
    }

    pub fn wire(name: impl Into<String>, np: &str, nn: &str) -> Self {
        Self::new(name, ComponentKind::Wire, &[np, nn])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_terminal_counts() {
        assert_eq!(ComponentKind::Wire.num_terminals(), 2);
        assert_eq!(
            ComponentKind::Vcvs { gain: 2.into() }.num_terminals(),
            4
        );
        assert_eq!(
            ComponentKind::MutualInductance {
                inductor1: "L1".into(),
                inductor2: "L2".into(),
                coupling: 1.into(),
            }
            .num_terminals(),
            0
        );
    }

    #[test]
    fn test_spec_with_ic() {
        let c = ComponentSpec::capacitor("C1", "1", "0", 10).with_ic(rat(5));
        match c.kind {
            ComponentKind::Capacitor { ic, .. } => assert_eq!(ic, Some(rat(5))),
            _ => panic!("wrong kind"),
        }
        // with_ic on a resistor is a no-op
        let r = ComponentSpec::resistor("R1", "1", "0", 5).with_ic(rat(1));
        assert!(matches!(r.kind, ComponentKind::Resistor { .. }));
    }

    #[test]
    fn test_value_from_f64_documented_lossy() {
        let v = Value::from_f64(0.5).unwrap();
        assert_eq!(v.number().unwrap(), &BigRational::new(1.into(), 2.into()));
    }
}
