//! DC operating point over exact rationals.
//!
//! Capacitors are open circuits, inductors are 0 V branches (ideal
//! shorts whose current is an explicit unknown). All arithmetic is in
//! `BigRational`, so results are exact closed forms.

use num_rational::BigRational;
use num_traits::Zero;
use symspice_core::{Excitation, Netlist, NodeId};
use symspice_expr::RatFun;

use crate::assemble::{check_reactive, Domain, DomainSolution, Formulation, ReactiveStamp};
use crate::classify::DomainTag;
use crate::error::Result;
use crate::linear::SolverMethod;

#[derive(Debug)]
pub(crate) struct DcDomain;

impl Domain for DcDomain {
    type Scalar = BigRational;

    fn tag(&self) -> DomainTag {
        DomainTag::Dc
    }

    fn rational(&self, r: &BigRational) -> BigRational {
        r.clone()
    }

    fn ratfun(&self, f: &RatFun, component: &str) -> Result<BigRational> {
        f.at_zero().ok_or_else(|| {
            symspice_core::Error::DegenerateComponent {
                name: component.to_string(),
                reason: "two-port parameter has a pole at s = 0".into(),
            }
            .into()
        })
    }

    fn source(&self, excitation: &Excitation) -> BigRational {
        excitation.dc_part().unwrap_or_else(BigRational::zero)
    }

    fn capacitor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        _aux: bool,
    ) -> Result<ReactiveStamp<BigRational>> {
        check_reactive(name, value, ic)?;
        Ok(ReactiveStamp::Open)
    }

    fn inductor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<BigRational>> {
        check_reactive(name, value, ic)?;
        debug_assert!(aux, "DC inductors always use a branch unknown");
        Ok(ReactiveStamp::Branch {
            impedance: BigRational::zero(),
            series_voltage: BigRational::zero(),
        })
    }

    fn mutual_impedance(&self, _m: &BigRational) -> Option<BigRational> {
        None
    }

    fn mutual_initial_voltage(
        &self,
        _m: &BigRational,
        _partner_ic: &BigRational,
    ) -> Option<BigRational> {
        None
    }
}

/// An exact DC solution of a netlist.
#[derive(Debug)]
pub struct DcSolution(DomainSolution<DcDomain>);

impl DcSolution {
    /// Node voltage (ground is zero).
    pub fn voltage(&self, node: NodeId) -> BigRational {
        self.0.voltage(node)
    }

    /// Current through a component, first terminal to second.
    pub fn current(&self, name: &str) -> Result<BigRational> {
        self.0.current(name)
    }
}

/// Solve the DC operating point. Only DC excitation parts drive the
/// system; tones and transients are ignored here.
pub fn solve_dc(netlist: &Netlist, formulation: Formulation) -> Result<DcSolution> {
    crate::assemble::solve_domain(DcDomain, netlist, formulation, SolverMethod::Auto)
        .map(DcSolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use symspice_core::ComponentSpec;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    // 6V -- R1 (2 ohm) -- node 2 -- R2 (4 ohm) -- gnd
    fn divider() -> Netlist {
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
            .add(ComponentSpec::resistor("R1", "1", "2", 2))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R2", "2", "0", 4))
            .unwrap();
        netlist
    }

    #[test]
    fn test_voltage_divider_exact() {
        let netlist = divider();
        let solution = solve_dc(&netlist, Formulation::Auto).unwrap();
        let n2 = netlist.node_id("2").unwrap();
        assert_eq!(solution.voltage(n2), rat(4));
        assert_eq!(solution.current("R1").unwrap(), rat(1));
        assert_eq!(solution.current("R2").unwrap(), rat(1));
        // Source branch current flows 1 A out of the + terminal.
        assert_eq!(solution.current("V1").unwrap(), rat(-1));
    }

    #[test]
    fn test_inductor_is_dc_short() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(20)),
            ))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("R1", "1", "2", 5))
            .unwrap();
        netlist
            .add(ComponentSpec::inductor("L1", "2", "3", 20))
            .unwrap();
        netlist
            .add(ComponentSpec::capacitor("C1", "3", "0", 10))
            .unwrap();

        let solution = solve_dc(&netlist, Formulation::Auto).unwrap();
        // Capacitor blocks: no current flows, no drop across R or L.
        let n3 = netlist.node_id("3").unwrap();
        assert_eq!(solution.voltage(n3), rat(20));
        assert_eq!(solution.current("L1").unwrap(), rat(0));
        assert_eq!(solution.current("C1").unwrap(), rat(0));
    }

    #[test]
    fn test_exact_fractions() {
        // Three 1-ohm resistors in parallel from a 1 A source: v = 1/3.
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::current_source(
                "I1",
                "0",
                "1",
                Excitation::dc(rat(1)),
            ))
            .unwrap();
        for name in ["R1", "R2", "R3"] {
            netlist
                .add(ComponentSpec::resistor(name, "1", "0", 1))
                .unwrap();
        }
        let solution = solve_dc(&netlist, Formulation::Auto).unwrap();
        let n1 = netlist.node_id("1").unwrap();
        assert_eq!(solution.voltage(n1), BigRational::new(1.into(), 3.into()));
    }

    #[test]
    fn test_vcvs_amplifier() {
        // E1 doubles the divider tap voltage.
        let mut netlist = divider();
        netlist
            .add(ComponentSpec::vcvs("E1", "3", "0", "2", "0", 2))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor("RL", "3", "0", 8))
            .unwrap();
        let solution = solve_dc(&netlist, Formulation::Auto).unwrap();
        let n3 = netlist.node_id("3").unwrap();
        assert_eq!(solution.voltage(n3), rat(8));
    }

    #[test]
    fn test_shorted_source_is_singular() {
        let mut netlist = Netlist::new();
        netlist
            .add(ComponentSpec::voltage_source(
                "V1",
                "1",
                "0",
                Excitation::dc(rat(5)),
            ))
            .unwrap();
        netlist.add(ComponentSpec::wire("W1", "1", "0")).unwrap();
        let err = solve_dc(&netlist, Formulation::Auto).unwrap_err();
        match err {
            crate::error::Error::Singular { reasons, .. } => {
                assert!(!reasons.is_empty());
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
