//! Laplace-domain analysis over rational functions of `s`.
//!
//! Transient excitations and initial conditions drive this domain.
//! Initial conditions enter either as series voltage terms on the
//! auxiliary branch (`-L*i0`, `v0/s`) or as Norton current sources in
//! the admittance form (`-C*v0`, `i0/s`), depending on the formulation.
//! Elimination is exact over the fraction field, so node voltages come
//! back as closed-form rational functions ready for partial-fraction
//! inversion.

use num_rational::BigRational;
use num_traits::Zero;
use symspice_core::{Excitation, Netlist, NodeId};
use symspice_expr::RatFun;

use crate::assemble::{check_reactive, Domain, DomainSolution, Formulation, ReactiveStamp};
use crate::classify::DomainTag;
use crate::error::Result;
use crate::linear::SolverMethod;

#[derive(Debug)]
pub(crate) struct LaplaceDomain;

impl Domain for LaplaceDomain {
    type Scalar = RatFun;

    fn tag(&self) -> DomainTag {
        DomainTag::Laplace
    }

    fn rational(&self, r: &BigRational) -> RatFun {
        RatFun::constant(r.clone())
    }

    fn ratfun(&self, f: &RatFun, _component: &str) -> Result<RatFun> {
        Ok(f.clone())
    }

    fn source(&self, excitation: &Excitation) -> RatFun {
        excitation
            .transient_part()
            .map(|t| t.transform())
            .unwrap_or_else(RatFun::zero)
    }

    fn capacitor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<RatFun>> {
        check_reactive(name, value, ic)?;
        if value.is_zero() {
            return Ok(ReactiveStamp::Open);
        }
        let sc = RatFun::var().scale(value);
        Ok(if aux {
            // v_a - v_b - i/(sC) = v0/s
            let series_voltage = match ic {
                Some(v0) => RatFun::constant(v0.clone()) / RatFun::var(),
                None => RatFun::zero(),
            };
            ReactiveStamp::Branch {
                impedance: sc.recip(),
                series_voltage,
            }
        } else {
            // i = sC*dv - C*v0
            let norton = ic.map(|v0| -RatFun::constant(value * v0));
            ReactiveStamp::Admittance { y: sc, norton }
        })
    }

    fn inductor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<RatFun>> {
        check_reactive(name, value, ic)?;
        let sl = RatFun::var().scale(value);
        Ok(if aux {
            // v_a - v_b - sL*i = -L*i0
            let series_voltage = match ic {
                Some(i0) => -RatFun::constant(value * i0),
                None => RatFun::zero(),
            };
            ReactiveStamp::Branch {
                impedance: sl,
                series_voltage,
            }
        } else {
            // i = dv/(sL) + i0/s
            let norton = ic.map(|i0| RatFun::constant(i0.clone()) / RatFun::var());
            ReactiveStamp::Admittance {
                y: sl.recip(),
                norton,
            }
        })
    }

    fn mutual_impedance(&self, m: &BigRational) -> Option<RatFun> {
        Some(RatFun::var().scale(m))
    }

    fn mutual_initial_voltage(
        &self,
        m: &BigRational,
        partner_ic: &BigRational,
    ) -> Option<RatFun> {
        Some(-RatFun::constant(m * partner_ic))
    }
}

/// An exact Laplace-domain solution of a netlist.
#[derive(Debug)]
pub struct LaplaceSolution(DomainSolution<LaplaceDomain>);

impl LaplaceSolution {
    /// Node voltage transform `V(s)`.
    pub fn voltage(&self, node: NodeId) -> RatFun {
        self.0.voltage(node)
    }

    /// Branch current transform `I(s)`, first terminal to second.
    pub fn current(&self, name: &str) -> Result<RatFun> {
        self.0.current(name)
    }
}

/// Solve the Laplace domain. Only transient excitation parts and
/// initial conditions drive the system.
pub fn solve_laplace(netlist: &Netlist, formulation: Formulation) -> Result<LaplaceSolution> {
    crate::assemble::solve_domain(LaplaceDomain, netlist, formulation, SolverMethod::Auto)
        .map(LaplaceSolution)
}
