//! AC steady state at one angular frequency, over complex phasors.
//!
//! Phasor convention: a tone `A*cos(w*t + phi)` maps to the phasor
//! `A*e^{j*phi}`, so `v(t) = Re(V * e^{j*w*t})`. The frequency is kept
//! exact for classification; numerics are `Complex<f64>`.

use nalgebra::{Complex, DMatrix, DVector};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use symspice_core::{Excitation, Netlist, NodeId};
use symspice_expr::RatFun;

use crate::assemble::{check_reactive, Domain, DomainSolution, Formulation, ReactiveStamp};
use crate::classify::DomainTag;
use crate::error::Result;
use crate::linear::SolverMethod;

#[derive(Debug)]
pub(crate) struct AcDomain {
    omega_exact: BigRational,
    omega: f64,
}

impl AcDomain {
    pub(crate) fn new(omega: BigRational) -> Self {
        let w = omega.to_f64().unwrap_or(0.0);
        Self {
            omega_exact: omega,
            omega: w,
        }
    }

    fn jw(&self) -> Complex<f64> {
        Complex::new(0.0, self.omega)
    }
}

impl Domain for AcDomain {
    type Scalar = Complex<f64>;

    fn tag(&self) -> DomainTag {
        DomainTag::Ac(self.omega_exact.clone())
    }

    fn rational(&self, r: &BigRational) -> Complex<f64> {
        Complex::new(r.to_f64().unwrap_or(0.0), 0.0)
    }

    fn ratfun(&self, f: &RatFun, component: &str) -> Result<Complex<f64>> {
        f.eval_complex(self.jw()).ok_or_else(|| {
            symspice_core::Error::DegenerateComponent {
                name: component.to_string(),
                reason: format!("two-port parameter has a pole at omega = {}", self.omega),
            }
            .into()
        })
    }

    fn source(&self, excitation: &Excitation) -> Complex<f64> {
        let mut phasor = Complex::zero();
        for tone in excitation.tones_at(&self.omega_exact) {
            let amplitude = tone.amplitude.to_f64().unwrap_or(0.0);
            phasor += Complex::from_polar(amplitude, tone.phase_rad());
        }
        phasor
    }

    fn capacitor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<Complex<f64>>> {
        // Initial conditions do not affect the steady state, but a
        // zero-valued element with one is still malformed.
        check_reactive(name, value, ic)?;
        if value.is_zero() {
            return Ok(ReactiveStamp::Open);
        }
        let y = self.jw() * self.rational(value);
        Ok(if aux {
            ReactiveStamp::Branch {
                impedance: y.inv(),
                series_voltage: Complex::zero(),
            }
        } else {
            ReactiveStamp::Admittance { y, norton: None }
        })
    }

    fn inductor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<Complex<f64>>> {
        check_reactive(name, value, ic)?;
        let z = self.jw() * self.rational(value);
        Ok(if aux {
            ReactiveStamp::Branch {
                impedance: z,
                series_voltage: Complex::zero(),
            }
        } else {
            ReactiveStamp::Admittance {
                y: z.inv(),
                norton: None,
            }
        })
    }

    fn mutual_impedance(&self, m: &BigRational) -> Option<Complex<f64>> {
        Some(self.jw() * self.rational(m))
    }

    fn mutual_initial_voltage(
        &self,
        _m: &BigRational,
        _partner_ic: &BigRational,
    ) -> Option<Complex<f64>> {
        None
    }

    fn solve_linear(
        &self,
        a: DMatrix<Complex<f64>>,
        b: DVector<Complex<f64>>,
        method: SolverMethod,
    ) -> Option<DVector<Complex<f64>>> {
        crate::linear::solve_complex(a, b, method)
    }
}

/// An AC steady-state solution at one angular frequency.
#[derive(Debug)]
pub struct AcSolution(DomainSolution<AcDomain>);

impl AcSolution {
    /// The angular frequency this solution was computed at.
    pub fn omega(&self) -> &BigRational {
        &self.0.domain().omega_exact
    }

    /// Node voltage phasor.
    pub fn voltage(&self, node: NodeId) -> Complex<f64> {
        self.0.voltage(node)
    }

    /// Branch current phasor, first terminal to second.
    pub fn current(&self, name: &str) -> Result<Complex<f64>> {
        self.0.current(name)
    }
}

/// Solve the AC steady state at one angular frequency. Only tones at
/// exactly that frequency drive the system.
pub fn solve_ac(
    netlist: &Netlist,
    omega: BigRational,
    formulation: Formulation,
    method: SolverMethod,
) -> Result<AcSolution> {
    crate::assemble::solve_domain(AcDomain::new(omega), netlist, formulation, method)
        .map(AcSolution)
}
