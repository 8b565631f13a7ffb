//! Independent source excitations.
//!
//! A source value is split into the parts that drive the three analysis
//! domains: a DC offset, a finite sum of single-frequency tones, and a
//! transient part carried into the Laplace domain. The source classifier
//! groups sources by which parts are present.

use std::fmt;

use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use symspice_expr::{Poly, RatFun};

/// One sinusoidal tone: `amplitude * cos(omega*t + phase)`.
///
/// The angular frequency is an exact rational so tones at the same
/// frequency group together without float tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Peak amplitude.
    pub amplitude: BigRational,
    /// Angular frequency in rad/s.
    pub omega: BigRational,
    /// Phase in degrees.
    pub phase_deg: BigRational,
}

impl Tone {
    /// Phase in radians (lossy).
    pub fn phase_rad(&self) -> f64 {
        self.phase_deg.to_f64().unwrap_or(0.0) * std::f64::consts::PI / 180.0
    }
}

/// The transient part of an excitation, expressed in the Laplace domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Transient {
    /// A step of the given height at `t = 0`: transform `v / s`.
    Step(BigRational),
    /// An arbitrary `s`-domain expression.
    Laplace(RatFun),
}

impl Transient {
    /// The Laplace-domain transform of this part.
    pub fn transform(&self) -> RatFun {
        match self {
            Transient::Step(v) => {
                RatFun::new(Poly::constant(v.clone()), Poly::var())
            }
            Transient::Laplace(f) => f.clone(),
        }
    }
}

/// A full independent-source excitation: DC offset + AC tones + transient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Excitation {
    /// DC offset (zero if absent).
    pub dc: Option<BigRational>,
    /// Sinusoidal tones.
    pub tones: Vec<Tone>,
    /// Transient / s-domain part.
    pub transient: Option<Transient>,
}

impl Excitation {
    /// A pure DC excitation.
    pub fn dc(value: BigRational) -> Self {
        Self {
            dc: Some(value),
            ..Default::default()
        }
    }

    /// A single-tone AC excitation with zero phase.
    pub fn ac(amplitude: BigRational, omega: BigRational) -> Self {
        Self::ac_phased(amplitude, omega, BigRational::zero())
    }

    /// A single-tone AC excitation with a phase in degrees.
    pub fn ac_phased(amplitude: BigRational, omega: BigRational, phase_deg: BigRational) -> Self {
        Self {
            tones: vec![Tone {
                amplitude,
                omega,
                phase_deg,
            }],
            ..Default::default()
        }
    }

    /// A step excitation.
    pub fn step(value: BigRational) -> Self {
        Self {
            transient: Some(Transient::Step(value)),
            ..Default::default()
        }
    }

    /// An arbitrary Laplace-domain excitation.
    pub fn laplace(f: RatFun) -> Self {
        Self {
            transient: Some(Transient::Laplace(f)),
            ..Default::default()
        }
    }

    /// A fully killed excitation (0 V / 0 A).
    pub fn killed() -> Self {
        Self::default()
    }

    /// Add a DC offset to an existing excitation.
    pub fn with_dc(mut self, value: BigRational) -> Self {
        self.dc = Some(value);
        self
    }

    /// Add a tone to an existing excitation.
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tones.push(tone);
        self
    }

    /// True when every part is absent or zero.
    pub fn is_zero(&self) -> bool {
        self.dc.as_ref().is_none_or(|v| v.is_zero())
            && self.tones.iter().all(|t| t.amplitude.is_zero())
            && match &self.transient {
                None => true,
                Some(Transient::Step(v)) => v.is_zero(),
                Some(Transient::Laplace(f)) => f.is_zero(),
            }
    }

    /// The excitation restricted to the DC part only.
    pub fn dc_part(&self) -> Option<BigRational> {
        self.dc.clone().filter(|v| !v.is_zero())
    }

    /// The tones at one angular frequency.
    pub fn tones_at(&self, omega: &BigRational) -> Vec<&Tone> {
        self.tones
            .iter()
            .filter(|t| &t.omega == omega && !t.amplitude.is_zero())
            .collect()
    }

    /// The transient part, if present and non-zero.
    pub fn transient_part(&self) -> Option<&Transient> {
        self.transient.as_ref().filter(|t| match t {
            Transient::Step(v) => !v.is_zero(),
            Transient::Laplace(f) => !f.is_zero(),
        })
    }
}

impl fmt::Display for Excitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(v) = &self.dc {
            write!(f, "dc {v}")?;
            wrote = true;
        }
        for tone in &self.tones {
            if wrote {
                write!(f, " + ")?;
            }
            write!(f, "ac {} @ {} rad/s", tone.amplitude, tone.omega)?;
            wrote = true;
        }
        if let Some(t) = &self.transient {
            if wrote {
                write!(f, " + ")?;
            }
            match t {
                Transient::Step(v) => write!(f, "step {v}")?,
                Transient::Laplace(expr) => write!(f, "{expr}")?,
            }
            wrote = true;
        }
        if !wrote {
            write!(f, "0")?;
        }
        Ok(())
    }
}
