//! Generic MNA assembly over a scalar domain.
//!
//! One assembly path serves all three domains. A [`Domain`] supplies the
//! scalar type and the per-element admittance/impedance values; the
//! assembler walks the netlist once and applies the stamp for each
//! component kind. The unknown layout (which nodes and which auxiliary
//! branch currents exist) is computed up front so stamps can reference
//! branch indices in any component order.

use indexmap::IndexMap;
use log::debug;
use num_rational::BigRational;
use num_traits::{One, Zero};
use symspice_core::{
    Component, ComponentKind, Excitation, MnaScalar, MnaSystem, Netlist, NodeId, Value,
};
use symspice_expr::RatFun;

use crate::classify::DomainTag;
use crate::error::{Error, Result};

/// How reactive elements enter the system.
///
/// The admittance form eliminates the element's current algebraically;
/// the auxiliary form keeps it as an explicit unknown, which is required
/// to read the current back and tolerates zero-valued elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formulation {
    /// Auxiliary unknowns for inductors, admittance form for capacitors.
    #[default]
    Auto,
    /// Auxiliary unknowns for both inductors and capacitors.
    AlwaysAuxiliary,
    /// Admittance form wherever algebraically possible.
    PreferElimination,
}

/// Maps nodes and auxiliary branches to unknown indices.
///
/// Node unknowns come first (netlist node order, ground excluded), then
/// one or two branch current unknowns per eligible component, in
/// component order.
#[derive(Debug, Clone)]
pub struct UnknownLayout {
    node_index: IndexMap<NodeId, usize>,
    /// Component name to first branch index (two-ports own two).
    branch_index: IndexMap<String, usize>,
    num_branches: usize,
}

impl UnknownLayout {
    /// The unknown index of a node, or `None` for ground.
    pub fn node(&self, id: NodeId) -> Option<usize> {
        if id.is_ground() {
            None
        } else {
            self.node_index.get(&id).copied()
        }
    }

    /// The first auxiliary branch index of a component, if it has one.
    pub fn branch(&self, name: &str) -> Option<usize> {
        self.branch_index.get(name).copied()
    }

    pub fn num_nodes(&self) -> usize {
        self.node_index.len()
    }

    pub fn num_branches(&self) -> usize {
        self.num_branches
    }
}

/// How a reactive element is stamped in one domain.
pub(crate) enum ReactiveStamp<S> {
    /// No contribution (capacitor at DC).
    Open,
    /// Admittance form: `i(a->b) = y*(v_a - v_b) + norton`.
    Admittance { y: S, norton: Option<S> },
    /// Auxiliary branch form: `v_a - v_b - z*i = e`.
    Branch { impedance: S, series_voltage: S },
}

/// Reject a reactive element whose value is exactly zero while it
/// carries an initial condition: neither formulation represents it.
pub(crate) fn check_reactive(
    name: &str,
    value: &BigRational,
    ic: Option<&BigRational>,
) -> Result<()> {
    if value.is_zero() && ic.is_some() {
        return Err(symspice_core::Error::DegenerateComponent {
            name: name.to_string(),
            reason: "zero-valued reactive element with an initial condition".into(),
        }
        .into());
    }
    Ok(())
}

/// A scalar domain the generic assembler can target.
pub(crate) trait Domain {
    type Scalar: MnaScalar;

    fn tag(&self) -> DomainTag;

    /// Lift an exact rational into the domain scalar.
    fn rational(&self, r: &BigRational) -> Self::Scalar;

    /// Lift an `s`-domain rational function (two-port parameters).
    fn ratfun(&self, f: &RatFun, component: &str) -> Result<Self::Scalar>;

    /// The excitation value of an independent source in this domain.
    fn source(&self, excitation: &Excitation) -> Self::Scalar;

    fn capacitor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<Self::Scalar>>;

    fn inductor(
        &self,
        name: &str,
        value: &BigRational,
        ic: Option<&BigRational>,
        aux: bool,
    ) -> Result<ReactiveStamp<Self::Scalar>>;

    /// The mutual coupling impedance `s*M` (`None` at DC, where the
    /// coupling vanishes).
    fn mutual_impedance(&self, m: &BigRational) -> Option<Self::Scalar>;

    /// The RHS contribution `-M*i0` of the partner inductor's initial
    /// current (Laplace only).
    fn mutual_initial_voltage(
        &self,
        m: &BigRational,
        partner_ic: &BigRational,
    ) -> Option<Self::Scalar>;

    /// Solve the assembled system; `None` means singular. Exact domains
    /// use Gaussian elimination; the numeric AC domain honors the method
    /// selection.
    fn solve_linear(
        &self,
        a: nalgebra::DMatrix<Self::Scalar>,
        b: nalgebra::DVector<Self::Scalar>,
        method: crate::linear::SolverMethod,
    ) -> Option<nalgebra::DVector<Self::Scalar>> {
        let _ = method;
        crate::linear::solve_gaussian(a, b)
    }
}

/// An assembled system plus the layout needed to interpret its solution.
pub(crate) struct Assembled<D: Domain> {
    pub(crate) layout: UnknownLayout,
    pub(crate) system: MnaSystem<D::Scalar>,
}

/// Resolve a component value to a number, rejecting unbound symbols.
pub(crate) fn bound<'a>(value: &'a Value, component: &str) -> Result<&'a BigRational> {
    match value {
        Value::Num(r) => Ok(r),
        Value::Symbol(sym) => Err(symspice_core::Error::UnboundSymbol {
            component: component.to_string(),
            symbol: sym.clone(),
        }
        .into()),
    }
}

fn inductor_uses_branch(
    tag: &DomainTag,
    formulation: Formulation,
    value: &BigRational,
    coupled: bool,
) -> bool {
    match tag {
        DomainTag::Dc => true,
        _ => match formulation {
            Formulation::Auto | Formulation::AlwaysAuxiliary => true,
            Formulation::PreferElimination => coupled || value.is_zero(),
        },
    }
}

fn capacitor_uses_branch(tag: &DomainTag, formulation: Formulation, has_ic: bool) -> bool {
    if matches!(tag, DomainTag::Dc) {
        return false;
    }
    match formulation {
        Formulation::AlwaysAuxiliary => true,
        Formulation::Auto => has_ic,
        Formulation::PreferElimination => false,
    }
}

/// Number of auxiliary branch unknowns a component contributes.
fn branch_count(
    component: &Component,
    tag: &DomainTag,
    formulation: Formulation,
    coupled: &[String],
) -> Result<usize> {
    Ok(match &component.kind {
        ComponentKind::VoltageSource { .. }
        | ComponentKind::Vcvs { .. }
        | ComponentKind::Wire
        | ComponentKind::Transformer { .. } => 1,
        ComponentKind::TwoPort { .. } => 2,
        ComponentKind::Inductor { value, .. } => {
            let value = bound(value, &component.name)?;
            let coupled = coupled.contains(&component.name);
            usize::from(inductor_uses_branch(tag, formulation, value, coupled))
        }
        ComponentKind::Capacitor { value, ic } => {
            // A zero-valued capacitor is an open circuit in every domain
            // and gets no branch even in auxiliary form.
            let value = bound(value, &component.name)?;
            if value.is_zero() {
                0
            } else {
                usize::from(capacitor_uses_branch(tag, formulation, ic.is_some()))
            }
        }
        _ => 0,
    })
}

/// Names of inductors referenced by a mutual coupling.
fn coupled_inductors(netlist: &Netlist) -> Vec<String> {
    let mut names = Vec::new();
    for c in netlist.components() {
        if let ComponentKind::MutualInductance {
            inductor1,
            inductor2,
            ..
        } = &c.kind
        {
            names.push(inductor1.clone());
            names.push(inductor2.clone());
        }
    }
    names
}

fn build_layout(
    netlist: &Netlist,
    tag: &DomainTag,
    formulation: Formulation,
) -> Result<UnknownLayout> {
    let mut node_index = IndexMap::new();
    for node in netlist.nodes() {
        let next = node_index.len();
        node_index.insert(node.id(), next);
    }

    let coupled = coupled_inductors(netlist);
    let mut branch_index = IndexMap::new();
    let mut num_branches = 0;
    for component in netlist.components() {
        let count = branch_count(component, tag, formulation, &coupled)?;
        if count > 0 {
            branch_index.insert(component.name.clone(), num_branches);
            num_branches += count;
        }
    }

    Ok(UnknownLayout {
        node_index,
        branch_index,
        num_branches,
    })
}

/// Validate a mutual coupling and fetch its partner inductor.
fn coupled_inductor<'a>(
    netlist: &'a Netlist,
    mutual: &str,
    name: &str,
) -> Result<&'a Component> {
    let component = netlist.component(name).ok_or_else(|| {
        symspice_core::Error::InvalidComponent {
            name: mutual.to_string(),
            reason: format!("couples unknown component '{name}'"),
        }
    })?;
    if !matches!(component.kind, ComponentKind::Inductor { .. }) {
        return Err(symspice_core::Error::InvalidComponent {
            name: mutual.to_string(),
            reason: format!("'{name}' is not an inductor"),
        }
        .into());
    }
    Ok(component)
}

fn inductor_ic(component: &Component) -> Option<&BigRational> {
    match &component.kind {
        ComponentKind::Inductor { ic, .. } => ic.as_ref(),
        _ => None,
    }
}

/// Assemble the MNA system for a netlist in one domain.
///
/// Stamps are additive and the layout is fixed before stamping starts,
/// so component order never changes the assembled system.
pub(crate) fn assemble<D: Domain>(
    domain: &D,
    netlist: &Netlist,
    formulation: Formulation,
) -> Result<Assembled<D>> {
    let tag = domain.tag();
    let layout = build_layout(netlist, &tag, formulation)?;
    let mut system: MnaSystem<D::Scalar> =
        MnaSystem::new(layout.num_nodes(), layout.num_branches());
    debug!(
        "assembling {} system: {} node(s), {} branch(es)",
        tag,
        layout.num_nodes(),
        layout.num_branches()
    );

    let coupled = coupled_inductors(netlist);
    for component in netlist.components() {
        stamp_component(domain, netlist, &layout, &mut system, component, formulation, &coupled)?;
    }

    Ok(Assembled { layout, system })
}

fn node_at(
    layout: &UnknownLayout,
    component: &Component,
    terminal: usize,
) -> Result<Option<usize>> {
    let id = component.nodes[terminal];
    if id.is_ground() {
        return Ok(None);
    }
    match layout.node(id) {
        Some(index) => Ok(Some(index)),
        None => Err(symspice_core::Error::UnresolvedNode {
            component: component.name.clone(),
            node: format!("{id}"),
        }
        .into()),
    }
}

fn stamp_reactive<D: Domain>(
    layout: &UnknownLayout,
    system: &mut MnaSystem<D::Scalar>,
    component: &Component,
    stamp: ReactiveStamp<D::Scalar>,
) -> Result<()> {
    let a = node_at(layout, component, 0)?;
    let b = node_at(layout, component, 1)?;
    match stamp {
        ReactiveStamp::Open => {}
        ReactiveStamp::Admittance { y, norton } => {
            system.stamp_admittance(a, b, y);
            if let Some(i) = norton {
                system.stamp_current_source(a, b, i);
            }
        }
        ReactiveStamp::Branch {
            impedance,
            series_voltage,
        } => {
            let branch = layout
                .branch(&component.name)
                .ok_or_else(|| Error::NoBranchCurrent(component.name.clone()))?;
            system.stamp_voltage_source(a, b, branch, series_voltage);
            system.stamp_branch_impedance(branch, impedance);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn stamp_component<D: Domain>(
    domain: &D,
    netlist: &Netlist,
    layout: &UnknownLayout,
    system: &mut MnaSystem<D::Scalar>,
    component: &Component,
    formulation: Formulation,
    coupled: &[String],
) -> Result<()> {
    let name = &component.name;
    match &component.kind {
        ComponentKind::Resistor { value } => {
            let r = bound(value, name)?;
            if r.is_zero() {
                return Err(symspice_core::Error::DegenerateComponent {
                    name: name.clone(),
                    reason: "zero resistance; use a wire".into(),
                }
                .into());
            }
            let a = node_at(layout, component, 0)?;
            let b = node_at(layout, component, 1)?;
            system.stamp_admittance(a, b, domain.rational(&r.recip()));
        }
        ComponentKind::Conductor { value } => {
            let g = bound(value, name)?;
            let a = node_at(layout, component, 0)?;
            let b = node_at(layout, component, 1)?;
            system.stamp_admittance(a, b, domain.rational(g));
        }
        ComponentKind::Capacitor { value, ic } => {
            let c = bound(value, name)?;
            let aux = capacitor_uses_branch(&domain.tag(), formulation, ic.is_some());
            let stamp = domain.capacitor(name, c, ic.as_ref(), aux)?;
            stamp_reactive::<D>(layout, system, component, stamp)?;
        }
        ComponentKind::Inductor { value, ic } => {
            let l = bound(value, name)?;
            let aux = inductor_uses_branch(
                &domain.tag(),
                formulation,
                l,
                coupled.contains(name),
            );
            let stamp = domain.inductor(name, l, ic.as_ref(), aux)?;
            stamp_reactive::<D>(layout, system, component, stamp)?;
        }
        ComponentKind::VoltageSource { excitation } => {
            let a = node_at(layout, component, 0)?;
            let b = node_at(layout, component, 1)?;
            let branch = layout
                .branch(name)
                .ok_or_else(|| Error::NoBranchCurrent(name.clone()))?;
            system.stamp_voltage_source(a, b, branch, domain.source(excitation));
        }
        ComponentKind::CurrentSource { excitation } => {
            let a = node_at(layout, component, 0)?;
            let b = node_at(layout, component, 1)?;
            system.stamp_current_source(a, b, domain.source(excitation));
        }
        ComponentKind::Wire => {
            let a = node_at(layout, component, 0)?;
            let b = node_at(layout, component, 1)?;
            let branch = layout
                .branch(name)
                .ok_or_else(|| Error::NoBranchCurrent(name.clone()))?;
            system.stamp_voltage_source(a, b, branch, D::Scalar::zero());
        }
        ComponentKind::Vcvs { gain } => {
            let e = domain.rational(bound(gain, name)?);
            let p = node_at(layout, component, 0)?;
            let n = node_at(layout, component, 1)?;
            let cp = node_at(layout, component, 2)?;
            let cn = node_at(layout, component, 3)?;
            let branch = layout
                .branch(name)
                .ok_or_else(|| Error::NoBranchCurrent(name.clone()))?;
            let row = system.branch_row(branch);
            for (node, sign) in [(p, false), (n, true)] {
                if let Some(i) = node {
                    let one = D::Scalar::one();
                    if sign {
                        system.add(i, row, -one.clone());
                        system.add(row, i, -one);
                    } else {
                        system.add(i, row, one.clone());
                        system.add(row, i, one);
                    }
                }
            }
            if let Some(i) = cp {
                system.add(row, i, -e.clone());
            }
            if let Some(i) = cn {
                system.add(row, i, e);
            }
        }
        ComponentKind::Transformer { ratio } => {
            let a = domain.rational(bound(ratio, name)?);
            let p1 = node_at(layout, component, 0)?;
            let n1 = node_at(layout, component, 1)?;
            let p2 = node_at(layout, component, 2)?;
            let n2 = node_at(layout, component, 3)?;
            let branch = layout
                .branch(name)
                .ok_or_else(|| Error::NoBranchCurrent(name.clone()))?;
            let row = system.branch_row(branch);
            // Branch equation v1 = a*v2; secondary current is -a times
            // the primary branch current, which makes the stamp symmetric.
            let entries = [
                (p1, D::Scalar::one()),
                (n1, -D::Scalar::one()),
                (p2, -a.clone()),
                (n2, a),
            ];
            for (node, coeff) in entries {
                if let Some(i) = node {
                    system.add(row, i, coeff.clone());
                    system.add(i, row, coeff);
                }
            }
        }
        ComponentKind::Gyrator { resistance } => {
            let r = bound(resistance, name)?;
            if r.is_zero() {
                return Err(symspice_core::Error::DegenerateComponent {
                    name: name.clone(),
                    reason: "zero gyration resistance".into(),
                }
                .into());
            }
            let g = domain.rational(&r.recip());
            let p1 = node_at(layout, component, 0)?;
            let n1 = node_at(layout, component, 1)?;
            let p2 = node_at(layout, component, 2)?;
            let n2 = node_at(layout, component, 3)?;
            // i1 = v2/R into port 1, i2 = -v1/R into port 2.
            system.stamp_vccs(p1, n1, p2, n2, g.clone());
            system.stamp_vccs(p2, n2, p1, n1, -g);
        }
        ComponentKind::TwoPort { a, b, c, d } => {
            let pa = domain.ratfun(a, name)?;
            let pb = domain.ratfun(b, name)?;
            let pc = domain.ratfun(c, name)?;
            let pd = domain.ratfun(d, name)?;
            let p1 = node_at(layout, component, 0)?;
            let n1 = node_at(layout, component, 1)?;
            let p2 = node_at(layout, component, 2)?;
            let n2 = node_at(layout, component, 3)?;
            let branch = layout
                .branch(name)
                .ok_or_else(|| Error::NoBranchCurrent(name.clone()))?;
            let row1 = system.branch_row(branch);
            let row2 = system.branch_row(branch + 1);
            // Port currents flow into the + terminals:
            //   v1 = A*v2 - B*i2,  i1 = C*v2 - D*i2.
            if let Some(i) = p1 {
                system.add(i, row1, D::Scalar::one());
                system.add(row1, i, D::Scalar::one());
            }
            if let Some(i) = n1 {
                system.add(i, row1, -D::Scalar::one());
                system.add(row1, i, -D::Scalar::one());
            }
            if let Some(i) = p2 {
                system.add(i, row2, D::Scalar::one());
                system.add(row1, i, -pa.clone());
                system.add(row2, i, -pc.clone());
            }
            if let Some(i) = n2 {
                system.add(i, row2, -D::Scalar::one());
                system.add(row1, i, pa);
                system.add(row2, i, pc);
            }
            system.add(row1, row2, pb);
            system.add(row2, row1, D::Scalar::one());
            system.add(row2, row2, pd);
        }
        ComponentKind::MutualInductance {
            inductor1,
            inductor2,
            coupling,
        } => {
            let m = bound(coupling, name)?;
            let first = coupled_inductor(netlist, name, inductor1)?;
            let second = coupled_inductor(netlist, name, inductor2)?;
            let Some(zm) = domain.mutual_impedance(m) else {
                return Ok(());
            };
            let b1 = layout
                .branch(inductor1)
                .ok_or_else(|| Error::NoBranchCurrent(inductor1.clone()))?;
            let b2 = layout
                .branch(inductor2)
                .ok_or_else(|| Error::NoBranchCurrent(inductor2.clone()))?;
            let row1 = system.branch_row(b1);
            let row2 = system.branch_row(b2);
            system.add(row1, row2, -zm.clone());
            system.add(row2, row1, -zm);
            if let Some(ic) = inductor_ic(second) {
                if let Some(v) = domain.mutual_initial_voltage(m, ic) {
                    system.add_rhs(row1, v);
                }
            }
            if let Some(ic) = inductor_ic(first) {
                if let Some(v) = domain.mutual_initial_voltage(m, ic) {
                    system.add_rhs(row2, v);
                }
            }
        }
    }
    Ok(())
}

/// A solved sub-circuit in one domain.
///
/// Holds the netlist it was solved against so branch currents of
/// elements without auxiliary unknowns can be reconstructed from the
/// node voltages.
#[derive(Debug)]
pub(crate) struct DomainSolution<D: Domain> {
    domain: D,
    netlist: Netlist,
    layout: UnknownLayout,
    x: nalgebra::DVector<D::Scalar>,
}

/// Assemble and solve a netlist in one domain.
///
/// A singular system is diagnosed structurally and reported through
/// [`Error::Singular`] with every matching reason.
pub(crate) fn solve_domain<D: Domain>(
    domain: D,
    netlist: &Netlist,
    formulation: Formulation,
    method: crate::linear::SolverMethod,
) -> Result<DomainSolution<D>> {
    let Assembled { layout, system } = assemble(&domain, netlist, formulation)?;
    let (a, b) = system.into_parts();
    match domain.solve_linear(a, b, method) {
        Some(x) => Ok(DomainSolution {
            domain,
            netlist: netlist.clone(),
            layout,
            x,
        }),
        None => {
            let tag = domain.tag();
            let reasons = crate::diagnose::diagnose(netlist, &tag);
            Err(Error::Singular {
                domain: tag,
                reasons,
            })
        }
    }
}

impl<D: Domain> DomainSolution<D> {
    pub(crate) fn domain(&self) -> &D {
        &self.domain
    }

    /// The voltage at a node. Ground is zero; a node absent from this
    /// sub-circuit (removed with a killed current source) contributes
    /// zero as well.
    pub(crate) fn voltage(&self, id: NodeId) -> D::Scalar {
        match self.layout.node(id) {
            Some(index) => self.x[index].clone(),
            None => D::Scalar::zero(),
        }
    }

    /// The current through a component, from its first terminal to its
    /// second. Auxiliary unknowns are read directly; admittance-form
    /// elements are reconstructed from the node voltages.
    pub(crate) fn current(&self, name: &str) -> Result<D::Scalar> {
        let Some(component) = self.netlist.component(name) else {
            // Removed by decomposition: a killed current source.
            return Ok(D::Scalar::zero());
        };
        if let Some(branch) = self.layout.branch(name) {
            return Ok(self.x[self.layout.num_nodes() + branch].clone());
        }

        let dv = |t0: usize, t1: usize| {
            self.voltage(component.nodes[t0]) - self.voltage(component.nodes[t1])
        };
        match &component.kind {
            ComponentKind::Resistor { value } => {
                let r = bound(value, name)?;
                Ok(self.domain.rational(&r.recip()) * dv(0, 1))
            }
            ComponentKind::Conductor { value } => {
                let g = bound(value, name)?;
                Ok(self.domain.rational(g) * dv(0, 1))
            }
            ComponentKind::Capacitor { value, ic } => {
                let c = bound(value, name)?;
                match self.domain.capacitor(name, c, ic.as_ref(), false)? {
                    ReactiveStamp::Open => Ok(D::Scalar::zero()),
                    ReactiveStamp::Admittance { y, norton } => {
                        let mut i = y * dv(0, 1);
                        if let Some(n) = norton {
                            i += n;
                        }
                        Ok(i)
                    }
                    ReactiveStamp::Branch { .. } => Err(Error::NoBranchCurrent(name.into())),
                }
            }
            ComponentKind::Inductor { value, ic } => {
                let l = bound(value, name)?;
                match self.domain.inductor(name, l, ic.as_ref(), false)? {
                    ReactiveStamp::Open => Ok(D::Scalar::zero()),
                    ReactiveStamp::Admittance { y, norton } => {
                        let mut i = y * dv(0, 1);
                        if let Some(n) = norton {
                            i += n;
                        }
                        Ok(i)
                    }
                    ReactiveStamp::Branch { .. } => Err(Error::NoBranchCurrent(name.into())),
                }
            }
            ComponentKind::CurrentSource { excitation } => Ok(self.domain.source(excitation)),
            // Port-1 current of a gyrator is set by the port-2 voltage.
            ComponentKind::Gyrator { resistance } => {
                let r = bound(resistance, name)?;
                Ok(self.domain.rational(&r.recip()) * dv(2, 3))
            }
            _ => Err(Error::NoBranchCurrent(name.into())),
        }
    }
}
