//! Benchmarks for the exact solving pipeline.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use num_bigint::BigInt;
use num_rational::BigRational;
use symspice_core::{ComponentSpec, Excitation, Netlist};
use symspice_solver::{Analysis, Formulation, dc::solve_dc, laplace::solve_laplace};

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// A resistor ladder of `n` sections driven by a DC source.
fn resistor_ladder(n: usize) -> Netlist {
    let mut netlist = Netlist::new();
    netlist
        .add(ComponentSpec::voltage_source("V1", "1", "0", Excitation::dc(rat(10))))
        .unwrap();
    for i in 1..=n {
        let top = i.to_string();
        let next = (i + 1).to_string();
        netlist
            .add(ComponentSpec::resistor(format!("Rs{i}"), &top, &next, 2))
            .unwrap();
        netlist
            .add(ComponentSpec::resistor(format!("Rp{i}"), &next, "0", 3))
            .unwrap();
    }
    netlist
}

/// An RC ladder of `n` sections driven by a step source.
fn rc_ladder(n: usize) -> Netlist {
    let mut netlist = Netlist::new();
    netlist
        .add(ComponentSpec::voltage_source("V1", "1", "0", Excitation::step(rat(1))))
        .unwrap();
    for i in 1..=n {
        let top = i.to_string();
        let next = (i + 1).to_string();
        netlist
            .add(ComponentSpec::resistor(format!("R{i}"), &top, &next, 2))
            .unwrap();
        netlist
            .add(ComponentSpec::capacitor(format!("C{i}"), &next, "0", 1))
            .unwrap();
    }
    netlist
}

fn bench_dc_ladder(c: &mut Criterion) {
    for n in [4, 8, 16] {
        let netlist = resistor_ladder(n);
        c.bench_function(&format!("dc_resistor_ladder_{n}"), |b| {
            b.iter(|| solve_dc(black_box(&netlist), Formulation::Auto).unwrap());
        });
    }
}

fn bench_laplace_ladder(c: &mut Criterion) {
    for n in [2, 4] {
        let netlist = rc_ladder(n);
        c.bench_function(&format!("laplace_rc_ladder_{n}"), |b| {
            b.iter(|| solve_laplace(black_box(&netlist), Formulation::Auto).unwrap());
        });
    }
}

fn bench_cached_query(c: &mut Criterion) {
    c.bench_function("cached_node_voltage", |b| {
        let mut analysis = Analysis::new(resistor_ladder(8));
        analysis.solve_node_voltage("5").unwrap();
        b.iter(|| analysis.solve_node_voltage(black_box("5")).unwrap());
    });
}

criterion_group!(
    benches,
    bench_dc_ladder,
    bench_laplace_ladder,
    bench_cached_query
);
criterion_main!(benches);
