//! Benchmarks for the QAOA layer kernels
//!
//! Compares the scalar and parallel phase layers and times the mixer layer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use maqaoa_core::{BasisTables, Graph, TermTable};
use maqaoa_state::kernels::mixer::apply_mixer_layer;
use maqaoa_state::kernels::phase::{apply_phase_layer_parallel, apply_phase_layer_scalar};
use maqaoa_state::StateVector;

const SIZES: [usize; 3] = [10, 14, 16];

fn gammas(len: usize) -> Vec<f64> {
    (0..len).map(|i| 0.1 + 0.03 * i as f64).collect()
}

fn bench_phase_layer_scalar(c: &mut Criterion) {
    let mut group = c.benchmark_group("phase_layer_scalar");

    for num_qubits in SIZES.iter() {
        group.throughput(Throughput::Elements(1 << num_qubits));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            num_qubits,
            |b, &num_qubits| {
                let table = TermTable::edge_cuts(&Graph::cycle(num_qubits)).unwrap();
                let gammas = gammas(table.num_terms());
                let mut state = StateVector::uniform(num_qubits).unwrap();

                b.iter(|| {
                    apply_phase_layer_scalar(black_box(&mut state), &table, &gammas).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_phase_layer_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("phase_layer_parallel");

    for num_qubits in SIZES.iter() {
        group.throughput(Throughput::Elements(1 << num_qubits));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            num_qubits,
            |b, &num_qubits| {
                let table = TermTable::edge_cuts(&Graph::cycle(num_qubits)).unwrap();
                let gammas = gammas(table.num_terms());
                let mut state = StateVector::uniform(num_qubits).unwrap();

                b.iter(|| {
                    apply_phase_layer_parallel(black_box(&mut state), &table, &gammas).unwrap();
                })
            },
        );
    }

    group.finish();
}

fn bench_mixer_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer_layer");

    for num_qubits in SIZES.iter() {
        group.throughput(Throughput::Elements(1 << num_qubits));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_qubits),
            num_qubits,
            |b, &num_qubits| {
                let basis = BasisTables::new(num_qubits).unwrap();
                let betas = gammas(num_qubits);
                let mut state = StateVector::uniform(num_qubits).unwrap();

                b.iter(|| {
                    apply_mixer_layer(black_box(&mut state), &betas, &basis).unwrap();
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_phase_layer_scalar,
    bench_phase_layer_parallel,
    bench_mixer_layer
);
criterion_main!(benches);
