use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netgrowth::figures::likelihood_surface;
use netgrowth::prelude::*;

fn choice_data(n_max: usize, p: f64) -> ChoiceData {
    let options = RpGraphOptions::new(n_max, 1.0, p).with_edges_per_node(2);
    let (_, edges) = make_rp_graph(&options, &mut create_rng(1)).unwrap();
    process_edges(&edges, 20, false, &mut create_rng(2)).unwrap()
}

fn synthesis_benchmark(c: &mut Criterion) {
    c.bench_function("make_rp_graph 5000 nodes", |b| {
        let options = RpGraphOptions::new(5000, 0.5, 0.5).with_edges_per_node(5);
        b.iter(|| {
            let graph = make_rp_graph(&options, &mut create_rng(3)).unwrap();
            black_box(graph);
        })
    });
}

fn likelihood_benchmark(c: &mut Criterion) {
    let data = choice_data(2000, 0.5);
    let alphas = arange(0.0, 2.0, 0.1);
    let ps = arange(0.0, 1.0, 0.1);

    c.bench_function("likelihood surface 20x10", |b| {
        b.iter(|| black_box(likelihood_surface(&data, &alphas, &ps, false)))
    });

    c.bench_function("mixed logit EM", |b| {
        b.iter(|| {
            let mut model = MixedLogitModel::new("bench", &data);
            model.add_uniform_model().add_log_degree_model(None);
            black_box(model.fit(20, 1e-3).unwrap())
        })
    });

    c.bench_function("degree model fit", |b| {
        b.iter(|| {
            let mut model = DegreeModel::new(100);
            model.fit(&data).unwrap();
            black_box(model.log_likelihood())
        })
    });
}

criterion_group!(benches, synthesis_benchmark, likelihood_benchmark);
criterion_main!(benches);
