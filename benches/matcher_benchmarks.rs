use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gqlpath::{label_set, parse, Bindings, Graph, MatchConfig, PathMatcher, Properties, VertexId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random directed graph with `n` vertices and about `degree * n` edges
fn random_graph(n: usize, degree: usize) -> Graph {
    let graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(42);
    let vertices: Vec<VertexId> = (0..n)
        .map(|i| {
            let label = if i % 10 == 0 { "Hub" } else { "Node" };
            graph.add_vertex(label_set([label]))
        })
        .collect();
    for &src in &vertices {
        for _ in 0..degree {
            let dst = vertices[rng.gen_range(0..n)];
            let _ = graph.add_edge(src, dst, label_set(["LINK"]), Properties::new());
        }
    }
    graph
}

fn count_matches(graph: &Graph, text: &str, config: &MatchConfig) -> usize {
    let snapshot = graph.snapshot();
    let pattern = parse(text).expect("pattern parses");
    let matcher = PathMatcher::with_config(&snapshot, config.clone());
    matcher
        .match_pattern(&pattern, Bindings::new())
        .expect("pattern validates")
        .count()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse quantified pattern", |b| {
        b.iter(|| {
            parse(black_box(
                "MATCH ALL SHORTEST TRAIL p = (a:Hub)((x)-[e:LINK]->(y) WHERE y.w > 1){1,4}(b:Hub) WHERE a <> b",
            ))
        })
    });
}

fn bench_fixed_length(c: &mut Criterion) {
    let graph = random_graph(500, 3);
    let config = MatchConfig::default();
    c.bench_function("two-hop walk", |b| {
        b.iter(|| count_matches(&graph, black_box("(a:Hub)-[:LINK]->(b)-[:LINK]->(c)"), &config))
    });
}

fn bench_shortest(c: &mut Criterion) {
    let graph = random_graph(500, 3);
    let config = MatchConfig::default();
    let mut group = c.benchmark_group("shortest");
    for prefix in ["ANY SHORTEST", "ALL SHORTEST", "SHORTEST 3", "SHORTEST 2 GROUPS"] {
        let text = format!("MATCH {} (a:Hub)-[:LINK]->+(b:Hub)", prefix);
        group.bench_with_input(BenchmarkId::from_parameter(prefix), &text, |b, text| {
            b.iter(|| count_matches(&graph, black_box(text), &config))
        });
    }
    group.finish();
}

fn bench_path_modes(c: &mut Criterion) {
    let graph = random_graph(100, 2);
    let config = MatchConfig {
        max_path_length: 5,
        ..MatchConfig::default()
    };
    let mut group = c.benchmark_group("path modes");
    for mode in ["WALK", "TRAIL", "SIMPLE", "ACYCLIC"] {
        let text = format!("MATCH {} (a:Hub)-[:LINK]->{{1,5}}(b)", mode);
        group.bench_with_input(BenchmarkId::from_parameter(mode), &text, |b, text| {
            b.iter(|| count_matches(&graph, black_box(text), &config))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_fixed_length,
    bench_shortest,
    bench_path_modes
);
criterion_main!(benches);
