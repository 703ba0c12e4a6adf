use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dclog::{split_log, IterationStats};

/// Builds a log with the shape of a real run: a preamble, then one
/// enumeration section per iteration with three samples per concept.
fn synthetic_log(iterations: usize, concepts: usize) -> String {
    let mut text = String::from("job preamble\nloading tasks\n");
    for iteration in 0..iterations {
        text.push_str("Generative model enumeration results:\n");
        for concept in 0..concepts {
            for sample in 0..3 {
                let status = if (iteration + concept + sample) % 2 == 0 {
                    "HIT"
                } else {
                    "MISS"
                };
                text.push_str(&format!(
                    "{} wave1_concept{}_{} w/ (lambda (fold $0 empty cons))\n",
                    status, concept, sample
                ));
            }
        }
        text.push_str("Hits 10/100 tasks\nsome solver chatter\n");
    }
    text
}

fn parse_and_aggregate(c: &mut Criterion) {
    let text = synthetic_log(20, 50);

    c.bench_function("split_log_20_iterations", |b| {
        b.iter(|| split_log(black_box(&text)).unwrap())
    });

    let chunks = split_log(&text).unwrap();
    c.bench_function("collect_stats_20_iterations", |b| {
        b.iter(|| {
            chunks
                .iter()
                .map(|chunk| IterationStats::from_chunk(black_box(chunk)))
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, parse_and_aggregate);
criterion_main!(benches);
