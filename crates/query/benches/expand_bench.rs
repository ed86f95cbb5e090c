use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use query::{EmergencyDetector, QueryExpander};

fn bench_expand(c: &mut Criterion) {
    let expander = QueryExpander::default();
    let detector = EmergencyDetector::default();
    let mut group = c.benchmark_group("query");

    for repeat in [1usize, 8, 64].iter() {
        let text = "my dog won't eat, keeps vomiting and scratching ".repeat(*repeat);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("expand_x{repeat}"), |b| {
            b.iter(|| expander.expand(black_box(&text)))
        });
        group.bench_function(format!("detect_x{repeat}"), |b| {
            b.iter(|| detector.detect(black_box(&text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand);
criterion_main!(benches);
