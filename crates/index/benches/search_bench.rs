use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use index::CorpusStore;
use knowledge::{KnowledgeEntry, Severity, SpeciesScope};

fn sample_entry(id: usize) -> KnowledgeEntry {
    KnowledgeEntry {
        symptom_title: format!("symptom-{id}"),
        description: format!("description for symptom {id}"),
        severity: Severity::Routine,
        species_scope: SpeciesScope::Both,
        home_care_advice: String::new(),
        vet_escalation_criteria: String::new(),
        service_recommendation: None,
        climate_notes: None,
        category: "bench".into(),
    }
}

fn sample_vector(id: usize, dim: usize) -> Vec<f32> {
    (0..dim)
        .map(|j| (((id * 31 + j * 17) % 97) as f32 / 97.0) - 0.5)
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let dim = 384;
    let mut group = c.benchmark_group("corpus_search");

    for size in [100, 1_000, 5_000].iter() {
        let entries: Vec<KnowledgeEntry> = (0..*size).map(sample_entry).collect();
        let embeddings: Vec<Vec<f32>> = (0..*size).map(|i| sample_vector(i, dim)).collect();
        let store = CorpusStore::build(entries, embeddings).expect("store");
        let query = sample_vector(7, dim);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_function(format!("top20_{size}"), |b| {
            b.iter(|| store.search(black_box(&query), black_box(20)).expect("search"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
