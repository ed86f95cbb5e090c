mod common;

use common::{offline_pipeline, sample_corpus};
use snoutiq::{AnalysisResult, SubjectProfile};

/// Everything except the timestamp.
fn stable_view(result: &AnalysisResult) -> serde_json::Value {
    let mut value = serde_json::to_value(result).unwrap();
    value["query_metadata"]
        .as_object_mut()
        .unwrap()
        .remove("timestamp");
    value
}

#[tokio::test]
async fn same_query_same_answer() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();
    let pet = SubjectProfile::new("Bruno", "dog");

    let first = pipeline.analyze(&pet, "dog limping on back leg").await.unwrap();
    let second = pipeline.analyze(&pet, "dog limping on back leg").await.unwrap();
    assert_eq!(stable_view(&first), stable_view(&second));
}

#[tokio::test]
async fn independent_pipelines_agree() {
    let a = offline_pipeline();
    let b = offline_pipeline();
    a.load_entries(sample_corpus()).await.unwrap();
    b.load_entries(sample_corpus()).await.unwrap();
    let pet = SubjectProfile::new("Mittens", "cat");

    for query in [
        "cat sneezing all day",
        "cat bleeding from paw",
        "my cat is limping",
    ] {
        let ra = a.analyze(&pet, query).await.unwrap();
        let rb = b.analyze(&pet, query).await.unwrap();
        assert_eq!(stable_view(&ra), stable_view(&rb), "query: {query}");
    }
}

#[tokio::test]
async fn reloading_the_same_corpus_keeps_ranking() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();
    let pet = SubjectProfile::new("Bruno", "dog");
    let before = pipeline.analyze(&pet, "dog scratching ears").await.unwrap();

    pipeline.load_entries(sample_corpus()).await.unwrap();
    let after = pipeline.analyze(&pet, "dog scratching ears").await.unwrap();
    assert_eq!(stable_view(&before), stable_view(&after));
}

#[tokio::test]
async fn whitespace_around_query_does_not_change_result() {
    let pipeline = offline_pipeline();
    pipeline.load_entries(sample_corpus()).await.unwrap();
    let pet = SubjectProfile::new("Bruno", "dog");

    let plain = pipeline.analyze(&pet, "dog vomiting").await.unwrap();
    let padded = pipeline.analyze(&pet, "  dog vomiting \n").await.unwrap();
    assert_eq!(stable_view(&plain), stable_view(&padded));
}
