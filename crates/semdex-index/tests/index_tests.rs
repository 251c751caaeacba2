use semdex_core::types::{Chunk, Metric};
use semdex_core::Error;
use semdex_index::persist::{load, save};
use semdex_index::score::to_score;
use semdex_index::FlatIndex;

fn chunks_for(texts: &[&str]) -> Vec<Chunk> {
    texts
        .iter()
        .enumerate()
        .map(|(id, t)| Chunk { id, text: (*t).to_string() })
        .collect()
}

#[test]
fn squared_l2_orders_by_distance() {
    let vectors = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]];
    let index = FlatIndex::build(&vectors, Metric::SquaredL2).expect("build");

    let hits = index.query(&[0.9, 0.0], 3).expect("query");
    let ids: Vec<usize> = hits.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![1, 0, 2]);

    // Distances are non-decreasing down the ranking.
    for pair in hits.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn normalized_dot_orders_by_cosine() {
    // Vector 2 is long but nearly collinear with the query; normalization
    // must stop its magnitude from dominating.
    let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![10.0, 1.0]];
    let index = FlatIndex::build(&vectors, Metric::NormalizedDot).expect("build");

    let hits = index.query(&[5.0, 0.0], 3).expect("query");
    let ids: Vec<usize> = hits.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![0, 2, 1]);
    assert!((hits[0].1 - 1.0).abs() < 1e-5, "identical direction scores 1");
}

#[test]
fn oversized_k_returns_all_without_padding() {
    let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
    let index = FlatIndex::build(&vectors, Metric::NormalizedDot).expect("build");
    let hits = index.query(&[1.0, 1.0], 10).expect("query");
    assert_eq!(hits.len(), 2);
}

#[test]
fn mismatched_vector_dimensions_are_rejected() {
    let vectors = vec![vec![1.0, 0.0], vec![0.5]];
    assert!(matches!(
        FlatIndex::build(&vectors, Metric::SquaredL2),
        Err(Error::InvalidConfig(_))
    ));

    let index = FlatIndex::build(&[vec![1.0, 0.0]], Metric::SquaredL2).expect("build");
    assert!(matches!(index.query(&[1.0, 0.0, 0.0], 1), Err(Error::InvalidConfig(_))));
}

#[test]
fn empty_build_is_rejected() {
    assert!(matches!(
        FlatIndex::build(&[], Metric::SquaredL2),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn scores_are_bounded_and_monotonic() {
    assert!((to_score(Metric::SquaredL2, 0.0) - 1.0).abs() < f32::EPSILON);
    assert!(to_score(Metric::SquaredL2, 1.0) < to_score(Metric::SquaredL2, 0.5));
    assert!(to_score(Metric::SquaredL2, 1e6) > 0.0);
    assert!(to_score(Metric::SquaredL2, 1e6) < 1e-3);

    assert!((to_score(Metric::NormalizedDot, 1.2) - 1.0).abs() < f32::EPSILON);
    assert!(to_score(Metric::NormalizedDot, -0.4).abs() < f32::EPSILON);
    assert!((to_score(Metric::NormalizedDot, 0.63) - 0.63).abs() < f32::EPSILON);
}

#[test]
fn save_then_load_reproduces_query_results() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("index.semdex.json");

    let vectors = vec![vec![0.2, 0.9, 0.1], vec![0.8, 0.1, 0.3], vec![0.5, 0.5, 0.5]];
    let chunks = chunks_for(&["alpha", "bravo", "charlie"]);
    let index = FlatIndex::build(&vectors, Metric::NormalizedDot).expect("build");
    let before = index.query(&[0.7, 0.2, 0.2], 3).expect("query");

    save(&index, &chunks, &path).expect("save");
    let (loaded, loaded_chunks) = load(&path).expect("load");

    assert_eq!(loaded.dim(), index.dim());
    assert_eq!(loaded.metric(), index.metric());
    assert_eq!(loaded_chunks, chunks);

    let after = loaded.query(&[0.7, 0.2, 0.2], 3).expect("query");
    assert_eq!(before, after, "ranking and measures survive the round trip");
}

#[test]
fn saving_with_mismatched_chunk_count_is_rejected() {
    let index = FlatIndex::build(&[vec![1.0, 0.0]], Metric::SquaredL2).expect("build");
    let chunks = chunks_for(&["alpha", "bravo"]);
    let tmp = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        save(&index, &chunks, &tmp.path().join("bad.json")),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn unsupported_artifact_version_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("future.json");
    let artifact = serde_json::json!({
        "version": 99,
        "metric": "normalized-dot",
        "dim": 2,
        "chunks": ["alpha"],
        "vectors": [1.0, 0.0],
    });
    std::fs::write(&path, artifact.to_string()).expect("write");

    assert!(matches!(load(&path), Err(Error::FormatMismatch(_))));
}

#[test]
fn truncated_vector_buffer_is_rejected() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("truncated.json");
    let artifact = serde_json::json!({
        "version": 1,
        "metric": "squared-l2",
        "dim": 2,
        "chunks": ["alpha", "bravo"],
        "vectors": [1.0, 0.0, 0.5],
    });
    std::fs::write(&path, artifact.to_string()).expect("write");

    assert!(matches!(load(&path), Err(Error::FormatMismatch(_))));
}
