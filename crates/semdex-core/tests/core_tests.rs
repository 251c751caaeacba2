use semdex_core::chunker::{chunk, chunk_with};
use semdex_core::config::{ChunkingConfig, ScoringConfig};
use semdex_core::types::{Chunk, Relevance};
use semdex_core::Error;

#[test]
fn no_overlap_chunks_reconstruct_word_sequence() {
    let text = "the quick brown fox jumps over the lazy dog again and again";
    let chunks: Vec<Chunk> = chunk(text, 5, 0).expect("chunk").collect();

    let rebuilt = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rebuilt, text);

    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.id, i, "ids are ordinal");
    }
}

#[test]
fn short_document_yields_single_chunk() {
    let chunks: Vec<Chunk> = chunk("only four words here", 128, 0).expect("chunk").collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "only four words here");
    assert_eq!(chunks[0].id, 0);
}

#[test]
fn empty_document_yields_no_chunks() {
    assert_eq!(chunk("", 16, 0).expect("chunk").count(), 0);
    assert_eq!(chunk("   \n\t  ", 16, 0).expect("chunk").count(), 0);
}

#[test]
fn overlapping_windows_share_words() {
    let text = "a b c d e f g h i j";
    let chunks: Vec<Chunk> = chunk(text, 4, 2).expect("chunk").collect();

    for pair in chunks.windows(2) {
        let prev: Vec<&str> = pair[0].text.split_whitespace().collect();
        let next: Vec<&str> = pair[1].text.split_whitespace().collect();
        assert_eq!(&prev[prev.len() - 2..], &next[..2], "adjacent chunks share the overlap");
    }

    // Every word is still covered, in order.
    let first_words: Vec<&str> = chunks
        .iter()
        .flat_map(|c| c.text.split_whitespace().skip(if c.id == 0 { 0 } else { 2 }))
        .collect();
    assert_eq!(first_words.join(" "), text);
}

#[test]
fn overlap_not_smaller_than_size_is_rejected() {
    assert!(matches!(chunk("a b c", 4, 4), Err(Error::InvalidConfig(_))));
    assert!(matches!(chunk("a b c", 4, 5), Err(Error::InvalidConfig(_))));
}

#[test]
fn zero_chunk_size_is_rejected() {
    assert!(matches!(chunk("a b c", 0, 0), Err(Error::InvalidConfig(_))));
}

#[test]
fn iterator_is_restartable() {
    let text = "one two three four five six seven eight";
    let iter = chunk(text, 3, 1).expect("chunk");
    let first: Vec<Chunk> = iter.clone().collect();
    let second: Vec<Chunk> = iter.collect();
    assert_eq!(first, second);
}

#[test]
fn six_word_windows_split_two_sentence_document_in_two() {
    let text = "Photosynthesis converts light energy into chemical energy. \
                Mitochondria produce ATP through respiration.";
    let config = ChunkingConfig { chunk_size: 6, overlap: 0 };
    let chunks: Vec<Chunk> = chunk_with(text, &config).expect("chunk").collect();
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].text.starts_with("Photosynthesis"));
    assert!(chunks[1].text.ends_with("respiration."));
}

#[test]
fn relevance_bands_use_exclusive_thresholds() {
    let scoring = ScoringConfig::default();
    assert_eq!(Relevance::band(0.9, &scoring), Relevance::High);
    assert_eq!(Relevance::band(0.7, &scoring), Relevance::Medium);
    assert_eq!(Relevance::band(0.6, &scoring), Relevance::Medium);
    assert_eq!(Relevance::band(0.5, &scoring), Relevance::Low);
    assert_eq!(Relevance::band(0.0, &scoring), Relevance::Low);
}

#[test]
fn default_config_sections() {
    let chunking = ChunkingConfig::default();
    assert_eq!(chunking.chunk_size, 128);
    assert_eq!(chunking.overlap, 0);

    let scoring = ScoringConfig::default();
    assert!((scoring.high_threshold - 0.7).abs() < f32::EPSILON);
    assert!((scoring.medium_threshold - 0.5).abs() < f32::EPSILON);
    assert!((scoring.keyword_min_score - 0.1).abs() < f32::EPSILON);
}
