//! End-to-end detection flows over a stubbed search provider.

use super::*;
use crate::similarity::ScoringError;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_copied_text_is_found_lexically() {
    let (provider, _) = StubProvider::new(search_results());
    let detector = create_detector(provider, None);

    let report = detector.find_plagiarism(SOURCE_TEXT);

    // crossed the threshold, but there is nothing to escalate to
    assert_eq!(report.method, "tfidf");
    assert_eq!(report.total_paragraphs_processed, 1);
    assert!(approx(report.max_similarity, 1.0));
    assert_eq!(report.similarity, report.max_similarity);
    assert!(approx(report.average_similarity, 0.5));
    assert_eq!(report.sorted_urls[0].link, "https://energy.example");
    assert_eq!(report.sorted_urls.len(), 2);
    assert!(report.errors.is_empty());
}

#[test]
fn test_semantic_pass_reuses_lexical_candidates() {
    let (provider, counter) = StubProvider::new(search_results());
    let detector = create_detector(provider, Some(word_vectors()));

    let report = detector.find_plagiarism(SOURCE_TEXT);

    assert_eq!(report.method, "semantic");
    assert!(approx(report.max_similarity, 1.0));
    assert_eq!(report.sorted_urls[0].link, "https://energy.example");
    assert_eq!(calls(&counter), 1);
}

#[test]
fn test_weak_match_stays_lexical() {
    let (provider, _) = StubProvider::new(vec![document(
        "The recipe needs flour, butter and two eggs.",
        "https://baking.example",
    )]);
    let detector = create_detector(provider, Some(word_vectors()));

    let report = detector.find_plagiarism(SOURCE_TEXT);

    assert_eq!(report.method, "tfidf");
    assert_eq!(report.max_similarity, 0.0);
}

#[test]
fn test_provider_failure_yields_empty_report() {
    let detector = create_detector(StubProvider::failing(), None);

    let report = detector.find_plagiarism(SOURCE_TEXT);

    assert_eq!(report.total_paragraphs_processed, 1);
    assert_eq!(report.max_similarity, 0.0);
    assert_eq!(report.average_similarity, 0.0);
    assert!(report.sorted_urls.is_empty());
    assert!(report.results[0].scores.individual.is_empty());
}

#[test]
fn test_long_text_is_segmented() {
    let (provider, _) = StubProvider::new(search_results());
    let detector = create_detector(provider, None);

    let text = format!("{SOURCE_TEXT} {SOURCE_TEXT} {SOURCE_TEXT} {SOURCE_TEXT}");
    let report = detector.find_plagiarism(&text);

    assert_eq!(report.total_paragraphs_processed, 3);
    let indexes: Vec<usize> = report.results.iter().map(|r| r.segment_index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);
    // every segment points at the same source, listed once
    let energy = report
        .sorted_urls
        .iter()
        .filter(|s| s.link == "https://energy.example")
        .count();
    assert_eq!(energy, 1);
}

#[test]
fn test_compare_against_targets() {
    let (provider, counter) = StubProvider::new(vec![]);
    let detector = create_detector(provider, None);

    let targets = vec![
        "Solar panels convert sunlight into electricity for homes!".to_string(),
        "Nothing in common here.".to_string(),
    ];
    let results = detector.compare(&[SOURCE_TEXT.to_string()], Some(&targets));

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.input_text, "solar panel convert sunlight electricity home");
    assert!(approx(result.similarity, 1.0));
    assert_eq!(result.individual_similarity.len(), 2);
    assert_eq!(result.sorted_urls[0].link, "target-0");
    assert_eq!(calls(&counter), 0);
}

#[test]
fn test_compare_without_targets_searches_first_input() {
    let (provider, counter) = StubProvider::new(search_results());
    let detector = create_detector(provider, None);

    let inputs = vec![SOURCE_TEXT.to_string(), "Eggs and flour.".to_string()];
    let results = detector.compare(&inputs, None);

    assert_eq!(results.len(), 2);
    assert_eq!(calls(&counter), 1);
    assert_eq!(results[0].sorted_urls[0].link, "https://energy.example");
    assert_eq!(results[1].sorted_urls[0].link, "https://baking.example");
}

#[test]
fn test_compare_semantic_scores_each_sentence() {
    let (provider, _) = StubProvider::new(vec![]);
    let detector = create_detector(provider, Some(word_vectors()));

    let input = format!("{SOURCE_TEXT} Butter and eggs.");
    let results = detector
        .compare_semantic(&input, &[SOURCE_TEXT.to_string(), "Flour, butter, eggs.".to_string()])
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].sorted_urls[0].link, "target-0");
    assert!(approx(results[0].max_similarity, 1.0));
    assert_eq!(results[1].sorted_urls[0].link, "target-1");
}

#[test]
fn test_compare_semantic_needs_embeddings() {
    let (provider, _) = StubProvider::new(vec![]);
    let detector = create_detector(provider, None);

    let err = detector.compare_semantic(SOURCE_TEXT, &[SOURCE_TEXT.to_string()]).unwrap_err();
    assert!(matches!(err, ScoringError::EmbeddingsUnavailable));
}
