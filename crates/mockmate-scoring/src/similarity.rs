//! Lexical similarity between a keypoint and windows of an answer.
//!
//! Two measures are averaged into one confidence score: cosine similarity
//! of term-frequency vectors, and the fraction of the keypoint's
//! {1,2}-grams present in the window. The window scan keeps a short
//! keypoint from being diluted by a long answer.

use std::collections::{HashMap, HashSet};

/// Tokens of context added around a keypoint-sized answer window.
const WINDOW_CONTEXT: usize = 2;

/// Lowercase word tokens. Single-character tokens are dropped.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Cosine similarity between two equal-length vectors. Zero vectors and
/// mismatched lengths score 0.
pub(crate) fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

fn term_frequencies(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity of the two token lists' term-frequency vectors over
/// their shared vocabulary.
pub(crate) fn term_frequency_cosine(a: &[String], b: &[String]) -> f64 {
    let counts_a = term_frequencies(a);
    let counts_b = term_frequencies(b);

    let vocabulary: HashSet<&str> = counts_a.keys().chain(counts_b.keys()).copied().collect();
    let mut vector_a = Vec::with_capacity(vocabulary.len());
    let mut vector_b = Vec::with_capacity(vocabulary.len());
    for term in vocabulary {
        vector_a.push(counts_a.get(term).copied().unwrap_or(0.0));
        vector_b.push(counts_b.get(term).copied().unwrap_or(0.0));
    }

    cosine_similarity(&vector_a, &vector_b)
}

/// Unigrams and bigrams of a token list. Bigrams join with a space.
pub(crate) fn ngrams(tokens: &[String]) -> HashSet<String> {
    let mut grams: HashSet<String> = tokens.iter().cloned().collect();
    for pair in tokens.windows(2) {
        grams.insert(format!("{} {}", pair[0], pair[1]));
    }
    grams
}

/// Fraction of the keypoint's n-grams present in the answer's n-grams.
pub(crate) fn ngram_overlap(answer: &HashSet<String>, keypoint: &HashSet<String>) -> f64 {
    if keypoint.is_empty() {
        return 0.0;
    }
    let shared = keypoint.intersection(answer).count();
    shared as f64 / keypoint.len() as f64
}

fn window_confidence(
    window: &[String],
    keypoint_tokens: &[String],
    keypoint_grams: &HashSet<String>,
) -> f64 {
    let similarity = term_frequency_cosine(window, keypoint_tokens);
    let overlap = ngram_overlap(&ngrams(window), keypoint_grams);
    (similarity + overlap) / 2.0
}

/// Best combined confidence of a keypoint over all answer windows.
///
/// Windows are keypoint-sized plus [`WINDOW_CONTEXT`] tokens, stride one.
/// An answer shorter than one window is compared whole.
pub(crate) fn keypoint_confidence(answer_tokens: &[String], keypoint_tokens: &[String]) -> f64 {
    if answer_tokens.is_empty() || keypoint_tokens.is_empty() {
        return 0.0;
    }

    let keypoint_grams = ngrams(keypoint_tokens);
    let window_len = keypoint_tokens.len() + WINDOW_CONTEXT;
    if answer_tokens.len() <= window_len {
        return window_confidence(answer_tokens, keypoint_tokens, &keypoint_grams);
    }

    answer_tokens
        .windows(window_len)
        .map(|window| window_confidence(window, keypoint_tokens, &keypoint_grams))
        .fold(0.0, f64::max)
}
