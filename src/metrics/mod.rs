//! Error metric engine.
//!
//! Two entry points with intentionally different conventions:
//! - [`score_corpus`] aligns the newline-joined corpus in one pass and
//!   reports percentages rounded to 2 decimals.
//! - [`score_unit`] scores one pair with newlines removed and reports raw
//!   fractions rounded to 4 decimals.
//!
//! Corpus CER is therefore not the mean of per-unit CERs: the corpus
//! divides total edits by total reference characters.

pub mod align;

pub use align::{EditCounts, align};

use crate::unit::EvaluationUnit;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Corpus-wide error rates, in percent rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMetrics {
    pub character_error_rate: f64,
    pub word_error_rate: f64,
    pub match_error_rate: f64,
    pub word_information_lost: f64,
    pub word_information_preserved: f64,
    /// Number of units in the corpus.
    pub units: usize,
    /// Character alignment counts behind the CER.
    pub characters: EditCounts,
    /// Word alignment counts behind the word metrics.
    pub words: EditCounts,
}

/// Error rates of a single unit, as fractions rounded to 4 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerUnitMetrics {
    pub character_error_rate: f64,
    pub word_error_rate: f64,
    pub match_error_rate: f64,
    pub word_information_lost: f64,
    pub word_information_preserved: f64,
}

impl PerUnitMetrics {
    /// Metric names in display/export order.
    pub const NAMES: [&'static str; 5] = ["cer", "wer", "mer", "wil", "wip"];

    /// Metric values in the order of [`PerUnitMetrics::NAMES`].
    pub fn values(&self) -> [f64; 5] {
        [
            self.character_error_rate,
            self.word_error_rate,
            self.match_error_rate,
            self.word_information_lost,
            self.word_information_preserved,
        ]
    }

    /// Build from values in the order of [`PerUnitMetrics::NAMES`].
    pub fn from_values(values: [f64; 5]) -> Self {
        Self {
            character_error_rate: values[0],
            word_error_rate: values[1],
            match_error_rate: values[2],
            word_information_lost: values[3],
            word_information_preserved: values[4],
        }
    }
}

/// Unrounded rates as fractions.
#[derive(Debug, Clone, Copy)]
struct Rates {
    cer: f64,
    wer: f64,
    mer: f64,
    wil: f64,
    wip: f64,
}

impl Rates {
    fn from_counts(characters: &EditCounts, words: &EditCounts) -> Self {
        let ref_chars = characters.reference_len();
        let ref_words = words.reference_len();
        assert!(
            ref_chars > 0 && ref_words > 0,
            "reference text must contain at least one token; blank references are filtered during pairing"
        );

        let errors = words.errors() as f64;
        let hits = words.hits as f64;
        let hyp_words = words.hypothesis_len();

        let cer = characters.errors() as f64 / ref_chars as f64;
        let wer = errors / ref_words as f64;
        let mer = errors / (errors + hits);
        let wip = if hyp_words == 0 {
            0.0
        } else {
            (hits / ref_words as f64) * (hits / hyp_words as f64)
        };

        Self {
            cer,
            wer,
            mer,
            wil: 1.0 - wip,
            wip,
        }
    }
}

/// Score the whole corpus at once.
///
/// Reference and hypothesis texts are trimmed, joined with `\n` in unit
/// order, and aligned as one character sequence and one word sequence.
///
/// # Panics
///
/// Panics if `units` holds no reference tokens.
pub fn score_corpus(units: &[EvaluationUnit]) -> CorpusMetrics {
    let reference = join_trimmed(units.iter().map(|u| u.reference_text.as_str()));
    let hypothesis = join_trimmed(units.iter().map(|u| u.hypothesis_text.as_str()));

    let (characters, words) = count(&reference, &hypothesis);
    let rates = Rates::from_counts(&characters, &words);

    CorpusMetrics {
        character_error_rate: percent(rates.cer),
        word_error_rate: percent(rates.wer),
        match_error_rate: percent(rates.mer),
        word_information_lost: percent(rates.wil),
        word_information_preserved: percent(rates.wip),
        units: units.len(),
        characters,
        words,
    }
}

/// Score one reference/hypothesis pair.
///
/// Newlines are removed before scoring, so lines are concatenated without a
/// separator, matching how ground truth is transcribed per segment.
///
/// # Panics
///
/// Panics if `reference` has no non-whitespace content.
pub fn score_unit(reference: &str, hypothesis: &str) -> PerUnitMetrics {
    let reference = strip_newlines(reference);
    let hypothesis = strip_newlines(hypothesis);

    let (characters, words) = count(reference.trim(), hypothesis.trim());
    let rates = Rates::from_counts(&characters, &words);

    PerUnitMetrics {
        character_error_rate: round_to(rates.cer, 4),
        word_error_rate: round_to(rates.wer, 4),
        match_error_rate: round_to(rates.mer, 4),
        word_information_lost: round_to(rates.wil, 4),
        word_information_preserved: round_to(rates.wip, 4),
    }
}

/// Score every unit independently, preserving input order.
pub fn score_units(units: &[EvaluationUnit]) -> Vec<PerUnitMetrics> {
    units
        .par_iter()
        .map(|u| score_unit(&u.reference_text, &u.hypothesis_text))
        .collect()
}

fn count(reference: &str, hypothesis: &str) -> (EditCounts, EditCounts) {
    let ref_chars: Vec<char> = reference.chars().collect();
    let hyp_chars: Vec<char> = hypothesis.chars().collect();
    let ref_words: Vec<&str> = reference.split_whitespace().collect();
    let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();

    (align(&ref_chars, &hyp_chars), align(&ref_words, &hyp_words))
}

fn join_trimmed<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.map(str::trim).collect::<Vec<_>>().join("\n")
}

fn strip_newlines(text: &str) -> String {
    text.chars().filter(|&c| c != '\n' && c != '\r').collect()
}

fn percent(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 2)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: &str, reference: &str, hypothesis: &str) -> EvaluationUnit {
        EvaluationUnit::new(id, "_crop_", format!("{}.png", id), reference.into(), hypothesis.into())
            .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_strings_score_zero() {
        for text in ["abc", "the cat sat", "Olá, mundo!\nsegunda linha"] {
            let m = score_unit(text, text);
            assert_eq!(m.character_error_rate, 0.0);
            assert_eq!(m.word_error_rate, 0.0);
            assert_eq!(m.match_error_rate, 0.0);
            assert_eq!(m.word_information_lost, 0.0);
            assert_eq!(m.word_information_preserved, 1.0);
        }
    }

    #[test]
    fn test_word_substitution() {
        let m = score_unit("the cat sat", "the dog sat");
        assert!(approx(m.word_error_rate, 0.3333));
        assert!(approx(m.match_error_rate, 0.3333));
        // wip = (2/3) * (2/3)
        assert!(approx(m.word_information_preserved, 0.4444));
        assert!(approx(m.word_information_lost, 0.5556));

        let corpus = score_corpus(&[unit("a", "the cat sat", "the dog sat")]);
        assert!(approx(corpus.word_error_rate, 33.33));
        assert_eq!(corpus.words.substitutions, 1);
        assert_eq!(corpus.words.insertions, 0);
        assert_eq!(corpus.words.deletions, 0);
    }

    #[test]
    fn test_character_substitution() {
        let m = score_unit("abc", "abd");
        assert!(approx(m.character_error_rate, 0.3333));

        let corpus = score_corpus(&[unit("a", "abc", "abd")]);
        assert!(approx(corpus.character_error_rate, 33.33));
    }

    #[test]
    fn test_empty_hypothesis_is_full_deletion() {
        let m = score_unit("one two", "");
        assert_eq!(m.character_error_rate, 1.0);
        assert_eq!(m.word_error_rate, 1.0);
        assert_eq!(m.match_error_rate, 1.0);
        assert_eq!(m.word_information_lost, 1.0);
        assert_eq!(m.word_information_preserved, 0.0);
    }

    #[test]
    fn test_unit_newlines_are_removed() {
        // "ab\ncd" becomes the single word "abcd"
        let m = score_unit("ab\ncd\n", "abcd");
        assert_eq!(m.character_error_rate, 0.0);
        assert_eq!(m.word_error_rate, 0.0);
    }

    #[test]
    fn test_corpus_differs_from_mean_of_units() {
        let units = vec![unit("a", "a", "b"), unit("b", "abcdefghij", "abcdefghij")];

        let per_unit = score_units(&units);
        assert_eq!(per_unit[0].character_error_rate, 1.0);
        assert_eq!(per_unit[1].character_error_rate, 0.0);
        let mean = per_unit.iter().map(|m| m.character_error_rate).sum::<f64>() / 2.0;

        // 1 edit over "a\nabcdefghij" = 12 characters
        let corpus = score_corpus(&units);
        assert_eq!(corpus.characters.errors(), 1);
        assert_eq!(corpus.characters.reference_len(), 12);
        assert!(approx(corpus.character_error_rate, 8.33));
        assert!(!approx(corpus.character_error_rate, mean * 100.0));
    }

    #[test]
    fn test_corpus_counts_units() {
        let units = vec![unit("a", "x y", "x y"), unit("b", "z", "")];
        let corpus = score_corpus(&units);
        assert_eq!(corpus.units, 2);
        assert_eq!(corpus.words.reference_len(), 3);
        assert_eq!(corpus.words.deletions, 1);
        assert!(approx(corpus.word_error_rate, 33.33));
    }

    #[test]
    fn test_score_units_preserves_order() {
        let units = vec![
            unit("a", "abc", "abc"),
            unit("b", "abc", "xyz"),
            unit("c", "abcd", "abce"),
        ];
        let scores = score_units(&units);
        let cers: Vec<f64> = scores.iter().map(|m| m.character_error_rate).collect();
        assert_eq!(cers, vec![0.0, 1.0, 0.25]);
    }

    #[test]
    fn test_tied_alignment_keeps_the_hit() {
        let m = score_unit("a b", "b c");
        assert!(approx(m.word_error_rate, 1.0));
        assert!(approx(m.match_error_rate, 0.6667));
        assert!(approx(m.word_information_lost, 0.75));
        assert!(approx(m.word_information_preserved, 0.25));
    }

    #[test]
    fn test_large_corpus_is_not_quadratic() {
        let line = "o rato roeu a roupa do rei de roma hoje";
        let units: Vec<EvaluationUnit> = (0..1000)
            .map(|i| {
                let hypothesis = if i % 20 == 0 {
                    line.replace("rei", "rel")
                } else {
                    line.to_string()
                };
                unit(&format!("p_crop_{}", i), line, &hypothesis)
            })
            .collect();

        let start = std::time::Instant::now();
        let corpus = score_corpus(&units);
        let elapsed = start.elapsed();

        assert_eq!(corpus.characters.errors(), 50);
        assert_eq!(corpus.words.substitutions, 50);
        assert_eq!(corpus.characters.reference_len(), 1000 * line.len() + 999);
        assert!(
            elapsed < std::time::Duration::from_secs(10),
            "corpus scoring took {:?}",
            elapsed
        );
    }

    #[test]
    #[should_panic]
    fn test_blank_reference_is_a_precondition_violation() {
        score_unit(" \n ", "text");
    }

    #[test]
    fn test_round_to() {
        assert!(approx(round_to(1.0 / 3.0, 4), 0.3333));
        assert!(approx(round_to(2.0 / 3.0 * 100.0, 2), 66.67));
    }

    #[test]
    fn test_values_roundtrip_order() {
        let m = PerUnitMetrics::from_values([0.1, 0.2, 0.3, 0.4, 0.6]);
        assert_eq!(m.word_error_rate, 0.2);
        assert_eq!(m.values(), [0.1, 0.2, 0.3, 0.4, 0.6]);
    }
}
