use unicode_segmentation::UnicodeSegmentation;

use crate::engine::SentimentEngine;
use crate::sentiment::{SentimentLabel, SentimentScore};

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "love", "loved", "loves", "perfect",
    "nice", "smooth", "easy", "comfortable", "beautiful", "sleek", "responsive", "reliable",
    "fantastic", "happy", "best", "recommend", "works", "worth", "intuitive", "precise",
    "fast", "quick", "helpful", "satisfied", "pleased", "elegant", "solid", "wonderful",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "hated", "broken", "broke", "poor",
    "worst", "useless", "disappointing", "disappointed", "uncomfortable", "slow", "laggy",
    "expensive", "overpriced", "defective", "annoying", "frustrating", "stopped", "dies",
    "died", "fails", "failed", "problem", "problems", "issue", "issues", "waste", "cramp",
    "pain", "awkward", "stupid", "silly", "returned", "refund", "junk", "flimsy",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
    "can't", "cannot", "won't", "hardly", "without",
];

const INTENSIFIERS: &[&str] = &["very", "really", "extremely", "so", "super", "absolutely", "totally"];

/// How many tokens a negator reaches forward.
const NEGATION_WINDOW: usize = 3;
/// Normalization constant for the compound score.
const ALPHA: f64 = 4.0;

/// Deterministic word-list sentiment classifier.
///
/// Sums word polarities (negated within a short window, amplified by a
/// preceding intensifier) and squashes the total into `[-1, 1]`, then buckets
/// it into the five-label set.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    /// Compound polarity in `[-1, 1]`.
    pub fn compound(&self, text: &str) -> f64 {
        let words: Vec<String> = text
            .unicode_words()
            .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
            .collect();

        let mut total = 0.0;
        let mut negated_until = 0usize;
        for (i, word) in words.iter().enumerate() {
            if NEGATORS.contains(&word.as_str()) {
                negated_until = i + NEGATION_WINDOW + 1;
                continue;
            }
            let mut polarity = if POSITIVE.contains(&word.as_str()) {
                1.0
            } else if NEGATIVE.contains(&word.as_str()) {
                -1.0
            } else {
                continue;
            };
            if i > 0 && INTENSIFIERS.contains(&words[i - 1].as_str()) {
                polarity *= 1.5;
            }
            if i < negated_until {
                polarity *= -0.75;
            }
            total += polarity;
        }
        total / (total * total + ALPHA).sqrt()
    }
}

impl SentimentEngine for LexiconSentiment {
    fn classify(&self, feedback: &str) -> SentimentScore {
        if feedback.trim().is_empty() {
            return SentimentScore::blank();
        }
        let compound = self.compound(feedback);
        let label = match compound {
            c if c >= 0.6 => SentimentLabel::VeryPositive,
            c if c >= 0.2 => SentimentLabel::Positive,
            c if c > -0.2 => SentimentLabel::Neutral,
            c if c > -0.6 => SentimentLabel::Negative,
            _ => SentimentLabel::VeryNegative,
        };
        let score = if label == SentimentLabel::Neutral {
            1.0 - compound.abs()
        } else {
            compound.abs()
        };
        SentimentScore::new(label, score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    fn label(text: &str) -> SentimentLabel {
        LexiconSentiment::new().classify(text).label
    }

    #[test]
    fn classifies_polarity() {
        assert_eq!(label("I love this mouse, it works great"), VeryPositive);
        assert_eq!(label("Nice looking mouse"), Positive);
        assert_eq!(label("The mouse is white"), Neutral);
        assert_eq!(label("Scrolling is laggy"), Negative);
        assert_eq!(label("Terrible, broken and awful"), VeryNegative);
    }

    #[test]
    fn negation_flips_polarity() {
        assert_eq!(label("not good"), Negative);
        assert_eq!(label("it is not bad at all"), Positive);
    }

    #[test]
    fn blank_input_is_fixed_neutral() {
        let score = LexiconSentiment::new().classify("   ");
        assert_eq!(score, SentimentScore::blank());
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let engine = LexiconSentiment::new();
        for text in ["great great great great great", "bad", "plain text", "not not not"] {
            let s = engine.classify(text);
            assert!((0.0..=1.0).contains(&s.score), "{text}: {}", s.score);
        }
    }
}
