use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed label set produced by sentiment engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    #[serde(rename = "Negative")]
    Negative,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Positive")]
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryNegative => "Very Negative",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Positive => "Positive",
            Self::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a sentiment engine for a single piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl SentimentScore {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Fixed result for empty or whitespace-only feedback.
    pub fn blank() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }
}

/// Per-label occurrence counts, kept in first-seen order.
///
/// Insertion order matters: [`SentimentTally::majority`] resolves ties in
/// favour of the label that was recorded first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    counts: Vec<(SentimentLabel, usize)>,
}

impl SentimentTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: SentimentLabel) {
        match self.counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label, 1)),
        }
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.iter().map(|(_, count)| count).sum()
    }

    /// Label with the highest count; the first-inserted label wins a tie.
    pub fn majority(&self) -> Option<SentimentLabel> {
        let mut best: Option<(SentimentLabel, usize)> = None;
        for &(label, count) in &self.counts {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// `label: count` pairs joined for prompt text, e.g. `Positive: 3, Negative: 1`.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<SentimentLabel> for SentimentTally {
    fn from_iter<I: IntoIterator<Item = SentimentLabel>>(iter: I) -> Self {
        let mut tally = Self::new();
        for label in iter {
            tally.record(label);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    #[test]
    fn majority_picks_highest_count() {
        let tally: SentimentTally = [Positive, Negative, Positive, Positive].into_iter().collect();
        assert_eq!(tally.get(Positive), 3);
        assert_eq!(tally.get(Negative), 1);
        assert_eq!(tally.majority(), Some(Positive));
    }

    #[test]
    fn majority_tie_goes_to_first_inserted() {
        let tally: SentimentTally = [Negative, Positive, Positive, Negative].into_iter().collect();
        assert_eq!(tally.majority(), Some(Negative));

        let tally: SentimentTally = [Positive, Negative, Negative, Positive].into_iter().collect();
        assert_eq!(tally.majority(), Some(Positive));
    }

    #[test]
    fn majority_of_empty_tally_is_none() {
        assert_eq!(SentimentTally::new().majority(), None);
    }

    #[test]
    fn describe_keeps_insertion_order() {
        let tally: SentimentTally = [Neutral, VeryPositive, Neutral].into_iter().collect();
        assert_eq!(tally.describe(), "Neutral: 2, Very Positive: 1");
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn labels_serialize_as_display_names() {
        for label in [VeryNegative, Negative, Neutral, Positive, VeryPositive] {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{label}\""));
        }
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(SentimentScore::new(Positive, 1.7).score, 1.0);
        assert_eq!(SentimentScore::blank().label, Neutral);
        assert_eq!(SentimentScore::blank().score, 0.0);
    }
}
