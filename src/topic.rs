//! Topic and Subtopic entities and their generation prompts.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::sentiment::SentimentTally;

/// Cluster id assigned by the clustering engine.
pub type SubtopicId = i64;

/// Cluster id reserved for feedback the engine could not cluster.
pub const UNCLUSTERED: SubtopicId = -1;

static LEADING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\d_]+").expect("static pattern"));

/// Strip the leading run of digits, hyphens and underscores from a raw
/// cluster label: `"03_refund_policy"` becomes `"refund_policy"`.
pub fn clean_name(raw: &str) -> String {
    LEADING_ID.replace(raw, "").into_owned()
}

/// True when a write-once field already holds a usable value.
pub fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Anything that can ask a language model for a human-readable name.
pub trait Nameable {
    /// Prompt requesting a short Title Case name for this item.
    fn name_prompt(&self) -> String;
}

/// One flat cluster of feedback.
#[derive(Debug, Clone, Serialize)]
pub struct Subtopic {
    pub id: SubtopicId,
    /// Cleaned cluster label.
    pub name: String,
    /// Cluster membership reported by the engine (not the sample size).
    pub count: usize,
    /// Keywords, most representative first.
    pub tags: Vec<String>,
    /// Representative feedback sample. Sentiment is computed over this
    /// sample only, never over the full membership.
    pub feedback: Vec<String>,
    pub sentiment: SentimentTally,
    pub read_name: Option<String>,
    pub summary: Option<String>,
}

impl Subtopic {
    /// Detail block used when naming the owning Topic.
    pub fn detail(&self) -> String {
        format!(
            "id: {}\nname: {}\ntags: {}\nfeedback: {}\nsentiment: {}",
            self.id,
            self.name,
            self.tags.join(", "),
            self.feedback.join(" | "),
            self.sentiment.describe(),
        )
    }

    /// Prompt requesting a 3-5 sentence objective summary.
    pub fn summary_prompt(&self) -> String {
        format!(
            "You are analyzing customer feedback data.\n\n\
             The following keywords represent a cluster of related feedback:\n{tags}\n\n\
             Here are example feedback statements from this cluster:\n{feedback}\n\n\
             Sentiment distribution for this cluster:\n{sentiment}\n\n\
             Write a short, cohesive paragraph summarizing the main theme that these \
             keywords, feedback statements and sentiment describe. The summary should:\n\
             - Be factual and objective\n\
             - Not start with \"Here's a summary\" or similar framing\n\
             - Capture the key issue or focus of discussion across the feedback\n\
             - Avoid repetition and avoid quoting the feedback directly\n\
             - Be 3-5 sentences long\n\
             - Use plain, neutral language",
            tags = self.tags.join(", "),
            feedback = self.feedback.join("\n"),
            sentiment = self.sentiment.describe(),
        )
    }
}

impl Nameable for Subtopic {
    fn name_prompt(&self) -> String {
        format!(
            "You are an analyst labelling clusters of customer feedback with concise, \
             descriptive names. A subtopic is a small, specific theme within a broader subject.\n\n\
             Short description of the subtopic:\n\"{name}\"\n\n\
             Keywords for the subtopic:\n{tags}\n\n\
             Feedback for the subtopic:\n{feedback}\n\n\
             Sentiment distribution:\n{sentiment}\n\n\
             Generate a brief, human-readable name for this subtopic.\n\
             - Use 2-5 words.\n\
             - Use Title Case.\n\
             - Make it clear and specific; avoid generic terms.\n\
             - Return only the name, without explanation.",
            name = self.name,
            tags = self.tags.join(", "),
            feedback = self.feedback.join("\n"),
            sentiment = self.sentiment.describe(),
        )
    }
}

/// A group of Subtopics sharing a resolved hierarchy parent.
#[derive(Debug, Clone, Serialize)]
pub struct Topic {
    /// Parent label from the merge table, or the unresolved sentinel.
    pub name: String,
    pub related_sub_topics: Vec<SubtopicId>,
    pub read_name: Option<String>,
    /// Member detail blocks, attached right before naming.
    #[serde(skip)]
    pub subtopic_details: Vec<String>,
}

impl Topic {
    pub fn new(name: impl Into<String>, related_sub_topics: Vec<SubtopicId>) -> Self {
        Self {
            name: name.into(),
            related_sub_topics,
            read_name: None,
            subtopic_details: Vec::new(),
        }
    }

    pub fn contains(&self, id: SubtopicId) -> bool {
        self.related_sub_topics.contains(&id)
    }

    /// Attach detail blocks for every member found through `lookup`.
    pub fn attach_details<'a, F>(&mut self, lookup: F)
    where
        F: Fn(SubtopicId) -> Option<&'a Subtopic>,
    {
        self.subtopic_details = self
            .related_sub_topics
            .iter()
            .filter_map(|&id| lookup(id))
            .map(Subtopic::detail)
            .collect();
    }
}

impl Nameable for Topic {
    fn name_prompt(&self) -> String {
        format!(
            "You are generating a clear, human-readable name for a topic based on grouped \
             subtopics. A topic is the overarching theme; a subtopic is a smaller, more \
             specific theme within it.\n\n\
             The current topic identifier is:\n\"{identifier}\"\n\n\
             Below are the subtopics that belong to this topic, each with its id, name, \
             tags, feedback and sentiment distribution:\n\n{details}\n\n\
             Generate a concise, intuitive name for the overall topic using the identifier \
             and the subtopic descriptions.\n\n\
             Guidelines:\n\
             - Use 2-5 words in Title Case.\n\
             - Reflect the main unifying idea across the subtopics.\n\
             - Avoid jargon, underscores, and overly generic labels.\n\
             - Do not include the word \"Topic\" or \"Subtopic\" in the name.\n\
             - Return only the literal name, nothing else.",
            identifier = self.name.replace('_', " "),
            details = self.subtopic_details.join("\n\n"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;

    fn subtopic() -> Subtopic {
        Subtopic {
            id: 3,
            name: "battery_charging_port".into(),
            count: 57,
            tags: vec!["battery".into(), "charging".into(), "port".into()],
            feedback: vec!["Can't use it while charging".into(), "Port is underneath".into()],
            sentiment: [SentimentLabel::Negative, SentimentLabel::Negative]
                .into_iter()
                .collect(),
            read_name: None,
            summary: None,
        }
    }

    #[test]
    fn clean_name_strips_leading_id() {
        assert_eq!(clean_name("03_refund_policy"), "refund_policy");
        assert_eq!(clean_name("-1_noise"), "noise");
        assert_eq!(clean_name("12-_-shipping"), "shipping");
    }

    #[test]
    fn clean_name_keeps_names_without_leading_digits() {
        assert_eq!(clean_name("abc123"), "abc123");
        assert_eq!(clean_name("refund_2024"), "refund_2024");
        assert_eq!(clean_name(""), "");
    }

    #[test]
    fn is_set_ignores_blank_values() {
        assert!(!is_set(&None));
        assert!(!is_set(&Some("  ".into())));
        assert!(is_set(&Some("Charging Port".into())));
    }

    #[test]
    fn subtopic_prompts_carry_cluster_data() {
        let st = subtopic();
        let name = st.name_prompt();
        assert!(name.contains("battery, charging, port"));
        assert!(name.contains("Port is underneath"));
        assert!(name.contains("2-5 words"));
        assert!(name.contains("Title Case"));

        let summary = st.summary_prompt();
        assert!(summary.contains("Negative: 2"));
        assert!(summary.contains("3-5 sentences"));
    }

    #[test]
    fn topic_prompt_forbids_labels_and_underscores() {
        let st = subtopic();
        let mut topic = Topic::new("battery_charging", vec![3, 9]);
        topic.attach_details(|id| (id == st.id).then_some(&st));
        assert_eq!(topic.subtopic_details.len(), 1);

        let prompt = topic.name_prompt();
        assert!(prompt.contains("\"battery charging\""));
        assert!(prompt.contains("id: 3"));
        assert!(prompt.contains("sentiment: Negative: 2"));
        assert!(prompt.contains("Do not include the word \"Topic\" or \"Subtopic\""));
        assert!(prompt.contains("underscores"));
        assert!(prompt.contains("Return only the literal name"));
    }
}
