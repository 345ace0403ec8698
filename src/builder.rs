//! Subtopic and Topic construction from clustering output.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::algo::hierarchy::MergeTable;
use crate::engine::{ClusterRecord, SentimentEngine};
use crate::sentiment::{SentimentScore, SentimentTally};
use crate::topic::{clean_name, Subtopic, SubtopicId, Topic, UNCLUSTERED};

/// Upper bound on the representative feedback kept per Subtopic.
pub const FEEDBACK_SAMPLE_CAP: usize = 4;

/// Score one piece of feedback. Blank text never reaches the engine.
pub fn score_feedback(engine: &dyn SentimentEngine, feedback: &str) -> SentimentScore {
    if feedback.trim().is_empty() {
        return SentimentScore::blank();
    }
    engine.classify(feedback)
}

/// Tally sentiment labels over a feedback sample.
pub fn tally_sentiment(engine: &dyn SentimentEngine, feedback: &[String]) -> SentimentTally {
    feedback
        .iter()
        .map(|fb| score_feedback(engine, fb).label)
        .collect()
}

/// Build one Subtopic from a cluster record.
///
/// Sentiment covers the capped sample only; `count` is copied from the
/// engine's membership figure unchanged.
pub fn build_subtopic(record: &ClusterRecord, engine: &dyn SentimentEngine) -> Subtopic {
    let feedback: Vec<String> = record
        .feedback
        .iter()
        .take(FEEDBACK_SAMPLE_CAP)
        .cloned()
        .collect();
    let sentiment = tally_sentiment(engine, &feedback);
    Subtopic {
        id: record.id,
        name: clean_name(&record.name),
        count: record.count,
        tags: record.tags.clone(),
        feedback,
        sentiment,
        read_name: None,
        summary: None,
    }
}

/// Build Subtopics in record order, skipping the unclustered id and any
/// repeated id.
pub fn build_subtopics(records: &[ClusterRecord], engine: &dyn SentimentEngine) -> Vec<Subtopic> {
    info!("building subtopics");
    let mut seen: HashSet<SubtopicId> = HashSet::new();
    let subtopics: Vec<Subtopic> = records
        .iter()
        .filter(|r| r.id != UNCLUSTERED)
        .filter(|r| {
            let fresh = seen.insert(r.id);
            if !fresh {
                warn!(id = r.id, "duplicate cluster id skipped");
            }
            fresh
        })
        .map(|r| {
            let st = build_subtopic(r, engine);
            debug!(id = st.id, name = %st.name, sentiment = %st.sentiment.describe(), "subtopic built");
            st
        })
        .collect();
    info!(count = subtopics.len(), "subtopics built");
    subtopics
}

/// Group Subtopics by resolved parent name.
///
/// Topics appear in first-encounter order of their parent names. Subtopics
/// without a resolvable parent share the `unresolved` Topic. Distinct
/// hierarchy branches with the same parent name collapse into one Topic.
pub fn build_topics(subtopics: &[Subtopic], hierarchy: &MergeTable, unresolved: &str) -> Vec<Topic> {
    info!("building topics");
    let mut order: Vec<(String, Vec<SubtopicId>)> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for st in subtopics {
        let parent = match hierarchy.resolve(st.id) {
            Some(name) => name.to_string(),
            None => {
                warn!(id = st.id, "no enclosing parent; assigning to '{unresolved}'");
                unresolved.to_string()
            }
        };
        match position.get(&parent) {
            Some(&idx) => order[idx].1.push(st.id),
            None => {
                position.insert(parent.clone(), order.len());
                order.push((parent, vec![st.id]));
            }
        }
    }

    let topics: Vec<Topic> = order
        .into_iter()
        .map(|(name, members)| Topic::new(name, members))
        .collect();
    info!(count = topics.len(), "topics built");
    topics
}

/// Derived Subtopic -> owning Topic lookup.
///
/// Rebuilt from the Topics' membership lists; Subtopics hold no reference
/// to their Topic. When an id is listed by several Topics the first wins.
#[derive(Debug, Clone, Default)]
pub struct TopicIndex {
    owner: HashMap<SubtopicId, usize>,
}

impl TopicIndex {
    pub fn build(topics: &[Topic]) -> Self {
        let mut owner = HashMap::new();
        for (idx, topic) in topics.iter().enumerate() {
            for &id in &topic.related_sub_topics {
                owner.entry(id).or_insert(idx);
            }
        }
        Self { owner }
    }

    /// Position of the Topic owning `id` in the slice the index was built from.
    pub fn owner_of(&self, id: SubtopicId) -> Option<usize> {
        self.owner.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::hierarchy::MergeNode;
    use crate::sentiment::SentimentLabel;
    use std::cell::RefCell;

    /// Labels by keyword and records every text it was asked to score.
    #[derive(Default)]
    struct Recording {
        seen: RefCell<Vec<String>>,
    }

    impl SentimentEngine for Recording {
        fn classify(&self, feedback: &str) -> SentimentScore {
            self.seen.borrow_mut().push(feedback.to_string());
            let label = if feedback.contains("love") {
                SentimentLabel::Positive
            } else {
                SentimentLabel::Negative
            };
            SentimentScore::new(label, 0.9)
        }
    }

    fn record(id: i64, name: &str, count: usize, feedback: &[&str]) -> ClusterRecord {
        ClusterRecord {
            id,
            name: name.into(),
            count,
            tags: vec!["kw1".into(), "kw2".into()],
            feedback: feedback.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn subtopics(ids: &[i64]) -> Vec<Subtopic> {
        let engine = Recording::default();
        let records: Vec<ClusterRecord> = ids.iter().map(|&id| record(id, "x", 1, &[])).collect();
        build_subtopics(&records, &engine)
    }

    #[test]
    fn unclustered_id_never_becomes_subtopic() {
        let engine = Recording::default();
        let records = vec![
            record(-1, "-1_noise", 40, &["meh"]),
            record(0, "0_battery", 10, &["love it"]),
        ];
        let built = build_subtopics(&records, &engine);
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].id, 0);
        assert_eq!(engine.seen.borrow().as_slice(), ["love it"]);
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let engine = Recording::default();
        let records = vec![record(2, "2_first", 5, &[]), record(2, "2_second", 9, &[])];
        let built = build_subtopics(&records, &engine);
        assert_eq!(built.len(), 1);
        assert_eq!(built[0].name, "first");
    }

    #[test]
    fn subtopic_copies_engine_fields() {
        let engine = Recording::default();
        let st = build_subtopic(&record(3, "03_refund_policy", 250, &["love", "hate"]), &engine);
        assert_eq!(st.name, "refund_policy");
        assert_eq!(st.count, 250);
        assert_eq!(st.tags, vec!["kw1", "kw2"]);
        assert_eq!(st.feedback.len(), 2);
        assert!(st.read_name.is_none());
        assert!(st.summary.is_none());
    }

    #[test]
    fn sentiment_uses_capped_sample_only() {
        let engine = Recording::default();
        let rec = record(1, "1_x", 900, &["love a", "love b", "love c", "bad d", "bad e", "bad f"]);
        let st = build_subtopic(&rec, &engine);
        assert_eq!(st.feedback.len(), FEEDBACK_SAMPLE_CAP);
        assert_eq!(st.sentiment.total(), FEEDBACK_SAMPLE_CAP);
        assert_eq!(st.sentiment.get(SentimentLabel::Positive), 3);
        assert_eq!(st.sentiment.get(SentimentLabel::Negative), 1);
        assert_eq!(st.count, 900);
        assert_eq!(engine.seen.borrow().len(), 4);
    }

    #[test]
    fn blank_feedback_bypasses_engine() {
        let engine = Recording::default();
        let st = build_subtopic(&record(1, "1_x", 3, &["", "   ", "love"]), &engine);
        assert_eq!(engine.seen.borrow().len(), 1);
        assert_eq!(st.sentiment.get(SentimentLabel::Neutral), 2);
        assert_eq!(st.sentiment.get(SentimentLabel::Positive), 1);
    }

    #[test]
    fn topics_group_by_parent_in_first_encounter_order() {
        let hierarchy = MergeTable::new(vec![
            MergeNode::new([0, 1, 2, 3], 9, "everything"),
            MergeNode::new([2, 3], 7, "scrolling"),
            MergeNode::new([0, 1], 8, "charging"),
        ]);
        let topics = build_topics(&subtopics(&[2, 0, 3, 1]), &hierarchy, "None");
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].name, "scrolling");
        assert_eq!(topics[0].related_sub_topics, vec![2, 3]);
        assert_eq!(topics[1].name, "charging");
        assert_eq!(topics[1].related_sub_topics, vec![0, 1]);
    }

    #[test]
    fn unresolved_subtopics_share_sentinel_topic() {
        let hierarchy = MergeTable::new(vec![MergeNode::new([0, 1], 5, "charging")]);
        let topics = build_topics(&subtopics(&[0, 7, 1, 8]), &hierarchy, "None");
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[1].name, "None");
        assert_eq!(topics[1].related_sub_topics, vec![7, 8]);
    }

    #[test]
    fn equal_parent_names_collapse() {
        let hierarchy = MergeTable::new(vec![
            MergeNode::new([0, 1], 5, "battery"),
            MergeNode::new([2, 3], 6, "battery"),
        ]);
        let topics = build_topics(&subtopics(&[0, 1, 2, 3]), &hierarchy, "None");
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].related_sub_topics, vec![0, 1, 2, 3]);
    }

    #[test]
    fn every_subtopic_belongs_to_exactly_one_topic() {
        let hierarchy = MergeTable::new(vec![
            MergeNode::new([0, 1], 5, "a"),
            MergeNode::new([2], 6, "b"),
        ]);
        let sts = subtopics(&[0, 1, 2, 3]);
        let topics = build_topics(&sts, &hierarchy, "None");
        for st in &sts {
            let owners = topics.iter().filter(|t| t.contains(st.id)).count();
            assert_eq!(owners, 1, "subtopic {}", st.id);
        }
    }

    #[test]
    fn topic_index_reverse_lookup() {
        let topics = vec![Topic::new("a", vec![0, 2]), Topic::new("b", vec![1, 2])];
        let index = TopicIndex::build(&topics);
        assert_eq!(index.owner_of(0), Some(0));
        assert_eq!(index.owner_of(1), Some(1));
        assert_eq!(index.owner_of(2), Some(0));
        assert_eq!(index.owner_of(9), None);
    }
}
