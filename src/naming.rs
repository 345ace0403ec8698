//! Human-readable names and summaries via a text-generation engine.
//!
//! Both passes are write-once: an item whose field already holds a
//! non-empty value is skipped, so re-running a pass issues no new calls for
//! it. A failed call never aborts a pass; the item receives the configured
//! failure text and the pass moves on.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::NamingConfig;
use crate::engine::GenerationEngine;
use crate::topic::{is_set, Nameable, Subtopic, SubtopicId, Topic};

/// Outcome of a single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Text(String),
    /// The engine failed; `reason` is the logged cause.
    Recovered { reason: String },
}

impl Generated {
    /// The generated text, or `failure_text` for a recovered failure.
    pub fn into_value(self, failure_text: &str) -> String {
        match self {
            Self::Text(text) => text,
            Self::Recovered { .. } => failure_text.to_string(),
        }
    }
}

/// Counters for generation requests issued by the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingStats {
    pub calls: usize,
    pub recovered: usize,
}

pub struct NamingOrchestrator<'a> {
    engine: &'a dyn GenerationEngine,
    config: NamingConfig,
    stats: NamingStats,
}

impl<'a> NamingOrchestrator<'a> {
    pub fn new(engine: &'a dyn GenerationEngine, config: NamingConfig) -> Self {
        Self {
            engine,
            config,
            stats: NamingStats::default(),
        }
    }

    pub fn stats(&self) -> NamingStats {
        self.stats
    }

    fn generate(&mut self, item: &str, prompt: &str) -> Generated {
        self.stats.calls += 1;
        debug!(item, "generating");
        let generated = match self.engine.generate(&self.config.system_prompt, prompt) {
            Ok(text) => Generated::Text(text),
            Err(e) => Generated::Recovered {
                reason: e.to_string(),
            },
        };
        if let Generated::Recovered { reason } = &generated {
            self.stats.recovered += 1;
            warn!(item, reason = %reason, "generation failed for '{item}'; using failure text");
        }
        generated
    }

    fn generate_value(&mut self, item: &str, prompt: &str) -> String {
        self.generate(item, prompt).into_value(&self.config.failure_text)
    }

    /// Name every Topic that has no name yet, using its members' details.
    pub fn name_topics(&mut self, topics: &mut [Topic], subtopics: &[Subtopic]) {
        info!("building topic names");
        let lookup: HashMap<SubtopicId, &Subtopic> = subtopics.iter().map(|st| (st.id, st)).collect();
        for topic in topics.iter_mut().filter(|t| !is_set(&t.read_name)) {
            topic.attach_details(|id| lookup.get(&id).copied());
            let name = self.generate_value(&topic.name, &topic.name_prompt());
            topic.read_name = Some(name);
        }
    }

    /// Name and summarize every Subtopic, filling only unset fields.
    pub fn name_subtopics(&mut self, subtopics: &mut [Subtopic]) {
        info!("building subtopic names and summaries");
        for st in subtopics.iter_mut() {
            if !is_set(&st.read_name) {
                let name = self.generate_value(&st.name, &st.name_prompt());
                st.read_name = Some(name);
            }
            if !is_set(&st.summary) {
                let summary = self.generate_value(&st.name, &st.summary_prompt());
                st.summary = Some(summary);
            }
        }
    }
}
