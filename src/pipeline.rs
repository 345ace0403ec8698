//! The sequential batch pipeline.
//!
//! Stages run strictly in order, each completing before the next begins:
//! clustering, sentiment tally (inside Subtopic construction), Topic grouping,
//! Topic naming, Subtopic naming and summaries, report assembly. Engine calls
//! are issued one at a time.

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::builder::{build_subtopics, build_topics, TopicIndex};
use crate::config::Config;
use crate::engine::{ClusterOutput, ClusteringEngine, GenerationEngine, SentimentEngine};
use crate::error::Result;
use crate::input::load_feedback;
use crate::naming::{NamingOrchestrator, NamingStats};
use crate::report::{assemble, write_report, ReportRow};
use crate::topic::{Subtopic, Topic};

/// The external collaborators a run depends on.
#[derive(Clone, Copy)]
pub struct Engines<'a> {
    pub clustering: &'a dyn ClusteringEngine,
    pub sentiment: &'a dyn SentimentEngine,
    pub generation: &'a dyn GenerationEngine,
}

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub feedback: usize,
    pub subtopics: usize,
    pub topics: usize,
    pub rows: usize,
    pub generation_calls: usize,
    pub recovered: usize,
}

/// Owns every Topic and Subtopic for the duration of a run.
pub struct Pipeline<'a> {
    engines: Engines<'a>,
    config: Config,
    seeds: Option<Vec<Vec<String>>>,
    feedback: usize,
    subtopics: Vec<Subtopic>,
    topics: Vec<Topic>,
    /// Subtopic -> Topic lookup, rebuilt whenever `topics` is rebuilt.
    index: TopicIndex,
    stats: NamingStats,
}

impl<'a> Pipeline<'a> {
    pub fn new(engines: Engines<'a>, config: Config) -> Self {
        Self {
            engines,
            config,
            seeds: None,
            feedback: 0,
            subtopics: Vec::new(),
            topics: Vec::new(),
            index: TopicIndex::default(),
            stats: NamingStats::default(),
        }
    }

    /// Seed keyword lists forwarded to the clustering engine.
    pub fn with_seeds(mut self, seeds: Vec<Vec<String>>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subtopics(&self) -> &[Subtopic] {
        &self.subtopics
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Mutable access for callers that pre-fill names before enrichment.
    pub fn subtopics_mut(&mut self) -> &mut [Subtopic] {
        &mut self.subtopics
    }

    /// Topic membership is indexed by [`Pipeline::build`]; only names should
    /// be changed through this.
    pub fn topics_mut(&mut self) -> &mut [Topic] {
        &mut self.topics
    }

    /// Cluster `feedback` and build Subtopics and Topics, replacing any
    /// previously built entities. An empty corpus skips clustering.
    pub fn build(&mut self, feedback: &[String]) -> Result<()> {
        self.feedback = feedback.len();
        let output = if feedback.is_empty() {
            info!("no feedback rows; skipping clustering");
            ClusterOutput::default()
        } else {
            info!(rows = feedback.len(), "clustering feedback");
            self.engines
                .clustering
                .cluster(feedback, self.seeds.as_deref())?
        };

        self.subtopics = build_subtopics(&output.clusters, self.engines.sentiment);
        self.topics = build_topics(
            &self.subtopics,
            &output.hierarchy,
            &self.config.report.unresolved_topic,
        );
        self.index = TopicIndex::build(&self.topics);
        Ok(())
    }

    /// Run both naming passes. Items already named are left untouched, so
    /// calling this again issues no new generation requests for them.
    pub fn enrich(&mut self) -> NamingStats {
        let mut naming = NamingOrchestrator::new(self.engines.generation, self.config.naming.clone());
        naming.name_topics(&mut self.topics, &self.subtopics);
        naming.name_subtopics(&mut self.subtopics);
        let stats = naming.stats();
        self.stats.calls += stats.calls;
        self.stats.recovered += stats.recovered;
        stats
    }

    /// Report rows for the current entities.
    pub fn rows(&self) -> Vec<ReportRow> {
        assemble(
            &self.subtopics,
            &self.topics,
            &self.index,
            self.config.report.max_rows,
            &self.config.report.unresolved_topic,
        )
    }

    pub fn summary(&self, rows: usize) -> RunSummary {
        RunSummary {
            feedback: self.feedback,
            subtopics: self.subtopics.len(),
            topics: self.topics.len(),
            rows,
            generation_calls: self.stats.calls,
            recovered: self.stats.recovered,
        }
    }

    /// Build, enrich and assemble the report for `feedback`.
    pub fn run(&mut self, feedback: &[String]) -> Result<(Vec<ReportRow>, RunSummary)> {
        self.build(feedback)?;
        self.enrich();
        let rows = self.rows();
        let summary = self.summary(rows.len());
        info!(
            subtopics = summary.subtopics,
            topics = summary.topics,
            rows = summary.rows,
            recovered = summary.recovered,
            "run complete"
        );
        Ok((rows, summary))
    }

    /// Load feedback from `input`, run, and write the report to `output`.
    ///
    /// The input file is validated before any engine is called.
    pub fn run_file(&mut self, input: &Path, output: &Path) -> Result<RunSummary> {
        let feedback = load_feedback(input, &self.config.input.column, &self.config.input.extension)?;
        let (rows, summary) = self.run(&feedback)?;
        write_report(output, &rows)?;
        info!(path = %output.display(), "report written");
        Ok(summary)
    }
}
