//! Customer feedback to a two-level Topic/Subtopic hierarchy with sentiment,
//! generated names and summaries, rendered as a bounded CSV report.

pub mod algo;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod topic;

pub use config::Config;
pub use error::{Result, TopologyError};
pub use pipeline::{Engines, Pipeline, RunSummary};
pub use report::ReportRow;
pub use sentiment::{SentimentLabel, SentimentScore, SentimentTally};
pub use topic::{Subtopic, SubtopicId, Topic};
