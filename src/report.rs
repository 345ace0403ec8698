//! Flat report rows and CSV output.

use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::builder::TopicIndex;
use crate::error::Result;
use crate::topic::{is_set, Subtopic, Topic};

/// Report columns, in output order.
pub const COLUMNS: [&str; 5] = [
    "General Topic",
    "Subtopic",
    "Sentiment",
    "Number of Responses",
    "Summary",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "General Topic")]
    pub general_topic: String,
    #[serde(rename = "Subtopic")]
    pub subtopic: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
    #[serde(rename = "Number of Responses")]
    pub responses: usize,
    #[serde(rename = "Summary")]
    pub summary: String,
}

/// One row per Subtopic in creation order, truncated to `max_rows`.
///
/// `index` must have been built from `topics`. Subtopics with no owner, and
/// empty sentiment tallies, show `unresolved`. Unset names fall back to the
/// raw labels.
pub fn assemble(
    subtopics: &[Subtopic],
    topics: &[Topic],
    index: &TopicIndex,
    max_rows: usize,
    unresolved: &str,
) -> Vec<ReportRow> {
    subtopics
        .iter()
        .take(max_rows)
        .map(|st| {
            let general_topic = index
                .owner_of(st.id)
                .map(|idx| display_name(&topics[idx].read_name, &topics[idx].name))
                .unwrap_or_else(|| unresolved.to_string());
            ReportRow {
                general_topic,
                subtopic: display_name(&st.read_name, &st.name),
                sentiment: st
                    .sentiment
                    .majority()
                    .map(|label| label.to_string())
                    .unwrap_or_else(|| unresolved.to_string()),
                responses: st.count,
                summary: st.summary.clone().unwrap_or_default(),
            }
        })
        .collect()
}

fn display_name(read_name: &Option<String>, raw: &str) -> String {
    match read_name {
        Some(name) if is_set(read_name) => name.clone(),
        _ => raw.to_string(),
    }
}

/// Quote a text field, doubling embedded quotes.
fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Write rows as CSV. Every text column is quoted whatever its content;
/// only `Number of Responses` is written bare. The header is always
/// written, even for an empty report.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    // Fields arrive pre-quoted, so the writer must not quote again.
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);
    wtr.write_record(COLUMNS.map(quoted))?;
    for row in rows {
        wtr.write_record([
            quoted(&row.general_topic),
            quoted(&row.subtopic),
            quoted(&row.sentiment),
            row.responses.to_string(),
            quoted(&row.summary),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the report to `path` as UTF-8 CSV.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file))
}
