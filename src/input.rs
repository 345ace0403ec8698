//! Feedback loading from a delimited text table.

use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TopologyError};

/// Check that `path` exists and carries `extension` (case-insensitive).
pub fn validate_path(path: &Path, extension: &str) -> Result<()> {
    if !path.exists() {
        return Err(TopologyError::InputNotFound(path.to_path_buf()));
    }
    let actual = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    if !actual.eq_ignore_ascii_case(extension.trim_start_matches('.')) {
        return Err(TopologyError::InvalidFileType(format!(".{actual}")));
    }
    Ok(())
}

/// Validate and read the feedback column of the file at `path`.
pub fn load_feedback(path: &Path, column: &str, extension: &str) -> Result<Vec<String>> {
    validate_path(path, extension)?;
    let feedback = read_feedback(File::open(path)?, column)?;
    info!(path = %path.display(), rows = feedback.len(), "feedback loaded");
    Ok(feedback)
}

/// Read the `column` values from CSV data with a header row.
///
/// Header names are matched after trimming. Blank cells are dropped.
pub fn read_feedback<R: Read>(reader: R, column: &str) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let idx = rdr
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| TopologyError::MissingColumn(column.to_string()))?;

    let mut feedback = Vec::new();
    let mut blank = 0usize;
    for record in rdr.records() {
        let record = record?;
        match record.get(idx).map(str::trim) {
            Some(text) if !text.is_empty() => feedback.push(text.to_string()),
            _ => blank += 1,
        }
    }
    if blank > 0 {
        debug!(blank, "skipped blank feedback cells");
    }
    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_column() {
        let data = "Id,Comments,Rating\n1,Battery dies fast,2\n2,\"Love it, truly\",5\n";
        let fb = read_feedback(data.as_bytes(), "Comments").unwrap();
        assert_eq!(fb, vec!["Battery dies fast", "Love it, truly"]);
    }

    #[test]
    fn skips_blank_and_short_rows() {
        let data = "Comments,Rating\n  ,3\nGreat scroll wheel,4\n\"\"\n";
        let fb = read_feedback(data.as_bytes(), "Comments").unwrap();
        assert_eq!(fb, vec!["Great scroll wheel"]);
    }

    #[test]
    fn header_with_bom_and_padding_matches() {
        let data = "\u{feff} Comments ,x\nhello,1\n";
        let fb = read_feedback(data.as_bytes(), "Comments").unwrap();
        assert_eq!(fb, vec!["hello"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = read_feedback("Review\nok\n".as_bytes(), "Comments").unwrap_err();
        assert!(matches!(err, TopologyError::MissingColumn(c) if c == "Comments"));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let err = load_feedback(Path::new("/no/such/feedback.csv"), "Comments", "csv").unwrap_err();
        assert!(matches!(err, TopologyError::InputNotFound(_)));
    }

    #[test]
    fn wrong_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.txt");
        std::fs::write(&path, "Comments\nhi\n").unwrap();
        let err = load_feedback(&path, "Comments", "csv").unwrap_err();
        assert!(matches!(err, TopologyError::InvalidFileType(ext) if ext == ".txt"));
    }

    #[test]
    fn extension_check_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Feedback.CSV");
        std::fs::write(&path, "Comments\nhi\n").unwrap();
        assert_eq!(load_feedback(&path, "Comments", "csv").unwrap(), vec!["hi"]);
    }
}
