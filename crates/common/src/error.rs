//! Error types for Matchmate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchmateError {
    #[error("Student data file not found: {0}")]
    SourceNotFound(String),

    #[error("row {row} is missing column '{column}'")]
    MalformedRow { row: usize, column: String },

    /// A field that is not valid UTF-8. `row` 0 is the header.
    #[error("{} is not valid UTF-8", encoding_location(.row, .column))]
    InvalidEncoding { row: usize, column: Option<String> },

    #[error("no student data available")]
    EmptyRoster,

    /// Raised by the text-generation backend. Displays the backend message as-is.
    #[error("{0}")]
    Collaborator(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn encoding_location(row: &usize, column: &Option<String>) -> String {
    match (*row, column.as_deref()) {
        (0, _) => "the header row".to_string(),
        (row, Some(column)) => format!("column '{column}' in row {row}"),
        (row, None) => format!("row {row}"),
    }
}

pub type Result<T> = std::result::Result<T, MatchmateError>;
