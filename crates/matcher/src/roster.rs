//! Student roster loading.
//!
//! The source is CSV with a header row naming at least `name`, `course`,
//! `academic_performance` and `schedule`. Extra columns are ignored.
//! Loading is synchronous and reads the whole file; rosters are class-sized.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use matchmate_common::{MatchmateError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const NAME_COLUMN: &str = "name";
pub const COURSE_COLUMN: &str = "course";
pub const PERFORMANCE_COLUMN: &str = "academic_performance";
pub const SCHEDULE_COLUMN: &str = "schedule";

/// One normalized row of student data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub last_name: String,
    pub course: String,
    pub academic_performance: String,
    pub schedule: String,
}

impl StudentRecord {
    /// Build a record from raw column values.
    ///
    /// Values are trimmed and internal whitespace runs (including newlines
    /// inside quoted fields) collapse to a single space, so each student
    /// renders on one line. Returns `None` when `full_name` has no
    /// non-whitespace token.
    pub fn new(
        full_name: &str,
        course: &str,
        academic_performance: &str,
        schedule: &str,
    ) -> Option<Self> {
        let last_name = full_name.split_whitespace().last()?;
        Some(Self {
            last_name: last_name.to_string(),
            course: collapse_whitespace(course),
            academic_performance: collapse_whitespace(academic_performance),
            schedule: collapse_whitespace(schedule),
        })
    }
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Students in source row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StudentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a roster from a CSV file.
///
/// A path that does not exist or cannot be opened yields `SourceNotFound`.
pub fn load_roster(path: impl AsRef<Path>) -> Result<Roster> {
    let path = path.as_ref();
    let source = path.display().to_string();

    let file = File::open(path).map_err(|e| {
        debug!(path = %source, error = %e, "Roster source could not be opened");
        MatchmateError::SourceNotFound(source.clone())
    })?;

    parse_roster(file, &source)
}

/// Load a roster from any reader producing CSV text.
pub fn load_roster_from_reader<R: Read>(reader: R) -> Result<Roster> {
    parse_roster(reader, "<reader>")
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    name: Option<usize>,
    course: Option<usize>,
    performance: Option<usize>,
    schedule: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |column: &str| headers.iter().position(|h| h == column);
        Self {
            name: find(NAME_COLUMN),
            course: find(COURSE_COLUMN),
            performance: find(PERFORMANCE_COLUMN),
            schedule: find(SCHEDULE_COLUMN),
        }
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: Option<usize>,
    column: &str,
    row: usize,
) -> Result<&'r str> {
    index
        .and_then(|i| record.get(i))
        .ok_or_else(|| MatchmateError::MalformedRow {
            row,
            column: column.to_string(),
        })
}

fn parse_roster<R: Read>(reader: R, source: &str) -> Result<Roster> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| read_error(e, source, 0, None))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers);

    let mut records = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let row = i + 1;
        let record = result.map_err(|e| read_error(e, source, row, Some(&headers)))?;

        let name = field(&record, columns.name, NAME_COLUMN, row)?;
        let course = field(&record, columns.course, COURSE_COLUMN, row)?;
        let performance = field(&record, columns.performance, PERFORMANCE_COLUMN, row)?;
        let schedule = field(&record, columns.schedule, SCHEDULE_COLUMN, row)?;

        let student = StudentRecord::new(name, course, performance, schedule).ok_or_else(|| {
            MatchmateError::MalformedRow {
                row,
                column: NAME_COLUMN.to_string(),
            }
        })?;
        records.push(student);
    }

    debug!(source, records = records.len(), "Loaded roster");
    Ok(Roster::new(records))
}

/// Classify a CSV read failure: undecodable fields are encoding errors,
/// anything else means the source could not be read.
fn read_error(
    err: csv::Error,
    source: &str,
    row: usize,
    headers: Option<&csv::StringRecord>,
) -> MatchmateError {
    match err.kind() {
        csv::ErrorKind::Utf8 { err: utf8, .. } => MatchmateError::InvalidEncoding {
            row,
            column: headers
                .and_then(|h| h.get(utf8.field()))
                .map(str::to_string),
        },
        _ => {
            debug!(source, error = %err, "Roster source could not be read");
            MatchmateError::SourceNotFound(source.to_string())
        }
    }
}
