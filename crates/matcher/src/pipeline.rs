//! The recommendation pipeline: roster in, free-text pairings out.
//!
//! A run moves through `Loading -> Assembling -> Delegating` and ends in
//! exactly one of `LoadFailed`, `Succeeded` or `CollaboratorFailed`. An empty
//! roster stops before delegation. Every failure is returned as a value.

use std::path::Path;
use std::sync::Arc;

use matchmate_common::MatchmateError;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::crew::{Collaborator, CrewRequest};
use crate::prompt::{build_task_description, MatcherPersona};
use crate::roster::{load_roster, Roster};

pub const SOURCE_NOT_FOUND_MESSAGE: &str = "Student data file not found.";
pub const COLLABORATOR_ERROR_PREFIX: &str = "An error occurred during crew execution: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceNotFound,
    MalformedRow,
    EmptyRoster,
    CollaboratorError,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationResult {
    Success { text: String },
    Failure { kind: FailureKind, message: String },
}

impl RecommendationResult {
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// The text shown to the user: the recommendations, or an explanation.
    pub fn output(&self) -> String {
        match self {
            Self::Success { text } => text.clone(),
            Self::Failure { kind, message } => match kind {
                FailureKind::SourceNotFound => SOURCE_NOT_FOUND_MESSAGE.to_string(),
                FailureKind::MalformedRow => {
                    format!("Student data file is malformed: {message}.")
                }
                FailureKind::EmptyRoster => message.clone(),
                FailureKind::CollaboratorError => {
                    format!("{COLLABORATOR_ERROR_PREFIX}{message}")
                }
            },
        }
    }
}

impl From<MatchmateError> for RecommendationResult {
    fn from(err: MatchmateError) -> Self {
        let kind = match err {
            MatchmateError::MalformedRow { .. } | MatchmateError::InvalidEncoding { .. } => {
                FailureKind::MalformedRow
            }
            MatchmateError::EmptyRoster => FailureKind::EmptyRoster,
            MatchmateError::Collaborator(_) | MatchmateError::Config(_) => {
                FailureKind::CollaboratorError
            }
            MatchmateError::SourceNotFound(_) => FailureKind::SourceNotFound,
        };
        Self::failure(kind, err.to_string())
    }
}

/// Read the roster on the blocking pool so file I/O and parsing stay off the
/// async workers.
async fn load_roster_off_runtime(path: &Path) -> matchmate_common::Result<Roster> {
    let path = path.to_path_buf();
    let source = path.display().to_string();
    task::spawn_blocking(move || load_roster(&path))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Roster loader task failed");
            Err(MatchmateError::SourceNotFound(source))
        })
}

/// Turns a roster into pairing recommendations via a collaborator.
pub struct RecommendationPipeline {
    collaborator: Arc<dyn Collaborator>,
    persona: MatcherPersona,
}

impl RecommendationPipeline {
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            collaborator,
            persona: MatcherPersona::default(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.collaborator.model_name()
    }

    /// Assemble the request the collaborator will receive for `roster`.
    pub fn build_request(&self, roster: &Roster) -> CrewRequest {
        CrewRequest::new(&self.persona, build_task_description(roster))
    }

    /// Load the roster at `path` and run the pipeline over it.
    #[instrument(skip(self, path), fields(run_id = %Uuid::new_v4(), path = %path.display()))]
    pub async fn run(&self, path: &Path) -> RecommendationResult {
        debug!("Loading roster");
        let roster = match load_roster_off_runtime(path).await {
            Ok(roster) => roster,
            Err(e) => {
                warn!(error = %e, "Roster load failed");
                return e.into();
            }
        };
        self.recommend(&roster).await
    }

    /// Produce recommendations for an already-loaded roster.
    pub async fn recommend(&self, roster: &Roster) -> RecommendationResult {
        if roster.is_empty() {
            warn!("Roster is empty, skipping generation");
            return MatchmateError::EmptyRoster.into();
        }

        debug!(students = roster.len(), "Assembling matching task");
        let request = self.build_request(roster);

        debug!(model = %self.collaborator.model_name(), "Delegating to collaborator");
        match self.collaborator.generate(&request).await {
            Ok(text) => {
                info!(
                    students = roster.len(),
                    output_chars = text.len(),
                    "Recommendations generated"
                );
                RecommendationResult::Success { text }
            }
            Err(e) => {
                warn!(error = %e, "Collaborator failed");
                let message = match e {
                    MatchmateError::Collaborator(message) => message,
                    other => other.to_string(),
                };
                RecommendationResult::failure(FailureKind::CollaboratorError, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_for_each_failure_kind() {
        assert_eq!(
            RecommendationResult::failure(FailureKind::SourceNotFound, "students.csv").output(),
            "Student data file not found."
        );
        assert_eq!(
            RecommendationResult::from(MatchmateError::EmptyRoster).output(),
            "no student data available"
        );
        assert_eq!(
            RecommendationResult::failure(FailureKind::CollaboratorError, "quota exceeded").output(),
            "An error occurred during crew execution: quota exceeded"
        );
        assert_eq!(
            RecommendationResult::failure(
                FailureKind::MalformedRow,
                "row 2 is missing column 'course'"
            )
            .output(),
            "Student data file is malformed: row 2 is missing column 'course'."
        );
    }

    #[test]
    fn success_output_is_unmodified() {
        let result = RecommendationResult::Success {
            text: "- A and B: ...".into(),
        };
        assert!(result.is_success());
        assert_eq!(result.failure_kind(), None);
        assert_eq!(result.output(), "- A and B: ...");
    }

    #[test]
    fn loader_errors_map_to_failure_kinds() {
        let missing: RecommendationResult =
            MatchmateError::SourceNotFound("students.csv".into()).into();
        assert_eq!(missing.failure_kind(), Some(FailureKind::SourceNotFound));

        let malformed: RecommendationResult = MatchmateError::MalformedRow {
            row: 4,
            column: "schedule".into(),
        }
        .into();
        assert_eq!(malformed.failure_kind(), Some(FailureKind::MalformedRow));
        assert_eq!(
            malformed.output(),
            "Student data file is malformed: row 4 is missing column 'schedule'."
        );

        let undecodable: RecommendationResult = MatchmateError::InvalidEncoding {
            row: 2,
            column: Some("schedule".into()),
        }
        .into();
        assert_eq!(undecodable.failure_kind(), Some(FailureKind::MalformedRow));
        assert_eq!(
            undecodable.output(),
            "Student data file is malformed: column 'schedule' in row 2 is not valid UTF-8."
        );
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let result = RecommendationResult::failure(FailureKind::EmptyRoster, "none");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "empty_roster");
    }
}
