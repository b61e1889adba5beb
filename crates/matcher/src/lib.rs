//! Student roster ingestion and pairing recommendations.
//!
//! ```text
//! students.csv ──► roster ──► prompt ──► Collaborator ──► RecommendationResult
//!                  (load)    (render)   (LLM, once)
//! ```

pub mod crew;
pub mod pipeline;
pub mod prompt;
pub mod roster;

pub use crew::{Collaborator, CrewRequest, LlmCollaborator};
pub use pipeline::{FailureKind, RecommendationPipeline, RecommendationResult};
pub use prompt::{build_task_description, render_roster, render_student, MatcherPersona};
pub use roster::{load_roster, load_roster_from_reader, Roster, StudentRecord};
