//! Prompt assembly for the student matcher.

use serde::{Deserialize, Serialize};

use crate::roster::{Roster, StudentRecord};

const MATCHER_ROLE: &str = "Student Matcher";

const MATCHER_GOAL: &str = "Identify and suggest optimal student pairings for collaboration based on academic needs and schedules.";

const MATCHER_BACKSTORY: &str = "An expert in educational technology and collaborative learning. Your job is to analyze student data and find the best matches for study groups, project collaboration, or peer tutoring.";

const MATCHER_EXPECTED_OUTPUT: &str = r#"A clear, bulleted list of recommended student pairings with a brief explanation for each pairing. Example: "- Student A and Student D: Both are in CS101 and have matching schedules, making them perfect for a study group.""#;

const MATCHING_INSTRUCTION: &str = "Analyze the following student data and provide a list of recommended matches. \
The recommendations should be justified based on course, academic performance, and schedule. \
Specifically, find peers for study groups (same course, similar schedule), \
project collaboration (similar skills, complementary schedules), \
or peer tutoring (one student needs help, another is strong in that area).";

/// The fixed persona the matcher presents to the text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherPersona {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub expected_output: String,
}

impl Default for MatcherPersona {
    fn default() -> Self {
        Self {
            role: MATCHER_ROLE.into(),
            goal: MATCHER_GOAL.into(),
            backstory: MATCHER_BACKSTORY.into(),
            expected_output: MATCHER_EXPECTED_OUTPUT.into(),
        }
    }
}

/// Render one student as a single prompt line.
pub fn render_student(record: &StudentRecord) -> String {
    format!(
        "Student {}: Course = {}, Academic Performance = {}, Schedule = {}",
        record.last_name, record.course, record.academic_performance, record.schedule
    )
}

/// Render every student, one per line, in roster order.
pub fn render_roster(roster: &Roster) -> String {
    roster
        .iter()
        .map(render_student)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the task instruction with the roster embedded.
pub fn build_task_description(roster: &Roster) -> String {
    format!(
        "{MATCHING_INSTRUCTION}\n\nStudent Data:\n{}",
        render_roster(roster)
    )
}
