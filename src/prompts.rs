//! Prompt builders for the four generation tasks.
//!
//! Each builder takes the relevant slice of workflow state and returns
//! the full prompt string. The expected JSON shape is spelled out in the
//! prompt itself so [`crate::generate::generate_structured`] can decode
//! the response directly.

use std::fmt::Write as _;

use crate::models::{ExperienceEntry, SkillGap};

/// Prompt for one conversational question about a skill gap.
#[must_use]
pub fn gap_question(gap: &SkillGap) -> String {
    format!(
        "You are helping a candidate improve their resume. The target job \
         asks for a skill their resume does not clearly show.\n\n\
         Skill: {skill}\n\
         Category: {category}\n\
         Importance: {importance}\n\
         Job context: {context}\n\n\
         Write one short, friendly question that probes whether the \
         candidate has any experience with this skill, even indirect or \
         informal experience. Keep it conversational.\n\n\
         Respond with JSON: {{\"question\": \"...\"}}",
        skill = gap.skill,
        category = gap.category,
        importance = gap.importance,
        context = gap.context,
    )
}

/// Prompt for the question list opening a job deep dive.
#[must_use]
pub fn job_deep_dive(entry: &ExperienceEntry, relevant_skills: &[String]) -> String {
    let mut bullets = String::new();
    for bullet in &entry.bullets {
        let _ = writeln!(bullets, "  - {bullet}");
    }
    let skills = if relevant_skills.is_empty() {
        "None identified".to_string()
    } else {
        relevant_skills.join(", ")
    };
    format!(
        "You are interviewing a candidate about one job on their resume to \
         uncover achievements the current bullets undersell.\n\n\
         Role: {title} at {company} ({date})\n\
         Current bullets:\n{bullets}\n\
         Skills the candidate says they used in this role: {skills}\n\n\
         Write 2-4 open questions that draw out concrete accomplishments: \
         outcomes, numbers, scope, and how they were achieved. Avoid \
         yes/no questions.\n\n\
         Respond with JSON: {{\"questions\": [\"...\"]}}",
        title = entry.title,
        company = entry.company,
        date = entry.date,
    )
}

/// Prompt converting a free-text answer into X-Y-Z components.
#[must_use]
pub fn xyz_rewrite(user_input: &str, entry: &ExperienceEntry) -> String {
    format!(
        "Restate the candidate's accomplishment in the X-Y-Z pattern: \
         accomplished X, as measured by Y, by doing Z.\n\n\
         Role: {title} at {company}\n\
         Candidate's own words:\n{user_input}\n\n\
         Keep each component short and concrete. If the candidate gave no \
         measurable result, infer a plausible qualitative one from their \
         wording rather than inventing numbers.\n\n\
         Respond with JSON: {{\"x_accomplished\": \"...\", \
         \"y_measured_by\": \"...\", \"z_by_doing\": \"...\"}}",
        title = entry.title,
        company = entry.company,
    )
}

/// Prompt revising a bullet from the candidate's edit feedback.
#[must_use]
pub fn humanize_bullet(bullet: &str, feedback: &str) -> String {
    format!(
        "Revise this resume bullet according to the candidate's feedback. \
         Keep the X-Y-Z structure but make it sound like the candidate, \
         not like a template.\n\n\
         Current bullet: {bullet}\n\
         Feedback: {feedback}\n\n\
         Respond with JSON: {{\"bullet\": \"...\", \"changes_made\": \"...\"}}"
    )
}
