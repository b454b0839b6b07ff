//! Workflow state and the patch type nodes use to mutate it.
//!
//! Nodes never hold mutable access to the live state. Each step a node
//! receives a read-only snapshot and returns a [`StatePatch`] whose
//! populated fields the engine merges in. Fields left `None` stay
//! untouched, so patches from different nodes compose without clobbering
//! each other's progress.

use serde::{Deserialize, Serialize};

use crate::interact::HumanAnswer;
use crate::models::{
    AchievementDiscovery, ExperienceData, GapResponse, JobDeepDiveResult, SkillGap,
};

/// Which major phase of the improvement workflow the session is in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Init,
    GapExploration,
    JobDeepDive,
    Humanization,
    Completed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Init => "init",
            Phase::GapExploration => "gap_exploration",
            Phase::JobDeepDive => "job_deep_dive",
            Phase::Humanization => "humanization",
            Phase::Completed => "completed",
        };
        f.write_str(label)
    }
}

/// Complete session state for one resume-improvement run.
///
/// `experience_data` and `skill_gaps` are inputs fixed at session start;
/// everything else accumulates as the graph executes. The whole struct
/// round-trips through serde so checkpoints survive process restarts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,

    // Inputs, fixed at session start.
    pub experience_data: ExperienceData,
    pub skill_gaps: Vec<SkillGap>,

    // Phase 1: gap exploration.
    pub current_gap_index: usize,
    #[serde(default)]
    pub gap_responses: Vec<GapResponse>,
    #[serde(default)]
    pub pending_gap_question: Option<String>,

    // Phase 2: job deep dive.
    pub current_job_index: usize,
    #[serde(default)]
    pub job_results: Vec<JobDeepDiveResult>,
    #[serde(default)]
    pub pending_questions: Vec<String>,
    pub current_question_index: usize,
    #[serde(default)]
    pub current_achievements: Vec<AchievementDiscovery>,

    // Phase 3: humanization.
    pub humanization_job_index: usize,
    pub humanization_achievement_index: usize,
    #[serde(default)]
    pub current_bullet: Option<String>,
    #[serde(default)]
    pub current_achievement: Option<AchievementDiscovery>,

    // Scratch slot for the most recent human answer; consumed by the
    // first node that runs after a resume.
    #[serde(default)]
    pub human_response: Option<HumanAnswer>,

    // Output.
    #[serde(default)]
    pub final_experience_data: Option<ExperienceData>,
}

impl WorkflowState {
    /// Fresh state for the given inputs, positioned at the start of the
    /// workflow.
    #[must_use]
    pub fn new(experience_data: ExperienceData, skill_gaps: Vec<SkillGap>) -> Self {
        WorkflowState {
            experience_data,
            skill_gaps,
            ..WorkflowState::default()
        }
    }

    /// The gap currently under discussion, if the cursor is in range.
    #[must_use]
    pub fn current_gap(&self) -> Option<&SkillGap> {
        self.skill_gaps.get(self.current_gap_index)
    }

    /// The deep-dive result for the job currently being humanized.
    #[must_use]
    pub fn humanization_job(&self) -> Option<&JobDeepDiveResult> {
        self.job_results.get(self.humanization_job_index)
    }
}

/// A partial update to [`WorkflowState`]. Only populated fields are
/// applied; `apply` is the single place merge semantics live.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    pub phase: Option<Phase>,
    pub current_gap_index: Option<usize>,
    pub gap_responses: Option<Vec<GapResponse>>,
    /// `Some(None)` clears the pending question; `None` leaves it alone.
    pub pending_gap_question: Option<Option<String>>,
    pub current_job_index: Option<usize>,
    pub job_results: Option<Vec<JobDeepDiveResult>>,
    pub pending_questions: Option<Vec<String>>,
    pub current_question_index: Option<usize>,
    pub current_achievements: Option<Vec<AchievementDiscovery>>,
    pub humanization_job_index: Option<usize>,
    pub humanization_achievement_index: Option<usize>,
    pub current_bullet: Option<Option<String>>,
    pub current_achievement: Option<Option<AchievementDiscovery>>,
    pub human_response: Option<Option<HumanAnswer>>,
    pub final_experience_data: Option<Box<ExperienceData>>,
}

impl StatePatch {
    /// True when no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == StatePatch::default()
    }

    /// Merge this patch into `state`, field by field.
    pub fn apply(self, state: &mut WorkflowState) {
        if let Some(phase) = self.phase {
            state.phase = phase;
        }
        if let Some(idx) = self.current_gap_index {
            state.current_gap_index = idx;
        }
        if let Some(responses) = self.gap_responses {
            state.gap_responses = responses;
        }
        if let Some(question) = self.pending_gap_question {
            state.pending_gap_question = question;
        }
        if let Some(idx) = self.current_job_index {
            state.current_job_index = idx;
        }
        if let Some(results) = self.job_results {
            state.job_results = results;
        }
        if let Some(questions) = self.pending_questions {
            state.pending_questions = questions;
        }
        if let Some(idx) = self.current_question_index {
            state.current_question_index = idx;
        }
        if let Some(achievements) = self.current_achievements {
            state.current_achievements = achievements;
        }
        if let Some(idx) = self.humanization_job_index {
            state.humanization_job_index = idx;
        }
        if let Some(idx) = self.humanization_achievement_index {
            state.humanization_achievement_index = idx;
        }
        if let Some(bullet) = self.current_bullet {
            state.current_bullet = bullet;
        }
        if let Some(achievement) = self.current_achievement {
            state.current_achievement = achievement;
        }
        if let Some(answer) = self.human_response {
            state.human_response = answer;
        }
        if let Some(data) = self.final_experience_data {
            state.final_experience_data = Some(*data);
        }
    }
}
