//! Conditional routing functions.
//!
//! Each router is a pure function of the workflow state, run after its
//! source node to pick the next node. Routers never mutate state and
//! never fail: unanswerable conditions fall through to the conservative
//! branch, which keeps resumed sessions moving even with odd input.

use crate::state::WorkflowState;
use crate::types::NodeId;

/// After `Init`: any gaps to explore, or straight to the deep dive.
#[must_use]
pub fn route_initial(state: &WorkflowState) -> NodeId {
    if state.skill_gaps.is_empty() {
        NodeId::StartJobDeepDive
    } else {
        NodeId::GenerateGapQuestion
    }
}

/// After the gap confirmation: collect details on yes, record a
/// no-experience response otherwise.
#[must_use]
pub fn route_after_gap_confirm(state: &WorkflowState) -> NodeId {
    let has_experience = state
        .human_response
        .as_ref()
        .is_some_and(|answer| answer.as_bool());
    if has_experience {
        NodeId::CollectGapDetails
    } else {
        NodeId::StoreGapResponse
    }
}

/// After storing a gap response: more gaps, or move to the deep dive.
#[must_use]
pub fn route_after_gap_advance(state: &WorkflowState) -> NodeId {
    if state.current_gap_index < state.skill_gaps.len() {
        NodeId::GenerateGapQuestion
    } else {
        NodeId::StartJobDeepDive
    }
}

/// After generating deep-dive questions: ask the first, or fall through
/// to the additional-achievement prompt when none were produced.
#[must_use]
pub fn route_after_questions(state: &WorkflowState) -> NodeId {
    if state.pending_questions.is_empty() {
        NodeId::AskAdditionalAchievement
    } else {
        NodeId::AskDeepDiveQuestion
    }
}

/// After an X-Y-Z rewrite on the questioned path: more questions, or the
/// additional-achievement prompt.
#[must_use]
pub fn route_after_xyz(state: &WorkflowState) -> NodeId {
    if state.current_question_index < state.pending_questions.len() {
        NodeId::AskDeepDiveQuestion
    } else {
        NodeId::AskAdditionalAchievement
    }
}

/// After the additional-achievement prompt: a non-empty answer loops
/// back through the rewrite, an empty one finalizes the job.
#[must_use]
pub fn route_after_additional(state: &WorkflowState) -> NodeId {
    let has_input = state
        .human_response
        .as_ref()
        .is_some_and(|answer| !answer.as_text().trim().is_empty());
    if has_input {
        NodeId::GenerateXyzFromAdditional
    } else {
        NodeId::FinalizeJob
    }
}

/// After finalizing a job: more jobs, or start humanization.
#[must_use]
pub fn route_after_job(state: &WorkflowState) -> NodeId {
    if state.current_job_index < state.experience_data.experience.len() {
        NodeId::GenerateDeepDiveQuestions
    } else {
        NodeId::PrepareHumanization
    }
}

/// After entering humanization: skip the whole phase when no job
/// produced any achievements.
#[must_use]
pub fn route_after_prepare_humanization(state: &WorkflowState) -> NodeId {
    if state.job_results.iter().any(|jr| !jr.achievements.is_empty()) {
        NodeId::PrepareBullet
    } else {
        NodeId::ApplyImprovements
    }
}

/// After staging a bullet: present it when the cursor points at a real
/// achievement, otherwise advance past the empty slot.
///
/// Routes on the cursor rather than `current_bullet`, which may still
/// hold the previous job's bullet when the cursor lands on a job with
/// no achievements.
#[must_use]
pub fn route_after_prepare_bullet(state: &WorkflowState) -> NodeId {
    let staged = state
        .humanization_job()
        .and_then(|jr| jr.achievements.get(state.humanization_achievement_index))
        .is_some();
    if staged {
        NodeId::PresentBulletOptions
    } else {
        NodeId::AdvanceHumanization
    }
}

/// After the approve/edit/skip selection. Unknown choices take the edit
/// branch, matching the three-option prompt's catch-all.
#[must_use]
pub fn route_bullet_choice(state: &WorkflowState) -> NodeId {
    let choice = state
        .human_response
        .as_ref()
        .map(|answer| answer.as_choice())
        .unwrap_or_default();
    match choice {
        "Yes, looks good" => NodeId::SaveBullet,
        "Skip this bullet" => NodeId::AdvanceHumanization,
        _ => NodeId::CollectEditFeedback,
    }
}

/// After moving the humanization cursor: more jobs to walk, or done.
///
/// Only the job cursor decides; a job with no achievements routes back
/// through `PrepareBullet`, which advances past it, so a barren job in
/// the middle never ends the phase early.
#[must_use]
pub fn route_after_advance(state: &WorkflowState) -> NodeId {
    if state.humanization_job_index < state.job_results.len() {
        NodeId::PrepareBullet
    } else {
        NodeId::ApplyImprovements
    }
}
