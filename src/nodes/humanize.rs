//! Phase 3 nodes: bullet refinement.
//!
//! Every discovered achievement is turned into a draft X-Y-Z bullet and
//! shown to the candidate, who approves, edits, or skips it. Approved
//! bullets accumulate on their job's result; the final node folds them
//! back into a copy of the resume data.

use std::sync::Arc;

use async_trait::async_trait;

use crate::generate::{BulletRevision, Generator, generate_structured};
use crate::interact::{InteractionContext, SuspendRequest};
use crate::models::AchievementDiscovery;
use crate::node::{Node, NodeContext, NodeError, NodeOutcome};
use crate::nodes::job_header;
use crate::state::{Phase, StatePatch, WorkflowState};

/// Draft bullet in the fixed X-Y-Z sentence shape.
fn initial_bullet(achievement: &AchievementDiscovery) -> String {
    format!(
        "{}, measured by {}, by {}",
        achievement.x_accomplished, achievement.y_measured_by, achievement.z_by_doing
    )
}

/// Moves the session into the humanization phase and resets its cursors.
pub struct PrepareHumanization;

#[async_trait]
impl Node for PrepareHumanization {
    async fn run(
        &self,
        _state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        ctx.emit("entering bullet refinement");
        Ok(NodeOutcome::Patch(StatePatch {
            phase: Some(Phase::Humanization),
            humanization_job_index: Some(0),
            humanization_achievement_index: Some(0),
            ..StatePatch::default()
        }))
    }
}

/// Stages the achievement under the cursor as the current bullet.
///
/// A cursor with no achievement behind it (a job that produced none)
/// leaves the patch empty; routing inspects the cursor directly and
/// advances past it.
pub struct PrepareBullet;

#[async_trait]
impl Node for PrepareBullet {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let Some(job_result) = state.humanization_job() else {
            return Ok(NodeOutcome::noop());
        };
        let Some(achievement) = job_result
            .achievements
            .get(state.humanization_achievement_index)
        else {
            return Ok(NodeOutcome::noop());
        };

        Ok(NodeOutcome::Patch(StatePatch {
            current_bullet: Some(Some(initial_bullet(achievement))),
            current_achievement: Some(Some(achievement.clone())),
            ..StatePatch::default()
        }))
    }
}

/// Presents the current bullet for approval, edit, or skip.
pub struct PresentBulletOptions;

/// The three options offered for every bullet, verbatim.
pub const BULLET_OPTIONS: [&str; 3] = ["Yes, looks good", "No, I want to edit", "Skip this bullet"];

#[async_trait]
impl Node for PresentBulletOptions {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let bullet = state.current_bullet.as_deref().ok_or(NodeError::MissingInput {
            what: "current_bullet",
        })?;
        let achievement = state
            .current_achievement
            .as_ref()
            .ok_or(NodeError::MissingInput {
                what: "current_achievement",
            })?;

        Ok(NodeOutcome::Suspend(SuspendRequest::Select {
            prompt: format!(
                "Original input: {}\n\nXYZ version: {bullet}\n\nDoes this sound like you?",
                achievement.raw_user_input
            ),
            options: BULLET_OPTIONS.iter().map(|s| (*s).to_string()).collect(),
            context: InteractionContext {
                current_bullet: Some(bullet.to_string()),
                job_header: state
                    .humanization_job()
                    .map(|jr| job_header(&jr.original_entry)),
                ..InteractionContext::default()
            },
        }))
    }
}

/// Asks what the candidate wants changed about the current bullet.
pub struct CollectEditFeedback;

#[async_trait]
impl Node for CollectEditFeedback {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        Ok(NodeOutcome::Suspend(SuspendRequest::TextInput {
            prompt: "What would you like to change?".to_string(),
            job_options: None,
            context: InteractionContext {
                current_bullet: state.current_bullet.clone(),
                ..InteractionContext::default()
            },
        }))
    }
}

/// Revises the current bullet from the candidate's feedback.
pub struct RefineBullet {
    generator: Arc<dyn Generator>,
}

impl RefineBullet {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for RefineBullet {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let bullet = state.current_bullet.as_deref().ok_or(NodeError::MissingInput {
            what: "current_bullet",
        })?;
        let feedback = state
            .human_response
            .as_ref()
            .map(|answer| answer.as_text().trim().to_string())
            .unwrap_or_default();

        if feedback.is_empty() {
            // Nothing to change; re-present the same bullet.
            return Ok(NodeOutcome::Patch(StatePatch {
                human_response: Some(None),
                ..StatePatch::default()
            }));
        }

        ctx.emit("refining bullet from feedback");
        let prompt = crate::prompts::humanize_bullet(bullet, &feedback);
        let response: BulletRevision =
            generate_structured(self.generator.as_ref(), &prompt).await?;

        Ok(NodeOutcome::Patch(StatePatch {
            current_bullet: Some(Some(response.bullet)),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

/// Appends the approved bullet to its job's enhanced list.
pub struct SaveBullet;

#[async_trait]
impl Node for SaveBullet {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let bullet = state
            .current_bullet
            .clone()
            .ok_or(NodeError::MissingInput {
                what: "current_bullet",
            })?;
        let job_idx = state.humanization_job_index;

        let mut job_results = state.job_results.clone();
        let job_result = job_results.get_mut(job_idx).ok_or(NodeError::MissingInput {
            what: "job result at humanization_job_index",
        })?;
        job_result.enhanced_bullets.push(bullet);
        ctx.emit(&format!(
            "saved bullet {} for job {job_idx}",
            job_result.enhanced_bullets.len()
        ));

        Ok(NodeOutcome::Patch(StatePatch {
            job_results: Some(job_results),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

/// Moves the humanization cursor to the next achievement or job.
pub struct AdvanceHumanization;

#[async_trait]
impl Node for AdvanceHumanization {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let job_idx = state.humanization_job_index;
        let ach_idx = state.humanization_achievement_index;

        let patch = match state.humanization_job() {
            Some(job_result) if ach_idx + 1 < job_result.achievements.len() => StatePatch {
                humanization_achievement_index: Some(ach_idx + 1),
                human_response: Some(None),
                ..StatePatch::default()
            },
            Some(_) => StatePatch {
                humanization_job_index: Some(job_idx + 1),
                humanization_achievement_index: Some(0),
                human_response: Some(None),
                ..StatePatch::default()
            },
            // Cursor already past the last job; nothing left to move.
            None => StatePatch {
                human_response: Some(None),
                ..StatePatch::default()
            },
        };
        Ok(NodeOutcome::Patch(patch))
    }
}

/// Folds approved bullets into a copy of the resume data and completes
/// the session.
pub struct ApplyImprovements;

#[async_trait]
impl Node for ApplyImprovements {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let mut result = state.experience_data.clone();

        for job_result in &state.job_results {
            if job_result.enhanced_bullets.is_empty() {
                continue;
            }
            if let Some(entry) = result.experience.get_mut(job_result.job_index) {
                let mut bullets = job_result.original_entry.bullets.clone();
                bullets.extend(job_result.enhanced_bullets.iter().cloned());
                entry.bullets = bullets;
            }
        }
        ctx.emit("applying improvements to resume data");

        Ok(NodeOutcome::Patch(StatePatch {
            phase: Some(Phase::Completed),
            final_experience_data: Some(Box::new(result)),
            current_bullet: Some(None),
            current_achievement: Some(None),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExperienceData, ExperienceEntry, JobDeepDiveResult};
    use crate::types::NodeId;

    fn achievement(raw: &str) -> AchievementDiscovery {
        AchievementDiscovery {
            original_bullet_index: None,
            x_accomplished: "Cut latency".to_string(),
            y_measured_by: "p99 under 100ms".to_string(),
            z_by_doing: "adding a cache".to_string(),
            raw_user_input: raw.to_string(),
        }
    }

    fn entry() -> ExperienceEntry {
        ExperienceEntry {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            date: "2020-2023".to_string(),
            bullets: vec!["Maintained services".to_string()],
        }
    }

    fn state_with_results(results: Vec<JobDeepDiveResult>) -> WorkflowState {
        let mut state = WorkflowState::new(
            ExperienceData {
                experience: vec![entry()],
                ..ExperienceData::default()
            },
            Vec::new(),
        );
        state.job_results = results;
        state
    }

    fn ctx(node_id: NodeId) -> NodeContext {
        NodeContext { node_id, step: 0 }
    }

    #[tokio::test]
    async fn prepare_bullet_stages_achievement_in_xyz_shape() {
        let mut state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: vec![achievement("made it fast")],
            enhanced_bullets: Vec::new(),
        }]);

        let NodeOutcome::Patch(patch) = PrepareBullet
            .run(&state, ctx(NodeId::PrepareBullet))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        assert_eq!(
            state.current_bullet.as_deref(),
            Some("Cut latency, measured by p99 under 100ms, by adding a cache")
        );
        assert!(state.current_achievement.is_some());
    }

    #[tokio::test]
    async fn prepare_bullet_with_empty_job_is_noop() {
        let state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: Vec::new(),
            enhanced_bullets: Vec::new(),
        }]);

        let outcome = PrepareBullet
            .run(&state, ctx(NodeId::PrepareBullet))
            .await
            .unwrap();
        assert!(matches!(outcome, NodeOutcome::Patch(p) if p.is_empty()));
    }

    #[tokio::test]
    async fn advance_moves_within_job_then_to_next_job() {
        let mut state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: vec![achievement("a"), achievement("b")],
            enhanced_bullets: Vec::new(),
        }]);

        let NodeOutcome::Patch(patch) = AdvanceHumanization
            .run(&state, ctx(NodeId::AdvanceHumanization))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);
        assert_eq!(state.humanization_job_index, 0);
        assert_eq!(state.humanization_achievement_index, 1);

        let NodeOutcome::Patch(patch) = AdvanceHumanization
            .run(&state, ctx(NodeId::AdvanceHumanization))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);
        assert_eq!(state.humanization_job_index, 1);
        assert_eq!(state.humanization_achievement_index, 0);
    }

    #[tokio::test]
    async fn save_bullet_appends_to_job_result() {
        let mut state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: vec![achievement("made it fast")],
            enhanced_bullets: Vec::new(),
        }]);
        state.current_bullet = Some("Approved bullet".to_string());

        let NodeOutcome::Patch(patch) = SaveBullet
            .run(&state, ctx(NodeId::SaveBullet))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        assert_eq!(
            state.job_results[0].enhanced_bullets,
            vec!["Approved bullet".to_string()]
        );
    }

    #[tokio::test]
    async fn apply_improvements_extends_original_bullets() {
        let mut state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: vec![achievement("made it fast")],
            enhanced_bullets: vec!["New bullet".to_string()],
        }]);

        let NodeOutcome::Patch(patch) = ApplyImprovements
            .run(&state, ctx(NodeId::ApplyImprovements))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        assert_eq!(state.phase, Phase::Completed);
        let improved = state.final_experience_data.unwrap();
        assert_eq!(
            improved.experience[0].bullets,
            vec!["Maintained services".to_string(), "New bullet".to_string()]
        );
        // Source data is untouched.
        assert_eq!(state.experience_data.experience[0].bullets.len(), 1);
    }

    #[tokio::test]
    async fn apply_improvements_without_enhancements_keeps_resume_as_is() {
        let mut state = state_with_results(vec![JobDeepDiveResult {
            job_index: 0,
            original_entry: entry(),
            achievements: Vec::new(),
            enhanced_bullets: Vec::new(),
        }]);

        let NodeOutcome::Patch(patch) = ApplyImprovements
            .run(&state, ctx(NodeId::ApplyImprovements))
            .await
            .unwrap()
        else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        let improved = state.final_experience_data.unwrap();
        assert_eq!(improved, state.experience_data);
    }
}
