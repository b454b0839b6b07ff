//! Phase 2 nodes: job experience deep dive.
//!
//! For each job the workflow generates a handful of probing questions,
//! asks them one at a time, converts every non-empty answer into an
//! X-Y-Z achievement, then keeps asking for additional achievements
//! until the candidate passes. The job's achievements are bundled into a
//! [`JobDeepDiveResult`] before moving on.

use std::sync::Arc;

use async_trait::async_trait;

use crate::generate::{DeepDiveQuestions, Generator, XyzRewrite, generate_structured};
use crate::interact::{InteractionContext, SuspendRequest};
use crate::models::{AchievementDiscovery, JobDeepDiveResult};
use crate::node::{Node, NodeContext, NodeError, NodeOutcome};
use crate::nodes::job_header;
use crate::prompts;
use crate::state::{Phase, StatePatch, WorkflowState};

/// Moves the session into the deep-dive phase.
pub struct StartJobDeepDive;

#[async_trait]
impl Node for StartJobDeepDive {
    async fn run(
        &self,
        _state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        ctx.emit("entering job deep dive");
        Ok(NodeOutcome::Patch(StatePatch {
            phase: Some(Phase::JobDeepDive),
            current_achievements: Some(Vec::new()),
            ..StatePatch::default()
        }))
    }
}

/// Generates the question list for the job under the cursor.
pub struct GenerateDeepDiveQuestions {
    generator: Arc<dyn Generator>,
}

impl GenerateDeepDiveQuestions {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for GenerateDeepDiveQuestions {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let job_idx = state.current_job_index;
        let entry = state
            .experience_data
            .experience
            .get(job_idx)
            .ok_or(NodeError::MissingInput {
                what: "experience entry at current_job_index",
            })?;

        // Skills the candidate mapped to this job during gap exploration.
        let relevant_skills: Vec<String> = state
            .gap_responses
            .iter()
            .filter(|gr| gr.has_experience && gr.relevant_jobs.contains(&job_idx))
            .map(|gr| gr.gap.skill.clone())
            .collect();

        ctx.emit(&format!(
            "generating deep-dive questions for '{}'",
            entry.title
        ));
        let prompt = prompts::job_deep_dive(entry, &relevant_skills);
        let response: DeepDiveQuestions =
            generate_structured(self.generator.as_ref(), &prompt).await?;

        Ok(NodeOutcome::Patch(StatePatch {
            pending_questions: Some(response.questions),
            current_question_index: Some(0),
            current_achievements: Some(Vec::new()),
            ..StatePatch::default()
        }))
    }
}

/// Asks the pending question under the question cursor.
pub struct AskDeepDiveQuestion;

#[async_trait]
impl Node for AskDeepDiveQuestion {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let q_idx = state.current_question_index;
        let Some(question) = state.pending_questions.get(q_idx) else {
            // Cursor past the list; routing will move on.
            return Ok(NodeOutcome::noop());
        };
        let entry = state.experience_data.experience.get(state.current_job_index);

        Ok(NodeOutcome::Suspend(SuspendRequest::TextInput {
            prompt: format!("{question}\n\n(Press Enter to skip)"),
            job_options: None,
            context: InteractionContext {
                question_index: Some(q_idx),
                job_index: Some(state.current_job_index),
                job_header: entry.map(job_header),
                bullets: entry.map(|e| e.bullets.clone()).unwrap_or_default(),
                ..InteractionContext::default()
            },
        }))
    }
}

/// Asks for achievements not covered by the generated questions.
pub struct AskAdditionalAchievement;

#[async_trait]
impl Node for AskAdditionalAchievement {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let entry = state
            .experience_data
            .experience
            .get(state.current_job_index)
            .ok_or(NodeError::MissingInput {
                what: "experience entry at current_job_index",
            })?;

        Ok(NodeOutcome::Suspend(SuspendRequest::TextInput {
            prompt: format!(
                "Any other achievements from {} at {} not mentioned above?\n\n\
                 (Press Enter to finish)",
                entry.title, entry.company
            ),
            job_options: None,
            context: InteractionContext {
                job_index: Some(state.current_job_index),
                is_additional: true,
                ..InteractionContext::default()
            },
        }))
    }
}

/// Converts the latest answer into an X-Y-Z achievement.
///
/// Registered twice: on the questioned path it also advances the
/// question cursor, on the additional path it leaves the cursor alone
/// so it never runs past the question list.
pub struct GenerateXyzBullet {
    generator: Arc<dyn Generator>,
    advance_question: bool,
}

impl GenerateXyzBullet {
    /// Variant run after a deep-dive question; advances the cursor.
    pub fn from_answer(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            advance_question: true,
        }
    }

    /// Variant run after the additional-achievement prompt.
    pub fn from_additional(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            advance_question: false,
        }
    }

    fn next_question_index(&self, state: &WorkflowState) -> Option<usize> {
        self.advance_question
            .then(|| state.current_question_index + 1)
    }
}

#[async_trait]
impl Node for GenerateXyzBullet {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        // Kept untrimmed: the achievement records exactly what was typed.
        let user_input = state
            .human_response
            .as_ref()
            .map(|answer| answer.as_text().to_string())
            .unwrap_or_default();

        if user_input.trim().is_empty() {
            // Skipped question; just move the cursor along.
            return Ok(NodeOutcome::Patch(StatePatch {
                current_question_index: self.next_question_index(state),
                human_response: Some(None),
                ..StatePatch::default()
            }));
        }

        let entry = state
            .experience_data
            .experience
            .get(state.current_job_index)
            .ok_or(NodeError::MissingInput {
                what: "experience entry at current_job_index",
            })?;

        ctx.emit("rewriting answer into X-Y-Z form");
        let prompt = prompts::xyz_rewrite(&user_input, entry);
        let response: XyzRewrite = generate_structured(self.generator.as_ref(), &prompt).await?;

        let mut current_achievements = state.current_achievements.clone();
        current_achievements.push(AchievementDiscovery {
            original_bullet_index: None,
            x_accomplished: response.x_accomplished,
            y_measured_by: response.y_measured_by,
            z_by_doing: response.z_by_doing,
            raw_user_input: user_input,
        });

        Ok(NodeOutcome::Patch(StatePatch {
            current_achievements: Some(current_achievements),
            current_question_index: self.next_question_index(state),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

/// Bundles the job's achievements and advances the job cursor.
pub struct FinalizeJob;

#[async_trait]
impl Node for FinalizeJob {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let job_idx = state.current_job_index;
        let entry = state
            .experience_data
            .experience
            .get(job_idx)
            .ok_or(NodeError::MissingInput {
                what: "experience entry at current_job_index",
            })?;
        ctx.emit(&format!(
            "finalizing job {} with {} achievement(s)",
            job_idx,
            state.current_achievements.len()
        ));

        let mut job_results = state.job_results.clone();
        job_results.push(JobDeepDiveResult {
            job_index: job_idx,
            original_entry: entry.clone(),
            achievements: state.current_achievements.clone(),
            enhanced_bullets: Vec::new(),
        });

        Ok(NodeOutcome::Patch(StatePatch {
            job_results: Some(job_results),
            current_job_index: Some(job_idx + 1),
            current_achievements: Some(Vec::new()),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}
