//! Phase 1 nodes: skill gap exploration.
//!
//! For each gap the workflow generates one conversational question, asks
//! the candidate whether they have the experience, optionally collects
//! details plus the jobs the experience maps to, and records a
//! [`GapResponse`] either way.

use std::sync::Arc;

use async_trait::async_trait;

use crate::generate::{GapQuestion, Generator, generate_structured};
use crate::interact::{InteractionContext, SuspendRequest};
use crate::models::GapResponse;
use crate::node::{Node, NodeContext, NodeError, NodeOutcome};
use crate::prompts;
use crate::state::{StatePatch, WorkflowState};

/// Generates the conversational question for the gap under the cursor.
pub struct GenerateGapQuestion {
    generator: Arc<dyn Generator>,
}

impl GenerateGapQuestion {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Node for GenerateGapQuestion {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let gap = state.current_gap().ok_or(NodeError::MissingInput {
            what: "skill gap at current_gap_index",
        })?;
        ctx.emit(&format!("generating question for gap '{}'", gap.skill));

        let prompt = prompts::gap_question(gap);
        let response: GapQuestion = generate_structured(self.generator.as_ref(), &prompt).await?;

        Ok(NodeOutcome::Patch(StatePatch {
            pending_gap_question: Some(Some(response.question)),
            ..StatePatch::default()
        }))
    }
}

/// Asks whether the candidate has experience with the current gap.
pub struct AskGapConfirm;

#[async_trait]
impl Node for AskGapConfirm {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let question = state
            .pending_gap_question
            .as_deref()
            .ok_or(NodeError::MissingInput {
                what: "pending_gap_question",
            })?;
        let gap = state.current_gap().ok_or(NodeError::MissingInput {
            what: "skill gap at current_gap_index",
        })?;

        Ok(NodeOutcome::Suspend(SuspendRequest::Confirm {
            prompt: format!("{question}\n\nDo you have experience with {}?", gap.skill),
            default: false,
            context: InteractionContext {
                gap_skill: Some(gap.skill.clone()),
                gap_index: Some(state.current_gap_index),
                ..InteractionContext::default()
            },
        }))
    }
}

/// Collects free-text details about the gap experience, plus which jobs
/// it applies to.
pub struct CollectGapDetails;

#[async_trait]
impl Node for CollectGapDetails {
    async fn run(
        &self,
        state: &WorkflowState,
        _ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let gap = state.current_gap().ok_or(NodeError::MissingInput {
            what: "skill gap at current_gap_index",
        })?;

        let job_options = state
            .experience_data
            .experience
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{i}: {} at {}", e.title, e.company))
            .collect();

        Ok(NodeOutcome::Suspend(SuspendRequest::TextInput {
            prompt: format!("Please describe your experience with {}:", gap.skill),
            job_options: Some(job_options),
            context: InteractionContext {
                gap_skill: Some(gap.skill.clone()),
                gap_index: Some(state.current_gap_index),
                ..InteractionContext::default()
            },
        }))
    }
}

/// Records a no-experience response and advances the gap cursor.
pub struct StoreGapResponse;

#[async_trait]
impl Node for StoreGapResponse {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let gap = state.current_gap().ok_or(NodeError::MissingInput {
            what: "skill gap at current_gap_index",
        })?;
        ctx.emit(&format!("no experience with '{}'", gap.skill));

        let mut gap_responses = state.gap_responses.clone();
        gap_responses.push(GapResponse {
            gap: gap.clone(),
            has_experience: false,
            details: String::new(),
            relevant_jobs: Vec::new(),
        });

        Ok(NodeOutcome::Patch(StatePatch {
            gap_responses: Some(gap_responses),
            current_gap_index: Some(state.current_gap_index + 1),
            pending_gap_question: Some(None),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

/// Records a detailed response and advances the gap cursor.
///
/// The answer is coerced leniently: a plain text answer keeps its text
/// with no job mapping, and anything else degrades to empty details.
pub struct StoreGapResponseWithDetails;

#[async_trait]
impl Node for StoreGapResponseWithDetails {
    async fn run(
        &self,
        state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        let gap = state.current_gap().ok_or(NodeError::MissingInput {
            what: "skill gap at current_gap_index",
        })?;

        let (details, relevant_jobs) = state
            .human_response
            .as_ref()
            .map(|answer| answer.as_details())
            .unwrap_or_default();
        ctx.emit(&format!(
            "storing experience with '{}' mapped to {} job(s)",
            gap.skill,
            relevant_jobs.len()
        ));

        let mut gap_responses = state.gap_responses.clone();
        gap_responses.push(GapResponse {
            gap: gap.clone(),
            has_experience: true,
            details,
            relevant_jobs,
        });

        Ok(NodeOutcome::Patch(StatePatch {
            gap_responses: Some(gap_responses),
            current_gap_index: Some(state.current_gap_index + 1),
            pending_gap_question: Some(None),
            human_response: Some(None),
            ..StatePatch::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::HumanAnswer;
    use crate::models::{ExperienceData, ExperienceEntry, SkillCategory, SkillGap, SkillImportance};
    use crate::types::NodeId;

    fn test_state() -> WorkflowState {
        let experience_data = ExperienceData {
            experience: vec![ExperienceEntry {
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                date: "2020-2023".to_string(),
                bullets: vec!["Built things".to_string()],
            }],
            ..ExperienceData::default()
        };
        let gaps = vec![SkillGap {
            skill: "Kafka".to_string(),
            category: SkillCategory::Technical,
            importance: SkillImportance::Required,
            context: "Event streaming".to_string(),
        }];
        WorkflowState::new(experience_data, gaps)
    }

    fn ctx(node_id: NodeId) -> NodeContext {
        NodeContext { node_id, step: 0 }
    }

    #[tokio::test]
    async fn ask_gap_confirm_suspends_with_skill_context() {
        let mut state = test_state();
        state.pending_gap_question = Some("Ever streamed events?".to_string());

        let outcome = AskGapConfirm
            .run(&state, ctx(NodeId::AskGapConfirm))
            .await
            .unwrap();
        match outcome {
            NodeOutcome::Suspend(SuspendRequest::Confirm {
                prompt,
                default,
                context,
            }) => {
                assert!(prompt.contains("Ever streamed events?"));
                assert!(prompt.contains("Do you have experience with Kafka?"));
                assert!(!default);
                assert_eq!(context.gap_skill.as_deref(), Some("Kafka"));
                assert_eq!(context.gap_index, Some(0));
            }
            other => panic!("expected confirm suspend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ask_gap_confirm_requires_pending_question() {
        let state = test_state();
        let err = AskGapConfirm
            .run(&state, ctx(NodeId::AskGapConfirm))
            .await
            .unwrap_err();
        assert!(matches!(err, NodeError::MissingInput { .. }));
    }

    #[tokio::test]
    async fn collect_gap_details_offers_job_options() {
        let state = test_state();
        let outcome = CollectGapDetails
            .run(&state, ctx(NodeId::CollectGapDetails))
            .await
            .unwrap();
        match outcome {
            NodeOutcome::Suspend(SuspendRequest::TextInput { job_options, .. }) => {
                assert_eq!(
                    job_options.unwrap(),
                    vec!["0: Engineer at Acme".to_string()]
                );
            }
            other => panic!("expected text input suspend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_without_experience_records_and_advances() {
        let mut state = test_state();
        state.pending_gap_question = Some("q".to_string());
        state.human_response = Some(HumanAnswer::confirmed(false));

        let outcome = StoreGapResponse
            .run(&state, ctx(NodeId::StoreGapResponse))
            .await
            .unwrap();
        let NodeOutcome::Patch(patch) = outcome else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        assert_eq!(state.gap_responses.len(), 1);
        assert!(!state.gap_responses[0].has_experience);
        assert_eq!(state.current_gap_index, 1);
        assert_eq!(state.pending_gap_question, None);
        assert_eq!(state.human_response, None);
    }

    #[tokio::test]
    async fn store_with_details_coerces_plain_text() {
        let mut state = test_state();
        state.human_response = Some(HumanAnswer::text("ran a Kafka cluster"));

        let outcome = StoreGapResponseWithDetails
            .run(&state, ctx(NodeId::StoreGapResponseWithDetails))
            .await
            .unwrap();
        let NodeOutcome::Patch(patch) = outcome else {
            panic!("expected patch");
        };
        patch.apply(&mut state);

        let response = &state.gap_responses[0];
        assert!(response.has_experience);
        assert_eq!(response.details, "ran a Kafka cluster");
        assert!(response.relevant_jobs.is_empty());
    }
}
