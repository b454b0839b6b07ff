//! The node library: every executable step of the improvement workflow.
//!
//! Nodes fall into three families. Generation nodes hold a
//! [`Generator`](crate::generate::Generator) handle and call out for
//! structured output. Interaction nodes suspend with a
//! [`SuspendRequest`](crate::interact::SuspendRequest) and consume the
//! human's answer on the following step. Bookkeeping nodes only move
//! cursors and accumulate results.

mod deep_dive;
mod gap;
mod humanize;

pub use deep_dive::{
    AskAdditionalAchievement, AskDeepDiveQuestion, FinalizeJob, GenerateDeepDiveQuestions,
    GenerateXyzBullet, StartJobDeepDive,
};
pub use gap::{
    AskGapConfirm, CollectGapDetails, GenerateGapQuestion, StoreGapResponse,
    StoreGapResponseWithDetails,
};
pub use humanize::{
    AdvanceHumanization, ApplyImprovements, CollectEditFeedback, PrepareBullet,
    PrepareHumanization, PresentBulletOptions, RefineBullet, SaveBullet,
};

use async_trait::async_trait;

use crate::node::{Node, NodeContext, NodeError, NodeOutcome};
use crate::state::{Phase, StatePatch, WorkflowState};

/// Resets every cursor and moves the session into gap exploration.
///
/// Runs exactly once, as the first executable node of every session.
pub struct Init;

#[async_trait]
impl Node for Init {
    async fn run(
        &self,
        _state: &WorkflowState,
        ctx: NodeContext,
    ) -> Result<NodeOutcome, NodeError> {
        ctx.emit("initializing session state");
        Ok(NodeOutcome::Patch(StatePatch {
            phase: Some(Phase::GapExploration),
            current_gap_index: Some(0),
            gap_responses: Some(Vec::new()),
            current_job_index: Some(0),
            job_results: Some(Vec::new()),
            humanization_job_index: Some(0),
            humanization_achievement_index: Some(0),
            ..StatePatch::default()
        }))
    }
}

/// "Title at Company (date)" header used in interaction context.
pub(crate) fn job_header(entry: &crate::models::ExperienceEntry) -> String {
    format!("{} at {} ({})", entry.title, entry.company, entry.date)
}
