//! Node execution framework for the improvement workflow.
//!
//! This module provides the core abstractions for executable workflow
//! nodes: the [`Node`] trait, execution context, the [`NodeOutcome`]
//! returned by each step, and error handling.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::generate::GenerateError;
use crate::interact::SuspendRequest;
use crate::state::{StatePatch, WorkflowState};
use crate::types::NodeId;

/// Core trait defining executable workflow nodes.
///
/// A node receives a read-only snapshot of the workflow state and either
/// returns a [`StatePatch`] for the engine to merge, or suspends the run
/// with a [`SuspendRequest`] that must be answered before execution can
/// continue.
///
/// # Design Principles
///
/// - **Stateless**: nodes hold configuration (a generator handle at
///   most), never session data
/// - **Focused**: one node, one responsibility
/// - **Resumable**: any node may suspend; the engine checkpoints the
///   session at that point
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute this node against the given state snapshot.
    async fn run(&self, state: &WorkflowState, ctx: NodeContext)
    -> Result<NodeOutcome, NodeError>;
}

/// What a node produced this step.
#[derive(Clone, Debug)]
pub enum NodeOutcome {
    /// Merge this patch and keep routing.
    Patch(StatePatch),
    /// Stop here and wait for a human answer.
    Suspend(SuspendRequest),
}

impl NodeOutcome {
    /// An empty patch, for nodes that have nothing to change this step.
    #[must_use]
    pub fn noop() -> Self {
        NodeOutcome::Patch(StatePatch::default())
    }
}

/// Execution context passed to nodes.
///
/// Carries the node's identity and the engine's step counter so node
/// logs are traceable in the session's execution record.
#[derive(Clone, Copy, Debug)]
pub struct NodeContext {
    pub node_id: NodeId,
    pub step: u64,
}

impl NodeContext {
    /// Emit a node-scoped trace line enriched with this context's metadata.
    pub fn emit(&self, message: &str) {
        tracing::debug!(node = %self.node_id, step = self.step, "{message}");
    }
}

/// Errors that can occur during node execution.
///
/// These are fatal to the session: the engine surfaces them to the
/// caller rather than routing onward. Human-input oddities are never
/// errors (they coerce to defaults); only missing prerequisites and
/// generation failures land here.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing from the state snapshot.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(burnish::node::missing_input),
        help("check that the previous node produced the required data")
    )]
    MissingInput { what: &'static str },

    /// The generation boundary failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] GenerateError),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(burnish::node::serde_json))]
    Serde(#[from] serde_json::Error),
}
