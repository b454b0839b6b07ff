//! Graph construction and compilation.
//!
//! The improvement workflow is an explicit graph: every executable node
//! is registered under its [`NodeId`], and every node carries either one
//! unconditional edge or one router. [`GraphBuilder::compile`] validates
//! the topology up front so execution never discovers a missing edge at
//! step time. [`improvement_graph`] wires the full resume-improvement
//! topology.

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::generate::Generator;
use crate::node::Node;
use crate::nodes;
use crate::router;
use crate::state::WorkflowState;
use crate::types::NodeId;

/// Conditional routing function attached to a node's outgoing side.
pub type RouterFn = Arc<dyn Fn(&WorkflowState) -> NodeId + Send + Sync>;

/// Errors produced while validating a graph definition.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("graph has no entry edge from Start")]
    #[diagnostic(
        code(burnish::graph::missing_entry),
        help("add an edge from NodeId::Start to the first executable node")
    )]
    MissingEntry,

    #[error("edge from {from} targets unregistered node {to}")]
    #[diagnostic(code(burnish::graph::unknown_target))]
    UnknownTarget { from: NodeId, to: NodeId },

    #[error("node {node} has no outgoing edge or router")]
    #[diagnostic(
        code(burnish::graph::dead_end),
        help("every executable node needs an edge or a router; route to NodeId::End to finish")
    )]
    DeadEnd { node: NodeId },

    #[error("no route defined from {node}")]
    #[diagnostic(code(burnish::graph::no_route))]
    NoRoute { node: NodeId },

    #[error("virtual node {node} cannot be registered as executable")]
    #[diagnostic(code(burnish::graph::virtual_node))]
    VirtualNode { node: NodeId },
}

/// Builder for the workflow graph.
///
/// `Start` and `End` are virtual endpoints: they route but never
/// execute, and must not be registered with [`add_node`](Self::add_node).
#[derive(Default)]
pub struct GraphBuilder {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    edges: FxHashMap<NodeId, NodeId>,
    routers: FxHashMap<NodeId, RouterFn>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executable node under its identifier.
    #[must_use]
    pub fn add_node(mut self, id: NodeId, node: impl Node + 'static) -> Self {
        self.nodes.insert(id, Arc::new(node));
        self
    }

    /// Add an unconditional edge. A later edge or router for the same
    /// source replaces the earlier one.
    #[must_use]
    pub fn add_edge(mut self, from: NodeId, to: NodeId) -> Self {
        self.routers.remove(&from);
        self.edges.insert(from, to);
        self
    }

    /// Attach a conditional router to a node's outgoing side.
    #[must_use]
    pub fn add_router(
        mut self,
        from: NodeId,
        router: impl Fn(&WorkflowState) -> NodeId + Send + Sync + 'static,
    ) -> Self {
        self.edges.remove(&from);
        self.routers.insert(from, Arc::new(router));
        self
    }

    /// Validate the topology and produce an executable graph.
    ///
    /// Checks that an entry edge from `Start` exists, that every static
    /// edge targets a registered node (or `End`), and that every
    /// registered node has an outgoing edge or router. Router targets
    /// are dynamic and get the same check at step time.
    pub fn compile(self) -> Result<WorkflowGraph, GraphError> {
        for id in self.nodes.keys() {
            if id.is_start() || id.is_end() {
                return Err(GraphError::VirtualNode { node: *id });
            }
        }
        if !self.edges.contains_key(&NodeId::Start) && !self.routers.contains_key(&NodeId::Start) {
            return Err(GraphError::MissingEntry);
        }
        for (from, to) in &self.edges {
            if !to.is_end() && !self.nodes.contains_key(to) {
                return Err(GraphError::UnknownTarget {
                    from: *from,
                    to: *to,
                });
            }
        }
        for id in self.nodes.keys() {
            if !self.edges.contains_key(id) && !self.routers.contains_key(id) {
                return Err(GraphError::DeadEnd { node: *id });
            }
        }
        Ok(WorkflowGraph {
            nodes: self.nodes,
            edges: self.edges,
            routers: self.routers,
        })
    }
}

/// A compiled, immutable workflow graph.
pub struct WorkflowGraph {
    nodes: FxHashMap<NodeId, Arc<dyn Node>>,
    edges: FxHashMap<NodeId, NodeId>,
    routers: FxHashMap<NodeId, RouterFn>,
}

impl fmt::Debug for WorkflowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Node and router values are trait objects; show the topology only.
        let mut nodes: Vec<NodeId> = self.nodes.keys().copied().collect();
        nodes.sort_by_key(|id| id.encode());
        let mut routed: Vec<NodeId> = self.routers.keys().copied().collect();
        routed.sort_by_key(|id| id.encode());
        f.debug_struct("WorkflowGraph")
            .field("nodes", &nodes)
            .field("edges", &self.edges)
            .field("routers", &routed)
            .finish()
    }
}

impl WorkflowGraph {
    /// The executable node registered under `id`, if any.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Arc<dyn Node>> {
        self.nodes.get(&id).cloned()
    }

    /// The entry node, reached by routing from `Start`.
    pub fn entry(&self, state: &WorkflowState) -> Result<NodeId, GraphError> {
        self.route(NodeId::Start, state)
    }

    /// Pick the successor of `from` for the given state.
    ///
    /// Routers win over static edges; a router returning an
    /// unregistered, non-`End` target is a topology bug surfaced as
    /// [`GraphError::UnknownTarget`].
    pub fn route(&self, from: NodeId, state: &WorkflowState) -> Result<NodeId, GraphError> {
        let to = if let Some(router) = self.routers.get(&from) {
            router(state)
        } else if let Some(to) = self.edges.get(&from) {
            *to
        } else {
            return Err(GraphError::NoRoute { node: from });
        };
        if !to.is_end() && !self.nodes.contains_key(&to) {
            return Err(GraphError::UnknownTarget { from, to });
        }
        Ok(to)
    }
}

/// Build the full resume-improvement graph around the given generator.
pub fn improvement_graph(generator: Arc<dyn Generator>) -> Result<WorkflowGraph, GraphError> {
    GraphBuilder::new()
        // Phase 0.
        .add_node(NodeId::Init, nodes::Init)
        // Phase 1: gap exploration.
        .add_node(
            NodeId::GenerateGapQuestion,
            nodes::GenerateGapQuestion::new(generator.clone()),
        )
        .add_node(NodeId::AskGapConfirm, nodes::AskGapConfirm)
        .add_node(NodeId::CollectGapDetails, nodes::CollectGapDetails)
        .add_node(NodeId::StoreGapResponse, nodes::StoreGapResponse)
        .add_node(
            NodeId::StoreGapResponseWithDetails,
            nodes::StoreGapResponseWithDetails,
        )
        // Phase 2: job deep dive.
        .add_node(NodeId::StartJobDeepDive, nodes::StartJobDeepDive)
        .add_node(
            NodeId::GenerateDeepDiveQuestions,
            nodes::GenerateDeepDiveQuestions::new(generator.clone()),
        )
        .add_node(NodeId::AskDeepDiveQuestion, nodes::AskDeepDiveQuestion)
        .add_node(
            NodeId::GenerateXyzFromAnswer,
            nodes::GenerateXyzBullet::from_answer(generator.clone()),
        )
        .add_node(
            NodeId::AskAdditionalAchievement,
            nodes::AskAdditionalAchievement,
        )
        .add_node(
            NodeId::GenerateXyzFromAdditional,
            nodes::GenerateXyzBullet::from_additional(generator.clone()),
        )
        .add_node(NodeId::FinalizeJob, nodes::FinalizeJob)
        // Phase 3: humanization.
        .add_node(NodeId::PrepareHumanization, nodes::PrepareHumanization)
        .add_node(NodeId::PrepareBullet, nodes::PrepareBullet)
        .add_node(NodeId::PresentBulletOptions, nodes::PresentBulletOptions)
        .add_node(NodeId::CollectEditFeedback, nodes::CollectEditFeedback)
        .add_node(NodeId::RefineBullet, nodes::RefineBullet::new(generator))
        .add_node(NodeId::SaveBullet, nodes::SaveBullet)
        .add_node(NodeId::AdvanceHumanization, nodes::AdvanceHumanization)
        .add_node(NodeId::ApplyImprovements, nodes::ApplyImprovements)
        // Topology.
        .add_edge(NodeId::Start, NodeId::Init)
        .add_router(NodeId::Init, router::route_initial)
        .add_edge(NodeId::GenerateGapQuestion, NodeId::AskGapConfirm)
        .add_router(NodeId::AskGapConfirm, router::route_after_gap_confirm)
        .add_edge(NodeId::CollectGapDetails, NodeId::StoreGapResponseWithDetails)
        .add_router(NodeId::StoreGapResponse, router::route_after_gap_advance)
        .add_router(
            NodeId::StoreGapResponseWithDetails,
            router::route_after_gap_advance,
        )
        // Router, not a static edge: a resume with no experience
        // entries goes straight to humanization (and from there to
        // completion).
        .add_router(NodeId::StartJobDeepDive, router::route_after_job)
        .add_router(NodeId::GenerateDeepDiveQuestions, router::route_after_questions)
        .add_edge(NodeId::AskDeepDiveQuestion, NodeId::GenerateXyzFromAnswer)
        .add_router(NodeId::GenerateXyzFromAnswer, router::route_after_xyz)
        .add_router(NodeId::AskAdditionalAchievement, router::route_after_additional)
        .add_edge(
            NodeId::GenerateXyzFromAdditional,
            NodeId::AskAdditionalAchievement,
        )
        .add_router(NodeId::FinalizeJob, router::route_after_job)
        .add_router(
            NodeId::PrepareHumanization,
            router::route_after_prepare_humanization,
        )
        .add_router(NodeId::PrepareBullet, router::route_after_prepare_bullet)
        .add_router(NodeId::PresentBulletOptions, router::route_bullet_choice)
        .add_edge(NodeId::CollectEditFeedback, NodeId::RefineBullet)
        .add_edge(NodeId::RefineBullet, NodeId::PresentBulletOptions)
        .add_edge(NodeId::SaveBullet, NodeId::AdvanceHumanization)
        .add_router(NodeId::AdvanceHumanization, router::route_after_advance)
        .add_edge(NodeId::ApplyImprovements, NodeId::End)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GenerateError;
    use async_trait::async_trait;
    use serde_json::Value;

    struct NullGenerator;

    #[async_trait]
    impl Generator for NullGenerator {
        async fn generate(&self, _prompt: &str) -> Result<Value, GenerateError> {
            Err(GenerateError::Refused {
                message: "test generator".to_string(),
            })
        }
    }

    struct NoopNode;

    #[async_trait]
    impl Node for NoopNode {
        async fn run(
            &self,
            _state: &WorkflowState,
            _ctx: crate::node::NodeContext,
        ) -> Result<crate::node::NodeOutcome, crate::node::NodeError> {
            Ok(crate::node::NodeOutcome::noop())
        }
    }

    #[test]
    fn improvement_graph_compiles() {
        let graph = improvement_graph(Arc::new(NullGenerator)).unwrap();
        // Every executable node is registered.
        for id in NodeId::ALL {
            assert!(graph.node(id).is_some(), "missing node {id}");
        }
        let state = WorkflowState::default();
        assert_eq!(graph.entry(&state).unwrap(), NodeId::Init);
    }

    #[test]
    fn compiled_graph_debug_shows_topology() {
        let graph = improvement_graph(Arc::new(NullGenerator)).unwrap();
        let rendered = format!("{graph:?}");
        assert!(rendered.contains("WorkflowGraph"));
        assert!(rendered.contains("Init"));
    }

    #[test]
    fn compile_rejects_missing_entry() {
        let err = GraphBuilder::new()
            .add_node(NodeId::Init, NoopNode)
            .add_edge(NodeId::Init, NodeId::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingEntry));
    }

    #[test]
    fn compile_rejects_dead_ends() {
        let err = GraphBuilder::new()
            .add_node(NodeId::Init, NoopNode)
            .add_edge(NodeId::Start, NodeId::Init)
            .compile()
            .unwrap_err();
        assert!(matches!(err, GraphError::DeadEnd { node: NodeId::Init }));
    }

    #[test]
    fn compile_rejects_unknown_targets() {
        let err = GraphBuilder::new()
            .add_node(NodeId::Init, NoopNode)
            .add_edge(NodeId::Start, NodeId::Init)
            .add_edge(NodeId::Init, NodeId::SaveBullet)
            .compile()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownTarget {
                from: NodeId::Init,
                to: NodeId::SaveBullet
            }
        ));
    }

    #[test]
    fn compile_rejects_virtual_node_registration() {
        let err = GraphBuilder::new()
            .add_node(NodeId::Start, NoopNode)
            .add_edge(NodeId::Start, NodeId::End)
            .compile()
            .unwrap_err();
        assert!(matches!(err, GraphError::VirtualNode { .. }));
    }

    #[test]
    fn router_targets_are_checked_at_route_time() {
        let graph = GraphBuilder::new()
            .add_node(NodeId::Init, NoopNode)
            .add_edge(NodeId::Start, NodeId::Init)
            .add_router(NodeId::Init, |_| NodeId::SaveBullet)
            .compile()
            .unwrap();
        let err = graph.route(NodeId::Init, &WorkflowState::default()).unwrap_err();
        assert!(matches!(err, GraphError::UnknownTarget { .. }));
    }
}
