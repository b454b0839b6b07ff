//! Core identifiers for the improvement workflow graph.
//!
//! The graph is fixed: every node is known at compile time, so node
//! identity is a closed enum rather than free-form strings. `Start` and
//! `End` are virtual endpoints used only for wiring; they are never
//! executed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node in the improvement workflow graph.
///
/// Supports a stable string encoding ([`encode`](Self::encode) /
/// [`decode`](Self::decode)) used by checkpoint persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeId {
    /// Virtual entry point; has no implementation.
    Start,
    /// Virtual terminal; reaching it completes the run.
    End,

    // Initialization
    Init,

    // Gap exploration
    GenerateGapQuestion,
    AskGapConfirm,
    CollectGapDetails,
    StoreGapResponse,
    StoreGapResponseWithDetails,

    // Job deep-dive
    StartJobDeepDive,
    GenerateDeepDiveQuestions,
    AskDeepDiveQuestion,
    GenerateXyzFromAnswer,
    AskAdditionalAchievement,
    GenerateXyzFromAdditional,
    FinalizeJob,

    // Humanization
    PrepareHumanization,
    PrepareBullet,
    PresentBulletOptions,
    CollectEditFeedback,
    RefineBullet,
    SaveBullet,
    AdvanceHumanization,

    // Final
    ApplyImprovements,
}

impl NodeId {
    /// All executable nodes, in graph-wiring order. Excludes the virtual
    /// `Start`/`End` endpoints.
    pub const ALL: [NodeId; 21] = [
        NodeId::Init,
        NodeId::GenerateGapQuestion,
        NodeId::AskGapConfirm,
        NodeId::CollectGapDetails,
        NodeId::StoreGapResponse,
        NodeId::StoreGapResponseWithDetails,
        NodeId::StartJobDeepDive,
        NodeId::GenerateDeepDiveQuestions,
        NodeId::AskDeepDiveQuestion,
        NodeId::GenerateXyzFromAnswer,
        NodeId::AskAdditionalAchievement,
        NodeId::GenerateXyzFromAdditional,
        NodeId::FinalizeJob,
        NodeId::PrepareHumanization,
        NodeId::PrepareBullet,
        NodeId::PresentBulletOptions,
        NodeId::CollectEditFeedback,
        NodeId::RefineBullet,
        NodeId::SaveBullet,
        NodeId::AdvanceHumanization,
        NodeId::ApplyImprovements,
    ];

    /// Encode a node id into its persisted string form.
    #[must_use]
    pub fn encode(&self) -> &'static str {
        match self {
            NodeId::Start => "start",
            NodeId::End => "end",
            NodeId::Init => "init",
            NodeId::GenerateGapQuestion => "generate-gap-question",
            NodeId::AskGapConfirm => "ask-gap-confirm",
            NodeId::CollectGapDetails => "collect-gap-details",
            NodeId::StoreGapResponse => "store-gap-response",
            NodeId::StoreGapResponseWithDetails => "store-gap-response-with-details",
            NodeId::StartJobDeepDive => "start-job-deep-dive",
            NodeId::GenerateDeepDiveQuestions => "generate-deep-dive-questions",
            NodeId::AskDeepDiveQuestion => "ask-deep-dive-question",
            NodeId::GenerateXyzFromAnswer => "generate-xyz-from-answer",
            NodeId::AskAdditionalAchievement => "ask-additional-achievement",
            NodeId::GenerateXyzFromAdditional => "generate-xyz-from-additional",
            NodeId::FinalizeJob => "finalize-job",
            NodeId::PrepareHumanization => "prepare-humanization",
            NodeId::PrepareBullet => "prepare-bullet",
            NodeId::PresentBulletOptions => "present-bullet-options",
            NodeId::CollectEditFeedback => "collect-edit-feedback",
            NodeId::RefineBullet => "refine-bullet",
            NodeId::SaveBullet => "save-bullet",
            NodeId::AdvanceHumanization => "advance-humanization",
            NodeId::ApplyImprovements => "apply-improvements",
        }
    }

    /// Decode a persisted string form back into a node id.
    ///
    /// Returns `None` for unknown encodings; the graph is closed, so an
    /// unknown name means the checkpoint came from an incompatible build.
    #[must_use]
    pub fn decode(s: &str) -> Option<Self> {
        let id = match s {
            "start" => NodeId::Start,
            "end" => NodeId::End,
            "init" => NodeId::Init,
            "generate-gap-question" => NodeId::GenerateGapQuestion,
            "ask-gap-confirm" => NodeId::AskGapConfirm,
            "collect-gap-details" => NodeId::CollectGapDetails,
            "store-gap-response" => NodeId::StoreGapResponse,
            "store-gap-response-with-details" => NodeId::StoreGapResponseWithDetails,
            "start-job-deep-dive" => NodeId::StartJobDeepDive,
            "generate-deep-dive-questions" => NodeId::GenerateDeepDiveQuestions,
            "ask-deep-dive-question" => NodeId::AskDeepDiveQuestion,
            "generate-xyz-from-answer" => NodeId::GenerateXyzFromAnswer,
            "ask-additional-achievement" => NodeId::AskAdditionalAchievement,
            "generate-xyz-from-additional" => NodeId::GenerateXyzFromAdditional,
            "finalize-job" => NodeId::FinalizeJob,
            "prepare-humanization" => NodeId::PrepareHumanization,
            "prepare-bullet" => NodeId::PrepareBullet,
            "present-bullet-options" => NodeId::PresentBulletOptions,
            "collect-edit-feedback" => NodeId::CollectEditFeedback,
            "refine-bullet" => NodeId::RefineBullet,
            "save-bullet" => NodeId::SaveBullet,
            "advance-humanization" => NodeId::AdvanceHumanization,
            "apply-improvements" => NodeId::ApplyImprovements,
            _ => return None,
        };
        Some(id)
    }

    /// Returns `true` if this is the virtual [`Start`](Self::Start) endpoint.
    #[must_use]
    pub fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }

    /// Returns `true` if this is the virtual [`End`](Self::End) endpoint.
    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encode())
    }
}
