//! Interaction types exchanged between suspended nodes and the bridge.
//!
//! When an interaction node needs something from the human, it returns a
//! [`SuspendRequest`]; the engine persists a checkpoint and hands the
//! request to whatever bridge drives the session. The bridge answers with
//! a [`HumanAnswer`], which the engine injects into the workflow state
//! before routing onward.
//!
//! Answers are coerced, never rejected: a mismatched answer kind or a
//! malformed job-index list degrades to the most conservative default.
//! This keeps the conversational surface low-friction.

use serde::{Deserialize, Serialize};

/// Extra information a bridge may use when presenting a request.
///
/// All fields are optional; each request populates only what applies to
/// it. Bridges are free to ignore any of this.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionContext {
    pub gap_skill: Option<String>,
    pub gap_index: Option<usize>,
    pub question_index: Option<usize>,
    pub job_index: Option<usize>,
    /// "Title at Company (date)" header for the job under discussion.
    pub job_header: Option<String>,
    /// The job's current resume bullets, for display before questioning.
    #[serde(default)]
    pub bullets: Vec<String>,
    pub current_bullet: Option<String>,
    #[serde(default)]
    pub is_additional: bool,
}

/// A request for human input, tagged by interaction kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuspendRequest {
    /// Yes/no confirmation.
    Confirm {
        prompt: String,
        default: bool,
        #[serde(default)]
        context: InteractionContext,
    },
    /// Free-text input. When `job_options` is present, the bridge follows
    /// the text with a second prompt asking which of the listed jobs the
    /// answer applies to (comma-separated indices).
    TextInput {
        prompt: String,
        #[serde(default)]
        job_options: Option<Vec<String>>,
        #[serde(default)]
        context: InteractionContext,
    },
    /// Choice among fixed options. Bridges must present `options`
    /// verbatim and not invent alternatives.
    Select {
        prompt: String,
        options: Vec<String>,
        #[serde(default)]
        context: InteractionContext,
    },
}

impl SuspendRequest {
    /// The prompt text shown to the human, regardless of kind.
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            SuspendRequest::Confirm { prompt, .. }
            | SuspendRequest::TextInput { prompt, .. }
            | SuspendRequest::Select { prompt, .. } => prompt,
        }
    }

    /// The bridge context attached to this request.
    #[must_use]
    pub fn context(&self) -> &InteractionContext {
        match self {
            SuspendRequest::Confirm { context, .. }
            | SuspendRequest::TextInput { context, .. }
            | SuspendRequest::Select { context, .. } => context,
        }
    }
}

/// A typed answer supplied by the bridge on resume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HumanAnswer {
    /// Answer to a [`SuspendRequest::Confirm`].
    Confirmed { value: bool },
    /// Answer to a plain [`SuspendRequest::TextInput`].
    Text { value: String },
    /// Answer to a `TextInput` that carried `job_options`: the free text
    /// plus the jobs it applies to.
    TextWithJobs {
        details: String,
        relevant_jobs: Vec<usize>,
    },
    /// Answer to a [`SuspendRequest::Select`]: one of the offered options.
    Choice { value: String },
}

impl HumanAnswer {
    pub fn text(value: impl Into<String>) -> Self {
        HumanAnswer::Text {
            value: value.into(),
        }
    }

    pub fn confirmed(value: bool) -> Self {
        HumanAnswer::Confirmed { value }
    }

    pub fn choice(value: impl Into<String>) -> Self {
        HumanAnswer::Choice {
            value: value.into(),
        }
    }

    /// Coerce to a boolean; anything that is not a confirmation reads as
    /// `false`.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            HumanAnswer::Confirmed { value } => *value,
            _ => false,
        }
    }

    /// Coerce to text; non-text answers read as the empty string.
    #[must_use]
    pub fn as_text(&self) -> &str {
        match self {
            HumanAnswer::Text { value } => value,
            HumanAnswer::TextWithJobs { details, .. } => details,
            HumanAnswer::Choice { value } => value,
            HumanAnswer::Confirmed { .. } => "",
        }
    }

    /// Coerce to a selected option; non-choice answers read as empty.
    #[must_use]
    pub fn as_choice(&self) -> &str {
        match self {
            HumanAnswer::Choice { value } => value,
            _ => "",
        }
    }

    /// Coerce to `(details, relevant_jobs)` for the gap-details exchange.
    /// A plain text answer keeps its text and gets an empty job list.
    #[must_use]
    pub fn as_details(&self) -> (String, Vec<usize>) {
        match self {
            HumanAnswer::TextWithJobs {
                details,
                relevant_jobs,
            } => (details.clone(), relevant_jobs.clone()),
            HumanAnswer::Text { value } => (value.clone(), Vec::new()),
            _ => (String::new(), Vec::new()),
        }
    }
}

/// Parse a comma-separated job-index list, e.g. `"0, 2"`.
///
/// Invalid or empty input yields an empty list, never an error.
#[must_use]
pub fn parse_job_indices(input: &str) -> Vec<usize> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<usize>() {
            Ok(idx) => indices.push(idx),
            // One bad entry invalidates the whole list, matching the
            // all-or-nothing parse of the original interface.
            Err(_) => return Vec::new(),
        }
    }
    indices
}
