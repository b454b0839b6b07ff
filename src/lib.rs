//! # Burnish: Interactive Resume-Improvement Workflow Engine
//!
//! Burnish runs a guided interview that turns a résumé and a skill-gap
//! analysis into stronger, evidence-backed experience bullets. The
//! interview is modeled as an explicit graph of nodes over a shared
//! [`state::WorkflowState`]; nodes return mergeable patches or suspend
//! for human input, and every step is checkpointed so a session can
//! resume after a process restart.
//!
//! ## Core concepts
//!
//! - **Nodes** ([`node`], [`nodes`]): async units of work; each reads
//!   the state snapshot and returns a [`node::NodeOutcome`] — either a
//!   [`state::StatePatch`] to merge or a [`interact::SuspendRequest`]
//!   for the human.
//! - **Routing** ([`router`], [`graph`]): edges are static or
//!   conditional; routers are pure functions of the state, so replaying
//!   a checkpoint always takes the same path.
//! - **Runtimes** ([`runtimes`]): the session runner, checkpoint
//!   types, and pluggable persistence (in-memory or SQLite).
//! - **Bridges** ([`bridge`]): anything that can answer a suspend
//!   request; a console bridge ships in the box.
//! - **Generation** ([`generate`], [`prompts`]): the LLM seam. The
//!   engine only needs something that turns a prompt into JSON.
//!
//! ## Running a session
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use burnish::generate::{GenerateError, Generator};
//! use burnish::graph::improvement_graph;
//! use burnish::interact::HumanAnswer;
//! use burnish::models::ExperienceData;
//! use burnish::runtimes::{RunOutcome, Runner};
//! use serde_json::{Value, json};
//!
//! struct CannedGenerator;
//!
//! #[async_trait]
//! impl Generator for CannedGenerator {
//!     async fn generate(&self, _prompt: &str) -> Result<Value, GenerateError> {
//!         Ok(json!({"question": "Tell me more?"}))
//!     }
//! }
//!
//! # async fn run() -> miette::Result<()> {
//! let graph = improvement_graph(Arc::new(CannedGenerator))?;
//! let mut runner = Runner::new(Arc::new(graph));
//!
//! let mut outcome = runner
//!     .start("session-1", ExperienceData::default(), Vec::new())
//!     .await?;
//! while let RunOutcome::Suspended(request) = outcome {
//!     // Show `request` to the human, then resume with their answer.
//!     let answer = HumanAnswer::text(request.prompt().to_string());
//!     outcome = runner.resume("session-1", answer).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! With the `sqlite` feature, swap the default in-memory checkpointer
//! for [`runtimes::SqliteCheckpointer`] and the same session survives a
//! restart: load the runner fresh and call `resume` with the next
//! answer.

pub mod bridge;
pub mod generate;
pub mod graph;
pub mod interact;
pub mod models;
pub mod node;
pub mod nodes;
pub mod prompts;
pub mod router;
pub mod runtimes;
pub mod state;
pub mod telemetry;
pub mod types;
