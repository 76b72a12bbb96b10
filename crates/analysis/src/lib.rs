//! # Sitelens Analysis
//!
//! Per-route performance insights for a site, optionally grounded in its
//! source code.
//!
//! ```text
//! RunProcessor::process_run
//!     └─> Pipeline::run
//!           ├─> CodeIndexer (if a repository is given; failures only drop code context)
//!           ├─> RouteDiscovery
//!           ├─> BoundedRunner(2) ── MetricsClient::fetch per route
//!           └─> BoundedRunner(2) ── RouteAnalyzer::analyze per route
//!                                     ├─> trim_profile
//!                                     ├─> CodeRetriever::query
//!                                     ├─> build_prompt
//!                                     ├─> ModelClient::generate
//!                                     └─> ParsedResponse -> Insight
//! ```
//!
//! Every route yields exactly one insight, in discovery order. Failures
//! anywhere in a route's analysis produce a sentinel insight for that route.

mod clients;
mod code_changes;
mod config;
mod coordinator;
mod error;
mod orchestrator;
mod profile;
mod prompt;
mod response;
mod run;
mod runner;
mod schema;

pub use clients::{GeminiClient, MetricsClient, ModelClient, PageSpeedClient, DEFAULT_GEMINI_MODEL};
pub use code_changes::{collect_code_changes, parse_code_change};
pub use config::AnalysisConfig;
pub use coordinator::{collection_name, Pipeline};
pub use error::{AnalysisError, Result};
pub use orchestrator::RouteAnalyzer;
pub use profile::trim_profile;
pub use prompt::build_prompt;
pub use response::{collapse_whitespace, first_json_object, ParsedInsight, ParsedResponse};
pub use run::{InMemoryStateSink, ProjectContext, RunProcessor, RunStateSink};
pub use runner::{BoundedRunner, RunnerError};
pub use schema::insight_response_schema;
