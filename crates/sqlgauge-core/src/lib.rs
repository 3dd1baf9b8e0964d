//! sqlgauge-core: text-to-SQL evaluation harness.
//! Compose a case source, a completion generator, and a query executor; the
//! harness scores each (model, prompt, test case) combination on SQL
//! similarity and answer accuracy. See `examples/offline_eval.rs` for a
//! quickstart without any network or database.

pub mod answer;
pub mod config;
pub mod datasource;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod extract;
pub mod generator;
pub mod harness;
pub mod prompts;
pub mod report;
pub mod similarity;
pub mod testing;

pub use answer::answer_similarity;
pub use config::{ModelEntry, ModelsConfig, SamplingConfig};
pub use datasource::{CaseSource, JsonCaseSource, VecCaseSource};
pub use error::HarnessError;
pub use evaluator::evaluate;
pub use executor::Executor;
pub use extract::extract_sql;
pub use generator::{Generator, OpenAiCompatGenerator};
pub use harness::{Harness, HarnessBuilder, PacingPolicy};
pub use prompts::PromptStrategy;
pub use similarity::sql_similarity;
pub use sqlgauge_types::{
    CaseRecord, EvaluationResult, ExecutionOutcome, PromptSummary, Row, RunReport, TestCase,
};
