use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use sqlgauge_types::{CaseRecord, EvaluationResult, ExecutionOutcome, RunReport};

use crate::config::ModelsConfig;
use crate::datasource::CaseSource;
use crate::error::HarnessError;
use crate::evaluator::evaluate;
use crate::executor::Executor;
use crate::extract::extract_sql;
use crate::generator::Generator;
use crate::prompts::PromptStrategy;

/// Inter-call delays that keep the completion provider's rate limiter happy.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
	pub per_call_delay: Duration,
	pub per_model_delay: Duration,
}

impl PacingPolicy {
	/// No delays at all. For tests and local endpoints.
	pub fn none() -> Self {
		Self {
			per_call_delay: Duration::ZERO,
			per_model_delay: Duration::ZERO,
		}
	}
}

impl Default for PacingPolicy {
	fn default() -> Self {
		Self {
			per_call_delay: Duration::from_secs(5),
			per_model_delay: Duration::from_secs(20),
		}
	}
}

pub struct HarnessBuilder {
	cases: Option<Arc<dyn CaseSource>>,
	generator: Option<Arc<dyn Generator>>,
	executor: Option<Arc<dyn Executor>>,
	models: Option<ModelsConfig>,
	prompts: Vec<PromptStrategy>,
	pacing: PacingPolicy,
}

impl HarnessBuilder {
	pub fn new() -> Self {
		Self {
			cases: None,
			generator: None,
			executor: None,
			models: None,
			prompts: PromptStrategy::ALL.to_vec(),
			pacing: PacingPolicy::default(),
		}
	}

	pub fn case_source(mut self, cases: Arc<dyn CaseSource>) -> Self {
		self.cases = Some(cases);
		self
	}

	pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
		self.generator = Some(generator);
		self
	}

	pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
		self.executor = Some(executor);
		self
	}

	pub fn models(mut self, models: ModelsConfig) -> Self {
		self.models = Some(models);
		self
	}

	pub fn prompts<I>(mut self, prompts: I) -> Self
	where
		I: IntoIterator<Item = PromptStrategy>,
	{
		self.prompts = prompts.into_iter().collect();
		self
	}

	pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
		self.pacing = pacing;
		self
	}

	pub fn build(self) -> Result<Harness> {
		if self.prompts.is_empty() {
			return Err(HarnessError::Config("no prompt strategies selected".to_string()).into());
		}
		Ok(Harness {
			cases: self.cases.ok_or_else(|| anyhow::anyhow!("case_source must be set"))?,
			generator: self.generator.ok_or_else(|| anyhow::anyhow!("generator must be set"))?,
			executor: self.executor.ok_or_else(|| anyhow::anyhow!("executor must be set"))?,
			models: self.models.ok_or_else(|| anyhow::anyhow!("models must be set"))?,
			prompts: self.prompts,
			pacing: self.pacing,
		})
	}
}

impl Default for HarnessBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Drives model x test case x prompt combinations through generate, then
/// extract, then execute, then evaluate, strictly sequentially.
///
/// All collaborators are injected; the harness holds no ambient state. A
/// generation failure stops the remaining combinations for that model and is
/// recorded as a zero-scored row; it never aborts the run.
pub struct Harness {
	cases: Arc<dyn CaseSource>,
	generator: Arc<dyn Generator>,
	executor: Arc<dyn Executor>,
	models: ModelsConfig,
	prompts: Vec<PromptStrategy>,
	pacing: PacingPolicy,
}

impl Harness {
	pub fn builder() -> HarnessBuilder {
		HarnessBuilder::new()
	}

	pub async fn run(&self) -> Result<RunReport> {
		let cases = self.cases.load().await?;
		let schema_text = self.executor.schema_text().await?;

		let mut records: Vec<CaseRecord> = Vec::new();
		let mut first_call = true;

		for (mi, model) in self.models.models.iter().enumerate() {
			'model: for case in &cases {
				for prompt in &self.prompts {
					if !first_call && !self.pacing.per_call_delay.is_zero() {
						tokio::time::sleep(self.pacing.per_call_delay).await;
					}
					first_call = false;

					let raw = self
						.generator
						.generate(
							&schema_text,
							&case.question,
							*prompt,
							&model.id,
							&self.models.sampling,
						)
						.await;

					let raw = match raw {
						Ok(raw) => raw,
						Err(source) => {
							let err = HarnessError::Generation {
								model: model.key.clone(),
								source,
							};
							records.push(CaseRecord {
								model: model.key.clone(),
								prompt: prompt.id().to_string(),
								question: case.question.clone(),
								category: case.category.clone(),
								generated_sql: String::new(),
								error: Some(err.to_string()),
								result: EvaluationResult::zero(),
							});
							break 'model;
						}
					};

					let sql = extract_sql(&raw);
					let outcome = self.executor.execute(&sql).await;
					let result = evaluate(&outcome, &sql, &case.expected_sql, &case.expected_result);
					let error = match &outcome {
						ExecutionOutcome::Error(e) => Some(e.clone()),
						ExecutionOutcome::Rows(_) => None,
					};

					records.push(CaseRecord {
						model: model.key.clone(),
						prompt: prompt.id().to_string(),
						question: case.question.clone(),
						category: case.category.clone(),
						generated_sql: sql,
						error,
						result,
					});
				}
			}

			if mi + 1 < self.models.models.len() && !self.pacing.per_model_delay.is_zero() {
				tokio::time::sleep(self.pacing.per_model_delay).await;
			}
		}

		Ok(RunReport::from_records(records))
	}
}
