use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// A result row: column name to scalar value (string, number or null).
pub type Row = serde_json::Map<String, Value>;

/// Ground-truth test case: a natural-language question, the reference SQL
/// and the rows that SQL produces against the fixture database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
	pub question: String,
	#[serde(rename = "sql")]
	pub expected_sql: String,
	#[serde(default)]
	pub expected_result: Vec<Row>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
}

impl TestCase {
	pub fn new(question: impl Into<String>, expected_sql: impl Into<String>) -> Self {
		Self {
			question: question.into(),
			expected_sql: expected_sql.into(),
			expected_result: Vec::new(),
			category: None,
		}
	}

	pub fn with_result(mut self, rows: Vec<Row>) -> Self {
		self.expected_result = rows;
		self
	}
}

/// What actually happened when the generated SQL was run: either the rows it
/// produced, or the engine's error text. Never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionOutcome {
	Rows(Vec<Row>),
	Error(String),
}

impl ExecutionOutcome {
	pub fn is_error(&self) -> bool {
		matches!(self, ExecutionOutcome::Error(_))
	}

	pub fn rows(&self) -> Option<&[Row]> {
		match self {
			ExecutionOutcome::Rows(rows) => Some(rows),
			ExecutionOutcome::Error(_) => None,
		}
	}
}

/// Verdict for one (model, prompt, test case) combination. Percentages are
/// always finite values in [0, 100], even when execution failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
	pub syntax_ok: bool,
	pub sql_match_percent: f64,
	pub answer_match_percent: f64,
}

impl EvaluationResult {
	/// The downgraded verdict used whenever execution or scoring failed.
	pub fn zero() -> Self {
		Self {
			syntax_ok: false,
			sql_match_percent: 0.0,
			answer_match_percent: 0.0,
		}
	}
}

/// One evaluated combination, kept for persistence and per-case inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
	pub model: String,
	pub prompt: String,
	pub question: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	pub generated_sql: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	pub result: EvaluationResult,
}

/// Mean scores for one (model, prompt) combination.
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct PromptSummary {
	pub model: String,
	pub prompt: String,
	pub cases: usize,
	pub syntax_ok_rate: f64,
	pub avg_sql_match: f64,
	pub avg_answer_match: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
	pub records: Vec<CaseRecord>,
	pub summaries: Vec<PromptSummary>,
}

impl RunReport {
	pub fn from_records(records: Vec<CaseRecord>) -> Self {
		let summaries = Self::summarize(&records);
		Self { records, summaries }
	}

	/// Arithmetic-mean reduction per (model, prompt), in first-seen order.
	pub fn summarize(records: &[CaseRecord]) -> Vec<PromptSummary> {
		let mut keys: Vec<(String, String)> = Vec::new();
		for r in records {
			let key = (r.model.clone(), r.prompt.clone());
			if !keys.contains(&key) {
				keys.push(key);
			}
		}

		keys.into_iter()
			.map(|(model, prompt)| {
				let group: Vec<&CaseRecord> = records
					.iter()
					.filter(|r| r.model == model && r.prompt == prompt)
					.collect();
				let n = group.len().max(1) as f64;
				let syntax_ok = group.iter().filter(|r| r.result.syntax_ok).count() as f64;
				let sql_sum: f64 = group.iter().map(|r| r.result.sql_match_percent).sum();
				let ans_sum: f64 = group.iter().map(|r| r.result.answer_match_percent).sum();
				PromptSummary {
					model,
					prompt,
					cases: group.len(),
					syntax_ok_rate: syntax_ok / n,
					avg_sql_match: sql_sum / n,
					avg_answer_match: ans_sum / n,
				}
			})
			.collect()
	}

	pub fn summary_table(&self) -> String {
		use tabled::Table;
		let table = Table::new(&self.summaries);

		let totals = format!(
			"Combinations: {}  Evaluations: {}",
			self.summaries.len(),
			self.records.len()
		);

		format!("{}\n\n{}\n", table, totals)
	}
}
