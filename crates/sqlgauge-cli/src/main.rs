use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlgauge_core::{
	report, Harness, JsonCaseSource, ModelsConfig, OpenAiCompatGenerator, PacingPolicy,
	PromptStrategy,
};
use sqlgauge_store::{SqliteExecutor, Store};

#[derive(Debug, Parser)]
#[command(name = "sqlgauge", about = "Score text-to-SQL generation across models and prompts")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
	Run(RunArgs),
}

#[derive(Debug, Clone, Parser)]
struct RunArgs {
	/// JSON file with test cases: [{ "question", "sql", "expected_result", "category"? }]
	#[arg(long)]
	cases: PathBuf,

	/// YAML file with the models to compare and sampling settings
	#[arg(long)]
	models: PathBuf,

	/// SQLite database the queries run against (opened read-only)
	#[arg(long)]
	db: PathBuf,

	/// OpenAI-compatible chat completions base URL
	#[arg(long, default_value = "https://api.fireworks.ai/inference/v1")]
	base_url: String,

	/// Environment variable holding the API key (unset = no auth header)
	#[arg(long, default_value = "FIREWORKS_API_KEY")]
	api_key_env: String,

	/// Prompt strategies to evaluate: basic, few_shot, agentic
	#[arg(long, value_delimiter = ',', default_values_t = vec![
		PromptStrategy::Basic,
		PromptStrategy::FewShot,
		PromptStrategy::Agentic,
	])]
	prompts: Vec<PromptStrategy>,

	/// Delay between completion calls, in milliseconds
	#[arg(long, default_value_t = 5000)]
	call_delay_ms: u64,

	/// Delay between models, in milliseconds
	#[arg(long, default_value_t = 20000)]
	model_delay_ms: u64,

	/// Write the per-combination summary as CSV
	#[arg(long)]
	csv_out: Option<PathBuf>,

	/// Write per-case records as CSV
	#[arg(long)]
	case_csv_out: Option<PathBuf>,

	/// Write the full report as JSON
	#[arg(long)]
	json_out: Option<PathBuf>,

	/// Persist the run into this SQLite file
	#[arg(long)]
	store: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	match cli.command {
		Commands::Run(args) => run(args).await?,
	}
	Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
	let models = ModelsConfig::load(&args.models).await?;
	let cases = Arc::new(JsonCaseSource::new(&args.cases));
	let executor = Arc::new(
		SqliteExecutor::open(&args.db)
			.with_context(|| format!("failed to open {}", args.db.display()))?,
	);

	let mut generator = OpenAiCompatGenerator::new(&args.base_url);
	if let Ok(key) = std::env::var(&args.api_key_env) {
		generator = generator.with_api_key(key);
	}

	let harness = Harness::builder()
		.case_source(cases)
		.generator(Arc::new(generator))
		.executor(executor)
		.models(models.clone())
		.prompts(args.prompts.clone())
		.pacing(PacingPolicy {
			per_call_delay: Duration::from_millis(args.call_delay_ms),
			per_model_delay: Duration::from_millis(args.model_delay_ms),
		})
		.build()?;

	let result = harness.run().await?;
	println!("{}", result.summary_table());

	if let Some(path) = &args.csv_out {
		tokio::fs::write(path, report::render_summary_csv(&result)).await?;
		println!("Summary CSV written to {}", path.display());
	}
	if let Some(path) = &args.case_csv_out {
		tokio::fs::write(path, report::render_case_csv(&result)).await?;
		println!("Case CSV written to {}", path.display());
	}
	if let Some(path) = &args.json_out {
		report::save_json(&result, path).await?;
		println!("JSON report written to {}", path.display());
	}
	if let Some(path) = &args.store {
		let store = Store::open(path)?;
		let run_id = store.create_run(Some(serde_json::json!({
			"cases": args.cases.display().to_string(),
			"db": args.db.display().to_string(),
			"models": models.models.iter().map(|m| m.key.clone()).collect::<Vec<_>>(),
		})))?;
		store.save_report(run_id, &result)?;
		println!("Run {} persisted to {}", run_id, path.display());
	}

	Ok(())
}
