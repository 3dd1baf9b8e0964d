//! Run the harness end to end without a model endpoint or a database:
//! a canned generator and a scripted executor stand in for both.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use sqlgauge_core::{
    CaseSource, Executor, ExecutionOutcome, Generator, Harness, ModelEntry, ModelsConfig,
    PacingPolicy, PromptStrategy, Row, SamplingConfig, TestCase, VecCaseSource,
};

struct CannedGenerator {
    answers: HashMap<String, String>,
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(
        &self,
        _schema_text: &str,
        question: &str,
        _prompt: PromptStrategy,
        _model_id: &str,
        _sampling: &SamplingConfig,
    ) -> Result<String> {
        let sql = self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| "SELECT oops".to_string());
        Ok(format!("Sure! Here you go:\n```sql\n{sql}\n```"))
    }
}

struct ScriptedExecutor {
    outcomes: HashMap<String, Vec<Row>>,
}

#[async_trait]
impl Executor for ScriptedExecutor {
    async fn schema_text(&self) -> Result<String> {
        Ok("Artist: [ArtistId, Name]\nAlbum: [AlbumId, Title, ArtistId]".to_string())
    }

    async fn execute(&self, sql: &str) -> ExecutionOutcome {
        match self.outcomes.get(sql) {
            Some(rows) => ExecutionOutcome::Rows(rows.clone()),
            None => ExecutionOutcome::Error(format!("near \"{sql}\": syntax error")),
        }
    }
}

fn rows(v: serde_json::Value) -> Vec<Row> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().cloned().unwrap())
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let having_sql = "SELECT ar.Name, COUNT(al.AlbumId) as AlbumCount FROM Artist ar \
                      JOIN Album al ON ar.ArtistId = al.ArtistId \
                      GROUP BY ar.ArtistId, ar.Name HAVING COUNT(al.AlbumId) > 10 \
                      ORDER BY AlbumCount DESC";
    let having_rows = rows(json!([
        {"Name": "Iron Maiden", "AlbumCount": 21},
        {"Name": "Led Zeppelin", "AlbumCount": 14},
        {"Name": "Deep Purple", "AlbumCount": 11}
    ]));

    let cases: Arc<dyn CaseSource> = Arc::new(VecCaseSource::new(vec![
        TestCase::new("Which artists have more than 10 albums?", having_sql)
            .with_result(having_rows.clone()),
        TestCase::new("How many tracks were sold in 2013?", "SELECT 0 WHERE 1 = 0"),
    ]));

    let mut answers = HashMap::new();
    answers.insert(
        "Which artists have more than 10 albums?".to_string(),
        having_sql.to_string(),
    );
    let mut outcomes = HashMap::new();
    outcomes.insert(having_sql.to_string(), having_rows);

    let harness = Harness::builder()
        .case_source(cases)
        .generator(Arc::new(CannedGenerator { answers }))
        .executor(Arc::new(ScriptedExecutor { outcomes }))
        .models(ModelsConfig {
            models: vec![ModelEntry {
                key: "canned".to_string(),
                id: "offline/canned".to_string(),
            }],
            sampling: SamplingConfig::default(),
        })
        .pacing(PacingPolicy::none())
        .build()?;

    let report = harness.run().await?;
    println!("{}", report.summary_table());
    Ok(())
}
