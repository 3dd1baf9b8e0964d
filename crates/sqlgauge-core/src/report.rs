//! Flat-file exports of a run report: a summary CSV (one row per
//! model x prompt), a per-case CSV, and a timestamped JSON artifact.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use sqlgauge_types::RunReport;

pub fn render_summary_csv(report: &RunReport) -> String {
    let mut out = String::from(
        "Model Name,Prompt Type,Cases,Syntax OK Rate,Avg SQL Match Score,Avg Answer Match Score\n",
    );
    for s in &report.summaries {
        out.push_str(&format!(
            "{},{},{},{:.3},{:.1},{:.1}\n",
            csv_field(&s.model),
            csv_field(&s.prompt),
            s.cases,
            s.syntax_ok_rate,
            s.avg_sql_match,
            s.avg_answer_match,
        ));
    }
    out
}

pub fn render_case_csv(report: &RunReport) -> String {
    let mut out = String::from(
        "Model Name,Prompt Type,Category,Question,Generated SQL,Syntax OK,SQL Match,Answer Match,Error\n",
    );
    for r in &report.records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{:.1},{:.1},{}\n",
            csv_field(&r.model),
            csv_field(&r.prompt),
            csv_field(r.category.as_deref().unwrap_or("")),
            csv_field(&r.question),
            csv_field(&r.generated_sql),
            r.result.syntax_ok,
            r.result.sql_match_percent,
            r.result.answer_match_percent,
            csv_field(r.error.as_deref().unwrap_or("")),
        ));
    }
    out
}

/// Write the full report as JSON, wrapped with a generation timestamp.
pub async fn save_json(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let artifact = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "summaries": report.summaries,
        "records": report.records,
    });
    let body = serde_json::to_string_pretty(&artifact)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgauge_types::{CaseRecord, EvaluationResult};

    fn report() -> RunReport {
        RunReport::from_records(vec![CaseRecord {
            model: "llama_8b".to_string(),
            prompt: "prompt_2".to_string(),
            question: "Which tracks contain the word 'love', or not?".to_string(),
            category: Some("string_matching".to_string()),
            generated_sql: "SELECT Name, Composer FROM Track WHERE Name LIKE '%love%'".to_string(),
            error: None,
            result: EvaluationResult {
                syntax_ok: true,
                sql_match_percent: 92.5,
                answer_match_percent: 100.0,
            },
        }])
    }

    #[test]
    fn summary_csv_has_one_row_per_combination() {
        let csv = render_summary_csv(&report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Model Name,Prompt Type"));
        assert!(lines[1].starts_with("llama_8b,prompt_2,1,1.000,92.5,100.0"));
    }

    #[test]
    fn case_csv_quotes_embedded_commas() {
        let csv = render_case_csv(&report());
        assert!(csv.contains("\"Which tracks contain the word 'love', or not?\""));
    }
}
