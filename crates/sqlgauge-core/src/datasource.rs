use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use sqlgauge_types::TestCase;

/// Source of ground-truth test cases. Loaded once at startup; cases are
/// immutable thereafter.
#[async_trait]
pub trait CaseSource: Send + Sync {
    async fn load(&self) -> Result<Vec<TestCase>>;
}

pub struct VecCaseSource {
    cases: Vec<TestCase>,
}

impl VecCaseSource {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self { cases }
    }
}

#[async_trait]
impl CaseSource for VecCaseSource {
    async fn load(&self) -> Result<Vec<TestCase>> {
        Ok(self.cases.clone())
    }
}

/// Reads a JSON array of objects shaped like:
/// `{ "question": "...", "sql": "...", "expected_result": [...], "category"?: "..." }`
pub struct JsonCaseSource {
    path: PathBuf,
}

impl JsonCaseSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CaseSource for JsonCaseSource {
    async fn load(&self) -> Result<Vec<TestCase>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let cases: Vec<TestCase> = serde_json::from_str(&content)
            .with_context(|| format!("invalid test case JSON in {}", self.path.display()))?;
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_case_source_parses_corpus_shape() {
        let json = r#"[
            {
                "question": "Which artists have more than 10 albums?",
                "sql": "SELECT ar.Name, COUNT(al.AlbumId) as AlbumCount FROM Artist ar JOIN Album al ON ar.ArtistId = al.ArtistId GROUP BY ar.ArtistId, ar.Name HAVING COUNT(al.AlbumId) > 10 ORDER BY AlbumCount DESC",
                "expected_result": [
                    {"Name": "Iron Maiden", "AlbumCount": 21},
                    {"Name": "Led Zeppelin", "AlbumCount": 14}
                ],
                "category": "aggregation_with_having"
            },
            {
                "question": "How many tracks were sold in each month of 2013?",
                "sql": "SELECT strftime('%Y-%m', InvoiceDate) as Month, SUM(Quantity) as TracksSold FROM Invoice i JOIN InvoiceLine il ON i.InvoiceId = il.InvoiceId WHERE strftime('%Y', InvoiceDate) = '2013' GROUP BY Month ORDER BY Month",
                "expected_result": []
            }
        ]"#;

        let path = std::env::temp_dir().join(format!(
            "sqlgauge_cases_test_{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, json).await.unwrap();
        let cases = JsonCaseSource::new(&path).load().await.unwrap();
        tokio::fs::remove_file(&path).await.ok();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected_result.len(), 2);
        assert_eq!(cases[0].category.as_deref(), Some("aggregation_with_having"));
        assert!(cases[1].expected_result.is_empty());
        assert!(cases[1].category.is_none());
    }

    #[tokio::test]
    async fn vec_case_source_round_trips() {
        let source = VecCaseSource::new(vec![TestCase::new("q", "SELECT 1")]);
        let cases = source.load().await.unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].expected_sql, "SELECT 1");
    }
}
