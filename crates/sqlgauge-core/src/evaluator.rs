//! Combine extraction-adjacent scoring into one verdict per evaluated
//! combination.

use std::panic::{catch_unwind, AssertUnwindSafe};

use sqlgauge_types::{EvaluationResult, ExecutionOutcome, Row};

use crate::answer::answer_similarity;
use crate::similarity::sql_similarity;

/// Produce the verdict for one (test case, prompt, model) combination.
///
/// Pure function of its inputs: no I/O, no hidden state. `syntax_ok` is
/// derived solely from the execution outcome: a query that parses but fails
/// at execution is not considered well-formed. Never panics: any internal
/// scoring failure downgrades to the all-zero verdict.
pub fn evaluate(
    outcome: &ExecutionOutcome,
    generated_sql: &str,
    expected_sql: &str,
    expected_rows: &[Row],
) -> EvaluationResult {
    catch_unwind(AssertUnwindSafe(|| {
        let sql_match_percent = sql_similarity(generated_sql, expected_sql);
        let (syntax_ok, answer_match_percent) = match outcome {
            ExecutionOutcome::Error(_) => (false, 0.0),
            ExecutionOutcome::Rows(_) => (true, answer_similarity(outcome, expected_rows)),
        };
        EvaluationResult {
            syntax_ok,
            sql_match_percent,
            answer_match_percent,
        }
    }))
    .unwrap_or_else(|_| EvaluationResult::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<Row> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn perfect_generation_scores_perfectly() {
        let sql = "SELECT ar.Name, COUNT(al.AlbumId) as AlbumCount FROM Artist ar \
                   JOIN Album al ON ar.ArtistId = al.ArtistId GROUP BY ar.ArtistId, ar.Name \
                   HAVING COUNT(al.AlbumId) > 10 ORDER BY AlbumCount DESC";
        let expected_rows = rows(json!([
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14},
            {"Name": "Deep Purple", "AlbumCount": 11}
        ]));
        let outcome = ExecutionOutcome::Rows(expected_rows.clone());

        let result = evaluate(&outcome, sql, sql, &expected_rows);
        assert!(result.syntax_ok);
        assert_eq!(result.sql_match_percent, 100.0);
        assert_eq!(result.answer_match_percent, 100.0);
    }

    #[test]
    fn successful_query_with_no_rows_scores_zero_answer() {
        let expected_rows = rows(json!([
            {"Name": "Iron Maiden"},
            {"Name": "Led Zeppelin"},
            {"Name": "Deep Purple"}
        ]));
        let outcome = ExecutionOutcome::Rows(vec![]);

        let result = evaluate(
            &outcome,
            "SELECT Name FROM Artist WHERE 1 = 0",
            "SELECT Name FROM Artist",
            &expected_rows,
        );
        assert!(result.syntax_ok);
        assert_eq!(result.answer_match_percent, 0.0);
    }

    #[test]
    fn execution_error_zeroes_answer_regardless_of_sql_match() {
        let expected_rows = rows(json!([{"Name": "Iron Maiden"}]));
        let outcome = ExecutionOutcome::Error("no such table: Artists".to_string());

        let result = evaluate(
            &outcome,
            "SELECT Name FROM Artists",
            "SELECT Name FROM Artist",
            &expected_rows,
        );
        assert!(!result.syntax_ok);
        assert_eq!(result.answer_match_percent, 0.0);
        assert!(result.sql_match_percent > 0.0);
    }

    #[test]
    fn superset_result_still_scores_100() {
        let expected_rows = rows(json!([{"Name": "Iron Maiden", "AlbumCount": 21}]));
        let outcome = ExecutionOutcome::Rows(rows(json!([
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14}
        ])));

        let result = evaluate(
            &outcome,
            "SELECT Name, COUNT(*) as AlbumCount FROM Album GROUP BY Name HAVING COUNT(*) > 10",
            "SELECT Name, COUNT(*) as AlbumCount FROM Album GROUP BY Name HAVING COUNT(*) > 20",
            &expected_rows,
        );
        assert!(result.syntax_ok);
        assert_eq!(result.answer_match_percent, 100.0);
    }

    #[test]
    fn scores_are_always_finite() {
        let outcome = ExecutionOutcome::Error("boom".to_string());
        let result = evaluate(&outcome, "", "", &[]);
        assert!(result.sql_match_percent.is_finite());
        assert!(result.answer_match_percent.is_finite());
        assert!(!result.syntax_ok);
    }
}
