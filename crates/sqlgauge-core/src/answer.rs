//! Closeness of an executed result set to the expected result set, as a
//! percentage.
//!
//! Rows are matched as multisets: order never matters, and each actual row
//! satisfies at most one expected row. Every cell is canonicalized before
//! comparison, so tolerant equality is a true equivalence relation and the
//! multiset count cannot depend on row order: numeric cells (and strings
//! that parse as numbers, since engines disagree on numeric affinity) reduce
//! to their value rounded to two decimal places, other strings are trimmed
//! and compared case-sensitively, and a null cell is equal to an absent
//! column. Extra actual rows beyond the expectation do not penalize the
//! score.

use serde_json::Value;
use sqlgauge_types::{ExecutionOutcome, Row};

/// Score how closely `outcome` matches `expected`, in [0, 100].
///
/// An execution error always scores 0, even against an empty expectation: an
/// error means the question could not be evaluated at all. An empty
/// expectation scores 100 only against an empty actual set; returning rows
/// against a case that asserted "no rows" scores 0.
pub fn answer_similarity(outcome: &ExecutionOutcome, expected: &[Row]) -> f64 {
    let actual = match outcome {
        ExecutionOutcome::Error(_) => return 0.0,
        ExecutionOutcome::Rows(rows) => rows,
    };

    if expected.is_empty() {
        return if actual.is_empty() { 100.0 } else { 0.0 };
    }

    let mut used = vec![false; actual.len()];
    let mut matched = 0usize;
    for exp in expected {
        let hit = actual
            .iter()
            .enumerate()
            .position(|(i, row)| !used[i] && rows_match(exp, row));
        if let Some(i) = hit {
            used[i] = true;
            matched += 1;
        }
    }

    (matched as f64 / expected.len() as f64 * 100.0).min(100.0)
}

/// Tolerant row equality over the union of both rows' columns.
fn rows_match(a: &Row, b: &Row) -> bool {
    let keys = a.keys().chain(b.keys());
    for key in keys {
        let va = a.get(key).unwrap_or(&Value::Null);
        let vb = b.get(key).unwrap_or(&Value::Null);
        if canon(va) != canon(vb) {
            return false;
        }
    }
    true
}

/// Canonical cell form. Anything numeric, including numeric-looking text,
/// collapses to hundredths so equality stays transitive.
#[derive(Debug, PartialEq)]
enum Cell {
    Null,
    Num(i64),
    Str(String),
    Other(Value),
}

fn canon(v: &Value) -> Cell {
    match v {
        Value::Null => Cell::Null,
        Value::Number(_) => match v.as_f64() {
            Some(x) => Cell::Num(hundredths(x)),
            None => Cell::Other(v.clone()),
        },
        Value::String(s) => {
            let t = s.trim();
            match t.parse::<f64>() {
                Ok(x) if x.is_finite() => Cell::Num(hundredths(x)),
                _ => Cell::Str(t.to_string()),
            }
        }
        other => Cell::Other(other.clone()),
    }
}

fn hundredths(x: f64) -> i64 {
    (x * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().expect("object literal")
    }

    fn rows(v: Value) -> Vec<Row> {
        v.as_array()
            .expect("array literal")
            .iter()
            .map(|r| row(r.clone()))
            .collect()
    }

    #[test]
    fn execution_error_scores_zero() {
        let err = ExecutionOutcome::Error("no such column: Naem".to_string());
        let expected = rows(json!([{"Name": "Iron Maiden"}]));
        assert_eq!(answer_similarity(&err, &expected), 0.0);
        // An error against an empty expectation is still not a match.
        assert_eq!(answer_similarity(&err, &[]), 0.0);
    }

    #[test]
    fn empty_expected_empty_actual_scores_100() {
        let outcome = ExecutionOutcome::Rows(vec![]);
        assert_eq!(answer_similarity(&outcome, &[]), 100.0);
    }

    #[test]
    fn empty_expected_nonempty_actual_scores_zero() {
        let outcome = ExecutionOutcome::Rows(rows(json!([{"Month": "2013-01"}])));
        assert_eq!(answer_similarity(&outcome, &[]), 0.0);
    }

    #[test]
    fn exact_rows_score_100() {
        let data = json!([
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14}
        ]);
        let outcome = ExecutionOutcome::Rows(rows(data.clone()));
        assert_eq!(answer_similarity(&outcome, &rows(data)), 100.0);
    }

    #[test]
    fn row_order_does_not_matter() {
        let expected = rows(json!([
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14},
            {"Name": "Deep Purple", "AlbumCount": 11}
        ]));
        let shuffled = ExecutionOutcome::Rows(rows(json!([
            {"Name": "Deep Purple", "AlbumCount": 11},
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14}
        ])));
        assert_eq!(answer_similarity(&shuffled, &expected), 100.0);
    }

    #[test]
    fn numeric_tolerance_and_int_float_mix() {
        let expected = rows(json!([{"TotalSpending": 49.62}]));
        let outcome = ExecutionOutcome::Rows(rows(json!([{"TotalSpending": 49.620000000001}])));
        assert_eq!(answer_similarity(&outcome, &expected), 100.0);

        let expected = rows(json!([{"AlbumCount": 21}]));
        let outcome = ExecutionOutcome::Rows(rows(json!([{"AlbumCount": 21.0}])));
        assert_eq!(answer_similarity(&outcome, &expected), 100.0);
    }

    #[test]
    fn null_equals_missing_column() {
        let expected = rows(json!([{"Name": "Believe in Love", "Composer": null}]));
        let outcome = ExecutionOutcome::Rows(rows(json!([{"Name": "Believe in Love"}])));
        assert_eq!(answer_similarity(&outcome, &expected), 100.0);
    }

    #[test]
    fn superset_of_expected_scores_100() {
        let expected = rows(json!([{"Name": "Iron Maiden", "AlbumCount": 21}]));
        let outcome = ExecutionOutcome::Rows(rows(json!([
            {"Name": "Iron Maiden", "AlbumCount": 21},
            {"Name": "Led Zeppelin", "AlbumCount": 14}
        ])));
        assert_eq!(answer_similarity(&outcome, &expected), 100.0);
    }

    #[test]
    fn expected_order_does_not_change_score_with_mixed_cell_types() {
        // Text and numeric renderings of the same value must collapse to one
        // canonical form, or first-fit matching becomes order-dependent.
        let actual = ExecutionOutcome::Rows(rows(json!([
            {"TotalSpending": "49.62"},
            {"TotalSpending": "49.620"}
        ])));
        let expected_a = rows(json!([
            {"TotalSpending": 49.62},
            {"TotalSpending": "49.62"}
        ]));
        let expected_b = rows(json!([
            {"TotalSpending": "49.62"},
            {"TotalSpending": 49.62}
        ]));
        let score_a = answer_similarity(&actual, &expected_a);
        let score_b = answer_similarity(&actual, &expected_b);
        assert_eq!(score_a, score_b);
        assert_eq!(score_a, 100.0);

        // Same property when only part of the expectation is satisfiable.
        let actual = ExecutionOutcome::Rows(rows(json!([{"a": "49.620"}])));
        let forward = rows(json!([{"a": "no match"}, {"a": 49.62}]));
        let backward = rows(json!([{"a": 49.62}, {"a": "no match"}]));
        assert_eq!(answer_similarity(&actual, &forward), 50.0);
        assert_eq!(answer_similarity(&actual, &backward), 50.0);
    }

    #[test]
    fn duplicates_count_with_multiplicity() {
        let expected = rows(json!([
            {"Name": "All My Love"},
            {"Name": "All My Love"}
        ]));
        let outcome = ExecutionOutcome::Rows(rows(json!([{"Name": "All My Love"}])));
        assert_eq!(answer_similarity(&outcome, &expected), 50.0);
    }

    #[test]
    fn partial_overlap_scores_fraction() {
        let expected = rows(json!([
            {"Name": "Iron Maiden"},
            {"Name": "Led Zeppelin"},
            {"Name": "Deep Purple"}
        ]));
        let outcome = ExecutionOutcome::Rows(rows(json!([
            {"Name": "Iron Maiden"},
            {"Name": "Metallica"}
        ])));
        let score = answer_similarity(&outcome, &expected);
        assert!((score - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn strings_trimmed_but_case_sensitive() {
        let expected = rows(json!([{"Name": "Dirty Love"}]));
        let padded = ExecutionOutcome::Rows(rows(json!([{"Name": "  Dirty Love "}])));
        assert_eq!(answer_similarity(&padded, &expected), 100.0);
        let recased = ExecutionOutcome::Rows(rows(json!([{"Name": "dirty love"}])));
        assert_eq!(answer_similarity(&recased, &expected), 0.0);
    }
}
