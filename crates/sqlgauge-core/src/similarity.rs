//! Syntactic closeness of a generated SQL string to the reference SQL,
//! as a percentage. Neither input needs to be valid SQL.
//!
//! Both sides are normalized (lowercase, collapsed whitespace, no trailing
//! semicolon); normalized equality scores 100. Otherwise the score is the
//! better of a token multiset overlap (order-insensitive, so symmetric join
//! operands and reshuffled clauses still count) and a normalized Levenshtein
//! ratio over the normalized strings.

use std::collections::HashMap;

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Token, Tokenizer};
use strsim::normalized_levenshtein;

/// Score how close `generated` is to `expected`, in [0, 100].
///
/// An empty expected SQL scores 0 against anything except an equally empty
/// generated SQL, which scores 100.
pub fn sql_similarity(generated: &str, expected: &str) -> f64 {
    let e = normalize(expected);
    let g = normalize(generated);

    if e.is_empty() {
        return if g.is_empty() { 100.0 } else { 0.0 };
    }
    if g == e {
        return 100.0;
    }

    let overlap = token_overlap(&tokens(&g), &tokens(&e));
    let edit = normalized_levenshtein(&g, &e);
    (overlap.max(edit) * 100.0).clamp(0.0, 100.0)
}

/// Lowercase, collapse all whitespace runs to single spaces, drop trailing
/// semicolons.
fn normalize(sql: &str) -> String {
    let collapsed = sql
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed.trim_end_matches(';').trim().to_string()
}

/// Lex with sqlparser where possible; raw whitespace splitting otherwise, so
/// invalid SQL still gets a score.
fn tokens(sql: &str) -> Vec<String> {
    let dialect = SQLiteDialect {};
    match Tokenizer::new(&dialect, sql).tokenize() {
        Ok(toks) => toks
            .into_iter()
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .map(|t| t.to_string().to_lowercase())
            .collect(),
        Err(_) => sql.split_whitespace().map(|w| w.to_lowercase()).collect(),
    }
}

/// Multiset Jaccard: shared token count (with multiplicity) over the union.
fn token_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for t in a {
        counts.entry(t).or_default().0 += 1;
    }
    for t in b {
        counts.entry(t).or_default().1 += 1;
    }

    let mut shared = 0usize;
    let mut union = 0usize;
    for (na, nb) in counts.values() {
        shared += na.min(nb);
        union += na.max(nb);
    }
    shared as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sql_scores_100() {
        let sql = "SELECT Name FROM Artist WHERE ArtistId = 1";
        assert_eq!(sql_similarity(sql, sql), 100.0);
    }

    #[test]
    fn case_and_whitespace_differences_score_100() {
        let a = "select   name\nfrom artist;";
        let b = "SELECT Name FROM Artist";
        assert_eq!(sql_similarity(a, b), 100.0);
        assert_eq!(sql_similarity(b, a), 100.0);
    }

    #[test]
    fn symmetric_join_condition_scores_high() {
        let a = "SELECT t.Name FROM Track t JOIN Album a ON t.AlbumId = a.AlbumId";
        let b = "SELECT t.Name FROM Track t JOIN Album a ON a.AlbumId = t.AlbumId";
        assert!(sql_similarity(a, b) > 90.0);
    }

    #[test]
    fn different_alias_scores_high() {
        let a = "SELECT ar.Name FROM Artist ar";
        let b = "SELECT a.Name FROM Artist a";
        assert!(sql_similarity(a, b) > 60.0);
    }

    #[test]
    fn unrelated_sql_scores_low() {
        let a = "SELECT Total FROM Invoice";
        let b = "DELETE FROM Playlist WHERE PlaylistId > 9000";
        assert!(sql_similarity(a, b) < 50.0);
    }

    #[test]
    fn invalid_sql_still_scores() {
        let score = sql_similarity("SELEC Name FORM Artist", "SELECT Name FROM Artist");
        assert!(score > 0.0 && score < 100.0);
    }

    #[test]
    fn empty_expected_edge_cases() {
        assert_eq!(sql_similarity("", ""), 100.0);
        assert_eq!(sql_similarity("SELECT 1", ""), 0.0);
        assert_eq!(sql_similarity("", "SELECT 1"), 0.0);
    }
}
