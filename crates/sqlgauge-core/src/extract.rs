//! Recover a bare SQL statement from a model completion that may wrap it in
//! prose, markdown code fences, or `<sql_query>` tags.
//!
//! The stages run in a fixed priority order: a fenced code block wins over a
//! tag-delimited section; whichever body is chosen then has remaining
//! tag-like substrings stripped and stray brackets trimmed. The whole
//! pipeline is deterministic and idempotent.

use std::sync::OnceLock;

use regex::Regex;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:sql)?\s*(.*?)\s*```").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<sql_query>\s*(.*?)\s*</sql_query>").unwrap())
}

fn any_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

/// Stage (a): contents of the first fenced code block, if any.
pub fn code_fence(raw: &str) -> Option<String> {
    fence_re()
        .captures(raw)
        .map(|c| c[1].trim().to_string())
}

/// Stage (b): contents of the first `<sql_query>...</sql_query>` pair
/// (case-insensitive), if any.
pub fn tag_delimited(raw: &str) -> Option<String> {
    tag_re()
        .captures(raw)
        .map(|c| c[1].trim().to_string())
}

/// Stage (c): drop any remaining angle-bracket tag-like substrings.
pub fn strip_tags(s: &str) -> String {
    any_tag_re().replace_all(s, "").into_owned()
}

/// Stage (d): trim stray brackets and whitespace from both ends until
/// neither end changes.
pub fn bracket_trim(s: &str) -> String {
    let mut t = s.trim();
    loop {
        let before = t;
        if let Some(c) = t.chars().next() {
            if matches!(c, '<' | '[' | '{' | '}') {
                t = t[c.len_utf8()..].trim_start();
            }
        }
        if let Some(c) = t.chars().next_back() {
            if matches!(c, '>' | ']' | '}') {
                t = t[..t.len() - c.len_utf8()].trim_end();
            }
        }
        if t == before {
            return t.to_string();
        }
    }
}

/// Extract the SQL statement from a raw model completion. Returns an empty
/// string when the completion held no usable content.
pub fn extract_sql(raw: &str) -> String {
    let body = code_fence(raw)
        .or_else(|| tag_delimited(raw))
        .unwrap_or_else(|| raw.trim().to_string());
    bracket_trim(&strip_tags(&body))
}
