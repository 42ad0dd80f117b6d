//! Recovering a KQL statement from model output.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument, warn};

/// Substrings that mark a line as part of a query when no fenced block exists.
pub const QUERY_OPERATOR_TOKENS: [&str; 8] = [
    "|",
    "where",
    "summarize",
    "project",
    "order",
    "join",
    "extend",
    "distinct",
];

static KQL_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```kql\s*(.*?)\s*```").expect("Valid KQL fence regex"));

/// Extract the KQL statement from a model answer.
///
/// 1. The interior of the first ```` ```kql ```` fenced block, trimmed.
/// 2. Otherwise every trimmed line that contains a query operator token, or
///    starts with an uppercase letter and contains none of `.`, `:`, `;`.
///    Blank lines and `//` comment lines are skipped.
/// 3. Otherwise the whole text, trimmed.
///
/// Untagged fences are ignored, and comments trailing a kept line are kept.
///
/// # Examples
///
/// ```
/// use kustonl_core::extract_kql;
///
/// let answer = "Here you go:\n```kql\nStormEvents\n| count\n```\nEnjoy.";
/// assert_eq!(extract_kql(answer), "StormEvents\n| count");
/// ```
#[instrument(skip_all, fields(text_len = text.len()))]
pub fn extract_kql(text: &str) -> String {
    if let Some(body) = KQL_FENCE.captures(text).and_then(|c| c.get(1)) {
        debug!("Found fenced KQL block");
        return body.as_str().trim().to_string();
    }

    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .filter(|line| is_operator_line(line) || is_bare_identifier(line))
        .collect();

    if !lines.is_empty() {
        debug!(lines = lines.len(), "Recovered KQL from operator lines");
        return lines.join("\n");
    }

    warn!("Could not extract KQL query from response, returning full content");
    text.trim().to_string()
}

fn is_operator_line(line: &str) -> bool {
    QUERY_OPERATOR_TOKENS.iter().any(|token| line.contains(token))
}

// Bare table names such as "GetTenantVersions".
fn is_bare_identifier(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_uppercase)
        && !line.contains(['.', ':', ';'])
}
