//! Chat-style rendering of query reports.

use crate::NlQueryReport;
use serde_json::Value;

const GREETING: &str = "Hello! I'm your NL Kusto Bot, always ready to help you out. \
If you need assistance, just type 'help' to see the available commands.";

const HELP: &str = "Here's a list of commands I can help you with:\n\
- 'hi' or 'hello': Say hi or hello to me, and I'll greet you back.\n\
- 'help': Get a list of available commands.\n\n\
- Otherwise, feel free to ask me to run a kusto query for you!\n";

/// Fixed reply for chat commands, `None` for anything to be run as a query.
///
/// ```
/// use kustonl_server::canned_reply;
///
/// assert!(canned_reply("hello").is_some());
/// assert!(canned_reply("how many storms hit Texas?").is_none());
/// ```
pub fn canned_reply(message: &str) -> Option<&'static str> {
    match message {
        "hi" | "hello" => Some(GREETING),
        "help" => Some(HELP),
        _ => None,
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace('|', "\\|"),
        other => other.to_string().replace('|', "\\|"),
    }
}

/// Render a report as markdown: question, query, result table, summary.
///
/// Table columns are taken from the first row. Empty parts are left out.
pub fn render_report(report: &NlQueryReport) -> String {
    let mut out = String::new();

    if !report.prompt.is_empty() {
        out.push_str(&format!("**You asked:** {}\n", report.prompt));
    }

    if !report.generated_query.is_empty() {
        out.push_str(&format!(
            "\n\n**Generated Query:**\n\n```kql\n{}\n```\n",
            report.generated_query.trim()
        ));
    }

    if let Some(first) = report.results.first() {
        let columns: Vec<&String> = first.keys().collect();
        let header: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
        out.push_str(&format!("\n**Results:**\n\n| {} |\n", header.join(" | ")));
        out.push_str(&format!(
            "| {} |\n",
            vec!["---"; columns.len()].join(" | ")
        ));
        for row in &report.results {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| row.get(c.as_str()).map(cell).unwrap_or_default())
                .collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
    }

    if !report.summarized_results.is_empty() {
        out.push_str(&format!(
            "\n**Summary:**\n\n{}\n",
            report.summarized_results
        ));
    }

    out.trim().to_string()
}
