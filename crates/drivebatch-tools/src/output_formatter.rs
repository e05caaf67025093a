//! Output formatting for batch reports and dry-run plans
//!
//! Reports are first turned into a JSON response, then rendered as JSON,
//! a human-readable summary, or terse text.

use drivebatch_batch::BatchReport;
use drivebatch_core::{DryRunSummary, Error};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

/// Output format preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable summary
    #[default]
    Human,
    /// Minimal plain text
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: json, human, text",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Build the JSON response for a finished (or aborted) batch.
///
/// Items and errors are listed in input order.
pub fn report_response<R: Serialize>(
    operation: &str,
    report: &BatchReport<R>,
    aborted: Option<&Error>,
) -> Value {
    let items: Vec<Value> = report
        .sorted_successes()
        .into_iter()
        .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
        .collect();
    let errors: Vec<Value> = report
        .sorted_errors()
        .into_iter()
        .map(|e| json!({ "index": e.index, "identifier": e.identifier, "message": e.message }))
        .collect();

    json!({
        "operation": operation,
        "success": aborted.is_none() && report.all_succeeded(),
        "dry_run": report.dry_run,
        "summary": {
            "total": report.total_count,
            "success": report.success_count,
            "failed": report.failed_count,
        },
        "items": items,
        "errors": errors,
        "aborted": aborted.map(|e| e.to_string()),
        "took_ms": report.duration_ms,
    })
}

/// Build the JSON response for a dry-run plan
pub fn dry_run_response(summary: &DryRunSummary) -> Value {
    json!({
        "operation": "dry-run",
        "total": summary.total_count,
        "by_kind": summary
            .by_kind
            .iter()
            .map(|(kind, count)| (kind.as_str().to_string(), json!(count)))
            .collect::<serde_json::Map<String, Value>>(),
        "planned": summary
            .operations
            .iter()
            .map(|op| op.description.clone())
            .collect::<Vec<_>>(),
        "warnings": summary.warnings,
    })
}

/// Renders responses in the requested format
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Format a batch report response
    pub fn format(response: &Value, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(response),
            OutputFormat::Human => Self::format_human(response),
            OutputFormat::Text => Self::format_text(response),
        }
    }

    /// Format a dry-run response
    pub fn format_plan(response: &Value, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(response),
            OutputFormat::Human | OutputFormat::Text => Self::format_plan_human(response),
        }
    }

    fn format_json(response: &Value) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string())
    }

    fn format_human(response: &Value) -> String {
        let mut output = String::new();
        let Some(obj) = response.as_object() else {
            return Self::format_json(response);
        };

        if let Some(op) = obj.get("operation").and_then(|v| v.as_str()) {
            output.push_str(&format!("⚙️  Operation: {}\n", op));
        }

        if let Some(success) = obj.get("success").and_then(|v| v.as_bool()) {
            let status = if success { "✅ Success" } else { "❌ Failed" };
            output.push_str(&format!("Status: {}\n", status));
        }

        if obj.get("dry_run").and_then(|v| v.as_bool()) == Some(true) {
            output.push_str("🧪 Dry run: nothing was changed\n");
        }

        if let Some(summary) = obj.get("summary") {
            output.push_str(&format!(
                "\nTotal: {}, Success: {}, Failed: {}\n",
                summary["total"], summary["success"], summary["failed"]
            ));
        }

        if let Some(errors) = obj.get("errors").and_then(|v| v.as_array())
            && !errors.is_empty()
        {
            output.push_str("\nErrors:\n");
            for e in errors {
                output.push_str(&format!(
                    "  - [{}] {}: {}\n",
                    e["index"],
                    e["identifier"].as_str().unwrap_or_default(),
                    e["message"].as_str().unwrap_or_default()
                ));
            }
        }

        if let Some(reason) = obj.get("aborted").and_then(|v| v.as_str()) {
            output.push_str(&format!("\n⚠️  Stopped early: {}\n", reason));
        }

        if let Some(took) = obj.get("took_ms").and_then(|v| v.as_u64()) {
            output.push_str(&format!("\n⏱️  Took: {}ms\n", took));
        }

        output
    }

    fn format_text(response: &Value) -> String {
        let mut output = String::new();
        let Some(obj) = response.as_object() else {
            return Self::format_json(response);
        };

        if let Some(success) = obj.get("success").and_then(|v| v.as_bool()) {
            output.push_str(if success {
                "✓ Success\n"
            } else {
                "✗ Failed\n"
            });
        }

        if let Some(op) = obj.get("operation").and_then(|v| v.as_str()) {
            output.push_str(&format!("{}\n", op));
        }

        if let Some(summary) = obj.get("summary") {
            output.push_str(&format!(
                "total: {}, success: {}, failed: {}\n",
                summary["total"], summary["success"], summary["failed"]
            ));
        }

        if let Some(took) = obj.get("took_ms").and_then(|v| v.as_u64()) {
            output.push_str(&format!("({} ms)\n", took));
        }

        output
    }

    fn format_plan_human(response: &Value) -> String {
        let mut output = String::new();
        let total = response["total"].as_u64().unwrap_or_default();
        output.push_str(&format!("🧪 Dry run: {} planned operation(s)\n", total));

        if let Some(by_kind) = response["by_kind"].as_object() {
            for (kind, count) in by_kind {
                output.push_str(&format!("  {}: {}\n", kind, count));
            }
        }

        if let Some(planned) = response["planned"].as_array()
            && !planned.is_empty()
        {
            output.push_str("\nPlanned:\n");
            for (i, description) in planned.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {}\n",
                    i + 1,
                    description.as_str().unwrap_or_default()
                ));
            }
        }

        if let Some(warnings) = response["warnings"].as_array()
            && !warnings.is_empty()
        {
            output.push_str("\n⚠️  Warnings:\n");
            for warning in warnings {
                if let Some(msg) = warning.as_str() {
                    output.push_str(&format!("  • {}\n", msg));
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivebatch_core::dry_run::{self, MemoryRecorder};

    fn report() -> BatchReport<String> {
        let mut report = BatchReport::new(3, false);
        report.record_success(2, "c".to_string(), "c".to_string());
        report.record_failure(1, "b".to_string(), &Error::not_found("b"));
        report.record_success(0, "a".to_string(), "a".to_string());
        report
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("human").unwrap(),
            OutputFormat::Human
        );
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_report_response_is_in_input_order() {
        let response = report_response("batch-delete", &report(), None);

        assert_eq!(response["success"], json!(false));
        assert_eq!(response["summary"]["total"], json!(3));
        assert_eq!(response["items"][0]["index"], json!(0));
        assert_eq!(response["items"][1]["index"], json!(2));
        assert_eq!(response["errors"][0]["identifier"], json!("b"));
        assert!(response["aborted"].is_null());
    }

    #[test]
    fn test_format_human() {
        let response = report_response("batch-delete", &report(), None);
        let formatted = ResponseFormatter::format(&response, OutputFormat::Human);

        assert!(formatted.contains("Operation: batch-delete"));
        assert!(formatted.contains("❌ Failed"));
        assert!(formatted.contains("Total: 3, Success: 2, Failed: 1"));
        assert!(formatted.contains("  - [1] b: Not found: b"));
    }

    #[test]
    fn test_format_human_aborted() {
        let err = Error::remote(503, "unavailable");
        let response = report_response("batch-upload", &report(), Some(&err));
        let formatted = ResponseFormatter::format(&response, OutputFormat::Human);
        assert!(formatted.contains("Stopped early: Remote error (503): unavailable"));
    }

    #[test]
    fn test_format_text() {
        let mut ok = BatchReport::new(1, false);
        ok.record_success(0, "a".to_string(), "a".to_string());
        let response = report_response("batch-upload", &ok, None);
        let formatted = ResponseFormatter::format(&response, OutputFormat::Text);

        assert!(formatted.contains("✓ Success"));
        assert!(formatted.contains("total: 1, success: 1, failed: 0"));
    }

    #[test]
    fn test_format_plan() {
        let recorder = MemoryRecorder::new();
        dry_run::record_delete(&recorder, "1", "a.txt", false);
        dry_run::record_delete(&recorder, "2", "b.txt", true);

        let response = dry_run_response(&recorder.summary());
        let formatted = ResponseFormatter::format_plan(&response, OutputFormat::Human);

        assert!(formatted.contains("2 planned operation(s)"));
        assert!(formatted.contains("  trash: 1"));
        assert!(formatted.contains("  delete: 1"));
        assert!(formatted.contains("1. Trash: a.txt"));

        let json = ResponseFormatter::format_plan(&response, OutputFormat::Json);
        assert!(json.contains("\"total\": 2"));
    }
}
