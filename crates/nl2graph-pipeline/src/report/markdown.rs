//! Markdown rendering of a `Report`.

use std::fmt::Write;

use super::Report;

pub fn render(report: &Report) -> String {
    let mut out = String::new();
    let s = &report.summary;
    // Writing to a String cannot fail.
    let _ = writeln!(out, "# Report: {}\n", report.run_id);
    let _ = writeln!(out, "**Total:** {}\n", report.total);
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|--------|-------|");
    let _ = writeln!(out, "| Count | {} |", s.count);
    let _ = writeln!(out, "| Errors | {} |", s.error_count);
    let _ = writeln!(out, "| Accuracy | {:.4} |", s.accuracy);
    let _ = writeln!(out, "| Avg F1 | {:.4} |", s.avg_f1);
    let _ = writeln!(out, "| Avg Precision | {:.4} |", s.avg_precision);
    let _ = writeln!(out, "| Avg Recall | {:.4} |", s.avg_recall);
    if s.total_input_tokens > 0 || s.total_duration > 0.0 {
        let _ = writeln!(out, "| Avg Duration (s) | {:.3} |", s.avg_duration);
        let _ = writeln!(out, "| Input Tokens | {} |", s.total_input_tokens);
        let _ = writeln!(out, "| Output Tokens | {} |", s.total_output_tokens);
    }
    out.push('\n');

    if !report.by_field.is_empty() {
        let _ = writeln!(out, "## By Field\n");
        for (field, groups) in &report.by_field {
            let _ = writeln!(out, "### {field}\n");
            let _ = writeln!(out, "| Value | Count | Errors | Accuracy | F1 |");
            let _ = writeln!(out, "|-------|-------|--------|----------|-----|");
            for (value, g) in groups {
                let _ = writeln!(
                    out,
                    "| {value} | {} | {} | {:.4} | {:.4} |",
                    g.count, g.error_count, g.accuracy, g.avg_f1
                );
            }
            out.push('\n');
        }
    }

    let errors = &report.errors;
    if errors.total_errors > 0 {
        let _ = writeln!(out, "## Errors\n");
        let _ = writeln!(out, "**Total Errors:** {}\n", errors.total_errors);
        if !errors.missing_relations.is_empty() {
            let _ = writeln!(out, "**Missing Relations:**");
            for rel in &errors.missing_relations {
                let _ = writeln!(out, "- {rel}");
            }
            out.push('\n');
        }
        if !errors.error_types.is_empty() {
            let _ = writeln!(out, "**Error Types:**");
            for (kind, count) in &errors.error_types {
                let _ = writeln!(out, "- {kind}: {count}");
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::report::Reporting;
    use nl2graph_core::{ExecutionResult, Method, Record, ResultRow, RunConfig};

    #[test]
    fn renders_summary_and_errors() {
        let run = RunConfig::new(Method::Llm, "cypher", "m");
        let mut row = ResultRow::empty(&run.key_for("q1"));
        row.exec = Some(ExecutionResult::failed("Connection refused"));
        let report = Reporting.generate(&[(Record::new("q1", "?", vec![]), row)], "demo", &[]);

        let md = report.to_markdown();
        assert!(md.starts_with("# Report: demo\n"));
        assert!(md.contains("| Errors | 1 |"));
        assert!(md.contains("- connection: 1"));
        assert!(!md.contains("## By Field"));
    }
}
