//! Report assembly and rendering
//!
//! Drives the history walk, fetches and classifies console logs for included
//! failing builds, joins the results into display-ready rows and renders
//! them as a bordered text table or JSON. The report is always best-effort:
//! per-build problems degrade single rows, never the whole run.

use crate::catalog::Catalog;
use crate::classify::classify;
use crate::models::{BuildDecision, ReportOutput, ReportRow, ReportSummary, ReportWindow};
use crate::server::{BuildServer, ServerError};
use crate::walk::walk_history;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Run one report: walk the history, classify the console logs of included
/// non-success builds, assemble the rows.
///
/// The interrupt flag is checked between walk steps; when it is set the walk
/// stops and the partial report is assembled with `interrupted` marked in
/// the summary. A failed console fetch keeps the build's row with an empty
/// cause set (an unexplained failure is more useful reported than dropped).
pub fn run_report<S: BuildServer + ?Sized>(
    server: &S,
    catalog: &Catalog,
    job: &str,
    window: ReportWindow,
    interrupted: &AtomicBool,
) -> Result<ReportOutput, ServerError> {
    let mut decisions: Vec<BuildDecision> = Vec::new();
    let mut classifications: BTreeMap<u32, BTreeSet<String>> = BTreeMap::new();
    let mut summary = ReportSummary::default();

    let mut walk = walk_history(server, job, window)?;
    loop {
        if interrupted.load(Ordering::Relaxed) {
            summary.interrupted = Some(true);
            break;
        }
        let Some(item) = walk.next() else { break };
        let decision = item?;

        // Only failed builds get classified; a successful build that is in
        // the report (include_success) keeps an empty cause column.
        if decision.included && !decision.info.result.is_success() {
            let number = decision.info.number;
            match server.console_text(job, number) {
                Ok(text) => {
                    classifications.insert(number, classify(&text, catalog));
                    summary.classified += 1;
                }
                Err(err) => {
                    warn!(job, number, error = %err, "console log unavailable");
                    classifications.insert(number, BTreeSet::new());
                    summary.log_fetch_failures += 1;
                }
            }
        }
        decisions.push(decision);
    }

    summary.skipped_missing = walk.skipped_missing();
    summary.visited = decisions.len();
    summary.included = decisions.iter().filter(|d| d.included).count();

    let rows = assemble(&decisions, &classifications, catalog);
    Ok(ReportOutput { rows, summary })
}

/// Join build decisions with classification results. Only included decisions
/// become rows; row order follows the walk (descending build number).
pub fn assemble(
    decisions: &[BuildDecision],
    classifications: &BTreeMap<u32, BTreeSet<String>>,
    catalog: &Catalog,
) -> Vec<ReportRow> {
    decisions
        .iter()
        .filter(|d| d.included)
        .map(|d| {
            let causes: Vec<String> = classifications
                .get(&d.info.number)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            let bug_urls = causes
                .iter()
                .map(|name| {
                    catalog
                        .get(name)
                        .and_then(|sig| sig.bug_url())
                        .unwrap_or("")
                        .to_string()
                })
                .collect();
            ReportRow {
                job: d.info.job.clone(),
                number: d.info.number,
                result: d.info.result.as_str().to_string(),
                causes,
                bug_urls,
                url: d.info.url.clone(),
                display_name: d.info.display_name.clone().unwrap_or_default(),
            }
        })
        .collect()
}

const HEADERS: [&str; 7] = [
    "Job Name",
    "Build No.",
    "Status",
    "Cause",
    "Bug URL(s)",
    "Build URL",
    "Build Info",
];

fn row_cells(row: &ReportRow) -> [String; 7] {
    [
        row.job.clone(),
        row.number.to_string(),
        row.result.clone(),
        row.causes.join("\n"),
        row.bug_urls.join("\n"),
        row.url.clone(),
        row.display_name.clone(),
    ]
}

/// Draw the report rows as a bordered plain-text table. Cells may span
/// multiple lines (one cause or bug URL per line).
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut table: Vec<[String; 7]> = vec![HEADERS.map(str::to_string)];
    table.extend(rows.iter().map(row_cells));

    let mut widths = [0usize; 7];
    for row in &table {
        for (i, cell) in row.iter().enumerate() {
            for line in cell.lines() {
                widths[i] = widths[i].max(line.chars().count());
            }
        }
    }

    let mut separator = String::from("+");
    for width in widths {
        separator.push_str(&"-".repeat(width + 2));
        separator.push('+');
    }
    separator.push('\n');

    let mut out = separator.clone();
    for row in &table {
        let height = row
            .iter()
            .map(|cell| cell.lines().count().max(1))
            .max()
            .unwrap_or(1);
        for line_idx in 0..height {
            out.push('|');
            for (i, cell) in row.iter().enumerate() {
                let line = cell.lines().nth(line_idx).unwrap_or("");
                out.push(' ');
                out.push_str(line);
                out.push_str(&" ".repeat(widths[i] - line.chars().count()));
                out.push_str(" |");
            }
            out.push('\n');
        }
        out.push_str(&separator);
    }
    out
}

/// Format the full report for human consumption: the table (or a short
/// notice when nothing is in the window) followed by the run summary.
pub fn render_human(output: &ReportOutput) -> String {
    let mut text = String::new();
    if output.rows.is_empty() {
        text.push_str("No builds in the report window.\n");
    } else {
        text.push_str(&render_table(&output.rows));
    }

    let summary = &output.summary;
    text.push_str("\nReport Summary:\n");
    text.push_str(&format!("  Visited: {} builds\n", summary.visited));
    text.push_str(&format!("  Included: {} builds\n", summary.included));
    text.push_str(&format!("  Classified: {} console logs\n", summary.classified));
    if summary.skipped_missing > 0 {
        text.push_str(&format!(
            "  Skipped (missing): {} builds\n",
            summary.skipped_missing
        ));
    }
    if summary.log_fetch_failures > 0 {
        text.push_str(&format!(
            "  Console logs unavailable: {}\n",
            summary.log_fetch_failures
        ));
    }
    if summary.interrupted == Some(true) {
        text.push_str("  Status: Interrupted by user\n");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildInfo, BuildResult};
    use chrono::Utc;

    fn decision(number: u32, result: BuildResult, included: bool) -> BuildDecision {
        BuildDecision {
            info: BuildInfo {
                job: "example_job".to_string(),
                number,
                result,
                timestamp: Utc::now(),
                url: format!("http://ci/job/example_job/{}/", number),
                display_name: Some(format!("#{number}")),
            },
            included,
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_toml_str(
            r#"
[infra-oom]
literals = ["OutOfMemoryError"]
bug = { url = "https://bugs.example.com/1892011" }

[mirror-timeout]
literals = ["Timeout when fetching from mirror"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn assemble_keeps_only_included_decisions_in_walk_order() {
        let decisions = vec![
            decision(50, BuildResult::Success, false),
            decision(49, BuildResult::Failure, true),
            decision(48, BuildResult::Failure, false),
        ];
        let rows = assemble(&decisions, &BTreeMap::new(), &catalog());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 49);
    }

    #[test]
    fn assemble_joins_causes_with_their_bug_urls() {
        let decisions = vec![decision(49, BuildResult::Failure, true)];
        let mut classifications = BTreeMap::new();
        classifications.insert(
            49,
            BTreeSet::from([
                "infra-oom".to_string(),
                "mirror-timeout".to_string(),
            ]),
        );
        let rows = assemble(&decisions, &classifications, &catalog());
        assert_eq!(rows[0].causes, vec!["infra-oom", "mirror-timeout"]);
        // One URL slot per cause; empty string where no bug is tracked.
        assert_eq!(
            rows[0].bug_urls,
            vec!["https://bugs.example.com/1892011", ""]
        );
    }

    #[test]
    fn assemble_defaults_to_empty_causes() {
        let decisions = vec![decision(50, BuildResult::Success, true)];
        let rows = assemble(&decisions, &BTreeMap::new(), &catalog());
        assert!(rows[0].causes.is_empty());
        assert!(rows[0].bug_urls.is_empty());
    }

    #[test]
    fn table_renders_headers_and_multi_line_cells() {
        let row = ReportRow {
            job: "example_job".to_string(),
            number: 49,
            result: "FAILURE".to_string(),
            causes: vec!["infra-oom".to_string(), "mirror-timeout".to_string()],
            bug_urls: vec!["https://bugs.example.com/1892011".to_string(), String::new()],
            url: "http://ci/job/example_job/49/".to_string(),
            display_name: "#49".to_string(),
        };
        let table = render_table(&[row]);
        assert!(table.contains("Job Name"));
        assert!(table.contains("infra-oom"));
        assert!(table.contains("mirror-timeout"));
        // Two causes means the data row spans two lines plus borders.
        assert!(table.lines().count() >= 6);
        // All lines between borders are equally wide.
        let widths: BTreeSet<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths.len(), 1);
    }

    #[test]
    fn human_rendering_reports_an_empty_window() {
        let output = ReportOutput {
            rows: vec![],
            summary: ReportSummary::default(),
        };
        let text = render_human(&output);
        assert!(text.contains("No builds in the report window."));
        assert!(text.contains("Report Summary:"));
    }
}
