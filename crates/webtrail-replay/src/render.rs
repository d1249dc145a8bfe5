//! Human-readable renderings of an [`ExecutionReport`].

use std::fmt::Write;
use std::path::Path;

use webtrail_protocols::{ActionResult, ExecutionReport};

fn status(result: &ActionResult) -> &'static str {
    if result.success { "PASS" } else { "FAIL" }
}

/// Plain-text summary for terminals and log files.
pub fn render_text(report: &ExecutionReport, title: &str) -> String {
    let stats = &report.overall_stats;
    let mut out = String::new();
    let _ = writeln!(out, "Workflow: {} ({})", title, report.workflow_id);
    let _ = writeln!(
        out,
        "Started {}  finished {}  ({} ms)",
        report.start_time.to_rfc3339(),
        report.end_time.to_rfc3339(),
        (report.end_time - report.start_time).num_milliseconds()
    );
    if report.cancelled {
        let _ = writeln!(out, "Run was cancelled before completion");
    }
    let _ = writeln!(out);

    for action in &report.actions {
        let _ = writeln!(
            out,
            "[{}] #{:<3} {:<9} {:<40} {:<9} conf {:.2}  retries {}  {} ms",
            status(action),
            action.index,
            action.action_type,
            truncate(&action.name, 40),
            action.method,
            action.confidence,
            action.retries,
            action.duration_ms
        );
        if let Some(error) = &action.error {
            let _ = writeln!(out, "        error: {}", error);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}/{} actions succeeded ({:.1}%), average {:.0} ms, average confidence {:.2}",
        stats.successful, stats.total, stats.success_rate, stats.average_time, stats.average_confidence
    );
    for (method, stat) in &report.method_stats {
        let _ = writeln!(out, "  {:<9} {} actions, {} ms", method, stat.count, stat.total_time);
    }

    if !report.errors.is_empty() {
        let _ = writeln!(out, "\nErrors:");
        for error in &report.errors {
            let _ = write!(out, "  [{}]", error.kind);
            if let Some(name) = &error.action_name {
                let _ = write!(out, " {}", name);
            }
            let _ = writeln!(out, ": {}", error.message);
            if let Some(url) = &error.url {
                let _ = writeln!(out, "    url: {}", url);
            }
            if let Some(shot) = &error.screenshot {
                let _ = writeln!(out, "    screenshot: {}", shot.display());
            }
        }
    }
    out
}

/// Self-contained HTML page. Screenshot links are relative to the report's
/// own directory.
pub fn render_html(report: &ExecutionReport, title: &str) -> String {
    let stats = &report.overall_stats;
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\n<style>{STYLE}</style></head><body>\n",
        title = escape(title)
    );
    let _ = writeln!(out, "<h1>{}</h1>", escape(title));
    let _ = writeln!(
        out,
        "<p class=\"meta\">{} &middot; {} &rarr; {}{}</p>",
        escape(&report.workflow_id),
        report.start_time.to_rfc3339(),
        report.end_time.to_rfc3339(),
        if report.cancelled { " &middot; <span class=\"badge fail\">cancelled</span>" } else { "" }
    );
    let _ = writeln!(
        out,
        "<p class=\"summary\">{}/{} succeeded ({:.1}%) &middot; avg {:.0} ms &middot; avg confidence {:.2}</p>",
        stats.successful, stats.total, stats.success_rate, stats.average_time, stats.average_confidence
    );

    out.push_str(
        "<table>\n<tr><th>#</th><th>Status</th><th>Action</th><th>Type</th><th>Method</th>\
         <th>Confidence</th><th>Retries</th><th>Time</th><th>Screenshots</th></tr>\n",
    );
    for action in &report.actions {
        let badge = if action.success { "pass" } else { "fail" };
        let _ = write!(
            out,
            "<tr><td>{}</td><td><span class=\"badge {}\">{}</span></td><td>{}",
            action.index,
            badge,
            status(action),
            escape(&action.name)
        );
        if let Some(error) = &action.error {
            let _ = write!(out, "<div class=\"error\">{}</div>", escape(error));
        }
        let _ = write!(
            out,
            "</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{} ms</td><td>",
            action.action_type, action.method, action.confidence, action.retries, action.duration_ms
        );
        if let Some(artifacts) = &action.artifacts {
            for (label, path) in [
                ("before", &artifacts.before),
                ("highlight", &artifacts.highlight),
                ("after", &artifacts.after),
            ] {
                if let Some(path) = path {
                    let _ = write!(out, "{} ", link(label, path));
                }
            }
        }
        out.push_str("</td></tr>\n");
    }
    out.push_str("</table>\n");

    if !report.errors.is_empty() {
        out.push_str("<h2>Errors</h2>\n<ul>\n");
        for error in &report.errors {
            let _ = write!(
                out,
                "<li><span class=\"badge fail\">{}</span> {}",
                error.kind,
                escape(&error.message)
            );
            if let Some(url) = &error.url {
                let _ = write!(out, " <code>{}</code>", escape(url));
            }
            if let Some(shot) = &error.screenshot {
                let _ = write!(out, " {}", link("screenshot", shot));
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</body></html>\n");
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{border-bottom:1px solid #ddd;padding:6px 8px;text-align:left;vertical-align:top}\
.badge{border-radius:4px;padding:2px 6px;font-size:0.8em;color:#fff}\
.pass{background:#2e7d32}.fail{background:#c62828}\
.error{color:#c62828;font-size:0.85em}.meta{color:#666}";

fn link(label: &str, path: &Path) -> String {
    let target = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("<a href=\"{}\">{}</a>", escape(&target), label)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;
    use webtrail_protocols::{
        ActionArtifacts, ActionType, ErrorKind, ErrorRecord, ResolutionMethod,
    };

    fn report() -> ExecutionReport {
        let start = Utc::now();
        let ok = ActionResult {
            index: 0,
            name: "Click \"Sign in\"".into(),
            action_type: ActionType::Click,
            success: true,
            method: ResolutionMethod::Selector,
            confidence: 1.0,
            retries: 0,
            duration_ms: 120,
            error: None,
            artifacts: Some(ActionArtifacts {
                before: Some(PathBuf::from("/tmp/debug/wf/000-before.png")),
                after: None,
                highlight: None,
            }),
        };
        let failed = ActionResult {
            index: 1,
            name: "Click <Vanished>".into(),
            action_type: ActionType::Click,
            success: false,
            method: ResolutionMethod::None,
            confidence: 0.0,
            retries: 2,
            duration_ms: 900,
            error: Some("Resolution failed".into()),
            artifacts: None,
        };
        let mut error = ErrorRecord::new(ErrorKind::ResolutionFailure, "Resolution failed").for_action(1, "Click <Vanished>");
        error.url = Some("https://example.com/login".into());
        error.screenshot = Some(PathBuf::from("/tmp/artifacts/wf/action-001-failure.png"));
        ExecutionReport::from_results("wf", start, start + Duration::milliseconds(1020), vec![ok, failed], vec![error], false)
    }

    #[test]
    fn test_text_lists_every_action_and_error() {
        let text = render_text(&report(), "Login");
        assert!(text.contains("Workflow: Login (wf)"));
        assert!(text.contains("[PASS] #0"));
        assert!(text.contains("[FAIL] #1"));
        assert!(text.contains("retries 2"));
        assert!(text.contains("1/2 actions succeeded (50.0%)"));
        assert!(text.contains("url: https://example.com/login"));
    }

    #[test]
    fn test_html_escapes_and_links_relative() {
        let html = render_html(&report(), "Login <test>");
        assert!(html.contains("<title>Login &lt;test&gt;</title>"));
        assert!(html.contains("Click &lt;Vanished&gt;"));
        assert!(html.contains("<a href=\"000-before.png\">before</a>"));
        assert!(html.contains("<a href=\"action-001-failure.png\">screenshot</a>"));
        assert!(html.contains("badge pass"));
        assert!(html.contains("badge fail"));
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long action name", 10), "a very ...");
    }
}
