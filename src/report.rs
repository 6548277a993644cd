//! HTML report rendering
//!
//! One self-contained page summarizing a batch: a card per capture result,
//! in the same order the requests were supplied, each with the source URL,
//! the configuration used, an inline image referencing the screenshot by a
//! path relative to the report's own location, and the capture timestamp.

use crate::error::CaptureError;
use crate::request::CaptureResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render the full report document.
pub fn render_report(results: &[CaptureResult], report_path: &Path) -> String {
    let cards: Vec<String> = results
        .iter()
        .map(|result| render_card(result, report_path))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Capture Results</title>
<style>
body {{ font-family: 'Segoe UI', system-ui, sans-serif; background: #f8f9fa; padding: 2rem; }}
.container {{ max-width: 960px; margin: 0 auto; }}
.capture-card {{ background: white; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); margin-bottom: 2rem; overflow: hidden; }}
.capture-header {{ background: #f1f3f5; padding: 1rem; border-bottom: 1px solid #dee2e6; }}
.capture-header a {{ color: #228be6; text-decoration: none; word-break: break-all; }}
.capture-content {{ padding: 1.5rem; }}
.info-list {{ list-style: none; padding: 0; }}
.info-list li {{ margin-bottom: 0.5rem; color: #495057; }}
.screenshot {{ max-width: 100%; height: auto; border-radius: 4px; margin: 1rem 0; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
.timestamp {{ color: #868e96; font-size: 0.9rem; margin-top: 1rem; }}
.warning {{ color: #e8590c; }}
</style>
</head>
<body>
<div class="container">
<h1>Capture Results</h1>
{cards}
</div>
</body>
</html>
"#,
        cards = cards.join("\n")
    )
}

fn render_card(result: &CaptureResult, report_path: &Path) -> String {
    let request = &result.request;
    let url = escape(request.url.as_str());
    let image_src = relative_to_report(report_path, &result.screenshot_path);
    let image_src = escape(&image_src.display().to_string());

    let selector = request.selector.as_deref().unwrap_or("none");
    let viewport = request
        .viewport
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string());
    let filename = result
        .screenshot_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let warning = result
        .warning
        .as_deref()
        .map(|w| format!("<p class=\"warning\">Warning: {}</p>\n", escape(w)))
        .unwrap_or_default();

    format!(
        r#"<div class="capture-card">
<div class="capture-header"><a href="{url}" target="_blank">{url}</a></div>
<div class="capture-content">
<ul class="info-list">
<li><strong>Wait Time:</strong> {wait_time} seconds</li>
<li><strong>Selector:</strong> {selector}</li>
<li><strong>Full Page:</strong> {fullpage}</li>
<li><strong>Viewport Size:</strong> {viewport}</li>
<li><strong>Filename:</strong> {filename}</li>
</ul>
{warning}<img class="screenshot" src="{image_src}" alt="Screenshot of {url}">
<p class="timestamp">Captured at: {timestamp}</p>
</div>
</div>"#,
        wait_time = request.wait_time,
        selector = escape(selector),
        fullpage = if request.fullpage { "yes" } else { "no" },
        viewport = viewport,
        filename = escape(&filename),
        timestamp = result.captured_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Render and write the report, returning its path.
pub async fn write_report(
    results: &[CaptureResult],
    report_path: &Path,
) -> Result<PathBuf, CaptureError> {
    let html = render_report(results, report_path);
    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(report_path, html).await?;
    info!("Report written to {}", report_path.display());
    Ok(report_path.to_path_buf())
}

/// Express `target` relative to the report's directory so the `<img>`
/// references survive moving the output tree as a whole. Screenshots that
/// live outside the report's directory are reached by walking up with
/// `..` components.
fn relative_to_report(report_path: &Path, target: &Path) -> PathBuf {
    let base = report_path.parent().unwrap_or_else(|| Path::new(""));
    // One absolute and one relative path have no common root to diff from.
    if target.is_absolute() != base.is_absolute() {
        return target.to_path_buf();
    }

    let mut base_parts = base.components().peekable();
    let mut target_parts = target.components().peekable();
    while let (Some(b), Some(t)) = (base_parts.peek(), target_parts.peek()) {
        if b != t {
            break;
        }
        base_parts.next();
        target_parts.next();
    }

    let mut relative = PathBuf::new();
    for _ in base_parts {
        relative.push("..");
    }
    relative.extend(target_parts);
    relative
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{CaptureRequest, CaptureSpec};

    fn result_for(url: &str, filename: &str) -> CaptureResult {
        let request = CaptureRequest::new(CaptureSpec {
            url: url.to_string(),
            wait_time: 5,
            fullpage: true,
            ..Default::default()
        })
        .unwrap();
        CaptureResult {
            request,
            screenshot_path: PathBuf::from("screenshots").join(filename),
            captured_at: chrono::Local::now(),
            warning: None,
        }
    }

    #[test]
    fn test_report_preserves_input_order() {
        let results = vec![
            result_for("https://first.example.com", "a.png"),
            result_for("https://second.example.com", "b.png"),
            result_for("https://third.example.com", "c.png"),
        ];
        let html = render_report(&results, Path::new("capture_results.html"));

        let first = html.find("first.example.com").unwrap();
        let second = html.find("second.example.com").unwrap();
        let third = html.find("third.example.com").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_report_uses_relative_image_paths() {
        let results = vec![result_for("https://example.com", "shot.png")];
        let html = render_report(&results, Path::new("capture_results.html"));
        assert!(html.contains("src=\"screenshots/shot.png\""));
    }

    #[test]
    fn test_report_in_subdirectory_walks_up_to_screenshots() {
        // screenshots/ is a sibling of out/, so the image path must climb
        // out of the report's directory first.
        let results = vec![result_for("https://example.com", "shot.png")];
        let html = render_report(&results, Path::new("out/capture_results.html"));
        assert!(html.contains("src=\"../screenshots/shot.png\""));
    }

    #[test]
    fn test_relative_to_report_strips_shared_base() {
        let rel = relative_to_report(
            Path::new("out/report.html"),
            Path::new("out/screenshots/shot.png"),
        );
        assert_eq!(rel, PathBuf::from("screenshots/shot.png"));
    }

    #[test]
    fn test_relative_to_report_diverging_bases() {
        let rel = relative_to_report(
            Path::new("reports/nested/report.html"),
            Path::new("screenshots/shot.png"),
        );
        assert_eq!(rel, PathBuf::from("../../screenshots/shot.png"));

        let rel = relative_to_report(
            Path::new("/var/reports/report.html"),
            Path::new("/var/screenshots/shot.png"),
        );
        assert_eq!(rel, PathBuf::from("../screenshots/shot.png"));
    }

    #[test]
    fn test_report_shows_warnings() {
        let mut result = result_for("https://example.com", "shot.png");
        result.warning = Some("Selector '#gone' did not appear".to_string());
        let html = render_report(&[result], Path::new("capture_results.html"));
        assert!(html.contains("class=\"warning\""));
        assert!(html.contains("#gone"));
    }

    #[test]
    fn test_report_escapes_markup() {
        let results = vec![result_for("https://example.com/?a=1&b=2", "shot.png")];
        let html = render_report(&results, Path::new("capture_results.html"));
        assert!(html.contains("a=1&amp;b=2"));
    }
}
