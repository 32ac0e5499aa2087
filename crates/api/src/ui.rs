//! HTML rendering of a snapshot for the `/ui` page.

use std::fmt::Write;

use eir_core::{Snapshot, Status};

/// Background color of a status badge.
fn status_color(status: Status) -> &'static str {
    match status {
        Status::Ok => "#2eb886",
        Status::Warning => "#daa038",
        Status::Critical => "#a30200",
        Status::Unknown => "#9e9e9e",
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn badge(status: Status) -> String {
    format!(
        r#"<span class="badge" style="background:{}">{}</span>"#,
        status_color(status),
        status
    )
}

/// Render a full HTML page for `snapshot`.
pub fn render(snapshot: &Snapshot) -> String {
    let host = escape(&snapshot.hostname);
    let mut rows = String::new();
    for probe in &snapshot.probes {
        // Writing to a String cannot fail.
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td><pre>{}</pre></td></tr>",
            escape(&probe.name),
            badge(probe.status),
            escape(&probe.detail),
        );
    }
    if snapshot.probes.is_empty() {
        rows.push_str(r#"<tr><td colspan="3">No probe results</td></tr>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{host} - Eir</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border-bottom: 1px solid #ddd; padding: 0.5em; text-align: left; vertical-align: top; }}
pre {{ margin: 0; white-space: pre-wrap; }}
.badge {{ color: #fff; padding: 0.2em 0.6em; border-radius: 0.3em; font-weight: bold; }}
</style>
</head>
<body>
<h1>{host} {overall}</h1>
<p>Eir version {version}</p>
<table>
<tr><th>Probe</th><th>Status</th><th>Details</th></tr>
{rows}
</table>
</body>
</html>
"#,
        overall = badge(snapshot.overall_status),
        version = escape(&snapshot.version),
    )
}
