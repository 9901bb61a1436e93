use crate::core::charts::ChartKind;
use crate::domain::model::{Classification, GroupSummary, TransformResult};
use std::fmt::Write;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 960px; margin: 2em auto; }}
table {{ border-collapse: collapse; margin-bottom: 1.5em; }}
td, th {{ border: 1px solid #ccc; padding: 0.25em 0.75em; }}
.leap {{ color: #1a7f37; }}
.not-leap {{ color: #cf222e; }}
.error {{ color: #cf222e; font-weight: bold; }}
img {{ max-width: 100%; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape_html(title),
        body = body
    )
}

fn checker_form(value: &str) -> String {
    format!(
        r#"<h2>Leap Year Checker</h2>
<form method="get" action="/check">
<label>Enter a year: <input name="year" value="{}"></label>
<button type="submit">Check Leap Year</button>
</form>"#,
        escape_html(value)
    )
}

fn upload_form() -> &'static str {
    r#"<h2>Dataset</h2>
<form method="post" action="/upload" enctype="multipart/form-data">
<input type="file" name="file" accept=".csv">
<button type="submit">Upload CSV</button>
</form>
<form method="post" action="/reset"><button type="submit">Use sample dataset</button></form>"#
}

fn group_table(title: &str, groups: &[GroupSummary]) -> String {
    let mut html = format!(
        "<h3>{}</h3>\n<table><tr><th>Group</th><th>Total Years</th><th>Total Leap Years</th><th>Leap Year Ratio</th><th>Earliest Year</th><th>Latest Year</th></tr>\n",
        escape_html(title)
    );
    for g in groups {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&g.key),
            g.total_years,
            g.total_leap_years,
            g.leap_year_ratio,
            g.earliest_year,
            g.latest_year
        );
    }
    html.push_str("</table>\n");
    html
}

pub fn index(source: &str, analysis: Result<&TransformResult, String>) -> String {
    let mut body = checker_form("2024");
    body.push_str(upload_form());
    let _ = writeln!(body, "<p>Current dataset: <strong>{}</strong></p>", escape_html(source));

    match analysis {
        Err(message) => {
            let _ = writeln!(body, "<p class=\"error\">{}</p>", escape_html(&message));
        }
        Ok(result) => {
            let leap = result.records.iter().filter(|r| r.is_leap).count();
            let _ = writeln!(
                body,
                "<p>Rows: {} ({} leap years). Missing years: {}, duplicates removed: {}.</p>",
                result.records.len(),
                leap,
                result.cleaning.missing_years,
                result.cleaning.duplicates_removed
            );
            if !result.mismatches.is_empty() {
                let _ = writeln!(
                    body,
                    "<p class=\"error\">{} rows declare a leap status that contradicts the rule.</p>",
                    result.mismatches.len()
                );
            }

            body.push_str("<h3>First 10 Rows</h3>\n<table><tr><th>Year</th><th>Is_Leap_Year</th><th>Leap_Reason</th><th>Year_Normalized</th></tr>\n");
            for record in result.records.iter().take(10) {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.4}</td></tr>",
                    record.year, record.is_leap, record.reason, record.normalized
                );
            }
            body.push_str("</table>\n");

            body.push_str(&group_table("Grouped by Leap Reason", &result.groups_by_reason));
            body.push_str(&group_table("Grouped by Year Range", &result.groups_by_year));

            if !result.records.is_empty() {
                body.push_str("<h2>Visualization</h2>\n");
                for kind in ChartKind::ALL {
                    let _ = writeln!(
                        body,
                        "<p><img src=\"/charts/{0}\" alt=\"{0} chart\"></p>",
                        kind.name()
                    );
                }
            }
        }
    }

    layout("Leap Year Checker", &body)
}

pub fn check_result(year: i64, result: Classification) -> String {
    let verdict = if result.is_leap {
        format!(
            "<p class=\"leap\">✅ {} is a LEAP YEAR. ({})</p>",
            year, result.reason
        )
    } else {
        format!(
            "<p class=\"not-leap\">❌ {} is NOT a leap year. ({})</p>",
            year, result.reason
        )
    };
    let body = format!(
        "{}\n{}\n<p><a href=\"/\">Back to dataset</a></p>",
        verdict,
        checker_form(&year.to_string())
    );
    layout("Leap Year Checker", &body)
}

pub fn error(message: &str, suggestion: &str, input: &str) -> String {
    let body = format!(
        "<p class=\"error\">{}</p>\n<p>{}</p>\n{}",
        escape_html(message),
        escape_html(suggestion),
        checker_form(input)
    );
    layout("Leap Year Checker", &body)
}
