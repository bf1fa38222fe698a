//! Rendering of check reports for the terminal or for other programs.

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;
use vaultmark_check::CheckReport;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One line per issue, with fix suggestions and a summary
    #[default]
    Human,
    /// The full report as pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: human, json",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &CheckReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => Self::format_human(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    fn format_json(report: &CheckReport) -> String {
        report.to_json().unwrap_or_else(|e| {
            log::error!("Failed to serialize report: {}", e);
            "{}".to_string()
        })
    }

    fn format_human(report: &CheckReport) -> String {
        let mut out = String::new();

        for issue in &report.issues {
            let _ = writeln!(out, "{}", issue);
            push_fix(&mut out, issue.fix_command.as_deref(), issue.fix_hint.as_deref());
        }
        for issue in &report.schema_issues {
            let _ = writeln!(out, "{}", issue);
            push_fix(&mut out, issue.fix_command.as_deref(), issue.fix_hint.as_deref());
        }

        if report.total_issues() > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}", Summary(report));
        out.push('\n');
        out
    }
}

fn push_fix(out: &mut String, command: Option<&str>, hint: Option<&str>) {
    match (command, hint) {
        (Some(command), _) => {
            let _ = writeln!(out, "  fix: {}", command);
        }
        (None, Some(hint)) => {
            let _ = writeln!(out, "  hint: {}", hint);
        }
        (None, None) => {}
    }
}

/// `Checked 3 files: 1 error, 2 warnings`
struct Summary<'a>(&'a CheckReport);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        write!(
            f,
            "Checked {} {}: ",
            report.files_checked,
            plural(report.files_checked, "file", "files")
        )?;
        if report.error_count == 0 && report.warning_count == 0 {
            return f.write_str("no issues");
        }
        write!(
            f,
            "{} {}, {} {}",
            report.error_count,
            plural(report.error_count, "error", "errors"),
            report.warning_count,
            plural(report.warning_count, "warning", "warnings")
        )
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
