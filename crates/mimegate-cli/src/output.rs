//! Text and JSON rendering of scan results.

use std::path::Path;

use colored::Colorize;
use mimegate_core::{ConfigWarning, Detection, ScanOutcome, ScanReport};
use rust_i18n::t;
use serde_json::{Value, json};

fn status_label(outcome: &ScanOutcome) -> String {
    match outcome {
        ScanOutcome::Ok => t!("cli.scan.ok").green().to_string(),
        ScanOutcome::Rejected(_) => t!("cli.scan.rejected").red().bold().to_string(),
        ScanOutcome::Inconclusive(_) => t!("cli.scan.inconclusive").yellow().bold().to_string(),
    }
}

fn detection_label(detection: &Detection) -> String {
    let mut label = detection.normalized.to_string();
    if detection.raw != detection.normalized {
        label = format!("{} ({})", label, detection.raw);
    }
    if detection.degraded {
        label = format!("{} [{}]", label, t!("cli.scan.degraded"));
    }
    label
}

/// Human-readable report: one line per file, messages for blocked files,
/// then a summary.
pub fn format_scan_text(report: &ScanReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        let detected = file
            .detection
            .as_ref()
            .map(detection_label)
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>8}  {}  {}\n",
            status_label(&file.outcome),
            file.path.display(),
            detected.dimmed()
        ));
        if let Some(message) = file.outcome.message() {
            out.push_str(&format!("          {}\n", message));
        }
    }
    out.push('\n');
    out.push_str(&t!(
        "cli.scan.summary",
        total = report.total(),
        accepted = report.accepted,
        rejected = report.rejected,
        inconclusive = report.inconclusive,
        ms = report.elapsed_ms
    ));
    out.push('\n');
    out
}

/// Machine-readable report including the rendered messages.
pub fn scan_json(report: &ScanReport) -> Value {
    let files: Vec<Value> = report
        .files
        .iter()
        .map(|file| {
            json!({
                "path": file.path,
                "status": file.outcome.label(),
                "detection": file.detection,
                "outcome": file.outcome,
                "message": file.outcome.message(),
            })
        })
        .collect();
    json!({
        "files": files,
        "summary": {
            "total": report.total(),
            "accepted": report.accepted,
            "rejected": report.rejected,
            "inconclusive": report.inconclusive,
            "elapsed_ms": report.elapsed_ms,
        }
    })
}

pub fn format_detection_text(path: &Path, detection: &Detection) -> String {
    format!(
        "{}: {}  {}",
        path.display(),
        detection_label(detection),
        detection.sniffer.dimmed()
    )
}

pub fn detection_json(path: &Path, detection: &Detection) -> Value {
    json!({ "path": path, "detection": detection })
}

pub fn format_warning(warning: &ConfigWarning) -> String {
    let mut line = format!(
        "{}: {}: {}",
        t!("cli.config.warning").yellow().bold(),
        warning.field,
        warning.message
    );
    if let Some(suggestion) = &warning.suggestion {
        line.push_str(&format!("\n  {}: {}", t!("cli.config.suggestion").cyan(), suggestion));
    }
    line
}
