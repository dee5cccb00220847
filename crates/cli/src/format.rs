//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): labelled, e.g. `1) "Paracetamol"`, `(boolean) true`
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): Bare values, tab-separated, no type prefixes

use medcat_executor::{
    BuildReport, Error, HealthReport, IndexEntry, IndexStats, MirrorAction, Output,
};
use serde_json::Value;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Raw => format_raw(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    format_message_error(&err.to_string(), mode)
}

/// Format an error that happened before a command ran.
pub fn format_message_error(message: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": message
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", message)),
        OutputMode::Raw => message.to_string(),
        OutputMode::Human => format!("(error) {}", message),
    }
}

// =========================================================================
// JSON mode
// =========================================================================

fn format_json(output: &Output) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Raw mode
// =========================================================================

fn format_raw(output: &Output) -> String {
    match output {
        Output::Bool(b) => {
            if *b {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        Output::Values(values) => values.join("\n"),
        Output::MedicationPage { medications, .. } => medications
            .iter()
            .map(|e| {
                format!(
                    "{}\t{}",
                    e.id().unwrap_or_default(),
                    e.name().unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Record(v) => serde_json::to_string(v).unwrap_or_default(),
        Output::Stats(s) => format!("{}\t{}\t{}", s.total, s.version, s.generated_at),
        Output::Health(h) => format!("{}\t{}\t{}", h.status, h.medications_count, h.total_files),
        Output::Describe(info) => format!("{}\t{}", info.name, info.version),
        Output::Written { id } => id.clone(),
        Output::Mirrored(MirrorAction::Upserted { id }) => id.to_string(),
        Output::Mirrored(MirrorAction::Removed { id, .. }) => id.to_string(),
        Output::Applied { applied, total } => format!("{}\t{}", applied, total),
        Output::Built(r) => format!("{}\t{}\t{}", r.version, r.indexed, r.skipped.len()),
        Output::Exported { path, rows } => format!("{}\t{}", path, rows),
    }
}

// =========================================================================
// Human mode
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Bool(b) => format!("(boolean) {}", b),
        Output::Values(values) => format_string_list(values),
        Output::MedicationPage {
            medications,
            matched,
            limit,
            offset,
            ..
        } => format_page(medications, *matched, *limit, *offset),
        Output::Record(v) => format_record(v),
        Output::Stats(s) => format_stats(s),
        Output::Health(h) => format_health(h),
        Output::Describe(info) => {
            let mut lines = vec![
                format!("name: \"{}\"", info.name),
                format!("version: {}", info.version),
                "commands:".to_string(),
            ];
            for c in &info.commands {
                lines.push(format!("  {}", c));
            }
            lines.join("\n")
        }
        Output::Written { id } => format!("Wrote \"{}\"", id),
        Output::Mirrored(MirrorAction::Upserted { id }) => format!("Upserted \"{}\"", id),
        Output::Mirrored(MirrorAction::Removed { id, existed }) => {
            if *existed {
                format!("Removed \"{}\"", id)
            } else {
                format!("Removed \"{}\" (not present)", id)
            }
        }
        Output::Applied { applied, total } => {
            format!("Applied {} of {} change events", applied, total)
        }
        Output::Built(r) => format_build_report(r),
        Output::Exported { path, rows } => format!("Exported {} rows to {}", rows, path),
    }
}

fn format_string_list(items: &[String]) -> String {
    if items.is_empty() {
        "(empty list)".to_string()
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}) \"{}\"", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn format_page(medications: &[IndexEntry], matched: usize, limit: i64, offset: i64) -> String {
    let mut lines = Vec::with_capacity(medications.len() + 1);
    if medications.is_empty() {
        lines.push("(empty list)".to_string());
    }
    for (i, entry) in medications.iter().enumerate() {
        let mut line = format!(
            "{}) \"{}\" {}",
            offset.max(0) as usize + i + 1,
            entry.id().unwrap_or_default(),
            entry.name().unwrap_or_default()
        );
        let tags: Vec<&str> = [entry.category(), entry.status()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !tags.is_empty() {
            line.push_str(&format!(" [{}]", tags.join(", ")));
        }
        lines.push(line);
    }
    lines.push(format!(
        "(showing {} of {} matches, limit {}, offset {})",
        medications.len(),
        matched,
        limit,
        offset
    ));
    lines.join("\n")
}

fn format_record(v: &Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn format_stats(s: &IndexStats) -> String {
    let mut lines = vec![
        format!("total: {}", s.total),
        format!("version: {}", s.version),
        format!("generated_at: {}", s.generated_at),
    ];
    if let Some(pv) = s.projection_version {
        lines.push(format!("projection_version: {}", pv));
    }
    lines.join("\n")
}

fn format_health(h: &HealthReport) -> String {
    let mut lines = vec![
        format!("status: {}", h.status),
        format!("catalog_dir: {}", h.catalog_dir),
        format!("medications_count: {}", h.medications_count),
        format!("total_files: {}", h.total_files),
    ];
    if let Some(err) = &h.error {
        lines.push(format!("error: {}", err));
    }
    lines.join("\n")
}

fn format_build_report(r: &BuildReport) -> String {
    let mut lines = vec![format!(
        "Indexed {} of {} records (version {})",
        r.indexed, r.scanned, r.version
    )];
    if let Some(prev) = &r.previous_version {
        lines.push(format!("previous version: {}", prev));
    }
    if r.packages > 0 {
        lines.push(format!("packages: {}", r.packages));
    }
    for skip in &r.skipped {
        lines.push(format!("  skipped {}: {}", skip.source_ref, skip.reason));
    }
    lines.join("\n")
}
