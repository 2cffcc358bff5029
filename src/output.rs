//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every entity is shown as a header line (positional index + identity)
//! followed by indented context lines, the same way for every command.
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! 001 IMG_0042.jpg (1920x1440)
//!     Source: photos/IMG_0042.png
//!     2048.0KB → 312.4KB, re-encoded
//! 002 small.jpg (640x480)
//!     Source: photos/small.jpg
//!     120.5KB, kept
//!
//! Skipped
//!     notes.txt: unsupported type
//!
//! Compressed 2 images (1 re-encoded)
//! ```
//!
//! ## Spot
//!
//! ```text
//! 駅前広場
//!     Id: 6f1c0c52-...
//!     Rating: 8 【A級】主要駅・スーパー（主力）
//!     Location: 35.68, 139.76
//!     Best time: 08:00, 17:00
//!     Audience: 主婦, 学生
//!     Car: 一瞬の乗降のみ可 (brief_stop)
//!     Images
//!         001 https://cdn.example.com/spots/1717000000000-a.jpg
//!     Street View: https://www.google.com/maps/@?api=1&...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{CompressedFile, Rejection};
use crate::spot::{Spot, rating_description, time_slot_label};
use crate::store::{HistoryOperation, SpotHistory};
use std::path::PathBuf;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size: KB below one MiB, MB above.
fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Compress
// ============================================================================

/// One compressed input, as reported by `compress`.
#[derive(Debug, Clone)]
pub struct CompressOutcome {
    pub source: PathBuf,
    pub original_size: u64,
    pub output: Option<PathBuf>,
    pub compressed: CompressedFile,
}

pub fn format_rejection(name: &str, rejection: &Rejection) -> String {
    match rejection {
        Rejection::UnsupportedType(_) => format!("{}: unsupported type", name),
        Rejection::TooLarge { size, limit } => format!(
            "{}: {} exceeds {} limit",
            name,
            format_size(*size),
            format_size(*limit)
        ),
    }
}

pub fn format_compress_report(
    outcomes: &[CompressOutcome],
    skipped: &[(String, Rejection)],
) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, outcome) in outcomes.iter().enumerate() {
        let file = &outcome.compressed.file;
        let header = match outcome.compressed.dimensions {
            Some(d) => format!("{} {} ({}x{})", format_index(i + 1), file.name, d.width, d.height),
            None => format!("{} {}", format_index(i + 1), file.name),
        };
        lines.push(header);
        lines.push(format!("{}Source: {}", indent(1), outcome.source.display()));

        if outcome.compressed.recompressed {
            lines.push(format!(
                "{}{} → {}, re-encoded",
                indent(1),
                format_size(outcome.original_size),
                format_size(file.size())
            ));
        } else {
            lines.push(format!("{}{}, kept", indent(1), format_size(file.size())));
        }

        if let Some(ref output) = outcome.output {
            lines.push(format!("{}Output: {}", indent(1), output.display()));
        }
    }

    if !skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for (name, rejection) in skipped {
            lines.push(format!("{}{}", indent(1), format_rejection(name, rejection)));
        }
    }

    let reencoded = outcomes.iter().filter(|o| o.compressed.recompressed).count();
    lines.push(String::new());
    lines.push(format!(
        "Compressed {} ({} re-encoded)",
        plural(outcomes.len(), "image"),
        reencoded
    ));
    lines
}

pub fn print_compress_report(outcomes: &[CompressOutcome], skipped: &[(String, Rejection)]) {
    for line in format_compress_report(outcomes, skipped) {
        println!("{}", line);
    }
}

// ============================================================================
// Spots
// ============================================================================

/// Full detail view of one spot.
pub fn format_spot(spot: &Spot) -> Vec<String> {
    let r = &spot.record;
    let ctx = indent(1);
    let mut lines = vec![r.title.clone(), format!("{}Id: {}", ctx, spot.id)];

    match rating_description(r.rating) {
        Some(desc) => lines.push(format!("{}Rating: {} {}", ctx, r.rating, desc)),
        None => lines.push(format!("{}Rating: {}", ctx, r.rating)),
    }
    lines.push(format!("{}Location: {}, {}", ctx, r.lat, r.lng));

    if let Some(ref desc) = r.description {
        lines.push(format!("{}{}", ctx, truncate_desc(desc.trim(), 60)));
    }
    if let Some(ref hours) = r.best_time {
        let labels: Vec<String> = hours.iter().map(|h| time_slot_label(*h)).collect();
        lines.push(format!("{}Best time: {}", ctx, labels.join(", ")));
    }
    if let Some(ref audience) = r.audience_attributes {
        lines.push(format!("{}Audience: {}", ctx, audience.join(", ")));
    }
    lines.push(format!(
        "{}Car: {} ({})",
        ctx,
        r.car_accessibility.label(),
        r.car_accessibility
    ));

    lines.push(format!("{}Images", ctx));
    for (i, url) in r.images.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(2), format_index(i + 1), url));
    }
    lines.push(format!("{}Street View: {}", ctx, spot.street_view_url()));
    lines
}

pub fn print_spot(spot: &Spot) {
    for line in format_spot(spot) {
        println!("{}", line);
    }
}

/// One header line per spot with its id as context.
pub fn format_spot_list(spots: &[Spot]) -> Vec<String> {
    if spots.is_empty() {
        return vec!["No spots".to_string()];
    }
    let mut lines = Vec::new();
    for (i, spot) in spots.iter().enumerate() {
        lines.push(format!(
            "{} {} (rating {}, {})",
            format_index(i + 1),
            spot.record.title,
            spot.record.rating,
            plural(spot.record.images.len(), "photo")
        ));
        lines.push(format!("{}Id: {}", indent(1), spot.id));
    }
    lines
}

pub fn print_spot_list(spots: &[Spot]) {
    for line in format_spot_list(spots) {
        println!("{}", line);
    }
}

/// Change history of one spot, oldest first.
pub fn format_history(history: &[SpotHistory]) -> Vec<String> {
    let mut lines = vec!["History".to_string()];
    for (i, entry) in history.iter().enumerate() {
        let op = match entry.operation {
            HistoryOperation::Insert => "created",
            HistoryOperation::Update => "updated",
            HistoryOperation::Delete => "deleted",
        };
        lines.push(format!(
            "{}{} {} {} ({})",
            indent(1),
            format_index(i + 1),
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            op,
            entry.snapshot.record.title
        ));
    }
    lines
}

pub fn print_history(history: &[SpotHistory]) {
    for line in format_history(history) {
        println!("{}", line);
    }
}
