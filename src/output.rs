//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! The primary display for every album is its title and positional index;
//! bucket keys are secondary context on indented lines. Images are listed by
//! filename (the filename is their identity) with their native dimensions and
//! what the run did with them.
//!
//! # Output Format
//!
//! ## Sync
//!
//! ```text
//! 001 Air Camera (2 photos)
//!     Album: air_camera
//!     Descriptor: configs/air_camera.json
//!     001 01.jpg 1200x800: reused
//!     002 02.jpg 800x1200: generated
//!     003 03.jpg: failed (Image processing failed: ...)
//!
//! Skipped
//!     empty_album (no images)
//!
//! Failed
//!     broken: Storage error: ...
//!
//! Manifest: 1 album
//!     air_camera
//! ```
//!
//! ## Trigger
//!
//! ```text
//! Touched alps → images/gallery/alps/01.jpg
//! Skipped empty_album (no images)
//! Touched 1 album, skipped 1, failed 0
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::sync::{AlbumReport, ImageStatus, SyncReport};
use crate::trigger::TouchOutcome;
use crate::types::Manifest;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Singular/plural noun for counts.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Format an album header: positional index + title + published photo count.
///
/// ```text
/// 001 Air Camera (5 photos)
/// ```
fn album_header(index: usize, title: &str, count: usize) -> String {
    format!("{} {} ({})", format_index(index), title, plural(count, "photo"))
}

/// Format one image line with its status.
///
/// ```text
/// 001 01.jpg 1200x800: reused
/// 002 02.jpg: failed (Source image not found: ...)
/// ```
fn image_line(index: usize, name: &str, status: &ImageStatus) -> String {
    let prefix = format!("{} {}", format_index(index), name);
    match status {
        ImageStatus::Reused(d) => format!("{prefix} {}x{}: reused", d.width, d.height),
        ImageStatus::Generated(d) => format!("{prefix} {}x{}: generated", d.width, d.height),
        ImageStatus::Failed(e) => format!("{prefix}: failed ({e})"),
    }
}

// ============================================================================
// Sync
// ============================================================================

/// Format a single album's report.
pub fn format_album_report(index: usize, report: &AlbumReport) -> Vec<String> {
    let mut lines = vec![
        album_header(index, &report.title, report.published()),
        format!("{}Album: {}", indent(1), report.album),
        format!("{}Descriptor: {}", indent(1), report.descriptor_key),
    ];
    for (i, image) in report.images.iter().enumerate() {
        lines.push(format!(
            "{}{}",
            indent(1),
            image_line(i + 1, &image.name, &image.status)
        ));
    }
    lines
}

/// Format a multi-album run: albums, skipped, failed, then the manifest.
pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, album) in report.albums.iter().enumerate() {
        lines.extend(format_album_report(i + 1, album));
    }

    if !report.skipped.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Skipped".to_string());
        for album in &report.skipped {
            lines.push(format!("{}{} (no images)", indent(1), album));
        }
    }

    if !report.failed.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Failed".to_string());
        for (album, error) in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), album, error));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.extend(format_manifest(&report.manifest));
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
}

/// Format the manifest: count header, then one album id per line.
pub fn format_manifest(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![format!("Manifest: {}", plural(manifest.len(), "album"))];
    for id in manifest {
        lines.push(format!("{}{}", indent(1), id));
    }
    lines
}

pub fn print_manifest(manifest: &Manifest) {
    for line in format_manifest(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Trigger
// ============================================================================

/// Format touch outcomes, one line each, plus a totals line.
pub fn format_touch_outcomes(outcomes: &[TouchOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    let (mut touched, mut skipped, mut failed) = (0, 0, 0);

    for outcome in outcomes {
        match outcome {
            TouchOutcome::Touched { album, key } => {
                touched += 1;
                lines.push(format!("Touched {} → {}", album, key));
            }
            TouchOutcome::Skipped { album } => {
                skipped += 1;
                lines.push(format!("Skipped {} (no images)", album));
            }
            TouchOutcome::Failed { album, error } => {
                failed += 1;
                lines.push(format!("Failed {}: {}", album, error));
            }
        }
    }

    lines.push(format!(
        "Touched {}, skipped {}, failed {}",
        plural(touched, "album"),
        skipped,
        failed
    ));
    lines
}

pub fn print_touch_outcomes(outcomes: &[TouchOutcome]) {
    for line in format_touch_outcomes(outcomes) {
        println!("{}", line);
    }
}
