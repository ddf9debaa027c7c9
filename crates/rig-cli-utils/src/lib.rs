//! Shared utilities for the rootmotion-rs command-line tool

use console::style;
use glam::{Quat, Vec3};
use humansize::{DECIMAL, format_size};
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::{Cell, Row, Table};
use std::path::Path;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Create a standard progress bar
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Format a vector with fixed precision
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a rotation as XYZ Euler angles in degrees
pub fn format_rotation(q: Quat) -> String {
    // Round first so tiny negative angles do not print as "-0.0"
    let degrees = |angle: f32| (angle.to_degrees() * 10.0).round() / 10.0 + 0.0;
    let (x, y, z) = q.to_euler(glam::EulerRot::XYZ);
    format!("({:.1}°, {:.1}°, {:.1}°)", degrees(x), degrees(y), degrees(z))
}

/// Format a closed frame range
pub fn format_frames(start: i32, end: i32) -> String {
    let count = i64::from(end) - i64::from(start) + 1;
    format!("{start}..={end} ({count} frames)")
}

/// Shorten a path for display, keeping the file name
pub fn truncate_path(path: &str, max_len: usize) -> String {
    let chars = path.chars().count();
    if chars <= max_len {
        return path.to_string();
    }

    let filename = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let name_len = filename.chars().count();

    if name_len + 4 > max_len {
        // Not even ".../name" fits, keep the end of the name
        let keep = max_len.saturating_sub(3);
        let tail: String = filename.chars().skip(name_len.saturating_sub(keep)).collect();
        return format!("...{tail}");
    }

    // Keep as much of the leading directories as fits before ".../name"
    let budget = max_len - name_len - 4;
    let head: String = path.chars().take(budget).collect();
    let head = head.rsplit_once('/').map_or("", |(dir, _)| dir);
    if head.is_empty() {
        format!(".../{filename}")
    } else {
        format!("{head}/.../{filename}")
    }
}

/// Create a table with headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells.into_iter().map(|s| Cell::new(&s)).collect();
    table.add_row(Row::new(row_cells));
}

/// Green check mark followed by a message
pub fn success(message: &str) -> String {
    format!("{} {message}", style("✓").green().bold())
}

/// Yellow exclamation mark followed by a message
pub fn warning(message: &str) -> String {
    format!("{} {message}", style("!").yellow().bold())
}

/// Bold section heading
pub fn heading(text: &str) -> String {
    style(text).bold().underlined().to_string()
}
