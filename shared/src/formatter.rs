//! Shared formatter for free-text AI analysis.
//!
//! One parsing routine feeds every render target: the analysis panel,
//! chat bubbles, and the PDF renderer. The two on-screen targets differ
//! only in the header-length threshold they pass in.

use serde::{Deserialize, Serialize};

pub const GENERAL_SECTION_TITLE: &str = "General Analysis";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Bullet(String),
    Numbered { number: u32, text: String },
    Paragraph(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<Line>,
}

/// Strips markdown emphasis, canonicalizes bullet markers to `• ` and
/// collapses runs of blank lines. Idempotent: normalizing already
/// normalized text returns it unchanged.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped = text.replace("**", "");

    let mut out = String::with_capacity(stripped.len());
    let mut blank_pending = false;
    let mut wrote_any = false;
    for raw_line in stripped.lines() {
        let line = raw_line.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            blank_pending = wrote_any;
            continue;
        }
        if blank_pending {
            out.push('\n');
            blank_pending = false;
        }
        if wrote_any {
            out.push('\n');
        }
        if let Some(rest) = trimmed.strip_prefix("* ").or_else(|| trimmed.strip_prefix("• ")) {
            out.push_str("• ");
            out.push_str(rest.trim_start());
        } else {
            out.push_str(trimmed);
        }
        wrote_any = true;
    }
    out
}

/// Matches `^\d+\.\s`, returning the number and the remaining text.
fn split_numbered(line: &str) -> Option<(u32, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let number = line[..digits].parse().ok()?;
    Some((number, rest.trim_start()))
}

fn classify(line: &str) -> Line {
    if let Some(text) = line.strip_prefix("• ") {
        Line::Bullet(text.trim_start().to_string())
    } else if let Some((number, text)) = split_numbered(line) {
        Line::Numbered {
            number,
            text: text.to_string(),
        }
    } else {
        Line::Paragraph(line.to_string())
    }
}

/// Splits normalized analysis text into named sections. A line ending in
/// `:` and shorter than `header_threshold` starts a new section; text
/// without any header becomes a single "General Analysis" section.
#[must_use]
pub fn parse_formatted_text(text: &str, header_threshold: usize) -> Vec<Section> {
    let normalized = normalize(text);

    let mut sections = Vec::new();
    let mut current = Section {
        title: GENERAL_SECTION_TITLE.to_string(),
        lines: Vec::new(),
    };

    for raw_line in normalized.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let is_header =
            line.ends_with(':') && line.len() < header_threshold && !line.starts_with("• ");
        if is_header {
            if !current.lines.is_empty() {
                sections.push(current);
            }
            current = Section {
                title: line.trim_end_matches(':').trim().to_string(),
                lines: Vec::new(),
            };
        } else {
            current.lines.push(classify(line));
        }
    }

    if !current.lines.is_empty() {
        sections.push(current);
    }
    sections
}

/// Confidence in `[0, 1]` rendered as a percentage with one decimal,
/// e.g. `0.945` becomes `94.5%`.
#[must_use]
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// Processing time rendered in seconds with one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_processing_time(ms: u64) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}

/// Binary-unit file size: two decimals with trailing zeros trimmed.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let mut rendered = format!("{value:.2}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.pop();
    }
    format!("{rendered} {}", UNITS[exponent])
}
