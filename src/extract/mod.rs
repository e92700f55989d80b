//! Error extraction and secret redaction for console logs.
//!
//! Selects the lines worth sending to the analysis service: a fixed-size
//! tail window of the log plus every line matching a failure keyword,
//! deduplicated and kept in original order. Each selected line is scrubbed
//! of credential material before it leaves the process.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Default tail window size in lines.
pub const DEFAULT_WINDOW: usize = 50;

/// Failure keywords matched case-insensitively anywhere in a line.
static SIGNAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(error|exception|failed|fail|traceback)").expect("regex: signal tokens")
});

/// `password`/`token` plus the rest of the run, e.g. `password=abc123`
/// or `Token:xyz`. Crosses one `:`/`=` separator so a value after a
/// space (`Token: abc-xyz`) is scrubbed too. Each match collapses to
/// one marker.
static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:password|token)(?:\S*[:=]\s*\S+|\S*)").expect("regex: secret tokens")
});

/// Marker substituted for redacted content.
const REDACTION_MARKER: &str = "[REDACTED]";

/// Returns true if the line carries a failure keyword.
pub fn is_signal_line(line: &str) -> bool {
    SIGNAL_PATTERN.is_match(line)
}

/// Redact secrets from a single log line.
///
/// Idempotent: the marker itself contains neither keyword, so already
/// redacted text passes through unchanged.
pub fn redact_secrets(line: &str) -> String {
    SECRET_PATTERN.replace_all(line, REDACTION_MARKER).into_owned()
}

/// Extract the analyzable subset of a raw console log.
///
/// Selects the union of the last `window` lines and every signal line,
/// in original order with no duplicates. Selected lines are redacted and
/// trimmed, then joined with newlines. An empty log yields an empty
/// string.
pub fn extract(raw_log: &str, window: usize) -> String {
    let lines: Vec<&str> = raw_log.lines().collect();

    let tail_start = lines.len().saturating_sub(window);

    // BTreeSet gives set-union semantics and ascending iteration in one go.
    let mut selected: BTreeSet<usize> = (tail_start..lines.len()).collect();
    selected.extend(
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| is_signal_line(line))
            .map(|(i, _)| i),
    );

    selected
        .into_iter()
        .map(|i| redact_secrets(lines[i]).trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
