//! Log sanitization for patient-linked identifiers.
//!
//! Every formatted log line passes through [`SanitizingMakeWriter`], which
//! redacts:
//! - assessment ids (UUIDs)
//! - SSN-like and MRN-like numbers
//! - email addresses and phone numbers
//! - labelled dates of birth (`DOB: 1961-04-12`, `birthdate=...`)
//!
//! Unlabelled dates such as log timestamps pass through.
//! Logging call sites should still avoid formatting intake values.
//! Input per line is capped; the writer's cap comes from `Config`.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

/// Default cap on bytes sanitized per call.
pub const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

/// Pattern and replacement, in application order.
const RULES: [(&str, &str); 6] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-ID]",
    ),
    (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
    (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s][0-9]{3}[-.\s][0-9]{4}\b",
        "[REDACTED-PHONE]",
    ),
    (
        r"(?i)\b(?:dob|date of birth|birth(?:date|day)?)\s*[:=]?\s*\d{4}-\d{2}-\d{2}\b",
        "[REDACTED-DOB]",
    ),
];

struct Redactor {
    any: RegexSet,
    rules: Vec<(Regex, &'static str)>,
}

fn redactor() -> &'static Redactor {
    static REDACTOR: OnceLock<Redactor> = OnceLock::new();
    REDACTOR.get_or_init(|| Redactor {
        any: RegexSet::new(RULES.iter().map(|(p, _)| *p)).expect("Valid regex set"),
        rules: RULES
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("Valid regex"), *r))
            .collect(),
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifying patterns in `input`, capped at the default size.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, DEFAULT_SANITIZE_MAX_BYTES)
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let redactor = redactor();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut out = prefix.to_string();
    for idx in redactor.any.matches(prefix).into_iter() {
        let (regex, replacement) = &redactor.rules[idx];
        out = regex.replace_all(&out, *replacement).into_owned();
    }
    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// Whether `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_pii(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, DEFAULT_SANITIZE_MAX_BYTES);
    redactor().any.is_match(prefix)
}

/// A `tracing_subscriber` writer factory that sanitizes each formatted
/// line before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
    max_bytes: usize,
}

impl<M> SanitizingMakeWriter<M> {
    /// Wrap `inner`, sanitizing at most `max_bytes` per line (0 means default).
    #[must_use]
    pub fn new(inner: M, max_bytes: usize) -> Self {
        let max_bytes = if max_bytes == 0 {
            DEFAULT_SANITIZE_MAX_BYTES
        } else {
            max_bytes
        };
        Self { inner, max_bytes }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
    max_bytes: usize,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W, max_bytes: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            max_bytes,
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let sanitized = sanitize_with_limit(&text, self.max_bytes);
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight is flushed once it exceeds the cap.
        if self.buffer.len() > self.max_bytes.saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer(), self.max_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_assessment_id() {
        let input = "Saved assessment 550e8400-e29b-41d4-a716-446655440000 to storage";
        let sanitized = sanitize(input);
        assert_eq!(sanitized, "Saved assessment [REDACTED-ID] to storage");
    }

    #[test]
    fn test_sanitize_ssn_and_mrn() {
        let sanitized = sanitize("SSN: 123-45-6789, MRN:12345678");
        assert!(sanitized.contains("[REDACTED-SSN]"));
        assert!(sanitized.contains("[REDACTED-MRN]"));
        assert!(!sanitized.contains("6789"));
    }

    #[test]
    fn test_sanitize_contact_details() {
        let sanitized = sanitize("Contact patient@clinic.org or 555-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_scores_and_timestamps_untouched() {
        let line = "2026-10-14T09:30:00.123Z INFO score=45 tier=MODERATE factors=1";
        assert_eq!(sanitize(line), line);
        assert!(!contains_pii(line));
    }

    #[test]
    fn test_sanitize_labelled_birth_dates() {
        for line in [
            "patient DOB: 1961-04-12 submitted",
            "birthdate=1961-04-12",
            "Date of birth 1961-04-12",
        ] {
            let sanitized = sanitize(line);
            assert!(sanitized.contains("[REDACTED-DOB]"), "{line}");
            assert!(!sanitized.contains("1961-04-12"), "{line}");
        }
    }

    #[test]
    fn test_writer_uses_configured_cap() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out, 4);
            writer.write_all(b"abcdef\n").expect("Should write");
        }
        let text = String::from_utf8(out).expect("Should be utf-8");
        assert_eq!(text, "abcd [TRUNCATED]");
    }

    #[test]
    fn test_zero_cap_means_default() {
        let make = SanitizingMakeWriter::new(std::io::sink, 0);
        assert_eq!(make.max_bytes, DEFAULT_SANITIZE_MAX_BYTES);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("µµµµµµ", 3);
        assert_eq!(sanitized, "µ [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out, DEFAULT_SANITIZE_MAX_BYTES);
            writer
                .write_all(b"id 550e8400-e29b-41d4-a716-446655440000\npartial")
                .expect("Should write");
            writer.flush().expect("Should flush");
        }
        let text = String::from_utf8(out).expect("Should be utf-8");
        assert_eq!(text, "id [REDACTED-ID]\npartial");
    }
}
