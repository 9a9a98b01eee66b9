//! Incremental scanning for left-justified header blocks.
//!
//! A stateful scanner fed one closed line at a time, in document order.
//! Header lines accumulate into a block; the block is promoted to a message
//! boundary on the first non-header line after the critical headers
//! (From, Subject, Date-or-Sent) are all present.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::model::header::{Header, HeaderBlock, HeaderLabel};
use crate::model::line::Line;
use crate::scanner::ScanOutcome;

/// A header label at the start of a line, with a non-empty value after the
/// colon.
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(From|To|Subject|Date|Sent|Attachments|Cc|Bcc):\s+(.+)")
        .expect("header regex")
});

/// An email-address-shaped token (2-3 character TLD), the only wrapped
/// continuation we can recognize with any confidence.
static EMAIL_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+").expect("email regex"));

/// A header value that was cut off mid-list: more addresses follow.
static CONTINUED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;,]\s*$").expect("cont regex"));

/// Outlook/Exchange address-expansion artifacts, e.g.
/// `/O=EXCHANGELABS/OU=EXCHANGE ADMINISTRATIVE GROUP .../CN=RECIPIENTS/CN=...`.
/// These wrap onto their own line with no continuation hint on the line above.
static EXCHANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)CN=RECIPIENTS|/cn=|/o=exchange|/ou=").expect("exchange regex"));

/// State machine for left-justified header detection.
#[derive(Debug)]
pub struct LeftScanner {
    x_pos_tolerance: f64,
    headers: HeaderBlock,
    continuation: Option<HeaderLabel>,
    last_header: Option<HeaderLabel>,
}

impl LeftScanner {
    pub fn new(x_pos_tolerance: f64) -> Self {
        Self {
            x_pos_tolerance,
            headers: HeaderBlock::new(),
            continuation: None,
            last_header: None,
        }
    }

    /// Judge one line and update scanner state.
    pub fn scan_line(&mut self, line: &Line) -> ScanOutcome {
        if let Some(label) = self.scan_for_new_header(line) {
            self.last_header = Some(label);
            return ScanOutcome::Header(label);
        }

        // Not the start of a new header, but the previous header may have
        // announced a wrapped address list with a trailing ';' or ','.
        if let Some(label) = self.continuation {
            if EMAIL_TOKEN_RE.is_match(&line.text) {
                if let Some(h) = self.headers.get_mut(label) {
                    h.append_text(&line.text);
                    trace!(label = %label, "continuation line appended");
                    return ScanOutcome::Header(label);
                }
            }
        }

        // Exchange address expansions attach to the last address-bearing
        // header even without a continuation marker on the line above.
        if let Some(label) = self.last_header {
            if label.takes_addresses() && EXCHANGE_RE.is_match(&line.text) {
                if let Some(h) = self.headers.get_mut(label) {
                    h.append_text(&line.text);
                    trace!(label = %label, "address-expansion line appended");
                    return ScanOutcome::Header(label);
                }
            }
        }

        // A line that is neither header nor continuation disarms both
        // looser continuation rules.
        self.last_header = None;
        self.continuation = None;

        // The first non-header line after the critical headers are all
        // present is where the new message is declared.
        if self.headers.is_complete() {
            if let Some(start) = self.headers.start() {
                let headers = std::mem::take(&mut self.headers);
                self.reset();
                return ScanOutcome::EmailStart { start, headers };
            }
        }

        ScanOutcome::NonHeader
    }

    /// Discard all block state (headers found, continuation flags).
    pub fn reset(&mut self) {
        self.headers = HeaderBlock::new();
        self.continuation = None;
        self.last_header = None;
    }

    /// Whether any headers have accumulated in the current block.
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    fn scan_for_new_header(&mut self, line: &Line) -> Option<HeaderLabel> {
        let caps = HEADER_RE.captures(&line.text)?;
        let label = HeaderLabel::from_name(&caps[1])?;

        // All headers of one block share an x position; a header-looking
        // line at a different indent is a quoted email inside the body.
        for found in self.headers.values() {
            if (line.x - found.line.x).abs() > self.x_pos_tolerance {
                return None;
            }
        }

        let value = caps[2].to_string();
        self.headers.insert(Header {
            header: label,
            value,
            line: line.clone(),
        });

        self.continuation = CONTINUED_RE.is_match(&line.text).then_some(label);
        Some(label)
    }
}
