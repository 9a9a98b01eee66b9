//! Batch scanning for right-justified header blocks.
//!
//! Some export formats right-align the header labels, so the label column's
//! *right* edge is the alignment cue, and the left x of each label line
//! varies with the label's width. That makes incremental left-x gating
//! useless; instead the whole page's line list is scanned in one pass with
//! look-ahead. When the pass is inconclusive the caller falls back to the
//! left-justified scanner over the same lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

use crate::model::header::{Header, HeaderBlock, HeaderLabel};
use crate::model::line::Line;

/// A bare header label as a line's first word, e.g. `From:`.
static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(From|To|Subject|Date|Sent|Attachments|Cc|Bcc):$").expect("label regex")
});

/// Knobs for the batch pass.
#[derive(Debug, Clone, Copy)]
pub struct RightScanOptions {
    /// Tolerance for the shared right edge of the label column.
    pub x_pos_tolerance: f64,
    /// Lines tolerated above the first label line (masthead allowance).
    pub max_non_headers_before_block: usize,
    /// Maximum run of non-label lines inside the block before the scan stops.
    pub max_non_headers_in_block: usize,
}

/// Scan one page's ordered line list for a right-justified header block.
///
/// Returns the complete block, or `None` when detection is inconclusive:
/// no label within the masthead allowance, label edges misaligned, a label
/// line without extent data, or the critical headers never completing.
pub fn scan_page(lines: &[Line], opts: &RightScanOptions) -> Option<HeaderBlock> {
    // First pass: find how deep the label column runs.
    let mut right_edge: Option<f64> = None;
    let mut max_header_idx: Option<usize> = None;
    let mut seen: HashSet<HeaderLabel> = HashSet::new();
    let mut pre_block = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        match label_of(line) {
            Some(label) => {
                if seen.contains(&label) {
                    // A second From/To/... below the block is the quoted
                    // message's header column; stop extending.
                    trace!(label = %label, idx, "duplicate label, stopping scan");
                    break;
                }
                // Alignment is judged on the label word's right edge; a
                // label without extent data leaves nothing to align on.
                let edge = line.lead_x_max?;
                match right_edge {
                    None => right_edge = Some(edge),
                    Some(e) if (edge - e).abs() > opts.x_pos_tolerance => {
                        trace!(idx, edge, expected = e, "label edge misaligned");
                        return None;
                    }
                    Some(_) => {}
                }
                seen.insert(label);
                max_header_idx = Some(idx);
            }
            None => match max_header_idx {
                None => {
                    pre_block += 1;
                    if pre_block > opts.max_non_headers_before_block {
                        return None;
                    }
                }
                Some(last) => {
                    if idx - last > opts.max_non_headers_in_block {
                        break;
                    }
                }
            },
        }
    }

    let last = max_header_idx?;

    // Second pass: rebuild the block. Line order within the block is fully
    // known, so every non-label line continues the open header.
    let mut block = HeaderBlock::new();
    let mut open: Option<HeaderLabel> = None;
    for line in &lines[..=last] {
        if let Some(label) = label_of(line) {
            block.insert(Header {
                header: label,
                value: value_after_label(line),
                line: line.clone(),
            });
            open = Some(label);
        } else if let Some(label) = open {
            if let Some(h) = block.get_mut(label) {
                h.append_text(&line.text);
            }
        }
        // Masthead lines above the first label carry no header content.
    }

    block.is_complete().then_some(block)
}

/// The header label this line starts with, if its first word is a bare
/// `Label:` token.
fn label_of(line: &Line) -> Option<HeaderLabel> {
    let lead = line.lead_word()?;
    let caps = LABEL_RE.captures(lead)?;
    HeaderLabel::from_name(&caps[1])
}

/// The line text after the leading label word.
fn value_after_label(line: &Line) -> String {
    line.text
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> RightScanOptions {
        RightScanOptions {
            x_pos_tolerance: 1.0,
            max_non_headers_before_block: 1,
            max_non_headers_in_block: 7,
        }
    }

    /// A line whose leading label word ends at `edge`.
    fn label_line(y: f64, edge: f64, text: &str) -> Line {
        Line {
            page: 1,
            x: edge - 30.0,
            y,
            text: text.to_string(),
            lead_x_max: Some(edge),
        }
    }

    fn body_line(y: f64, text: &str) -> Line {
        Line {
            page: 1,
            x: 54.0,
            y,
            text: text.to_string(),
            lead_x_max: Some(80.0),
        }
    }

    fn value(block: &HeaderBlock, label: HeaderLabel) -> String {
        block.get(label).map(|h| h.value.clone()).unwrap_or_default()
    }

    #[test]
    fn test_aligned_labels_form_block() {
        let lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.2, "To: bob@x.com"),
            label_line(110.0, 99.9, "Subject: Hi"),
            label_line(120.0, 100.0, "Date: Jan 1, 2020"),
            body_line(140.0, "body text"),
        ];
        let block = scan_page(&lines, &opts()).expect("block");
        assert_eq!(value(&block, HeaderLabel::From), "alice@x.com");
        assert_eq!(value(&block, HeaderLabel::Subject), "Hi");
        assert_eq!(value(&block, HeaderLabel::Date), "Jan 1, 2020");
    }

    #[test]
    fn test_misaligned_edge_aborts() {
        let lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 110.0, "To: bob@x.com"),
            label_line(110.0, 100.0, "Subject: Hi"),
            label_line(120.0, 100.0, "Date: Jan 1, 2020"),
        ];
        assert!(scan_page(&lines, &opts()).is_none());
    }

    #[test]
    fn test_masthead_line_tolerated() {
        let lines = vec![
            body_line(80.0, "Dudley Dursley"),
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "Subject: Hi"),
            label_line(110.0, 100.0, "Sent: Jan 1, 2020"),
        ];
        assert!(scan_page(&lines, &opts()).is_some());
    }

    #[test]
    fn test_too_many_masthead_lines_not_found() {
        let lines = vec![
            body_line(70.0, "Office of the Registrar"),
            body_line(80.0, "Dudley Dursley"),
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "Subject: Hi"),
            label_line(110.0, 100.0, "Date: Jan 1, 2020"),
        ];
        assert!(scan_page(&lines, &opts()).is_none());
    }

    #[test]
    fn test_wrapped_value_continues_open_header() {
        let lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "To: bob@x.com;"),
            body_line(110.0, "carol@x.com; dave@x.com"),
            label_line(120.0, 100.0, "Subject: Hi"),
            label_line(130.0, 100.0, "Date: Jan 1, 2020"),
        ];
        let block = scan_page(&lines, &opts()).expect("block");
        assert_eq!(
            value(&block, HeaderLabel::To),
            "bob@x.com; carol@x.com; dave@x.com"
        );
    }

    #[test]
    fn test_gap_limit_stops_scan() {
        let mut lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "Subject: Hi"),
        ];
        // Eight body lines exceed the default in-block gap of 7
        for i in 0..8 {
            lines.push(body_line(110.0 + f64::from(i) * 10.0, "reply chain text"));
        }
        lines.push(label_line(200.0, 100.0, "Date: Jan 1, 2020"));
        // Date is never reached, so the critical headers stay incomplete
        assert!(scan_page(&lines, &opts()).is_none());
    }

    #[test]
    fn test_duplicate_label_stops_scan() {
        let lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "Subject: Hi"),
            label_line(110.0, 100.0, "Date: Jan 1, 2020"),
            body_line(120.0, "wrote:"),
            label_line(130.0, 100.0, "From: mallory@x.com"),
            label_line(140.0, 100.0, "Subject: quoted"),
        ];
        let block = scan_page(&lines, &opts()).expect("block");
        assert_eq!(value(&block, HeaderLabel::From), "alice@x.com");
        assert_eq!(value(&block, HeaderLabel::Subject), "Hi");
    }

    #[test]
    fn test_label_without_extent_aborts() {
        let mut first = label_line(90.0, 100.0, "From: alice@x.com");
        first.lead_x_max = None;
        let lines = vec![
            first,
            label_line(100.0, 100.0, "Subject: Hi"),
            label_line(110.0, 100.0, "Date: Jan 1, 2020"),
        ];
        assert!(scan_page(&lines, &opts()).is_none());
    }

    #[test]
    fn test_incomplete_block_not_found() {
        let lines = vec![
            label_line(90.0, 100.0, "From: alice@x.com"),
            label_line(100.0, 100.0, "To: bob@x.com"),
        ];
        assert!(scan_page(&lines, &opts()).is_none());
    }

    #[test]
    fn test_empty_page_not_found() {
        assert!(scan_page(&[], &opts()).is_none());
    }
}
