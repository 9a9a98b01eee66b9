//! Integration tests for the word-stream adapter, line assembly, header
//! scanning, and email segmentation working together.

use std::io::Cursor;
use std::path::Path;

use mailshred::config::{Justification, ScanConfig};
use mailshred::model::email::Email;
use mailshred::model::header::HeaderLabel;
use mailshred::segment::EmailSegmenter;
use mailshred::stream::bbox;

/// Run a bbox XML document through adapter + segmenter.
fn segment_bbox(xml: &str, scan: ScanConfig) -> Vec<Email> {
    let mut seg = EmailSegmenter::new(Path::new("tranche.pdf"), scan);
    bbox::parse(Cursor::new(xml.as_bytes()), &mut |ev| seg.apply(ev)).unwrap();
    seg.finish()
}

/// Build one bbox page from rows of `(x, y, text)` words.
fn page(words: &[(f64, f64, &str)]) -> String {
    let mut out = String::from("<page width=\"612.0\" height=\"792.0\">\n");
    for (x, y, text) in words {
        // Approximate extents: 6 units per character
        let x_max = x + (text.len() as f64) * 6.0;
        out.push_str(&format!(
            "<word xMin=\"{x}\" yMin=\"{y}\" xMax=\"{x_max}\" yMax=\"{}\">{text}</word>\n",
            y + 10.0
        ));
    }
    out.push_str("</page>\n");
    out
}

/// Spread a line of text into words starting at `x`, sharing `y`.
fn text_row(x: f64, y: f64, text: &str) -> Vec<(f64, f64, String)> {
    let mut words = Vec::new();
    let mut wx = x;
    for token in text.split_whitespace() {
        words.push((wx, y, token.to_string()));
        wx += (token.len() as f64) * 6.0 + 4.0;
    }
    words
}

fn rows_to_page(rows: &[Vec<(f64, f64, String)>]) -> String {
    let flat: Vec<(f64, f64, &str)> = rows
        .iter()
        .flatten()
        .map(|(x, y, t)| (*x, *y, t.as_str()))
        .collect();
    page(&flat)
}

fn value(email: &Email, label: HeaderLabel) -> String {
    email
        .headers
        .get(label)
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

// ─── Test 1: one page, one complete header block ────────────────────

#[test]
fn test_single_message_extracted_end_to_end() {
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "To: bob@x.com"),
        text_row(10.0, 114.0, "Subject: Hi"),
        text_row(10.0, 126.0, "Date: Jan 1, 2020"),
        text_row(50.0, 150.0, "body text"),
    ]);

    let emails = segment_bbox(&xml, ScanConfig::default());
    assert_eq!(emails.len(), 1);
    let email = &emails[0];
    assert_eq!(email.start.page, 1);
    assert_eq!(email.end.map(|b| b.page), Some(1));
    assert_eq!(value(email, HeaderLabel::From), "alice@x.com");
    assert_eq!(value(email, HeaderLabel::To), "bob@x.com");
    assert_eq!(value(email, HeaderLabel::Subject), "Hi");
    assert_eq!(value(email, HeaderLabel::Date), "Jan 1, 2020");
}

// ─── Test 2: sub-unit y jitter still forms one line ─────────────────

#[test]
fn test_vertical_jitter_within_tolerance() {
    // "To:" sits 0.22 units above its value, as real dumps do
    let xml = page(&[
        (10.0, 90.0, "From:"),
        (45.0, 90.1, "alice@x.com"),
        (10.0, 102.0, "Subject:"),
        (60.0, 102.2, "jitters"),
        (10.0, 113.9, "Date:"),
        (45.0, 114.0, "Jan"),
        (70.0, 114.1, "1,"),
        (85.0, 114.0, "2020"),
        (10.0, 140.0, "body"),
    ]);

    let emails = segment_bbox(&xml, ScanConfig::default());
    assert_eq!(emails.len(), 1);
    assert_eq!(value(&emails[0], HeaderLabel::Date), "Jan 1, 2020");
    assert_eq!(value(&emails[0], HeaderLabel::Subject), "jitters");
}

// ─── Test 3: multi-page monolithic tranche, fresh-page policy ───────

#[test]
fn test_monolithic_multi_message_boundaries() {
    let mut xml = String::new();
    // Message 1: headers on page 1, body spills onto page 2
    xml.push_str(&rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "Subject: first"),
        text_row(10.0, 114.0, "Sent: Monday, June 5, 2017 4:22 PM"),
        text_row(10.0, 140.0, "first body"),
    ]));
    xml.push_str(&rows_to_page(&[text_row(10.0, 90.0, "more of the first body")]));
    // Message 2 on page 3
    xml.push_str(&rows_to_page(&[
        text_row(10.0, 90.0, "From: bob@x.com"),
        text_row(10.0, 102.0, "Subject: second"),
        text_row(10.0, 114.0, "Date: Jan 2, 2020"),
        text_row(10.0, 140.0, "second body"),
    ]));

    let emails = segment_bbox(&xml, ScanConfig::default());
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].start.page, 1);
    assert_eq!(emails[0].end.map(|b| b.page), Some(2));
    assert_eq!(emails[1].start.page, 3);
    assert_eq!(emails[1].end.map(|b| b.page), Some(3));
    // Ordered by start page
    assert!(emails[0].start.page <= emails[1].start.page);
}

// ─── Test 4: continuation line folds into the To header ─────────────

#[test]
fn test_wrapped_recipient_list() {
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "To: alice@x.com;"),
        text_row(10.0, 114.0, "bob@x.com"),
        text_row(10.0, 126.0, "Subject: Hi"),
        text_row(10.0, 138.0, "Date: Jan 1, 2020"),
        text_row(10.0, 160.0, "body"),
    ]);

    let emails = segment_bbox(&xml, ScanConfig::default());
    assert_eq!(emails.len(), 1);
    assert_eq!(
        value(&emails[0], HeaderLabel::To),
        "alice@x.com; bob@x.com"
    );
}

// ─── Test 5: quoted reply headers do not split the message ──────────

#[test]
fn test_quoted_reply_not_a_boundary() {
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "Subject: re: budget"),
        text_row(10.0, 114.0, "Date: Jan 3, 2020"),
        text_row(10.0, 140.0, "please see below"),
        // The quoted original, indented
        text_row(40.0, 160.0, "From: bob@x.com"),
        text_row(40.0, 172.0, "Subject: budget"),
        text_row(40.0, 184.0, "Date: Jan 2, 2020"),
        text_row(40.0, 200.0, "original message"),
    ]);

    let emails = segment_bbox(&xml, ScanConfig::default());
    assert_eq!(emails.len(), 1);
    assert_eq!(value(&emails[0], HeaderLabel::From), "alice@x.com");
}

// ─── Test 6: right-justified labels, batch detection ────────────────

#[test]
fn test_right_justified_tranche() {
    // Labels of different widths share a right edge at x=100
    let mut rows = Vec::new();
    for (i, (label, value_text)) in [
        ("From:", "alice@x.com"),
        ("To:", "bob@x.com"),
        ("Subject:", "aligned right"),
        ("Sent:", "Jan 1, 2020"),
    ]
    .iter()
    .enumerate()
    {
        let y = 90.0 + (i as f64) * 12.0;
        let label_x = 100.0 - (label.len() as f64) * 6.0;
        rows.push(vec![(label_x, y, label.to_string())]);
        rows.push(text_row(110.0, y, value_text));
    }
    rows.push(text_row(54.0, 160.0, "body text"));

    // page() computes x_max as x + len*6, so every label ends at 100
    let xml = rows_to_page(&rows);
    let scan = ScanConfig {
        header_justification: Justification::Right,
        ..ScanConfig::default()
    };
    let emails = segment_bbox(&xml, scan);

    assert_eq!(emails.len(), 1);
    assert_eq!(value(&emails[0], HeaderLabel::Subject), "aligned right");
    assert_eq!(value(&emails[0], HeaderLabel::Sent), "Jan 1, 2020");
}

// ─── Test 7: right-justified fallback to left scanning ──────────────

#[test]
fn test_right_mode_falls_back_to_left() {
    // Left-justified labels: the label words' right edges diverge by far
    // more than the tolerance, so the batch pass must bail out and the
    // left-justified fallback must find the block on its own.
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "Subject: fallback"),
        text_row(10.0, 114.0, "Date: Jan 1, 2020"),
        text_row(10.0, 140.0, "body"),
    ]);

    let scan = ScanConfig {
        header_justification: Justification::Right,
        ..ScanConfig::default()
    };
    let emails = segment_bbox(&xml, scan);
    assert_eq!(emails.len(), 1);
    assert_eq!(value(&emails[0], HeaderLabel::Subject), "fallback");
}

// ─── Test 8: free-running boundary bookkeeping ──────────────────────

#[test]
fn test_free_running_policy() {
    let mut xml = String::new();
    xml.push_str(&rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "Subject: first"),
        text_row(10.0, 114.0, "Date: Jan 1, 2020"),
        text_row(10.0, 140.0, "body"),
    ]));
    xml.push_str(&rows_to_page(&[text_row(10.0, 90.0, "trailing page")]));

    let scan = ScanConfig {
        new_page_for_each_message: false,
        ..ScanConfig::default()
    };
    let emails = segment_bbox(&xml, scan);
    assert_eq!(emails.len(), 1);
    // Free-running: the last message runs to the last page seen
    assert_eq!(emails[0].end.map(|b| b.page), Some(2));
}

// ─── Test 9: a unit with no detectable headers yields nothing ───────

#[test]
fn test_headerless_unit_contributes_zero_messages() {
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "minutes of the budget meeting"),
        text_row(10.0, 102.0, "attendees discussed various topics"),
    ]);
    let emails = segment_bbox(&xml, ScanConfig::default());
    assert!(emails.is_empty());
}

// ─── Test 10: serialized output shape ───────────────────────────────

#[test]
fn test_json_sidecar_shape() {
    let xml = rows_to_page(&[
        text_row(10.0, 90.0, "From: alice@x.com"),
        text_row(10.0, 102.0, "Subject: Hi"),
        text_row(10.0, 114.0, "Date: Jan 1, 2020"),
        text_row(10.0, 140.0, "body"),
    ]);
    let emails = segment_bbox(&xml, ScanConfig::default());
    let json = serde_json::to_value(&emails).unwrap();

    assert_eq!(json[0]["file"], "tranche.pdf");
    assert_eq!(json[0]["start"]["page"], 1);
    assert_eq!(json[0]["end"]["page"], 1);
    assert_eq!(json[0]["headers"]["From"]["header"], "From");
    assert_eq!(json[0]["headers"]["From"]["value"], "alice@x.com");
}
