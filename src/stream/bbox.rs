//! Adapter for the XML word list produced by `pdftotext -htmlmeta -bbox`.
//!
//! The output is line-oriented XML:
//!
//! ```text
//! <page width="612.000000" height="792.000000">
//!   <word xMin="54.0" yMin="92.1" xMax="120.3" yMax="104.9">From:</word>
//!   ...
//! </page>
//! ```
//!
//! Words inside a page may arrive in arbitrary order; they are buffered per
//! page and sorted by `(y, x)` before delivery so the line assembler sees
//! non-decreasing vertical positions. Entity escaping in word text is left
//! untouched; the rest of the pipeline is escape-transparent.

use std::cmp::Ordering;
use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, ShredError};
use crate::model::line::Word;
use crate::stream::StreamEvent;

static PAGE_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<page[\s>]").expect("page regex"));
static PAGE_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</page\s*>").expect("page close regex"));
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<word\s+xMin="([^"]+)"\s+yMin="([^"]+)"\s+xMax="([^"]+)"\s+yMax="([^"]+)"\s*>(.*?)</word>"#,
    )
    .expect("word regex")
});

/// Parse a bbox word list, delivering [`StreamEvent`]s to `sink` in order.
///
/// Tolerant of the `-htmlmeta` wrapper (non-matching lines are skipped) and
/// of words with unparseable coordinates (skipped with a warning). Read
/// failures mid-stream are fatal for the unit.
pub fn parse<R: BufRead>(mut reader: R, sink: &mut dyn FnMut(StreamEvent)) -> Result<()> {
    let mut page_num: u32 = 0;
    let mut in_page = false;
    let mut words: Vec<Word> = Vec::new();
    let mut line_buf: Vec<u8> = Vec::with_capacity(512);

    loop {
        line_buf.clear();
        let n = reader.read_until(b'\n', &mut line_buf).map_err(|e| ShredError::Stream {
            page: page_num,
            reason: format!("read error: {e}"),
        })?;
        if n == 0 {
            break; // EOF
        }

        let line = decode_line(&line_buf);
        let line = line.trim();

        if PAGE_OPEN_RE.is_match(line) {
            if in_page {
                // Unclosed page; flush what we have before starting the next.
                warn!(page = page_num, "page element not closed, flushing");
                flush_page(&mut words, page_num, sink);
            }
            page_num += 1;
            in_page = true;
            debug!(page = page_num, "page start");
            sink(StreamEvent::PageStart { page: page_num });
            continue;
        }

        if PAGE_CLOSE_RE.is_match(line) {
            if in_page {
                flush_page(&mut words, page_num, sink);
                in_page = false;
            }
            continue;
        }

        if let Some(caps) = WORD_RE.captures(line) {
            if !in_page {
                // Word outside any page: the stream is not bbox output.
                return Err(ShredError::Stream {
                    page: page_num,
                    reason: "word element before first page".to_string(),
                });
            }
            match parse_word(&caps) {
                Some(word) => words.push(word),
                None => {
                    warn!(page = page_num, line = line, "skipping word with bad coordinates");
                }
            }
        }
    }

    if in_page {
        warn!(page = page_num, "stream ended inside a page, flushing");
        flush_page(&mut words, page_num, sink);
    }

    sink(StreamEvent::StreamEnd);
    Ok(())
}

/// Sort the page's words by `(y, x)` and deliver them, then close the page.
fn flush_page(words: &mut Vec<Word>, page: u32, sink: &mut dyn FnMut(StreamEvent)) {
    words.sort_by(|a, b| match a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal),
        other => other,
    });
    for word in words.drain(..) {
        sink(StreamEvent::Word(word));
    }
    sink(StreamEvent::PageEnd { page });
}

fn parse_word(caps: &regex::Captures<'_>) -> Option<Word> {
    let x: f64 = caps[1].parse().ok()?;
    let y: f64 = caps[2].parse().ok()?;
    let x_max: f64 = caps[3].parse().ok()?;
    let y_max: f64 = caps[4].parse().ok()?;
    Some(Word {
        text: caps[5].to_string(),
        x,
        y,
        x_max: Some(x_max),
        y_max: Some(y_max),
    })
}

/// Decode one line of extractor output.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every
/// byte). OCR-produced PDFs occasionally carry stray high bytes.
fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}
