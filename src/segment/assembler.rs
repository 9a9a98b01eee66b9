//! Grouping positioned words into lines.
//!
//! Extraction tools emit words with sub-unit vertical jitter, so words are
//! clustered by y-proximity rather than exact equality. Words may also
//! arrive out of horizontal order; a line is re-sorted by `x` when it
//! closes.

use std::cmp::Ordering;

use crate::model::line::{Line, Word};

#[derive(Debug)]
struct OpenLine {
    page: u32,
    x: f64,
    y: f64,
    words: Vec<Word>,
}

/// Accumulates words into the current line, closing it when a word lands
/// outside the vertical tolerance.
#[derive(Debug)]
pub struct LineAssembler {
    y_pos_tolerance: f64,
    page: u32,
    current: Option<OpenLine>,
}

impl LineAssembler {
    pub fn new(y_pos_tolerance: f64) -> Self {
        Self {
            y_pos_tolerance,
            page: 0,
            current: None,
        }
    }

    /// Set the page that subsequently opened lines belong to.
    /// Call [`Self::flush`] first; an open line belongs to the old page.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    /// Place one word. Returns the previous line if this word closed it.
    pub fn process_word(&mut self, word: Word) -> Option<Line> {
        match &mut self.current {
            Some(open) if (word.y - open.y).abs() <= self.y_pos_tolerance => {
                open.words.push(word);
                None
            }
            _ => {
                let closed = self.current.take().and_then(close);
                self.current = Some(OpenLine {
                    page: self.page,
                    x: word.x,
                    y: word.y,
                    words: vec![word],
                });
                closed
            }
        }
    }

    /// Close the open line, if any (page end / stream end).
    pub fn flush(&mut self) -> Option<Line> {
        self.current.take().and_then(close)
    }
}

/// Freeze an open line: sort words left-to-right, join with single spaces,
/// trim. Lines with no text are dropped.
fn close(mut open: OpenLine) -> Option<Line> {
    open.words
        .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));

    let text = open
        .words
        .iter()
        .map(|w| w.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    if text.is_empty() {
        return None;
    }

    let lead_x_max = open.words.first().and_then(|w| w.x_max);

    Some(Line {
        page: open.page,
        x: open.x,
        y: open.y,
        text,
        lead_x_max,
    })
}
