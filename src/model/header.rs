//! Recognized message headers and header blocks.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::line::Line;

/// The fixed set of header labels the scanner recognizes.
///
/// Parsing is case-insensitive ("FROM:", "from:" and "From:" all map to
/// `From`); rendering is canonical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub enum HeaderLabel {
    From,
    To,
    Cc,
    Bcc,
    Subject,
    Date,
    Sent,
    Attachments,
}

impl HeaderLabel {
    /// All recognized labels, in canonical order.
    pub const ALL: [HeaderLabel; 8] = [
        HeaderLabel::From,
        HeaderLabel::To,
        HeaderLabel::Cc,
        HeaderLabel::Bcc,
        HeaderLabel::Subject,
        HeaderLabel::Date,
        HeaderLabel::Sent,
        HeaderLabel::Attachments,
    ];

    /// Parse a label name, ignoring case. Returns `None` for anything
    /// outside the fixed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical label text (as it appears before the colon).
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderLabel::From => "From",
            HeaderLabel::To => "To",
            HeaderLabel::Cc => "Cc",
            HeaderLabel::Bcc => "Bcc",
            HeaderLabel::Subject => "Subject",
            HeaderLabel::Date => "Date",
            HeaderLabel::Sent => "Sent",
            HeaderLabel::Attachments => "Attachments",
        }
    }

    /// Whether values of this header are lists of addresses (From/To/Cc/Bcc).
    /// Such headers accept Outlook address-expansion continuation lines.
    pub fn takes_addresses(&self) -> bool {
        matches!(
            self,
            HeaderLabel::From | HeaderLabel::To | HeaderLabel::Cc | HeaderLabel::Bcc
        )
    }
}

impl fmt::Display for HeaderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recognized header: label, accumulated value, and the line it started
/// on. `value` grows in place as continuation lines are appended while the
/// block is still open.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub header: HeaderLabel,
    pub value: String,
    /// The originating line; retained for boundary positions, not serialized.
    #[serde(skip)]
    pub line: Line,
}

impl Header {
    /// Append continuation text to the value with a single-space join.
    pub fn append_text(&mut self, text: &str) {
        if self.value.is_empty() {
            self.value.push_str(text);
        } else {
            self.value.push(' ');
            self.value.push_str(text);
        }
    }
}

/// The earliest position of a header block: where the new message starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderStart {
    pub page: u32,
    pub y: f64,
}

/// The set of headers believed to belong to one email message.
///
/// Complete iff it holds `From`, `Subject`, and at least one of
/// `Date` / `Sent`. Serializes as a label-keyed map.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HeaderBlock {
    headers: BTreeMap<HeaderLabel, Header>,
}

impl HeaderBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a header, overwriting any previous header with the same label.
    pub fn insert(&mut self, header: Header) {
        self.headers.insert(header.header, header);
    }

    pub fn get(&self, label: HeaderLabel) -> Option<&Header> {
        self.headers.get(&label)
    }

    pub fn get_mut(&mut self, label: HeaderLabel) -> Option<&mut Header> {
        self.headers.get_mut(&label)
    }

    pub fn contains(&self, label: HeaderLabel) -> bool {
        self.headers.contains_key(&label)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &Header> {
        self.headers.values()
    }

    /// The critical-header rule: a block identifies a message only once it
    /// has a sender, a subject, and a date of either spelling.
    pub fn is_complete(&self) -> bool {
        self.contains(HeaderLabel::From)
            && self.contains(HeaderLabel::Subject)
            && (self.contains(HeaderLabel::Date) || self.contains(HeaderLabel::Sent))
    }

    /// The earliest `(page, y)` among the block's header lines.
    pub fn start(&self) -> Option<HeaderStart> {
        let mut best: Option<HeaderStart> = None;
        for h in self.headers.values() {
            let cand = HeaderStart {
                page: h.line.page,
                y: h.line.y,
            };
            let better = match best {
                None => true,
                Some(b) => cand.page < b.page || (cand.page == b.page && cand.y < b.y),
            };
            if better {
                best = Some(cand);
            }
        }
        best
    }
}
