//! Extracted email messages and their page boundaries.

use std::path::PathBuf;

use serde::Serialize;

use super::header::HeaderBlock;

/// A page position marking where a message starts or ends within its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boundary {
    /// 1-based page number within the source unit.
    pub page: u32,
}

/// One extracted email message.
///
/// Created the instant its header block becomes complete. `end` stays
/// `None` until either the next message starts or the unit's stream ends;
/// after a tranche finishes, every message's `end` is set, exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    /// The source unit this message was extracted from.
    pub file: PathBuf,
    pub start: Boundary,
    pub end: Option<Boundary>,
    pub headers: HeaderBlock,
}

impl Email {
    /// Number of pages this message spans, once `end` is finalized.
    pub fn num_pages(&self) -> Option<u32> {
        self.end
            .map(|end| end.page.saturating_sub(self.start.page) + 1)
    }
}
