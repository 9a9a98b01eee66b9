//! The positioned-word stream contract between extraction adapters and the
//! segmentation core.
//!
//! Adapters deliver events for one source unit at a time, in strict order:
//! `PageStart`, zero or more `Word`s, `PageEnd`, repeated per page, then
//! `StreamEnd`. Transport failures surface as errors from the adapter
//! function and terminate the unit.

pub mod bbox;

use crate::model::line::Word;

/// One event in a source unit's positioned-word stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A new page begins. Pages are numbered 1-based per unit.
    PageStart { page: u32 },
    /// A positioned word on the current page.
    Word(Word),
    /// The current page is finished.
    PageEnd { page: u32 },
    /// The unit's stream is exhausted.
    StreamEnd,
}
