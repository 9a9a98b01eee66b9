//! Header detection over reconstructed lines.
//!
//! Two strategies cover the observed tranche layouts: left-justified header
//! labels are scanned incrementally, one line at a time, by
//! [`left::LeftScanner`]; right-justified labels are detected in a single
//! batch pass per page by [`right::scan_page`], with the left scanner as
//! fallback when the batch pass is inconclusive. Strategy selection is a
//! configuration value ([`crate::config::Justification`]), not a separate
//! code path per tranche.

pub mod left;
pub mod right;

use crate::model::header::{HeaderBlock, HeaderLabel, HeaderStart};

/// The scanner's judgement of one line.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    /// The line is a header (new, or a continuation of the given label).
    Header(HeaderLabel),
    /// The line is not a header, and enough headers had accumulated that a
    /// new message is declared at `start`. Scanner state has been reset.
    EmailStart {
        start: HeaderStart,
        headers: HeaderBlock,
    },
    /// The line is not a header.
    NonHeader,
}
