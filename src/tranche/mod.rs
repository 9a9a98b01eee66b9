//! Tranche drivers: feed each source unit of a tranche through one
//! segmenter pass and concatenate the results.
//!
//! Three shapes of tranche occur in the wild: a single monolithic
//! multi-email PDF, a directory of single-email PDFs, and a portfolio PDF
//! whose embedded documents must be unpacked first. Units are processed
//! strictly sequentially; a unit's messages are finalized when its stream
//! ends and never touched afterwards.

pub mod directory;
pub mod monolithic;
pub mod portfolio;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ScanConfig;
use crate::error::{Result, ShredError};
use crate::model::email::Email;
use crate::segment::EmailSegmenter;
use crate::tools::PdfTools;

/// Cooperative cancellation flag, checked at each unit boundary.
///
/// Cancellation cannot interrupt a unit mid-extraction; the current unit
/// finishes (or fails) before the flag is observed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run one source unit through a fresh segmenter pass.
///
/// When OCR preprocessing is on, the unit is first OCR'd into
/// `<out_dir>/ocr` and the OCR'd copy becomes the unit actually read (and
/// the `file` recorded on its messages, so downstream consumers split the
/// searchable PDF, not the image-only original).
pub(crate) fn process_unit(
    tools: &PdfTools,
    scan: &ScanConfig,
    unit: &Path,
    out_dir: &Path,
) -> Result<Vec<Email>> {
    let src = if scan.perform_ocr {
        tools.ocr(unit, &out_dir.join("ocr"))?
    } else {
        unit.to_path_buf()
    };

    info!(unit = %src.display(), "reading unit");
    let mut segmenter = EmailSegmenter::new(&src, scan.clone());
    tools.stream_words(&src, &mut |event| segmenter.apply(event))?;
    let emails = segmenter.finish();

    if emails.is_empty() {
        // A detection miss, not a failure: the unit contributes nothing.
        warn!(unit = %src.display(), "no messages detected in unit");
    }
    Ok(emails)
}

/// List the `.pdf` files directly inside `dir`, sorted by file name.
pub(crate) fn list_pdf_units(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ShredError::io(dir, e))?;
    let mut units: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ShredError::io(dir, e))?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            units.push(path);
        }
    }
    units.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(units)
}
