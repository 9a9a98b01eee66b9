//! Driver for a tranche that is one monolithic multi-email PDF.

use std::path::{Path, PathBuf};

use crate::config::{ScanConfig, ToolsConfig};
use crate::error::{Result, ShredError};
use crate::model::email::Email;
use crate::tools::PdfTools;
use crate::tranche::{process_unit, CancelToken};

/// A tranche consisting of a single multi-page, multi-message PDF.
#[derive(Debug)]
pub struct MonolithicTranche {
    src: PathBuf,
    out_dir: PathBuf,
    scan: ScanConfig,
    tools: PdfTools,
}

impl MonolithicTranche {
    /// Create the driver, validating the source path up front.
    pub fn new(
        src: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
        scan: ScanConfig,
        tools: ToolsConfig,
    ) -> Result<Self> {
        let src = src.as_ref().to_path_buf();
        if !src.exists() {
            return Err(ShredError::SourceNotFound(src));
        }
        if !src.is_file() {
            return Err(ShredError::InvalidConfig(format!(
                "monolithic tranche source must be a file: {}",
                src.display()
            )));
        }
        Ok(Self {
            src,
            out_dir: out_dir.as_ref().to_path_buf(),
            scan,
            tools: PdfTools::new(tools),
        })
    }

    /// Extract the tranche's messages.
    ///
    /// `progress` receives `(units_done, units_total)` at unit boundaries;
    /// `cancel` is checked before the unit starts.
    pub fn read(
        &self,
        progress: Option<&dyn Fn(u64, u64)>,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Email>> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ShredError::Cancelled);
        }
        if let Some(cb) = progress {
            cb(0, 1);
        }

        let emails = process_unit(&self.tools, &self.scan, &self.src, &self.out_dir)?;

        if let Some(cb) = progress {
            cb(1, 1);
        }
        Ok(emails)
    }
}
