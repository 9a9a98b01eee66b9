//! Driver for a tranche that is a directory of single-email PDFs.

use std::path::{Path, PathBuf};

use crate::config::{ScanConfig, ToolsConfig};
use crate::error::{Result, ShredError};
use crate::model::email::Email;
use crate::tools::PdfTools;
use crate::tranche::{list_pdf_units, process_unit, CancelToken};

/// A tranche consisting of a directory of PDFs, one message each
/// (typically; a unit with several messages still segments normally).
///
/// Units are read in file-name order, strictly sequentially; later units'
/// message ordering depends on earlier units having fully finished.
#[derive(Debug)]
pub struct DirectoryTranche {
    src: PathBuf,
    out_dir: PathBuf,
    scan: ScanConfig,
    tools: PdfTools,
}

impl DirectoryTranche {
    /// Create the driver, validating the source directory up front.
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
        if !src.is_dir() {
            return Err(ShredError::NotADirectory(src));
        }
        Ok(Self {
            src,
            out_dir: out_dir.as_ref().to_path_buf(),
            scan,
            tools: PdfTools::new(tools),
        })
    }

    /// Extract all units' messages, concatenated in unit order.
    pub fn read(
        &self,
        progress: Option<&dyn Fn(u64, u64)>,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Email>> {
        let units = list_pdf_units(&self.src)?;
        let total = units.len() as u64;
        let mut emails: Vec<Email> = Vec::new();

        for (idx, unit) in units.iter().enumerate() {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return Err(ShredError::Cancelled);
            }
            if let Some(cb) = progress {
                cb(idx as u64, total);
            }
            emails.extend(process_unit(&self.tools, &self.scan, unit, &self.out_dir)?);
        }

        if let Some(cb) = progress {
            cb(total, total);
        }
        Ok(emails)
    }
}
