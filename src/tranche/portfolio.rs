//! Driver for a tranche packed inside a PDF portfolio.
//!
//! A portfolio is a PDF container holding embedded per-document PDFs. The
//! container is unpacked once into `<out_dir>/unpacked`, then the tranche
//! behaves exactly like a directory of single-email PDFs.

use std::path::{Path, PathBuf};

use crate::config::{ScanConfig, ToolsConfig};
use crate::error::{Result, ShredError};
use crate::model::email::Email;
use crate::tools::PdfTools;
use crate::tranche::{directory::DirectoryTranche, CancelToken};

/// A tranche consisting of one portfolio PDF to unpack and then read.
#[derive(Debug)]
pub struct PortfolioTranche {
    src: PathBuf,
    out_dir: PathBuf,
    scan: ScanConfig,
    tools_cfg: ToolsConfig,
}

impl PortfolioTranche {
    /// Create the driver, validating the portfolio path up front.
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
                "portfolio tranche source must be a file: {}",
                src.display()
            )));
        }
        Ok(Self {
            src,
            out_dir: out_dir.as_ref().to_path_buf(),
            scan,
            tools_cfg: tools,
        })
    }

    /// Unpack the portfolio, then extract every unpacked unit.
    pub fn read(
        &self,
        progress: Option<&dyn Fn(u64, u64)>,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Email>> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ShredError::Cancelled);
        }

        let unpack_dir = self.out_dir.join("unpacked");
        let tools = PdfTools::new(self.tools_cfg.clone());
        tools.unpack_portfolio(&self.src, &unpack_dir)?;

        let inner = DirectoryTranche::new(
            &unpack_dir,
            &self.out_dir,
            self.scan.clone(),
            self.tools_cfg.clone(),
        )?;
        inner.read(progress, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_portfolio_rejected_at_construction() {
        let result = PortfolioTranche::new(
            "/no/such/portfolio.pdf",
            "/tmp/out",
            ScanConfig::default(),
            ToolsConfig::default(),
        );
        assert!(matches!(result, Err(ShredError::SourceNotFound(_))));
    }
}
