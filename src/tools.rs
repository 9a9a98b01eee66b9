//! Thin harness over the external extraction tools.
//!
//! Three command-line programs do the heavy lifting: `pdftotext` (poppler)
//! produces the positioned-word stream, ImageMagick `convert` + `tesseract`
//! give image-only PDFs a text layer, and `pdftk` unpacks PDF portfolios.
//! Tool paths are supplied explicitly via [`ToolsConfig`] at construction;
//! nothing here consults ambient state.

use std::ffi::OsStr;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::error::{Result, ShredError};
use crate::stream::{bbox, StreamEvent};

/// Spawns the external tools with explicitly configured paths.
#[derive(Debug, Clone)]
pub struct PdfTools {
    cfg: ToolsConfig,
}

impl PdfTools {
    pub fn new(cfg: ToolsConfig) -> Self {
        Self { cfg }
    }

    /// Stream a PDF's positioned words into `sink` via `pdftotext -bbox`.
    ///
    /// Events are delivered while the child is still writing; only one page
    /// of words is buffered at a time (inside the bbox adapter).
    pub fn stream_words(&self, pdf: &Path, sink: &mut dyn FnMut(StreamEvent)) -> Result<()> {
        debug!(pdf = %pdf.display(), "spawning pdftotext");
        let mut child = Command::new(&self.cfg.pdftotext)
            .arg("-htmlmeta")
            .arg("-bbox")
            .arg(pdf)
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ShredError::tool("pdftotext", format!("spawn failed: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShredError::tool("pdftotext", "no stdout handle"))?;

        if let Err(e) = bbox::parse(BufReader::new(stdout), sink) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ShredError::tool("pdftotext", format!("wait failed: {e}")))?;
        if !output.status.success() {
            return Err(ShredError::tool(
                "pdftotext",
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }

    /// OCR an image-only PDF into a searchable one under `ocr_dir`.
    ///
    /// The PDF is rasterized to a 300-dpi multipage TIFF, then tesseract
    /// writes a new PDF with a text layer. Returns the path of the OCR'd
    /// PDF (same file name as the source, inside `ocr_dir`).
    pub fn ocr(&self, pdf: &Path, ocr_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(ocr_dir).map_err(|e| ShredError::io(ocr_dir, e))?;

        let scratch = tempfile::tempdir().map_err(|e| ShredError::io("<tempdir>", e))?;
        let tiff = scratch.path().join("ocr.tiff");

        info!(pdf = %pdf.display(), "rasterizing for OCR");
        self.run(
            "convert",
            &self.cfg.convert,
            &[
                OsStr::new("-density"),
                OsStr::new("300"),
                pdf.as_os_str(),
                OsStr::new("-depth"),
                OsStr::new("8"),
                OsStr::new("-strip"),
                OsStr::new("-background"),
                OsStr::new("white"),
                OsStr::new("-alpha"),
                OsStr::new("off"),
                tiff.as_os_str(),
            ],
        )?;

        let out_base = ocr_output_base(pdf, ocr_dir);
        info!(tiff = %tiff.display(), "running tesseract");
        self.run(
            "tesseract",
            &self.cfg.tesseract,
            &[tiff.as_os_str(), out_base.as_os_str(), OsStr::new("pdf")],
        )?;

        // tesseract appends ".pdf" to the output base itself
        let mut out = out_base.into_os_string();
        out.push(".pdf");
        Ok(PathBuf::from(out))
    }

    /// Unpack a PDF portfolio's embedded documents into `out_dir`.
    pub fn unpack_portfolio(&self, pdf: &Path, out_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(out_dir).map_err(|e| ShredError::io(out_dir, e))?;
        info!(pdf = %pdf.display(), out_dir = %out_dir.display(), "unpacking portfolio");
        self.run(
            "pdftk",
            &self.cfg.pdftk,
            &[
                pdf.as_os_str(),
                OsStr::new("unpack_files"),
                OsStr::new("output"),
                out_dir.as_os_str(),
            ],
        )
    }

    fn run(&self, name: &str, program: &Path, args: &[&OsStr]) -> Result<()> {
        debug!(tool = name, program = %program.display(), "spawning");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ShredError::tool(name, format!("spawn failed: {e}")))?;
        if !output.status.success() {
            return Err(ShredError::tool(
                name,
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(())
    }
}

/// Output base (no extension) for the OCR copy of `pdf` inside `ocr_dir`.
fn ocr_output_base(pdf: &Path, ocr_dir: &Path) -> PathBuf {
    let stem = pdf.file_stem().unwrap_or_else(|| OsStr::new("ocr"));
    ocr_dir.join(stem)
}
