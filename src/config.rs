//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILSHRED_CONFIG` (environment variable)
//! 2. `~/.config/mailshred/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailshred\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! CLI flags override individual values after loading.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which edge the header labels of a tranche are aligned on.
///
/// Determines the detection strategy: left-justified labels are scanned
/// incrementally line by line; right-justified labels are detected in one
/// batch pass per page (with a left-justified fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    Left,
    Right,
}

impl FromStr for Justification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown justification '{other}' (expected 'left' or 'right')")),
        }
    }
}

/// When the header scanner's block state is discarded.
///
/// `PerPage` resets at every page start, so a header block can never span a
/// page break. `PerMessage` resets only when a message boundary is emitted,
/// letting a block straddle pagination in free-running tranches. Emitting a
/// boundary always resets, under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScannerReset {
    PerPage,
    PerMessage,
}

impl FromStr for ScannerReset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-page" => Ok(Self::PerPage),
            "per-message" => Ok(Self::PerMessage),
            other => Err(format!(
                "unknown reset policy '{other}' (expected 'per-page' or 'per-message')"
            )),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Scanning tolerances and policies.
    pub scan: ScanConfig,
    /// Paths to the external extraction tools.
    pub tools: ToolsConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Scanning tolerances and segmentation policies.
///
/// Defaults match the values the original tranche dumps were tuned against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Vertical tolerance for clustering words into one line. Extraction
    /// tools introduce sub-unit jitter between words meant to share a
    /// visual line, usually between 0.01 and 0.25 units.
    pub y_pos_tolerance: f64,

    /// Horizontal tolerance for header alignment. A header-looking line
    /// indented differently from the block is presumed to be a quoted
    /// email inside the body.
    pub x_pos_tolerance: f64,

    /// Which edge the tranche's header labels are aligned on.
    pub header_justification: Justification,

    /// Whether every message is known to start on a fresh page.
    pub new_page_for_each_message: bool,

    /// Non-header lines tolerated at the top of a page before any header
    /// is seen (handles masthead lines above the real header block).
    pub num_non_headers_allowed_at_top: u32,

    /// Non-header lines tolerated between headers of the same block.
    pub num_non_headers_allowed_between_headers: u32,

    /// Right-justified mode: lines allowed above the first label line.
    pub max_non_headers_before_block: usize,

    /// Right-justified mode: maximum gap of non-label lines inside a block.
    pub max_non_headers_in_block: usize,

    /// Explicit scanner reset policy. When unset, derived from the
    /// page-break policy: per-page when `new_page_for_each_message`,
    /// per-message otherwise.
    pub scanner_reset: Option<ScannerReset>,

    /// Run OCR preprocessing on each unit before extraction. The caller
    /// must know whether the tranche is image-based; OCR on a unit that
    /// already has a text layer produces bad results.
    pub perform_ocr: bool,
}

/// Paths to the external tools the adapter spawns.
///
/// Passed explicitly into the tool harness at construction; nothing in the
/// core consults ambient state for tool discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// `pdftotext` (poppler-utils), used with `-htmlmeta -bbox`.
    pub pdftotext: PathBuf,
    /// ImageMagick `convert`, used to rasterize PDFs for OCR.
    pub convert: PathBuf,
    /// `tesseract`, used to OCR the rasterized pages back into a PDF.
    pub tesseract: PathBuf,
    /// `pdftk`, used to unpack PDF portfolios.
    pub pdftk: PathBuf,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            y_pos_tolerance: 0.5,
            x_pos_tolerance: 1.0,
            header_justification: Justification::Left,
            new_page_for_each_message: true,
            num_non_headers_allowed_at_top: 1,
            num_non_headers_allowed_between_headers: 1,
            max_non_headers_before_block: 1,
            max_non_headers_in_block: 7,
            scanner_reset: None,
            perform_ocr: false,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pdftotext: PathBuf::from("pdftotext"),
            convert: PathBuf::from("convert"),
            tesseract: PathBuf::from("tesseract"),
            pdftk: PathBuf::from("pdftk"),
        }
    }
}

impl ScanConfig {
    /// The effective reset policy (explicit value, or derived from the
    /// page-break policy).
    pub fn reset_policy(&self) -> ScannerReset {
        self.scanner_reset.unwrap_or(if self.new_page_for_each_message {
            ScannerReset::PerPage
        } else {
            ScannerReset::PerMessage
        })
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("MAILSHRED_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("mailshred").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailshred")
}
