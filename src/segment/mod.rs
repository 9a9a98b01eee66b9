//! The email segmenter: a synchronous reducer over one unit's word stream.
//!
//! Drives the line assembler and header scanner, translates `email_start`
//! signals into message boundary bookkeeping, and applies the tranche's
//! page-break policy. The segmenter holds no I/O and no timing state; the
//! transport (whatever delivers [`StreamEvent`]s) lives entirely outside.

pub mod assembler;

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::config::{Justification, ScanConfig, ScannerReset};
use crate::model::email::{Boundary, Email};
use crate::model::header::HeaderBlock;
use crate::model::line::Line;
use crate::scanner::left::LeftScanner;
use crate::scanner::right::{self, RightScanOptions};
use crate::scanner::ScanOutcome;
use crate::segment::assembler::LineAssembler;
use crate::stream::StreamEvent;

/// Reduces one source unit's event stream to an ordered message list.
///
/// Page numbering is the segmenter's own 1-based counter, advanced on every
/// `PageStart`; the adapter's page numbers are not trusted.
#[derive(Debug)]
pub struct EmailSegmenter {
    scan: ScanConfig,
    file: PathBuf,
    emails: Vec<Email>,
    assembler: LineAssembler,
    scanner: LeftScanner,
    /// One page of closed lines, buffered only in right-justified mode.
    page_lines: Vec<Line>,
    current_page: u32,
    /// The deepest page that produced at least one line.
    last_content_page: u32,
    headers_on_page: u32,
    non_header_run: u32,
    ignore_headers_until_next_page: bool,
}

impl EmailSegmenter {
    pub fn new(file: &Path, scan: ScanConfig) -> Self {
        let assembler = LineAssembler::new(scan.y_pos_tolerance);
        let scanner = LeftScanner::new(scan.x_pos_tolerance);
        Self {
            scan,
            file: file.to_path_buf(),
            emails: Vec::new(),
            assembler,
            scanner,
            page_lines: Vec::new(),
            current_page: 0,
            last_content_page: 0,
            headers_on_page: 0,
            non_header_run: 0,
            ignore_headers_until_next_page: false,
        }
    }

    /// Feed one stream event.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::PageStart { .. } => self.start_page(),
            StreamEvent::Word(word) => {
                if let Some(line) = self.assembler.process_word(word) {
                    self.handle_line(line);
                }
            }
            StreamEvent::PageEnd { .. } => self.end_page(),
            StreamEvent::StreamEnd => self.end_page(),
        }
    }

    /// Finalize the unit: the open message's end becomes the last page seen.
    pub fn finish(mut self) -> Vec<Email> {
        self.end_page();

        if let Some(last) = self.emails.last_mut() {
            if last.end.is_none() {
                // Under the fresh-page policy a trailing content-free page
                // belongs to no message slot; otherwise the open message
                // runs to the end of the unit.
                let end = if self.scan.new_page_for_each_message {
                    self.last_content_page.max(last.start.page)
                } else {
                    self.current_page
                };
                last.end = Some(Boundary { page: end });
            }
        }

        self.emails
    }

    fn start_page(&mut self) {
        // Anything still open belongs to the page we are leaving.
        if let Some(line) = self.assembler.flush() {
            self.handle_line(line);
        }
        self.scan_page_buffer();

        self.current_page += 1;
        self.assembler.set_page(self.current_page);
        if self.scan.reset_policy() == ScannerReset::PerPage {
            self.scanner.reset();
        }
        self.headers_on_page = 0;
        self.non_header_run = 0;
        self.ignore_headers_until_next_page = false;
        debug!(page = self.current_page, "page start");
    }

    fn end_page(&mut self) {
        if let Some(line) = self.assembler.flush() {
            self.handle_line(line);
        }
        self.scan_page_buffer();
    }

    fn handle_line(&mut self, line: Line) {
        trace!(x = line.x, y = line.y, text = %line.text, "line");
        self.last_content_page = self.last_content_page.max(line.page);

        if self.scan.header_justification == Justification::Right {
            self.page_lines.push(line);
            return;
        }
        self.scan_line(line);
    }

    /// Run one line through the incremental scanner, with the non-header
    /// allowance bookkeeping that guards against reply-chain false positives.
    fn scan_line(&mut self, line: Line) {
        if self.ignore_headers_until_next_page {
            return;
        }

        match self.scanner.scan_line(&line) {
            ScanOutcome::Header(label) => {
                trace!(label = %label, "header");
                self.headers_on_page += 1;
                self.non_header_run = 0;
            }
            ScanOutcome::EmailStart { start, headers } => {
                self.on_email_start(start.page, headers);
                self.count_non_header();
            }
            ScanOutcome::NonHeader => self.count_non_header(),
        }
    }

    fn count_non_header(&mut self) {
        self.non_header_run += 1;
        if !self.scan.new_page_for_each_message {
            return;
        }
        let allowance = if self.headers_on_page == 0 {
            self.scan.num_non_headers_allowed_at_top
        } else {
            self.scan.num_non_headers_allowed_between_headers
        };
        if self.non_header_run > allowance && !self.ignore_headers_until_next_page {
            debug!(
                page = self.current_page,
                "non-header allowance exceeded, ignoring rest of page"
            );
            self.ignore_headers_until_next_page = true;
        }
    }

    /// Right-justified mode: scan the finished page's buffered lines in one
    /// batch, falling back to the incremental scanner when inconclusive.
    fn scan_page_buffer(&mut self) {
        if self.scan.header_justification != Justification::Right {
            return;
        }
        let lines = std::mem::take(&mut self.page_lines);
        if lines.is_empty() {
            return;
        }

        let opts = RightScanOptions {
            x_pos_tolerance: self.scan.x_pos_tolerance,
            max_non_headers_before_block: self.scan.max_non_headers_before_block,
            max_non_headers_in_block: self.scan.max_non_headers_in_block,
        };
        if let Some(headers) = right::scan_page(&lines, &opts) {
            let start_page = headers
                .start()
                .map(|s| s.page)
                .unwrap_or(self.current_page);
            self.on_email_start(start_page, headers);
            return;
        }

        debug!(
            page = self.current_page,
            "right-justified scan inconclusive, falling back to left"
        );
        for line in lines {
            self.scan_line(line);
        }
    }

    fn on_email_start(&mut self, start_page: u32, headers: HeaderBlock) {
        let (prev_end, start) = if self.scan.new_page_for_each_message {
            (start_page.saturating_sub(1), start_page)
        } else {
            (start_page, start_page)
        };

        if let Some(prev) = self.emails.last_mut() {
            prev.end = Some(Boundary { page: prev_end });
        }

        debug!(page = start, "email start");
        self.emails.push(Email {
            file: self.file.clone(),
            start: Boundary { page: start },
            end: None,
            headers,
        });

        if self.scan.new_page_for_each_message {
            self.ignore_headers_until_next_page = true;
        }
    }
}
