//! `mailshred`: extract individual email messages from PDF document tranches.
//!
//! This crate provides the core library for turning positioned-word streams
//! (as produced by `pdftotext -bbox` or an OCR pass) into an ordered list of
//! email messages with reconstructed headers and page ranges.

pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod scanner;
pub mod segment;
pub mod stream;
pub mod tools;
pub mod tranche;
