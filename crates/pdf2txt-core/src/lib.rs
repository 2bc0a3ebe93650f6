//! Core of pdf2txt: conversion jobs, the PDF backend capability and the
//! sequential batch runner.
//!
//! The actual PDF decoding lives behind [`PdfBackend`]; this crate only opens
//! documents through it, joins page text with `--- Page N ---` headers and
//! writes the result next to the input.

pub mod backend;
pub mod batch;
pub mod config_file;
pub mod converter;
pub mod job;
pub mod mock;

pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use batch::{BatchEvent, BatchOptions, BatchSummary, JobOutcome, run_batch};
pub use config_file::{ConfigError, ConfigFile};
pub use converter::{ConversionReport, ConvertError, Converter, render_pages};
pub use job::{ConversionJob, DEFAULT_INPUTS, derive_output_path};
