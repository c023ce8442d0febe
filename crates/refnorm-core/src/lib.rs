//! refnorm core: keeps the `references` of a palette document tidy
//!
//! Every color record in a palette document may list the palettes it appears
//! in. Over time those lists collect duplicates and fall out of order. This
//! crate deduplicates each list and sorts it by numeric value.
//!
//! # Architecture
//!
//! ```text
//! JSON text → Document (shape check) → Normalizer → pretty JSON
//!                                          ↓
//!                                   NormalizeReport
//! ```
//!
//! `pipeline` wraps the same steps with a read at the start and an atomic
//! write at the end.
//!
//! # Guarantees
//!
//! - **Idempotent**: a normalized document normalizes to itself
//! - **All-or-nothing**: nothing is modified or written if any record fails
//! - **Order preserving**: keys keep their position in every object

pub mod document;
pub mod error;
pub mod normalizer;
pub mod pipeline;

pub use document::Document;
pub use error::{Error, Result};
pub use normalizer::{normalize_colors, normalize_document, normalize_str, NormalizeReport};
pub use pipeline::{run, Config, Mode, RunOutcome};

/// File read and rewritten when no path is given
pub const DEFAULT_FILE: &str = "colors.json";

pub const COLORS_KEY: &str = "colors";
pub const PALETTES_KEY: &str = "palettes";
pub const REFERENCES_KEY: &str = "references";
