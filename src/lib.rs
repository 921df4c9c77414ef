//! # lexicarve
//!
//! Layout-driven extraction of structured entries from dictionary-site
//! markup, plus consolidation of the extracted records into a clean,
//! deduplicated word list.
//!
//! Extraction is declarative and destructive: a JSON layout names CSS
//! selectors for every field of an entry, and the extractor carves each
//! matched leaf out of the tree as it reads it. Whatever meaningful text
//! is still in the tree afterwards proves the layout incomplete, so a
//! handful of layouts can be verified against an entire crawled corpus.
//!
//! ## Quick Start
//!
//! ```rust
//! use lexicarve::{Layout, PageExtractor};
//!
//! let layout = Layout::from_json(r#"{
//!     "selectors": { "title": ".headword" },
//!     "categories": { "word": { "selectors": { "entry": ".entry" } } },
//!     "shape": { "title": "text" },
//!     "size": { "title": "1,1" },
//!     "undefined": [".not-found"],
//!     "ignore": [],
//!     "boundary": ".dictionary"
//! }"#)?;
//!
//! let html = r#"<div class="dictionary">
//!     <div class="entry"><span class="headword">run</span></div>
//! </div>"#;
//!
//! let mut extractor = PageExtractor::new(&layout, html);
//! let entries = extractor.collect()?;
//! extractor.check_remain()?;
//! assert_eq!(entries.len(), 1);
//! # Ok::<(), lexicarve::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Extraction** ([`PageExtractor`], [`batch::parse_documents`]):
//!   markup in, structured [`Value`] entries out, with undefined-word
//!   detection and a remainder check per page.
//! - **Inflection** ([`inflect`]): closure over an external morphological
//!   lexicon, so every surface form of a headword is searchable.
//! - **Consolidation** ([`Consolidator`]): fetches stored records for a
//!   headword and its inflections, backfills phonetics across sources,
//!   and removes duplicate entries by source priority.
//! - **Sampling** ([`sample::StructureSampler`]): picks the structurally
//!   novel pages of a corpus for layout authoring.
//!
//! The crate emits [`tracing`] events; installing a subscriber is the
//! caller's business.

mod error;
mod extractor;
mod layout;
mod value;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Inflection closure and base-word derivation.
pub mod inflect;

/// Stored extraction records and the `RecordStore` capability.
pub mod record;

/// Consolidation of stored records into publishable entries.
pub mod consolidate;

/// Batch extraction with per-document failure isolation.
pub mod batch;

/// Structural fingerprinting for layout authoring.
pub mod sample;

// Public API - re-exports
pub use batch::{parse_documents, BatchReport, SourceDocument};
pub use consolidate::{Consolidator, SourcePriority};
pub use error::{Error, Result};
pub use extractor::PageExtractor;
pub use inflect::InflectionLookup;
pub use layout::{Arity, Category, ContentKind, Layout, Selector, Shape};
pub use record::{ConsolidatedEntry, EntryRecord, RecordStore};
pub use value::Value;
