//! Batch extraction driver: run one layout over many documents with
//! per-document failure isolation.
//!
//! One bad page never aborts the batch. Undefined-word pages are tallied
//! separately from layout failures, and a document whose extraction
//! succeeded but whose remainder check failed keeps its entries while
//! still being reported, so layout gaps surface without losing data.

use tracing::{info, warn};

use crate::error::Error;
use crate::extractor::PageExtractor;
use crate::layout::Layout;
use crate::value::Value;

/// One raw page to extract, tagged with a caller-chosen id (typically the
/// source URL or the word name).
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: String,
    pub html: String,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        SourceDocument {
            id: id.into(),
            html: html.into(),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Extracted entries per document, in input order.
    pub collected: Vec<(String, Vec<Value>)>,
    /// Ids of documents whose source confirms the word is not defined.
    pub undefined: Vec<String>,
    /// Ids of documents whose extraction or validation failed, with the
    /// failure. A document may appear here *and* in `collected` when its
    /// remainder check failed after a successful extraction.
    pub failures: Vec<(String, Error)>,
}

impl BatchReport {
    /// True when no document failed. Undefined words are not failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Extract every document with `layout`, accumulating per-document
/// outcomes instead of failing fast.
pub fn parse_documents<I>(layout: &Layout, docs: I) -> BatchReport
where
    I: IntoIterator<Item = SourceDocument>,
{
    let mut report = BatchReport::default();

    for doc in docs {
        info!(id = %doc.id, "extracting document");
        let mut extractor = PageExtractor::new(layout, &doc.html);

        match extractor.collect() {
            Ok(entries) => {
                report.collected.push((doc.id.clone(), entries));
                // Entries are kept even when validation then finds
                // unclaimed text; the failure still gets reported.
                if let Err(err) = extractor.check_remain() {
                    warn!(id = %doc.id, %err, "document left unextracted content");
                    report.failures.push((doc.id, err));
                }
            }
            Err(Error::UndefinedWord) => {
                info!(id = %doc.id, "word not defined in source");
                report.undefined.push(doc.id);
            }
            Err(err) => {
                warn!(id = %doc.id, %err, "extraction failed");
                report.failures.push((doc.id, err));
            }
        }
    }

    report
}
