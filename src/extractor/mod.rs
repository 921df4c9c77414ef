//! The tree extractor: walks a parsed dictionary page against a layout,
//! destructively carving structured entries out of the tree.
//!
//! One [`PageExtractor`] owns one tree for one document. `collect()`
//! detects the applicable categories, recursively extracts the layout's
//! field shape (removing each consumed leaf element from the tree), and
//! `check_remain()` then verifies that nothing meaningful was left behind.
//! The two calls form a single ordered pipeline over the same mutated
//! tree; never validate a tree extracted by someone else.

mod blocks;
mod validate;

use std::path::{Path, PathBuf};

use dom_query::{Document, Selection};
use tracing::debug;

use crate::dom;
use crate::error::{Error, Result};
use crate::layout::{ContentKind, Layout, Selector, Shape, ENTRY_FIELD};
use crate::value::Value;

use blocks::{find_blocks, Blocks};

/// Extracts structured entries from one parsed page.
pub struct PageExtractor<'a> {
    layout: &'a Layout,
    doc: Document,
    categories: Vec<String>,
    full: bool,
    sink: Option<DebugSink>,
}

impl<'a> PageExtractor<'a> {
    /// Parse `html` and detect which layout categories apply.
    ///
    /// A category applies when its `entry` selector matches anywhere in
    /// the document; detection order follows layout declaration order.
    #[must_use]
    pub fn new(layout: &'a Layout, html: &str) -> Self {
        let doc = dom::parse(html);
        let categories = layout
            .categories
            .iter()
            .filter(|(_, category)| {
                category
                    .entry_selector()
                    .is_some_and(|selector| selector.iter().any(|css| doc.select(css).exists()))
            })
            .map(|(name, _)| name.clone())
            .collect();

        PageExtractor { layout, doc, categories, full: false, sink: None }
    }

    /// The category names detected for this document.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Switch on full mode: every declared field appears in results (null
    /// when empty), and, given a directory, extraction artifacts are
    /// written under it for layout authoring.
    pub fn enable_debug(&mut self, name: &str, dir: Option<&Path>) -> Result<()> {
        self.full = true;
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)?;
        }
        self.sink = Some(DebugSink {
            name: name.to_string(),
            dir: dir.map(Path::to_path_buf),
        });
        Ok(())
    }

    /// Collect entries for every detected category, in declaration order.
    ///
    /// Consumed leaf elements are removed from the tree as a side effect.
    pub fn collect(&mut self) -> Result<Vec<Value>> {
        if self.categories.is_empty() {
            if self.is_undefined() {
                return Err(Error::UndefinedWord);
            }
            return Err(Error::NoCategory);
        }

        let mut entries: Vec<Value> = Vec::new();
        for category in &self.categories {
            debug!(category, "extracting category");
            let css = self.layout.merged_selectors(category);
            let shape = self.layout.shape_for(category);
            let root = self.doc.select("html");

            let arity = self.layout.arity(ENTRY_FIELD);
            let found = match find_blocks(&root, ENTRY_FIELD, css.get(ENTRY_FIELD).copied(), arity)
            {
                Ok(found) => found,
                Err(err) => {
                    self.snapshot_arity_failure(&root, &err)?;
                    return Err(err);
                }
            };

            match found {
                None => {}
                Some(Blocks::One(block)) => {
                    let value = self.collect_shape(&block, shape, &css)?;
                    if self.full || !value.is_empty() {
                        entries.push(value);
                    }
                }
                Some(Blocks::Many(list)) => {
                    for block in &list {
                        let value = self.collect_shape(block, shape, &css)?;
                        if self.full || !value.is_empty() {
                            entries.push(value);
                        }
                    }
                }
            }
        }

        if let Some(sink) = &self.sink {
            sink.write_json(&entries)?;
            sink.write_html(&dom::outer_html(&self.doc), "_remain")?;
        }

        if entries.is_empty() {
            return Err(Error::EmptyResult);
        }
        Ok(entries)
    }

    /// Validate that extraction accounted for everything meaningful.
    ///
    /// Must run after `collect()` on the same extractor: its correctness
    /// depends on the removals collect performed.
    pub fn check_remain(&mut self) -> Result<()> {
        validate::prune_outside_boundary(&self.doc, &self.layout.boundary);
        validate::remove_ignored(&self.doc, &self.layout.ignore);
        validate::remove_alpha_empty(&self.doc);

        if let Some(sink) = &self.sink {
            sink.write_html(&dom::outer_html(&self.doc), "_clean")?;
        }

        let text = self.doc.select("body").text();
        if dom::has_alpha(&text) {
            return Err(Error::RemainingText);
        }
        Ok(())
    }

    /// Recursive walk of one shape level under `tree`.
    fn collect_shape(
        &self,
        tree: &Selection,
        shape: &Shape,
        css: &std::collections::HashMap<&str, &Selector>,
    ) -> Result<Value> {
        let mut out: Vec<(String, Value)> = Vec::new();

        for (field, sub) in shape.fields() {
            let arity = self.layout.arity(field);
            let found = match find_blocks(tree, field, css.get(field.as_str()).copied(), arity) {
                Ok(found) => found,
                Err(err) => {
                    self.snapshot_arity_failure(tree, &err)?;
                    return Err(err);
                }
            };

            let mut data = match found {
                None => Value::Null,
                Some(Blocks::One(block)) => match sub {
                    Shape::Nested(_) => self.collect_shape(&block, sub, css)?,
                    Shape::Leaf(kind) => {
                        let value = leaf_content(&block, *kind);
                        dom::remove(&block);
                        value
                    }
                },
                Some(Blocks::Many(list)) => match sub {
                    Shape::Nested(_) => {
                        let mut items = Vec::with_capacity(list.len());
                        for block in &list {
                            items.push(self.collect_shape(block, sub, css)?);
                        }
                        Value::List(items)
                    }
                    Shape::Leaf(kind) => {
                        let items = list.iter().map(|block| leaf_content(block, *kind)).collect();
                        for block in &list {
                            dom::remove(block);
                        }
                        Value::List(items)
                    }
                },
            };

            if !self.full {
                data = data.pruned();
            }
            if self.full || !data.is_empty() {
                out.push((field.clone(), data));
            }
        }

        Ok(Value::Map(out))
    }

    fn is_undefined(&self) -> bool {
        self.layout
            .undefined
            .iter()
            .any(|css| self.doc.select(css).exists())
    }

    fn snapshot_arity_failure(&self, tree: &Selection, err: &Error) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let suffix = match err {
            Error::BlockNotFound(_) => "_block_0",
            Error::MultipleSingleBlock(_) => "_block_1",
            _ => return Ok(()),
        };
        sink.write_html(&tree.html(), suffix)
    }
}

/// Read a leaf field's content from its matched element.
fn leaf_content(block: &Selection, kind: ContentKind) -> Value {
    match kind {
        ContentKind::Text => Value::Text(dom::text_content(block).to_string()),
        ContentKind::Id => dom::id(block).map_or(Value::Null, Value::Text),
    }
}

/// Writes extraction artifacts for layout authoring.
struct DebugSink {
    name: String,
    dir: Option<PathBuf>,
}

impl DebugSink {
    fn write_json(&self, entries: &[Value]) -> Result<()> {
        let Some(dir) = &self.dir else { return Ok(()) };
        let path = dir.join(format!("{}.json", self.name));
        let json = serde_json::to_string_pretty(entries)?;
        debug!(path = %path.display(), "writing extraction artifact");
        std::fs::write(path, json)?;
        Ok(())
    }

    fn write_html(&self, html: &str, suffix: &str) -> Result<()> {
        let Some(dir) = &self.dir else { return Ok(()) };
        let path = dir.join(format!("{}{}.html", self.name, suffix));
        debug!(path = %path.display(), "writing tree snapshot");
        std::fs::write(path, html)?;
        Ok(())
    }
}
