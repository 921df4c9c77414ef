//! Structural fingerprinting for layout authoring.
//!
//! Feeding every crawled page through a [`StructureSampler`] yields a
//! small sample set: the documents that introduced a markup structure not
//! seen before. Writing a layout against just those pages covers every
//! structure in the corpus.
//!
//! A document's fingerprint is the set of routes from the document root
//! to each text-bearing leaf, where every element on the route is reduced
//! to its tag name plus sorted class list.

use std::collections::BTreeSet;

use dom_query::{NodeRef, Selection};
use tracing::debug;

use crate::dom;

/// An element reduced to what matters for layout selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSignature {
    pub tag: String,
    /// Class names, whitespace-split, sorted and space-rejoined.
    pub classes: String,
}

/// Accumulates leaf routes across documents and remembers which ones
/// introduced unseen structure.
#[derive(Debug, Default)]
pub struct StructureSampler {
    attributes: Vec<LeafSignature>,
    routes: BTreeSet<String>,
    samples: Vec<String>,
}

impl StructureSampler {
    #[must_use]
    pub fn new() -> Self {
        StructureSampler::default()
    }

    /// Fingerprint one document. Returns true when it contains at least
    /// one leaf route no earlier document had; such documents are kept as
    /// samples.
    pub fn observe(&mut self, id: &str, html: &str) -> bool {
        let doc = dom::parse(html);
        let mut novel = false;

        let nodes: Vec<NodeRef> = doc.select("body *").nodes().to_vec();
        for node in nodes {
            let sel = Selection::from(node);
            if !sel.children().is_empty() || sel.text().trim().is_empty() {
                continue;
            }
            let route = self.route_to(&node);
            if self.routes.insert(route) {
                novel = true;
            }
        }

        if novel {
            debug!(id, "document has unseen structure");
            self.samples.push(id.to_string());
        }
        novel
    }

    /// Ids of the structurally novel documents, in observation order.
    #[must_use]
    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    /// Every distinct element signature seen on a leaf route.
    #[must_use]
    pub fn attributes(&self) -> &[LeafSignature] {
        &self.attributes
    }

    /// Number of distinct leaf routes seen so far.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Route from the topmost element under `body` down to `node`, as
    /// space-joined indices into the signature table.
    fn route_to(&mut self, node: &NodeRef) -> String {
        let mut chain = vec![signature(node)];
        for ancestor in node.ancestors(None) {
            let Some(name) = ancestor.node_name() else {
                continue;
            };
            if name.as_ref() == "body" || name.as_ref() == "html" {
                break;
            }
            chain.push(signature(&ancestor));
        }

        // The chain was built leaf-first; the route reads root-first.
        let indices: Vec<String> = chain
            .into_iter()
            .rev()
            .map(|sig| self.intern(sig).to_string())
            .collect();
        indices.join(" ")
    }

    fn intern(&mut self, sig: LeafSignature) -> usize {
        match self.attributes.iter().position(|s| *s == sig) {
            Some(index) => index,
            None => {
                self.attributes.push(sig);
                self.attributes.len() - 1
            }
        }
    }
}

fn signature(node: &NodeRef) -> LeafSignature {
    let tag = node
        .node_name()
        .map(|name| name.to_string())
        .unwrap_or_default();
    let class_attr = node
        .attr("class")
        .map(|value| value.to_string())
        .unwrap_or_default();
    let mut classes: Vec<&str> = class_attr.split_whitespace().collect();
    classes.sort_unstable();

    LeafSignature {
        tag,
        classes: classes.join(" "),
    }
}
