//! DOM operations adapter.
//!
//! Thin layer over the `dom_query` crate exposing the handful of operations
//! the extraction engine is built on: parsing, CSS selection, flattened
//! text, node identity, and destructive removal. Keeping the engine behind
//! this surface makes the destructive tree mutations explicit and easy to
//! audit.

use std::collections::HashSet;

// Re-export core types for external use
pub use dom_query::{Document, NodeId, NodeRef, Selection};
pub use tendril::StrTendril;

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Get the flattened text content of a selection's subtree.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get an element's `id` attribute.
#[inline]
#[must_use]
pub fn id(sel: &Selection) -> Option<String> {
    sel.attr("id").map(|s| s.to_string())
}

/// Remove a selection's nodes from the tree. Irreversible.
#[inline]
pub fn remove(sel: &Selection) {
    sel.remove();
}

/// Remove a single node from the tree. Irreversible.
#[inline]
pub fn remove_node(node: &NodeRef) {
    Selection::from(*node).remove();
}

/// Serialized HTML of the whole document, for debug snapshots.
#[inline]
#[must_use]
pub fn outer_html(doc: &Document) -> StrTendril {
    doc.html()
}

/// Collect the node ids matched by a selector, in document order.
#[must_use]
pub fn select_ids(doc: &Document, selector: &str) -> Vec<NodeId> {
    doc.select(selector).nodes().iter().map(|n| n.id).collect()
}

/// True if `node` is a strict descendant of any node in `ancestor_ids`.
#[must_use]
pub fn has_ancestor_in(node: &NodeRef, ancestor_ids: &HashSet<NodeId>) -> bool {
    node.ancestors(None)
        .iter()
        .any(|anc| ancestor_ids.contains(&anc.id))
}

/// True if the text contains at least one alphabetic character.
///
/// This is the "meaningful content" test used throughout validation:
/// punctuation, digits, and whitespace alone do not count as content.
#[inline]
#[must_use]
pub fn has_alpha(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_and_text() {
        let doc = parse(r#"<div id="main"><span>hello</span> world</div>"#);
        let div = doc.select("div");

        assert_eq!(id(&div), Some("main".to_string()));
        assert_eq!(text_content(&div), "hello world".into());
    }

    #[test]
    fn test_remove_is_destructive() {
        let doc = parse(r#"<div><span class="gone">x</span><p>keep</p></div>"#);
        remove(&doc.select(".gone"));

        assert!(doc.select(".gone").is_empty());
        assert_eq!(text_content(&doc.select("div")), "keep".into());
    }

    #[test]
    fn test_remove_node_detaches_subtree() {
        let doc = parse(r#"<div><p>a<b>b</b></p><p>c</p></div>"#);
        let first = doc.select("p");
        let node = first.nodes()[0];
        remove_node(&node);

        assert_eq!(doc.select("p").length(), 1);
        assert!(doc.select("b").is_empty());
    }

    #[test]
    fn test_has_ancestor_in() {
        let doc = parse(r#"<div class="outer"><div class="inner"><p>x</p></div></div>"#);
        let outer_ids: HashSet<_> = select_ids(&doc, ".outer").into_iter().collect();

        let p = doc.select("p");
        assert!(has_ancestor_in(&p.nodes()[0], &outer_ids));

        let inner = doc.select(".inner");
        assert!(has_ancestor_in(&inner.nodes()[0], &outer_ids));

        let outer = doc.select(".outer");
        assert!(!has_ancestor_in(&outer.nodes()[0], &outer_ids));
    }

    #[test]
    fn test_has_alpha() {
        assert!(has_alpha("word"));
        assert!(has_alpha("  /ˈrʌn/ n"));
        assert!(!has_alpha(" 1. 2. / - \n"));
        assert!(!has_alpha(""));
    }

    #[test]
    fn test_missing_id_is_none() {
        let doc = parse("<div>no id</div>");
        assert_eq!(id(&doc.select("div")), None);
    }
}
