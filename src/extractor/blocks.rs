//! Candidate block resolution for one field of the extraction shape.
//!
//! Resolves a field's selector(s) against the current subtree, filters out
//! invalid candidates, and enforces the field's declared arity.

use std::collections::HashSet;

use dom_query::{NodeId, NodeRef, Selection};

use crate::dom;
use crate::error::{Error, Result};
use crate::layout::{Arity, Selector};

/// Valid candidates for a field, shaped by its max-arity.
#[derive(Debug)]
pub(crate) enum Blocks<'a> {
    /// Max-arity 1: the single matched element.
    One(Selection<'a>),
    /// Max-arity `+`: every matched element, in match order.
    Many(Vec<Selection<'a>>),
}

/// Resolve a field's candidates within `tree` and enforce `arity`.
///
/// A candidate is invalid when it is the subtree root itself, or a strict
/// descendant of another candidate in the same result set (nested matches
/// of the same selector must not be double-counted). Candidates matched by
/// more than one of the field's selectors are kept once per match.
///
/// Returns `Ok(None)` when no valid candidate remains and the field is
/// optional.
pub(crate) fn find_blocks<'a>(
    tree: &Selection<'a>,
    field: &str,
    selector: Option<&Selector>,
    arity: Arity,
) -> Result<Option<Blocks<'a>>> {
    let mut candidates: Vec<NodeRef<'a>> = Vec::new();
    if let Some(selector) = selector {
        for css in selector.iter() {
            for node in tree.select(css).nodes() {
                candidates.push(*node);
            }
        }
    }

    let root_ids: HashSet<NodeId> = tree.nodes().iter().map(|n| n.id).collect();
    let candidate_ids: HashSet<NodeId> = candidates.iter().map(|n| n.id).collect();

    let valid: Vec<NodeRef<'a>> = candidates
        .into_iter()
        .filter(|node| {
            !root_ids.contains(&node.id) && !dom::has_ancestor_in(node, &candidate_ids)
        })
        .collect();

    if arity.required && valid.is_empty() {
        return Err(Error::BlockNotFound(field.to_string()));
    }
    if !arity.multiple && valid.len() > 1 {
        return Err(Error::MultipleSingleBlock(field.to_string()));
    }

    if valid.is_empty() {
        return Ok(None);
    }

    let blocks = if arity.multiple {
        Blocks::Many(valid.into_iter().map(Selection::from).collect())
    } else {
        Blocks::One(Selection::from(valid[0]))
    };
    Ok(Some(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn one(css: &str) -> Selector {
        Selector::One(css.to_string())
    }

    #[test]
    fn test_single_match_with_exact_arity() {
        let doc = Document::from(r#"<div><span class="pos">n</span></div>"#);
        let root = doc.select("div");

        let arity = Arity { required: true, multiple: false };
        let blocks = find_blocks(&root, "pos", Some(&one(".pos")), arity).unwrap();

        match blocks {
            Some(Blocks::One(sel)) => assert_eq!(sel.text(), "n".into()),
            _ => panic!("expected single block"),
        }
    }

    #[test]
    fn test_missing_required_field_fails() {
        let doc = Document::from("<div><p>other</p></div>");
        let root = doc.select("div");

        let arity = Arity { required: true, multiple: false };
        let err = find_blocks(&root, "pos", Some(&one(".pos")), arity).unwrap_err();
        assert!(matches!(err, Error::BlockNotFound(field) if field == "pos"));
    }

    #[test]
    fn test_multiple_matches_for_single_field_fails() {
        let doc = Document::from(r#"<div><i class="pos">n</i><i class="pos">v</i></div>"#);
        let root = doc.select("div");

        let arity = Arity { required: false, multiple: false };
        let err = find_blocks(&root, "pos", Some(&one(".pos")), arity).unwrap_err();
        assert!(matches!(err, Error::MultipleSingleBlock(field) if field == "pos"));
    }

    #[test]
    fn test_optional_field_with_no_match_is_none() {
        let doc = Document::from("<div><p>other</p></div>");
        let root = doc.select("div");

        let blocks = find_blocks(&root, "ipa", Some(&one(".ipa")), Arity::default()).unwrap();
        assert!(blocks.is_none());

        // No selector at all behaves the same.
        let blocks = find_blocks(&root, "ipa", None, Arity::default()).unwrap();
        assert!(blocks.is_none());
    }

    #[test]
    fn test_nested_match_of_same_selector_is_dropped() {
        let doc = Document::from(
            r#"<div><div class="sense"><p>outer</p><div class="sense"><p>inner</p></div></div></div>"#,
        );
        let root = doc.select("body > div");

        let blocks = find_blocks(&root, "sense", Some(&one(".sense")), Arity::default()).unwrap();
        match blocks {
            Some(Blocks::Many(list)) => {
                // Only the outermost .sense survives; the nested one is a
                // strict descendant of a sibling candidate.
                assert_eq!(list.len(), 1);
                assert!(list[0].text().contains("outer"));
            }
            _ => panic!("expected block list"),
        }
    }

    #[test]
    fn test_multi_selector_candidates_concatenate_in_order() {
        let doc = Document::from(
            r#"<div><b class="us">first</b><b class="uk">second</b></div>"#,
        );
        let root = doc.select("div");

        let selector = Selector::Many(vec![".uk".to_string(), ".us".to_string()]);
        let blocks = find_blocks(&root, "ipa", Some(&selector), Arity::default()).unwrap();
        match blocks {
            Some(Blocks::Many(list)) => {
                assert_eq!(list.len(), 2);
                // Selector declaration order wins over document order.
                assert_eq!(list[0].text(), "second".into());
                assert_eq!(list[1].text(), "first".into());
            }
            _ => panic!("expected block list"),
        }
    }

    #[test]
    fn test_multiple_arity_keeps_document_order() {
        let doc = Document::from(
            r#"<ul><li class="eg">a</li><li class="eg">b</li><li class="eg">c</li></ul>"#,
        );
        let root = doc.select("ul");

        let blocks = find_blocks(&root, "examp", Some(&one(".eg")), Arity::default()).unwrap();
        match blocks {
            Some(Blocks::Many(list)) => {
                let texts: Vec<String> = list.iter().map(|s| s.text().to_string()).collect();
                assert_eq!(texts, vec!["a", "b", "c"]);
            }
            _ => panic!("expected block list"),
        }
    }
}
