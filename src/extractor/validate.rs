//! Post-extraction validation cleanup.
//!
//! After `collect()` has carved every declared field out of the tree, the
//! remainder is reduced in three ordered passes: prune branches outside the
//! boundary subtree, strip ignored elements, then remove alphabetic-empty
//! elements to a fixed point. Whatever alphabetic text survives was never
//! claimed by any field and means the layout under-specifies the page.

use std::collections::HashSet;

use dom_query::{Document, NodeId, NodeRef, Selection};

use crate::dom;

/// Keep only the branches leading to a `boundary` match; every sibling
/// branch that does not contain the boundary node is removed.
///
/// A boundary that matches nothing prunes every branch: the final
/// alphabetic check then decides whether that page was genuinely empty.
pub(crate) fn prune_outside_boundary(doc: &Document, boundary: &str) {
    let keep: HashSet<NodeId> = dom::select_ids(doc, boundary).into_iter().collect();
    let body = doc.select("body");
    prune_children(&body, boundary, &keep);
}

fn prune_children(sel: &Selection, boundary: &str, keep: &HashSet<NodeId>) {
    let children: Vec<NodeRef> = sel.children().nodes().to_vec();
    for child in children {
        if keep.contains(&child.id) {
            continue;
        }
        let child_sel = Selection::from(child);
        if child_sel.select(boundary).exists() {
            prune_children(&child_sel, boundary, keep);
        } else {
            dom::remove_node(&child);
        }
    }
}

/// Strip every element matching an ignore selector.
pub(crate) fn remove_ignored(doc: &Document, ignore: &[String]) {
    for css in ignore {
        dom::remove(&doc.select(css));
    }
}

/// Remove elements whose flattened text has no alphabetic character,
/// repeating until a full pass removes nothing.
///
/// The repeat handles ancestors that become empty only after their
/// children are stripped.
pub(crate) fn remove_alpha_empty(doc: &Document) {
    loop {
        let mut removed = false;
        let nodes: Vec<NodeRef> = doc.select("body *").nodes().to_vec();
        for node in nodes {
            if !dom::has_alpha(&Selection::from(node).text()) {
                dom::remove_node(&node);
                removed = true;
            }
        }
        if !removed {
            break;
        }
    }
}
