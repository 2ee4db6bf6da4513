use std::fmt;

use crate::classify::{AncestorView, ElementView, MAX_ANCESTOR_DEPTH};

/// Marker attribute recording that this extension hid an element. The sole
/// source of truth when restoring: anything else that is hidden belongs to
/// the host page and stays hidden.
pub const MARKER_ATTR: &str = "data-difficulty-hidden";

/// Value stored in the marker attribute.
pub const MARKER_VALUE: &str = "true";

/// Override class forcing difficulty elements visible against host CSS.
pub const SHOW_CLASS: &str = "leetcode-difficulty-show";

/// Href fragment identifying a link to a problem detail page.
pub const PROBLEM_LINK_FRAGMENT: &str = "/problems/";

/// Node taxonomy exposed by a document backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Comments, processing instructions and the like; skipped everywhere.
    Other,
}

/// A selector failed to run. Logged and skipped; never fatal.
#[derive(Debug)]
pub enum QueryError {
    /// The backend does not understand the selector syntax.
    Unsupported(String),
    /// The backend rejected the query at runtime.
    Backend(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::Unsupported(sel) => write!(f, "unsupported selector: {sel}"),
            QueryError::Backend(msg) => write!(f, "query failed: {msg}"),
        }
    }
}

/// The seam between the suppression engine and a page. Implemented over
/// `web_sys` for the live document and over an in-memory tree in tests.
/// Mutators take `&self`; backends use interior mutability where needed.
pub trait DomDocument {
    /// Handle to a node. Equality must mean node identity.
    type Node: Clone + PartialEq;

    fn body(&self) -> Option<Self::Node>;
    fn kind(&self, node: &Self::Node) -> NodeKind;
    /// Lowercased tag name; empty for non-elements.
    fn tag(&self, node: &Self::Node) -> String;
    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// Concatenated text content of the subtree.
    fn text(&self, node: &Self::Node) -> String;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Child nodes in document order, text nodes included.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    /// All nodes matching a selector, in document order.
    fn query(&self, selector: &str) -> Result<Vec<Self::Node>, QueryError>;

    fn set_attr(&self, node: &Self::Node, name: &str, value: &str);
    fn remove_attr(&self, node: &Self::Node, name: &str);
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    /// Set an inline style property; an empty value clears it.
    fn set_style(&self, node: &Self::Node, prop: &str, value: &str);
}

/// Class attribute of a node, empty for non-elements.
pub fn class_attr<D: DomDocument>(doc: &D, node: &D::Node) -> String {
    doc.attr(node, "class").unwrap_or_default()
}

/// Collect every node under `root` (excluded), depth first.
pub fn descendants<D: DomDocument>(doc: &D, root: &D::Node) -> Vec<D::Node> {
    let mut out = Vec::new();
    let mut stack = doc.children(root);
    stack.reverse();
    while let Some(node) = stack.pop() {
        let mut children = doc.children(&node);
        children.reverse();
        stack.extend(children);
        out.push(node);
    }
    out
}

/// True when some descendant of `node` is an anchor to a problem page.
pub fn has_problem_link<D: DomDocument>(doc: &D, node: &D::Node) -> bool {
    for child in doc.children(node) {
        if doc.kind(&child) != NodeKind::Element {
            continue;
        }
        if doc.tag(&child) == "a"
            && doc
                .attr(&child, "href")
                .is_some_and(|href| href.contains(PROBLEM_LINK_FRAGMENT))
        {
            return true;
        }
        if has_problem_link(doc, &child) {
            return true;
        }
    }
    false
}

/// Build the immutable snapshot [`crate::classify::classify`] consumes.
/// Walks at most [`MAX_ANCESTOR_DEPTH`] ancestors.
pub fn element_view<D: DomDocument>(doc: &D, node: &D::Node) -> ElementView {
    let mut ancestors = Vec::new();
    let mut current = doc.parent(node);
    while let Some(parent) = current {
        if ancestors.len() >= MAX_ANCESTOR_DEPTH || doc.kind(&parent) != NodeKind::Element {
            break;
        }
        ancestors.push(AncestorView {
            tag: doc.tag(&parent),
            class_attr: class_attr(doc, &parent),
            has_problem_link: has_problem_link(doc, &parent),
        });
        current = doc.parent(&parent);
    }
    ElementView {
        tag: doc.tag(node),
        class_attr: class_attr(doc, node),
        role: doc.attr(node, "role"),
        text: doc.text(node),
        ancestors,
    }
}

/// Append `node` unless an identical handle is already present.
pub fn push_unique<D: DomDocument>(set: &mut Vec<D::Node>, node: D::Node) {
    if !set.contains(&node) {
        set.push(node);
    }
}

/// Hide `node` and tag it with the suppression marker.
pub fn suppress<D: DomDocument>(doc: &D, node: &D::Node) {
    doc.set_style(node, "display", "none");
    doc.set_attr(node, MARKER_ATTR, MARKER_VALUE);
}

/// True when `node` carries the suppression marker.
pub fn is_suppressed<D: DomDocument>(doc: &D, node: &D::Node) -> bool {
    doc.attr(node, MARKER_ATTR).as_deref() == Some(MARKER_VALUE)
}

/// Style properties a restore pass clears. Suppression only sets `display`,
/// but older page states may carry leftovers from the other overrides the
/// visible pass applies, so all of them are reset.
const RESTORED_PROPS: [&str; 7] = [
    "display",
    "visibility",
    "opacity",
    "height",
    "width",
    "margin",
    "padding",
];

/// Undo suppression: clear the style overrides and drop the marker.
pub fn restore<D: DomDocument>(doc: &D, node: &D::Node) {
    for prop in RESTORED_PROPS {
        doc.set_style(node, prop, "");
    }
    doc.remove_attr(node, MARKER_ATTR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdom::TestDom;

    #[test]
    fn descendants_are_depth_first() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let outer = dom.el(body, "div", &[]);
        let inner = dom.el(outer, "span", &[]);
        let text = dom.text_node(inner, "hi");
        let sibling = dom.el(body, "p", &[]);
        assert_eq!(descendants(&dom, &body), vec![outer, inner, text, sibling]);
    }

    #[test]
    fn problem_link_found_in_subtree() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let row = dom.el(body, "div", &[]);
        let cell = dom.el(row, "div", &[]);
        dom.el(cell, "a", &[("href", "/problems/two-sum/")]);
        assert!(has_problem_link(&dom, &row));
    }

    #[test]
    fn unrelated_link_is_not_a_problem_link() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let row = dom.el(body, "div", &[]);
        dom.el(row, "a", &[("href", "/contest/weekly-123/")]);
        assert!(!has_problem_link(&dom, &row));
    }

    #[test]
    fn element_view_caps_ancestors() {
        let dom = TestDom::new();
        let mut parent = dom.body_id();
        for _ in 0..15 {
            parent = dom.el(parent, "div", &[]);
        }
        let leaf = dom.el(parent, "span", &[("class", "text-sd-easy")]);
        let view = element_view(&dom, &leaf);
        assert_eq!(view.ancestors.len(), MAX_ANCESTOR_DEPTH);
        assert_eq!(view.tag, "span");
        assert_eq!(view.class_attr, "text-sd-easy");
    }

    #[test]
    fn element_view_collects_text() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let cell = dom.el(body, "td", &[]);
        dom.text_node(cell, "Medium");
        let view = element_view(&dom, &cell);
        assert_eq!(view.text, "Medium");
        assert_eq!(view.ancestors[0].tag, "body");
    }

    #[test]
    fn suppress_then_restore_round_trips() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let label = dom.el(body, "p", &[("class", "text-sd-easy")]);
        suppress(&dom, &label);
        assert!(is_suppressed(&dom, &label));
        assert_eq!(dom.style_of(label, "display").as_deref(), Some("none"));
        restore(&dom, &label);
        assert!(!is_suppressed(&dom, &label));
        assert_eq!(dom.style_of(label, "display"), None);
    }

    #[test]
    fn push_unique_drops_duplicates() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let node = dom.el(body, "p", &[]);
        let mut set: Vec<usize> = Vec::new();
        push_unique::<TestDom>(&mut set, node);
        push_unique::<TestDom>(&mut set, node);
        assert_eq!(set.len(), 1);
    }
}
