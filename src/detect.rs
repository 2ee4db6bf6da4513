//! Detection strategies. Each pass walks the document its own way and
//! returns its own candidate set; [`collect_all`] unions them in order and
//! drops duplicates so suppression marks every element exactly once. The
//! passes overlap on purpose: the site's markup shifts without notice, and
//! any one heuristic surviving keeps the labels hidden.

use crate::classify::{self, Classification};
use crate::dom::{self, DomDocument, NodeKind};

/// Selectors matching the site's difficulty-styled elements. Tried one by
/// one; a selector the backend rejects is logged and skipped.
pub const DIFFICULTY_SELECTORS: [&str; 4] = [
    ".text-sd-easy",
    ".text-sd-medium",
    ".text-sd-hard",
    "[class*=\"text-sd-\"]",
];

/// Header cells of tables and ARIA grids.
const HEADER_SELECTOR: &str = "th, [role=\"columnheader\"]";

/// Structural pass: difficulty-class elements verified by classification.
pub fn class_pass<D: DomDocument>(doc: &D) -> Vec<D::Node> {
    let mut out = Vec::new();
    for selector in DIFFICULTY_SELECTORS {
        let nodes = match doc.query(selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("skipping selector {selector:?}: {e}");
                continue;
            }
        };
        for node in nodes {
            let view = dom::element_view(doc, &node);
            if classify::classify(&view) == Classification::DifficultyLabel {
                dom::push_unique::<D>(&mut out, node);
            }
        }
    }
    out
}

/// Text pass: walk every text node under the body and suppress the nearest
/// qualifying ancestor of exact vocabulary matches. Catches labels the
/// class list misses.
pub fn text_pass<D: DomDocument>(doc: &D) -> Vec<D::Node> {
    let mut out = Vec::new();
    let Some(body) = doc.body() else {
        return out;
    };
    for node in dom::descendants(doc, &body) {
        if doc.kind(&node) != NodeKind::Text {
            continue;
        }
        let word = doc.text(&node).trim().to_string();
        if !classify::is_difficulty_word(&word.to_lowercase()) {
            continue;
        }
        let Some(host) = doc.parent(&node) else {
            continue;
        };
        if doc.kind(&host) != NodeKind::Element {
            continue;
        }
        let view = dom::element_view(doc, &host);
        if classify::accepts_text_host(&view, &word) {
            dom::push_unique::<D>(&mut out, host);
        }
    }
    out
}

/// Column pass: a header cell reading "Difficulty" takes its whole column
/// with it — the header and the same-index cell of every row in the
/// enclosing table or grid.
pub fn column_pass<D: DomDocument>(doc: &D) -> Vec<D::Node> {
    let mut out = Vec::new();
    let headers = match doc.query(HEADER_SELECTOR) {
        Ok(nodes) => nodes,
        Err(e) => {
            log::warn!("skipping header selector: {e}");
            return out;
        }
    };
    for header in headers {
        let view = dom::element_view(doc, &header);
        if classify::classify(&view) != Classification::DifficultyHeader {
            continue;
        }
        dom::push_unique::<D>(&mut out, header.clone());

        let Some(header_row) = doc.parent(&header) else {
            continue;
        };
        let Some(index) = element_children(doc, &header_row)
            .iter()
            .position(|cell| *cell == header)
        else {
            continue;
        };
        let Some(table) = enclosing_table(doc, &header) else {
            continue;
        };
        for row in rows_of(doc, &table) {
            if let Some(cell) = element_children(doc, &row).into_iter().nth(index) {
                dom::push_unique::<D>(&mut out, cell);
            }
        }
    }
    out
}

/// Run every strategy and union the candidates, preserving order.
pub fn collect_all<D: DomDocument>(doc: &D) -> Vec<D::Node> {
    let mut out = Vec::new();
    for node in class_pass(doc) {
        dom::push_unique::<D>(&mut out, node);
    }
    for node in text_pass(doc) {
        dom::push_unique::<D>(&mut out, node);
    }
    for node in column_pass(doc) {
        dom::push_unique::<D>(&mut out, node);
    }
    out
}

fn element_children<D: DomDocument>(doc: &D, node: &D::Node) -> Vec<D::Node> {
    doc.children(node)
        .into_iter()
        .filter(|child| doc.kind(child) == NodeKind::Element)
        .collect()
}

fn enclosing_table<D: DomDocument>(doc: &D, node: &D::Node) -> Option<D::Node> {
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if doc.tag(&ancestor) == "table"
            || doc.attr(&ancestor, "role").as_deref() == Some("table")
        {
            return Some(ancestor);
        }
        current = doc.parent(&ancestor);
    }
    None
}

fn rows_of<D: DomDocument>(doc: &D, table: &D::Node) -> Vec<D::Node> {
    dom::descendants(doc, table)
        .into_iter()
        .filter(|node| {
            doc.kind(node) == NodeKind::Element
                && (doc.tag(node) == "tr"
                    || doc.attr(node, "role").as_deref() == Some("row"))
        })
        .collect()
}
