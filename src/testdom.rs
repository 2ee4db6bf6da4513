//! In-memory [`DomDocument`] backend for exercising the engine without a
//! browser. Supports the selector subset the engine actually uses: tag
//! names, `.class`, `[attr]`, `[attr="v"]`, `[attr*="v"]` and comma lists.

use std::cell::RefCell;

use crate::dom::{DomDocument, NodeKind, QueryError};

#[derive(Clone)]
struct NodeData {
    kind: NodeKind,
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    style: Vec<(String, String)>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl NodeData {
    fn element(tag: &str, parent: Option<usize>) -> Self {
        NodeData {
            kind: NodeKind::Element,
            tag: tag.to_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            style: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// Arena-backed document tree. Node handles are indices; node 0 is `<body>`.
pub struct TestDom {
    nodes: RefCell<Vec<NodeData>>,
}

impl TestDom {
    pub fn new() -> Self {
        TestDom {
            nodes: RefCell::new(vec![NodeData::element("body", None)]),
        }
    }

    pub fn body_id(&self) -> usize {
        0
    }

    /// Append an element child and return its handle.
    pub fn el(&self, parent: usize, tag: &str, attrs: &[(&str, &str)]) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let id = nodes.len();
        let mut data = NodeData::element(tag, Some(parent));
        data.attrs = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        nodes.push(data);
        nodes[parent].children.push(id);
        id
    }

    /// Append a text node child and return its handle.
    pub fn text_node(&self, parent: usize, text: &str) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let id = nodes.len();
        nodes.push(NodeData {
            kind: NodeKind::Text,
            tag: String::new(),
            attrs: Vec::new(),
            text: text.to_string(),
            style: Vec::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        nodes[parent].children.push(id);
        id
    }

    /// Inline style value, if set.
    pub fn style_of(&self, id: usize, prop: &str) -> Option<String> {
        self.nodes.borrow()[id]
            .style
            .iter()
            .find(|(k, _)| k == prop)
            .map(|(_, v)| v.clone())
    }

    pub fn is_display_none(&self, id: usize) -> bool {
        self.style_of(id, "display").as_deref() == Some("none")
    }

    fn classes_of(&self, id: usize) -> Vec<String> {
        self.attr(&id, "class")
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    fn matches(&self, id: usize, compound: &Compound) -> bool {
        let nodes = self.nodes.borrow();
        let data = &nodes[id];
        if data.kind != NodeKind::Element {
            return false;
        }
        if let Some(tag) = &compound.tag {
            if &data.tag != tag {
                return false;
            }
        }
        drop(nodes);
        let classes = self.classes_of(id);
        if !compound.classes.iter().all(|c| classes.contains(c)) {
            return false;
        }
        compound.attrs.iter().all(|test| {
            let value = self.attr(&id, &test.name);
            match test.op {
                AttrOp::Present => value.is_some(),
                AttrOp::Equals => value.as_deref() == Some(test.value.as_str()),
                AttrOp::Contains => value.is_some_and(|v| v.contains(&test.value)),
            }
        })
    }
}

impl DomDocument for TestDom {
    type Node = usize;

    fn body(&self) -> Option<usize> {
        Some(0)
    }

    fn kind(&self, node: &usize) -> NodeKind {
        self.nodes.borrow()[*node].kind
    }

    fn tag(&self, node: &usize) -> String {
        self.nodes.borrow()[*node].tag.clone()
    }

    fn attr(&self, node: &usize, name: &str) -> Option<String> {
        self.nodes.borrow()[*node]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn text(&self, node: &usize) -> String {
        let nodes = self.nodes.borrow();
        let data = &nodes[*node];
        if data.kind == NodeKind::Text {
            return data.text.clone();
        }
        let children = data.children.clone();
        drop(nodes);
        children
            .iter()
            .map(|child| self.text(child))
            .collect::<Vec<_>>()
            .join("")
    }

    fn parent(&self, node: &usize) -> Option<usize> {
        self.nodes.borrow()[*node].parent
    }

    fn children(&self, node: &usize) -> Vec<usize> {
        self.nodes.borrow()[*node].children.clone()
    }

    fn query(&self, selector: &str) -> Result<Vec<usize>, QueryError> {
        let compounds = parse_selector(selector)?;
        let count = self.nodes.borrow().len();
        let mut out = Vec::new();
        for id in 0..count {
            if compounds.iter().any(|c| self.matches(id, c)) {
                out.push(id);
            }
        }
        Ok(out)
    }

    fn set_attr(&self, node: &usize, name: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let attrs = &mut nodes[*node].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attr(&self, node: &usize, name: &str) {
        self.nodes.borrow_mut()[*node]
            .attrs
            .retain(|(k, _)| k != name);
    }

    fn add_class(&self, node: &usize, class: &str) {
        let mut classes = self.classes_of(*node);
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            self.set_attr(node, "class", &classes.join(" "));
        }
    }

    fn remove_class(&self, node: &usize, class: &str) {
        let classes: Vec<String> = self
            .classes_of(*node)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.set_attr(node, "class", &classes.join(" "));
    }

    fn set_style(&self, node: &usize, prop: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[*node].style;
        if value.is_empty() {
            style.retain(|(k, _)| k != prop);
            return;
        }
        match style.iter_mut().find(|(k, _)| k == prop) {
            Some((_, v)) => *v = value.to_string(),
            None => style.push((prop.to_string(), value.to_string())),
        }
    }
}

// --- Selector parsing ---

enum AttrOp {
    Present,
    Equals,
    Contains,
}

struct AttrTest {
    name: String,
    op: AttrOp,
    value: String,
}

struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

fn parse_selector(selector: &str) -> Result<Vec<Compound>, QueryError> {
    selector.split(',').map(parse_compound).collect()
}

fn ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

fn parse_compound(part: &str) -> Result<Compound, QueryError> {
    let unsupported = || QueryError::Unsupported(part.trim().to_string());
    let mut chars = part.trim().chars().peekable();
    let mut compound = Compound {
        tag: None,
        classes: Vec::new(),
        attrs: Vec::new(),
    };

    if chars
        .peek()
        .is_some_and(|c| c.is_ascii_alphanumeric())
    {
        compound.tag = Some(ident(&mut chars).to_lowercase());
    }

    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let class = ident(&mut chars);
                if class.is_empty() {
                    return Err(unsupported());
                }
                compound.classes.push(class);
            }
            '[' => {
                chars.next();
                let name = ident(&mut chars);
                if name.is_empty() {
                    return Err(unsupported());
                }
                let op = match chars.peek() {
                    Some(']') => AttrOp::Present,
                    Some('=') => {
                        chars.next();
                        AttrOp::Equals
                    }
                    Some('*') => {
                        chars.next();
                        if chars.next() != Some('=') {
                            return Err(unsupported());
                        }
                        AttrOp::Contains
                    }
                    _ => return Err(unsupported()),
                };
                let value = match op {
                    AttrOp::Present => String::new(),
                    _ => {
                        if chars.next() != Some('"') {
                            return Err(unsupported());
                        }
                        let mut value = String::new();
                        loop {
                            match chars.next() {
                                Some('"') => break,
                                Some(c) => value.push(c),
                                None => return Err(unsupported()),
                            }
                        }
                        value
                    }
                };
                if chars.next() != Some(']') {
                    return Err(unsupported());
                }
                compound.attrs.push(AttrTest { name, op, value });
            }
            _ => return Err(unsupported()),
        }
    }

    if compound.tag.is_none() && compound.classes.is_empty() && compound.attrs.is_empty() {
        return Err(unsupported());
    }
    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_selector_matches() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let hit = dom.el(body, "p", &[("class", "mx-0 text-sd-easy")]);
        dom.el(body, "p", &[("class", "mx-0")]);
        assert_eq!(dom.query(".text-sd-easy").unwrap(), vec![hit]);
    }

    #[test]
    fn attr_contains_selector_matches() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let hit = dom.el(body, "span", &[("class", "text-sd-hard")]);
        assert_eq!(dom.query("[class*=\"text-sd-\"]").unwrap(), vec![hit]);
    }

    #[test]
    fn comma_list_unions_matches() {
        let dom = TestDom::new();
        let body = dom.body_id();
        let th = dom.el(body, "th", &[]);
        let div = dom.el(body, "div", &[("role", "columnheader")]);
        assert_eq!(
            dom.query("th, [role=\"columnheader\"]").unwrap(),
            vec![th, div]
        );
    }

    #[test]
    fn unsupported_selector_errors() {
        let dom = TestDom::new();
        assert!(dom.query("div > p").is_err());
        assert!(dom.query("p:hover").is_err());
    }
}
