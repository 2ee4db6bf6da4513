use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use crate::dom::{DomDocument, NodeKind, QueryError};

/// Live-page backend for the engine.
#[derive(Clone)]
pub struct WebPage {
    document: Document,
}

impl WebPage {
    /// The current tab's document, if the script runs in a window context.
    pub fn current() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(WebPage { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl DomDocument for WebPage {
    type Node = Node;

    fn body(&self) -> Option<Node> {
        self.document.body().map(Node::from)
    }

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::ELEMENT_NODE => NodeKind::Element,
            Node::TEXT_NODE => NodeKind::Text,
            _ => NodeKind::Other,
        }
    }

    fn tag(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(|el| el.tag_name().to_lowercase())
            .unwrap_or_default()
    }

    fn attr(&self, node: &Node, name: &str) -> Option<String> {
        node.dyn_ref::<Element>()?.get_attribute(name)
    }

    fn text(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn query(&self, selector: &str) -> Result<Vec<Node>, QueryError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|e| QueryError::Backend(format!("{e:?}")))?;
        Ok((0..list.length()).filter_map(|i| list.get(i)).collect())
    }

    fn set_attr(&self, node: &Node, name: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.set_attribute(name, value);
        }
    }

    fn remove_attr(&self, node: &Node, name: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.remove_attribute(name);
        }
    }

    fn add_class(&self, node: &Node, class: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: &Node, class: &str) {
        if let Some(el) = node.dyn_ref::<Element>() {
            let _ = el.class_list().remove_1(class);
        }
    }

    fn set_style(&self, node: &Node, prop: &str, value: &str) {
        let Some(el) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            let _ = style.remove_property(prop);
        } else {
            let _ = style.set_property(prop, value);
        }
    }
}
