//! In-memory UI nodes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{markup, InputListener, NodeKind, Resolver, UiNode};
use crate::error::Result;

struct NodeData {
    kind: NodeKind,
    tag: String,
    attributes: RefCell<IndexMap<String, String>>,
    children: RefCell<Vec<Node>>,
    text: RefCell<String>,
    value: RefCell<String>,
    listeners: RefCell<Vec<InputListener>>,
    text_writes: Cell<usize>,
    value_writes: Cell<usize>,
}

/// A shared handle to an in-memory node.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    fn with_kind(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self(Rc::new(NodeData {
            kind,
            tag: tag.to_ascii_lowercase(),
            attributes: RefCell::new(IndexMap::new()),
            children: RefCell::new(Vec::new()),
            text: RefCell::new(text.to_string()),
            value: RefCell::new(String::new()),
            listeners: RefCell::new(Vec::new()),
            text_writes: Cell::new(0),
            value_writes: Cell::new(0),
        }))
    }

    pub fn element(tag: &str) -> Self {
        Self::with_kind(NodeKind::Element, tag, "")
    }

    pub fn text_node(text: &str) -> Self {
        Self::with_kind(NodeKind::Text, "", text)
    }

    pub fn comment(text: &str) -> Self {
        Self::with_kind(NodeKind::Comment, "", text)
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Lowercase tag name; empty for text and comment nodes.
    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    /// Set an attribute. Setting `value` also sets the live value.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if name == "value" {
            *self.0.value.borrow_mut() = value.to_string();
        }
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    pub fn append(&self, child: Node) {
        self.0.children.borrow_mut().push(child);
    }

    pub fn with_child(self, child: Node) -> Self {
        self.append(child);
        self
    }

    /// How many times the text has been written since creation.
    pub fn text_writes(&self) -> usize {
        self.0.text_writes.get()
    }

    /// How many times the value has been written since creation.
    pub fn value_writes(&self) -> usize {
        self.0.value_writes.get()
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Simulate user input: set the value, then run every input listener in
    /// registration order. Stops at the first failing listener.
    pub fn dispatch_input(&self, value: &str) -> Result<()> {
        *self.0.value.borrow_mut() = value.to_string();
        let listeners = self.0.listeners.borrow().clone();
        for listener in listeners {
            listener(value)?;
        }
        Ok(())
    }

    /// First element at or below this node matching `selector`, pre-order.
    ///
    /// Supports `#id`, `.class` and tag names.
    pub fn find(&self, selector: &str) -> Option<Node> {
        if self.matches(selector) {
            return Some(self.clone());
        }
        let children = self.0.children.borrow().clone();
        children.iter().find_map(|child| child.find(selector))
    }

    fn matches(&self, selector: &str) -> bool {
        if self.0.kind != NodeKind::Element {
            return false;
        }
        if let Some(id) = selector.strip_prefix('#') {
            self.attribute("id").as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        } else {
            self.0.tag.eq_ignore_ascii_case(selector)
        }
    }

    /// Serialize this node and its subtree.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self.0.kind {
            NodeKind::Text => out.push_str(&markup::escape(&self.0.text.borrow())),
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(&self.0.text.borrow());
                out.push_str("-->");
            }
            NodeKind::Element => {
                out.push('<');
                out.push_str(&self.0.tag);
                for (name, value) in self.0.attributes.borrow().iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&markup::escape(value));
                    out.push('"');
                }
                out.push('>');
                if markup::is_void(&self.0.tag) {
                    return;
                }
                for child in self.0.children.borrow().iter() {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(&self.0.tag);
                out.push('>');
            }
        }
    }
}

impl UiNode for Node {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.borrow().clone()
    }

    fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .attributes
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn text(&self) -> String {
        match self.0.kind {
            NodeKind::Text => self.0.text.borrow().clone(),
            NodeKind::Comment => String::new(),
            NodeKind::Element => self
                .0
                .children
                .borrow()
                .iter()
                .map(UiNode::text)
                .collect(),
        }
    }

    /// Text nodes take the text; elements replace their children with a
    /// single text node.
    fn set_text(&self, text: &str) {
        self.0.text_writes.set(self.0.text_writes.get() + 1);
        match self.0.kind {
            NodeKind::Element => {
                *self.0.children.borrow_mut() = vec![Node::text_node(text)];
            }
            NodeKind::Text | NodeKind::Comment => *self.0.text.borrow_mut() = text.to_string(),
        }
    }

    fn value(&self) -> String {
        self.0.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        self.0.value_writes.set(self.0.value_writes.get() + 1);
        *self.0.value.borrow_mut() = value.to_string();
    }

    fn add_input_listener(&self, listener: InputListener) {
        self.0.listeners.borrow_mut().push(listener);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

/// A parsed markup fragment with selector lookup.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self {
            nodes: markup::parse(input)?,
        })
    }

    /// Top-level nodes in document order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// First top-level element.
    pub fn first_element(&self) -> Option<Node> {
        self.nodes
            .iter()
            .find(|node| node.kind() == NodeKind::Element)
            .cloned()
    }

    pub fn query(&self, selector: &str) -> Option<Node> {
        self.nodes.iter().find_map(|node| node.find(selector))
    }

    pub fn to_markup(&self) -> String {
        self.nodes.iter().map(Node::to_markup).collect()
    }
}

impl Resolver<Node> for Document {
    fn resolve(&self, selector: &str) -> Option<Node> {
        self.query(selector)
    }
}
