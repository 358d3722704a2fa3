//! UI Tree
//!
//! The compiler only talks to the UI through [`UiNode`] and resolves root
//! selectors through [`Resolver`]. Any native tree can implement them.
//!
//! This module also ships an in-memory tree ([`Node`], [`Document`]) with a
//! small markup reader, used by hosts without a native UI and by the tests.

mod markup;
mod node;

use std::rc::Rc;

use crate::error::Result;

pub use markup::parse;
pub use node::{Document, Node};

/// Node classification used by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// Listener for input events. Receives the element's current value.
///
/// Returning an error hands it back to whoever dispatched the event.
pub type InputListener = Rc<dyn Fn(&str) -> Result<()>>;

/// The native operations a UI tree must provide.
///
/// Handles are cheap to clone and refer to the same underlying node.
pub trait UiNode: Clone + 'static {
    fn kind(&self) -> NodeKind;

    /// Children in document order.
    fn children(&self) -> Vec<Self>;

    /// Attributes as (name, value) pairs, in their natural order.
    fn attributes(&self) -> Vec<(String, String)>;

    /// Text content of a text node, or the concatenated text of an element.
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// Current value of a value-bearing element.
    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    fn add_input_listener(&self, listener: InputListener);
}

/// Maps a selector string to a node.
pub trait Resolver<N> {
    fn resolve(&self, selector: &str) -> Option<N>;
}

impl<N, F> Resolver<N> for F
where
    F: Fn(&str) -> Option<N>,
{
    fn resolve(&self, selector: &str) -> Option<N> {
        self(selector)
    }
}
