//! Template Compiler
//!
//! Walks a UI tree depth-first, pre-order, and wires directives to the
//! reactive model.
//!
//! # Node Handling
//!
//! - Elements: attributes are visited in their natural order. Each one whose
//!   name starts with the directive prefix is dispatched to its handler.
//!   Children are compiled afterwards, whether or not a directive matched.
//! - Text nodes: the trimmed content is handed to the text handler if it
//!   contains an interpolation marker.
//! - Comments are skipped.
//!
//! The first error aborts the whole pass. Bindings created before it are
//! retired along with the compiler's watcher list.

mod directive;
mod handlers;
mod interpolate;

use tracing::{debug, trace};

use crate::config::Config;
use crate::dom::{NodeKind, UiNode};
use crate::error::Result;
use crate::reactive::{Path, Value, Watcher};

pub use directive::{DirectiveKind, Directives, Handler};
pub use interpolate::{contains_binding, Template};

/// What a handler gets to create bindings with.
///
/// Watchers created through [`Binder::watch`] use the configured baseline
/// policy and are collected for the caller to own.
pub struct Binder<'a> {
    model: &'a Value,
    config: &'a Config,
    watchers: Vec<Watcher>,
}

impl<'a> Binder<'a> {
    pub fn new(model: &'a Value, config: &'a Config) -> Self {
        Self {
            model,
            config,
            watchers: Vec::new(),
        }
    }

    pub fn model(&self) -> &'a Value {
        self.model
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Create a watcher on `path` and keep it.
    pub fn watch<F>(&mut self, path: Path, callback: F) -> Result<Watcher>
    where
        F: Fn(&Value) -> Result<()> + 'static,
    {
        let watcher = Watcher::new(self.model, path, self.config.baseline, callback)?;
        self.watchers.push(watcher.clone());
        Ok(watcher)
    }

    pub fn into_watchers(self) -> Vec<Watcher> {
        self.watchers
    }
}

/// Compiles UI trees against one model.
pub struct Compiler<'a, N: UiNode> {
    model: &'a Value,
    config: &'a Config,
    directives: &'a Directives<N>,
}

impl<'a, N: UiNode> Compiler<'a, N> {
    pub fn new(model: &'a Value, config: &'a Config, directives: &'a Directives<N>) -> Self {
        Self {
            model,
            config,
            directives,
        }
    }

    /// Compile `root` and return every watcher the bindings created.
    pub fn compile(&self, root: &N) -> Result<Vec<Watcher>> {
        let mut binder = Binder::new(self.model, self.config);
        self.walk(root, &mut binder)?;
        let watchers = binder.into_watchers();
        debug!(watchers = watchers.len(), "compiled tree");
        Ok(watchers)
    }

    fn walk(&self, node: &N, binder: &mut Binder<'_>) -> Result<()> {
        match node.kind() {
            NodeKind::Element => {
                self.compile_element(node, binder)?;
                for child in node.children() {
                    self.walk(&child, binder)?;
                }
            }
            NodeKind::Text => self.compile_text(node, binder)?,
            NodeKind::Comment => {}
        }
        Ok(())
    }

    fn compile_element(&self, node: &N, binder: &mut Binder<'_>) -> Result<()> {
        let prefix = self.config.directive_prefix.as_str();
        for (name, value) in node.attributes() {
            let Some(directive) = name.strip_prefix(prefix) else {
                continue;
            };
            let (kind, handler) = self.directives.lookup(prefix, directive_name(directive))?;
            trace!(directive = %kind, expression = %value, "dispatching directive");
            handler(binder, node, &value)?;
        }
        Ok(())
    }

    fn compile_text(&self, node: &N, binder: &mut Binder<'_>) -> Result<()> {
        let content = node.text();
        let trimmed = content.trim();
        let trim = self.config.trim_interpolation;
        if !contains_binding(trimmed, &self.config.delimiters, trim) {
            return Ok(());
        }
        let handler = self.directives.get(DirectiveKind::Text)?;
        trace!(text = %trimmed, "dispatching interpolation");
        handler(binder, node, trimmed)
    }
}

/// The directive name is the first `-`-separated segment after the prefix,
/// so `model-lazy` dispatches `model`. `on:click` stays whole.
fn directive_name(rest: &str) -> &str {
    rest.split_once('-').map_or(rest, |(name, _)| name)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::dom::{parse, Node};
    use crate::error::Error;
    use crate::reactive::observe;

    fn compile(markup: &str, data: serde_json::Value) -> (Node, Value, Result<Vec<Watcher>>) {
        let root = parse(markup).unwrap().remove(0);
        let model = observe(data);
        let config = Config::default();
        let directives = Directives::default();
        let result = Compiler::new(&model, &config, &directives).compile(&root);
        (root, model, result)
    }

    #[test]
    fn binds_nested_elements_and_text() {
        let (root, model, watchers) = compile(
            r#"<form><label>Name: {{ name }}</label><div><input v-model="name"></div></form>"#,
            json!({ "name": "Ann" }),
        );
        let watchers = watchers.unwrap();
        assert_eq!(watchers.len(), 2);
        assert_eq!(root.to_markup(), r#"<form><label>Name: Ann</label><div><input v-model="name"></div></form>"#);

        model.as_object().unwrap().set("name", "Bo").unwrap();
        assert_eq!(root.text(), "Name: Bo");
    }

    #[test]
    fn interpolation_loses_outer_whitespace() {
        let (root, _model, watchers) = compile("<p>  {{a}}  </p>", json!({ "a": "x" }));
        let _watchers = watchers.unwrap();
        assert_eq!(root.text(), "x");
    }

    #[test]
    fn text_without_markers_is_untouched() {
        let (root, _model, watchers) = compile("<p>  plain  </p>", json!({}));
        assert!(watchers.unwrap().is_empty());
        assert_eq!(root.children()[0].text_writes(), 0);
        assert_eq!(root.text(), "  plain  ");
    }

    #[test]
    fn comments_are_skipped() {
        let (_root, _model, watchers) = compile("<p><!-- {{missing}} --></p>", json!({}));
        assert!(watchers.unwrap().is_empty());
    }

    #[test]
    fn unknown_directive_stops_before_children() {
        let (root, _model, result) = compile(
            r#"<input v-model="a" v-unknown="b">"#,
            json!({ "a": "first", "b": "second" }),
        );
        assert!(matches!(result, Err(Error::UnknownDirective { ref name, .. }) if name == "unknown"));
        assert_eq!(root.value(), "first");

        let (root, _model, result) = compile(
            r#"<div v-on:click="go"><p>{{a}}</p></div>"#,
            json!({ "a": 1 }),
        );
        assert!(matches!(result, Err(Error::UnknownDirective { ref name, .. }) if name == "on:click"));
        assert_eq!(root.text(), "{{a}}");
    }

    #[test]
    fn trailing_segments_after_the_directive_name_are_ignored() {
        let (root, _model, result) = compile(r#"<input v-model-lazy="a">"#, json!({ "a": "x" }));
        assert_eq!(result.unwrap().len(), 1);
        assert_eq!(root.value(), "x");

        assert_eq!(directive_name("model"), "model");
        assert_eq!(directive_name("text-raw-x"), "text");
        assert_eq!(directive_name("on:click"), "on:click");
    }

    #[test]
    fn attributes_are_dispatched_in_order() {
        let root = Node::element("div")
            .with_attribute("v-text", "second")
            .with_attribute("v-model", "first");
        let model = observe(json!({ "first": 1, "second": 2 }));
        let config = Config::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        let mut directives = Directives::<Node>::empty();
        for kind in DirectiveKind::ALL {
            let order = order.clone();
            directives.register(kind, move |_binder, _node, expression| {
                order.borrow_mut().push(format!("{kind}:{expression}"));
                Ok(())
            });
        }

        Compiler::new(&model, &config, &directives).compile(&root).unwrap();
        assert_eq!(*order.borrow(), vec!["text:second", "model:first"]);
    }

    #[test]
    fn missing_text_handler_is_unregistered() {
        let root = parse("<p>{{a}}</p>").unwrap().remove(0);
        let model = observe(json!({ "a": 1 }));
        let config = Config::default();
        let mut directives = Directives::<Node>::default();
        directives.unregister(DirectiveKind::Text);

        let err = Compiler::new(&model, &config, &directives).compile(&root).unwrap_err();
        assert!(matches!(err, Error::UnregisteredDirective(DirectiveKind::Text)));
    }

    #[test]
    fn custom_prefix_and_delimiters() {
        let root = parse(r#"<div><input x-model="n"><b>[[n]] {{n}}</b></div>"#).unwrap().remove(0);
        let model = observe(json!({ "n": 3 }));
        let config = Config::default()
            .with_directive_prefix("x-")
            .with_delimiters("[[", "]]");
        let directives = Directives::default();

        let _watchers = Compiler::new(&model, &config, &directives).compile(&root).unwrap();
        assert_eq!(root.to_markup(), r#"<div><input x-model="n"><b>3 {{n}}</b></div>"#);
        assert_eq!(root.children()[0].value(), "3");
    }

    #[test]
    fn path_failure_aborts_compilation() {
        let (_root, _model, result) = compile("<p>{{user.name}}</p>", json!({ "user": null }));
        assert!(matches!(result, Err(Error::PathResolution { .. })));
    }
}
