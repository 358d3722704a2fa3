//! Directive kinds and the handler registry.
//!
//! Directive names map onto a closed enum, so "no such directive" and "no
//! handler for this directive" are different errors. Adding a directive means
//! adding a variant, which the registry's exhaustive matches then force to be
//! wired up.

use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::handlers;
use super::Binder;
use crate::dom::UiNode;
use crate::error::{Error, Result};

/// Every directive the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// Two-way value binding (`v-model`).
    Model,
    /// Text interpolation (`{{ }}` in text nodes, or `v-text`).
    Text,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 2] = [DirectiveKind::Model, DirectiveKind::Text];

    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Model => "model",
            DirectiveKind::Text => "text",
        }
    }

    /// Parse a directive name, the segment after the prefix and before any
    /// further `-`. Compound names such as `on:click` are not decomposed.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A binding strategy: receives the binder, the node and the directive's
/// expression (attribute value, or trimmed text for interpolation).
pub type Handler<N> = Rc<dyn Fn(&mut Binder<'_>, &N, &str) -> Result<()>>;

/// Handlers keyed by directive kind.
pub struct Directives<N> {
    model: Option<Handler<N>>,
    text: Option<Handler<N>>,
}

impl<N: UiNode> Directives<N> {
    /// A registry with no handlers at all.
    pub fn empty() -> Self {
        Self {
            model: None,
            text: None,
        }
    }

    fn slot_mut(&mut self, kind: DirectiveKind) -> &mut Option<Handler<N>> {
        match kind {
            DirectiveKind::Model => &mut self.model,
            DirectiveKind::Text => &mut self.text,
        }
    }

    /// Install `handler` for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: DirectiveKind, handler: F) -> &mut Self
    where
        F: Fn(&mut Binder<'_>, &N, &str) -> Result<()> + 'static,
    {
        *self.slot_mut(kind) = Some(Rc::new(handler));
        self
    }

    pub fn unregister(&mut self, kind: DirectiveKind) -> Option<Handler<N>> {
        self.slot_mut(kind).take()
    }

    pub fn is_registered(&self, kind: DirectiveKind) -> bool {
        self.get(kind).is_ok()
    }

    /// The handler for `kind`.
    pub fn get(&self, kind: DirectiveKind) -> Result<Handler<N>> {
        let slot = match kind {
            DirectiveKind::Model => &self.model,
            DirectiveKind::Text => &self.text,
        };
        slot.clone().ok_or(Error::UnregisteredDirective(kind))
    }

    /// Resolve a directive name (prefix already stripped) to its handler.
    pub fn lookup(&self, prefix: &str, name: &str) -> Result<(DirectiveKind, Handler<N>)> {
        let Some(kind) = DirectiveKind::parse(name) else {
            warn!(directive = %format!("{prefix}{name}"), "unknown directive");
            return Err(Error::UnknownDirective {
                prefix: prefix.to_string(),
                name: name.to_string(),
            });
        };
        let handler = self.get(kind).map_err(|err| {
            warn!(directive = %kind, "directive has no handler");
            err
        })?;
        Ok((kind, handler))
    }
}

impl<N: UiNode> Default for Directives<N> {
    /// Every kind wired to its built-in handler.
    fn default() -> Self {
        let mut directives = Self::empty();
        directives
            .register(DirectiveKind::Model, handlers::model::<N>)
            .register(DirectiveKind::Text, handlers::text::<N>);
        directives
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::dom::Node;

    #[test]
    fn names_round_trip() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(DirectiveKind::parse("on:click"), None);
        assert_eq!(DirectiveKind::parse("Model"), None);
    }

    #[test]
    fn default_registers_every_kind() {
        let directives = Directives::<Node>::default();
        for kind in DirectiveKind::ALL {
            assert!(directives.is_registered(kind));
        }
    }

    #[test]
    fn unknown_and_unregistered_are_distinct() {
        let mut directives = Directives::<Node>::default();
        directives.unregister(DirectiveKind::Model);

        let err = directives.lookup("v-", "show").err().unwrap();
        assert!(matches!(err, Error::UnknownDirective { ref name, .. } if name == "show"));

        let err = directives.lookup("v-", "model").err().unwrap();
        assert!(matches!(err, Error::UnregisteredDirective(DirectiveKind::Model)));

        let (kind, _) = directives.lookup("v-", "text").unwrap();
        assert_eq!(kind, DirectiveKind::Text);
    }

    #[traced_test]
    #[test]
    fn unknown_directive_is_logged() {
        let directives = Directives::<Node>::default();
        assert!(directives.lookup("v-", "bind").is_err());
        assert!(logs_contain("unknown directive"));
        assert!(logs_contain("v-bind"));
    }
}
