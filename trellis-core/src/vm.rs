//! The binding facade.
//!
//! [`Vm`] takes `{ root, data }`. Without a root the data stays plain JSON
//! and nothing is compiled. With a root, the data is wrapped into a reactive
//! model and the root is compiled against it; the resulting watchers are
//! owned by the `Vm` until [`Vm::dispose`].

use tracing::debug;

use crate::compiler::{Compiler, Directives};
use crate::config::Config;
use crate::dom::{Resolver, UiNode};
use crate::error::{Error, Result};
use crate::reactive::{observe, Collector, Path, Value, Watcher};

/// Where to mount.
#[derive(Debug, Clone)]
pub enum Root<N> {
    Node(N),
    /// Looked up through a [`Resolver`].
    Selector(String),
}

/// Construction options.
#[derive(Debug, Clone)]
pub struct Options<N> {
    pub root: Option<Root<N>>,
    pub data: serde_json::Value,
    pub config: Config,
}

impl<N> Options<N> {
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            root: None,
            data,
            config: Config::default(),
        }
    }

    pub fn with_root(mut self, node: N) -> Self {
        self.root = Some(Root::Node(node));
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.root = Some(Root::Selector(selector.into()));
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }
}

/// The model a [`Vm`] holds.
#[derive(Debug, Clone)]
pub enum Data {
    /// Left untouched because no root was given.
    Plain(serde_json::Value),
    /// Wrapped into reactive properties.
    Reactive(Value),
}

/// A mounted model plus the bindings compiled against it.
pub struct Vm<N: UiNode> {
    data: Data,
    root: Option<N>,
    config: Config,
    watchers: Vec<Watcher>,
}

impl<N: UiNode> Vm<N> {
    /// Build with the default directives. Selector roots fail with
    /// [`Error::UnresolvedRoot`] since there is nothing to resolve them.
    pub fn new(options: Options<N>) -> Result<Self> {
        Self::build(options, None, &Directives::default())
    }

    /// Build with the default directives, resolving selector roots.
    pub fn with_resolver(options: Options<N>, resolver: &dyn Resolver<N>) -> Result<Self> {
        Self::build(options, Some(resolver), &Directives::default())
    }

    /// Build with a custom directive registry.
    pub fn build(
        options: Options<N>,
        resolver: Option<&dyn Resolver<N>>,
        directives: &Directives<N>,
    ) -> Result<Self> {
        let Options { root, data, config } = options;
        config.validate()?;

        let root = match root {
            None => {
                debug!("no root given, data left plain");
                return Ok(Self {
                    data: Data::Plain(data),
                    root: None,
                    config,
                    watchers: Vec::new(),
                });
            }
            Some(Root::Node(node)) => node,
            Some(Root::Selector(selector)) => resolver
                .and_then(|resolver| resolver.resolve(&selector))
                .ok_or(Error::UnresolvedRoot(selector))?,
        };

        let model = observe(data);
        let watchers = Compiler::new(&model, &config, directives).compile(&root)?;
        debug!(watchers = watchers.len(), "mounted");

        Ok(Self {
            data: Data::Reactive(model),
            root: Some(root),
            config,
            watchers,
        })
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn is_reactive(&self) -> bool {
        matches!(self.data, Data::Reactive(_))
    }

    /// The reactive model root, if the data was wrapped.
    pub fn model(&self) -> Option<&Value> {
        match &self.data {
            Data::Reactive(model) => Some(model),
            Data::Plain(_) => None,
        }
    }

    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Watchers owned by this instance, in creation order.
    pub fn watchers(&self) -> &[Watcher] {
        &self.watchers
    }

    /// Read the value at `path` without subscribing.
    pub fn get(&self, path: &str) -> Result<Value> {
        let path = Path::parse(path)?;
        match &self.data {
            Data::Reactive(model) => Collector::untracked(|| path.resolve(model)),
            Data::Plain(json) => {
                let mut current = json;
                for segment in path.segments() {
                    current = current
                        .get(segment.as_str())
                        .ok_or_else(|| Error::missing(path.as_str(), segment))?;
                }
                Ok(Value::from(current.clone()))
            }
        }
    }

    /// Write `value` at `path`. On a reactive model this notifies bindings
    /// synchronously. Returns whether the stored value changed.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<bool> {
        let path = Path::parse(path)?;
        let value = value.into();
        match &mut self.data {
            Data::Reactive(model) => path.assign(model, value),
            Data::Plain(json) => {
                let (last, parents) = path
                    .segments()
                    .split_last()
                    .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
                let mut current = json;
                for segment in parents {
                    current = current
                        .get_mut(segment.as_str())
                        .ok_or_else(|| Error::missing(path.as_str(), segment))?;
                }
                let container = current
                    .as_object_mut()
                    .ok_or_else(|| Error::missing(path.as_str(), last))?;
                let value = value.to_json();
                if container.get(last) == Some(&value) {
                    return Ok(false);
                }
                container.insert(last.clone(), value);
                Ok(true)
            }
        }
    }

    /// Watch `path` with the configured baseline policy. The watcher is also
    /// kept by this instance and retired by [`Vm::dispose`].
    pub fn watch<F>(&mut self, path: &str, callback: F) -> Result<Watcher>
    where
        F: Fn(&Value) -> Result<()> + 'static,
    {
        let Data::Reactive(model) = &self.data else {
            return Err(Error::NotReactive);
        };
        let watcher = Watcher::new(model, Path::parse(path)?, self.config.baseline, callback)?;
        self.watchers.push(watcher.clone());
        Ok(watcher)
    }

    /// Plain JSON copy of the current data.
    pub fn snapshot(&self) -> serde_json::Value {
        match &self.data {
            Data::Reactive(model) => model.to_json(),
            Data::Plain(json) => json.clone(),
        }
    }

    /// Retire every watcher this instance owns. Input listeners stay attached
    /// and keep writing into the model, but nothing re-renders any more.
    pub fn dispose(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.dispose();
        }
        debug!("disposed");
    }
}

impl<N: UiNode> std::fmt::Debug for Vm<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vm")
            .field("data", &self.data)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}
