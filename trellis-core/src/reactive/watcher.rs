//! Watcher Implementation
//!
//! A Watcher ties one binding path to a callback.
//!
//! # How Watchers Work
//!
//! 1. Construction occupies the collector slot, resolves the path once and
//!    releases the slot. Every property read along the path subscribes the
//!    watcher, and the value read becomes the baseline.
//!
//! 2. When a Dependency notifies, the watcher re-resolves its path (without
//!    collecting) and, if the result strictly differs from the baseline,
//!    invokes the callback with it.
//!
//! 3. Whether the baseline then moves to the delivered value depends on the
//!    [`BaselinePolicy`].
//!
//! Dependencies are collected once. A watcher never re-subscribes after
//! construction, so a property replaced under it is only seen through the
//! properties it originally read.
//!
//! # Lifecycle
//!
//! Dependencies only hold weak references. A watcher stays subscribed while
//! some handle to it is alive and it has not been disposed.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use super::collector::Collector;
use super::path::Path;
use super::subscriber::{Subscriber, SubscriberId};
use super::value::Value;
use crate::config::BaselinePolicy;
use crate::error::Result;

/// Callback invoked with the new value when a watched path changes.
pub type Callback = Rc<dyn Fn(&Value) -> Result<()>>;

struct WatcherInner {
    id: SubscriberId,
    model: Value,
    path: Path,
    policy: BaselinePolicy,
    baseline: RefCell<Value>,
    callback: Callback,
    disposed: Cell<bool>,
    fire_count: Cell<usize>,
}

impl Subscriber for WatcherInner {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn update(&self) -> Result<()> {
        if self.disposed.get() {
            return Ok(());
        }

        let current = Collector::untracked(|| self.path.resolve(&self.model))?;
        if current.strict_eq(&self.baseline.borrow()) {
            return Ok(());
        }

        if self.policy == BaselinePolicy::Refresh {
            *self.baseline.borrow_mut() = current.clone();
        }
        self.fire_count.set(self.fire_count.get() + 1);
        trace!(watcher = self.id.raw(), path = %self.path, value = %current, "watcher fired");

        let callback = Rc::clone(&self.callback);
        callback(&current)
    }

    fn is_active(&self) -> bool {
        !self.disposed.get()
    }
}

/// A path observer with a change callback.
///
/// Cloning yields another handle to the same watcher.
///
/// # Example
///
/// ```rust,ignore
/// let model = observe(json!({ "count": 0 }));
/// let watcher = Watcher::new(&model, Path::parse("count")?, BaselinePolicy::Refresh, |v| {
///     println!("count is now {v}");
///     Ok(())
/// })?;
/// ```
#[derive(Clone)]
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    /// Create a watcher and collect its dependencies.
    ///
    /// Fails if the path cannot be resolved against `model`.
    pub fn new<F>(model: &Value, path: Path, policy: BaselinePolicy, callback: F) -> Result<Self>
    where
        F: Fn(&Value) -> Result<()> + 'static,
    {
        let inner = Rc::new(WatcherInner {
            id: SubscriberId::new(),
            model: model.clone(),
            path,
            policy,
            baseline: RefCell::new(Value::Null),
            callback: Rc::new(callback),
            disposed: Cell::new(false),
            fire_count: Cell::new(0),
        });

        let baseline = {
            let weak: Weak<dyn Subscriber> = Rc::downgrade(&inner) as Weak<dyn Subscriber>;
            let _collecting = Collector::enter(inner.id, weak);
            inner.path.resolve(&inner.model)?
        };
        *inner.baseline.borrow_mut() = baseline;

        trace!(watcher = inner.id.raw(), path = %inner.path, "watcher created");
        Ok(Self { inner })
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn policy(&self) -> BaselinePolicy {
        self.inner.policy
    }

    /// The value change detection currently compares against.
    pub fn baseline(&self) -> Value {
        self.inner.baseline.borrow().clone()
    }

    /// How many times the callback has been invoked.
    pub fn fire_count(&self) -> usize {
        self.inner.fire_count.get()
    }

    /// Re-check the path and fire the callback if it changed.
    pub fn update(&self) -> Result<()> {
        self.inner.update()
    }

    /// Stop reacting. Dependencies drop the watcher on their next notify.
    pub fn dispose(&self) {
        if !self.inner.disposed.replace(true) {
            trace!(watcher = self.inner.id.raw(), "watcher disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path.as_str())
            .field("fire_count", &self.fire_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
