//! Dependency Implementation
//!
//! A Dependency is the subscriber list attached to one reactive property.
//!
//! # Semantics
//!
//! - `subscribe` appends without any identity check, so a subscriber that
//!   registers twice is notified twice per change.
//! - `notify` walks the list in subscription order and calls each update
//!   synchronously. It iterates a snapshot taken when it starts; subscribers
//!   added during the cycle are first visited by the next one.
//! - Entries are weak. A subscriber that was dropped or reports itself
//!   inactive is skipped, and pruned when the next notify starts.

use std::cell::RefCell;
use std::rc::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use super::subscriber::Subscriber;
use crate::error::Result;

/// Counter for generating unique dependency IDs.
static DEP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_dep_id() -> u64 {
    DEP_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The per-property list of subscribers to notify on change.
pub struct Dependency {
    id: u64,
    subscribers: RefCell<Vec<Weak<dyn Subscriber>>>,
}

impl Dependency {
    pub fn new() -> Self {
        Self {
            id: next_dep_id(),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Append a subscriber.
    pub fn subscribe(&self, subscriber: Weak<dyn Subscriber>) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.push(subscriber);
        trace!(dep = self.id, subscribers = subscribers.len(), "subscribed");
    }

    /// Update every live subscriber, in subscription order.
    ///
    /// The first failing update aborts the cycle and its error is returned.
    pub fn notify(&self) -> Result<()> {
        let snapshot = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.upgrade().is_some_and(|s| s.is_active()));
            subscribers.clone()
        };

        trace!(dep = self.id, subscribers = snapshot.len(), "notify");

        for weak in snapshot {
            if let Some(subscriber) = weak.upgrade() {
                if subscriber.is_active() {
                    subscriber.update()?;
                }
            }
        }
        Ok(())
    }

    /// Number of entries currently in the list, duplicates included.
    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().is_empty()
    }
}

impl Default for Dependency {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependency")
            .field("id", &self.id)
            .field("subscribers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::error::Error;
    use crate::reactive::SubscriberId;

    struct Recorder {
        id: SubscriberId,
        log: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        active: Cell<bool>,
        fail: bool,
    }

    impl Recorder {
        fn new(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Rc<Self> {
            Rc::new(Self {
                id: SubscriberId::new(),
                log: log.clone(),
                name,
                active: Cell::new(true),
                fail: false,
            })
        }

        fn failing(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Rc<Self> {
            Rc::new(Self {
                id: SubscriberId::new(),
                log: log.clone(),
                name,
                active: Cell::new(true),
                fail: true,
            })
        }
    }

    impl Subscriber for Recorder {
        fn id(&self) -> SubscriberId {
            self.id
        }

        fn update(&self) -> Result<()> {
            self.log.borrow_mut().push(self.name);
            if self.fail {
                return Err(Error::missing("x", "x"));
            }
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active.get()
        }
    }

    fn weak(r: &Rc<Recorder>) -> Weak<dyn Subscriber> {
        Rc::downgrade(r) as Weak<dyn Subscriber>
    }

    #[test]
    fn notifies_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(&log, "a");
        let b = Recorder::new(&log, "b");
        let c = Recorder::new(&log, "c");

        let dep = Dependency::new();
        dep.subscribe(weak(&b));
        dep.subscribe(weak(&a));
        dep.subscribe(weak(&c));

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec!["b", "a", "c"]);
    }

    #[test]
    fn duplicate_subscriptions_fire_twice() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(&log, "a");

        let dep = Dependency::new();
        dep.subscribe(weak(&a));
        dep.subscribe(weak(&a));
        assert_eq!(dep.len(), 2);

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec!["a", "a"]);
    }

    #[test]
    fn retired_subscribers_are_skipped_and_pruned() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(&log, "a");
        let b = Recorder::new(&log, "b");
        let c = Recorder::new(&log, "c");

        let dep = Dependency::new();
        dep.subscribe(weak(&a));
        dep.subscribe(weak(&b));
        dep.subscribe(weak(&c));

        b.active.set(false);
        drop(c);

        dep.notify().unwrap();
        assert_eq!(*log.borrow(), vec!["a"]);
        assert_eq!(dep.len(), 1);
    }

    #[test]
    fn failing_update_aborts_remaining() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(&log, "a");
        let bad = Recorder::failing(&log, "bad");
        let c = Recorder::new(&log, "c");

        let dep = Dependency::new();
        dep.subscribe(weak(&a));
        dep.subscribe(weak(&bad));
        dep.subscribe(weak(&c));

        assert!(dep.notify().is_err());
        assert_eq!(*log.borrow(), vec!["a", "bad"]);
    }

    #[test]
    fn empty_dependency_notifies_nothing() {
        let dep = Dependency::default();
        assert!(dep.is_empty());
        dep.notify().unwrap();
    }
}
