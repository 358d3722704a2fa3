//! Active Collector
//!
//! The collector slot names the subscriber that is currently reading the
//! model. When a reactive property is read while the slot is occupied, the
//! occupant is registered with that property's Dependency.
//!
//! # Implementation
//!
//! The slot is thread-local and holds at most one subscriber. A watcher
//! occupies it only for the duration of its construction read and the guard
//! returned by [`Collector::enter`] clears it again, even on early return.
//! Entering while occupied replaces the occupant until the inner guard drops,
//! so two collectors are never active at once.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::trace;

use super::subscriber::{Subscriber, SubscriberId};

thread_local! {
    static ACTIVE: RefCell<Option<Weak<dyn Subscriber>>> = const { RefCell::new(None) };
}

/// Guard that restores the previous slot contents when dropped.
pub struct Collector {
    id: SubscriberId,
    previous: Option<Weak<dyn Subscriber>>,
}

impl Collector {
    /// Make `subscriber` the active collector until the guard is dropped.
    pub fn enter(id: SubscriberId, subscriber: Weak<dyn Subscriber>) -> Self {
        let previous = ACTIVE.with(|slot| slot.borrow_mut().replace(subscriber));
        if previous.is_some() {
            trace!(subscriber = id.raw(), "collector slot taken over");
        }
        Self { id, previous }
    }

    /// Check if a collector is active.
    pub fn is_active() -> bool {
        ACTIVE.with(|slot| slot.borrow().is_some())
    }

    /// The active collector, if any.
    pub fn current() -> Option<Weak<dyn Subscriber>> {
        ACTIVE.with(|slot| slot.borrow().clone())
    }

    /// Run `f` with the slot empty, so reads inside it subscribe nothing.
    pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
        let saved = ACTIVE.with(|slot| slot.borrow_mut().take());
        let _restore = Restore(saved);
        f()
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        trace!(subscriber = self.id.raw(), "collector released");
        let previous = self.previous.take();
        ACTIVE.with(|slot| *slot.borrow_mut() = previous);
    }
}

struct Restore(Option<Weak<dyn Subscriber>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let saved = self.0.take();
        ACTIVE.with(|slot| *slot.borrow_mut() = saved);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::error::Result;

    struct Stub(SubscriberId);

    impl Subscriber for Stub {
        fn id(&self) -> SubscriberId {
            self.0
        }

        fn update(&self) -> Result<()> {
            Ok(())
        }

        fn is_active(&self) -> bool {
            true
        }
    }

    fn stub() -> Rc<Stub> {
        Rc::new(Stub(SubscriberId::new()))
    }

    fn current_id() -> Option<SubscriberId> {
        Collector::current()
            .and_then(|weak| weak.upgrade())
            .map(|subscriber| subscriber.id())
    }

    #[test]
    fn collector_occupies_slot_while_guard_lives() {
        let p = stub();
        assert!(!Collector::is_active());

        {
            let weak: Weak<dyn Subscriber> = Rc::downgrade(&p) as Weak<dyn Subscriber>;
            let _guard = Collector::enter(p.0, weak);
            assert!(Collector::is_active());
            assert_eq!(current_id(), Some(p.0));
        }

        assert!(!Collector::is_active());
        assert!(current_id().is_none());
    }

    #[test]
    fn nested_enter_restores_outer() {
        let outer = stub();
        let inner = stub();

        let _outer = Collector::enter(outer.0, Rc::downgrade(&outer) as Weak<dyn Subscriber>);
        {
            let _inner = Collector::enter(inner.0, Rc::downgrade(&inner) as Weak<dyn Subscriber>);
            assert_eq!(current_id(), Some(inner.0));
        }
        assert_eq!(current_id(), Some(outer.0));
    }

    #[test]
    fn untracked_empties_slot() {
        let p = stub();
        let _guard = Collector::enter(p.0, Rc::downgrade(&p) as Weak<dyn Subscriber>);

        let seen = Collector::untracked(Collector::is_active);
        assert!(!seen);
        assert_eq!(current_id(), Some(p.0));
    }
}
