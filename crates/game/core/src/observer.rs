//! Synchronous observer registry shared by timeline and character notifications.
//!
//! Listeners are held as `Rc<L>` and identified by a [`SubscriptionId`]. The
//! registry is a cloneable handle over shared storage, so a listener that keeps
//! a handle can unsubscribe itself (or others) from inside a callback.
//! Dispatch iterates over a snapshot taken before the first callback runs:
//! registry edits made during dispatch take effect on the next notification.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`ObserverList::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Registry<L: ?Sized> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Rc<L>)>,
}

/// Ordered set of listeners, deduplicated by pointer identity.
pub struct ObserverList<L: ?Sized> {
    registry: Rc<RefCell<Registry<L>>>,
}

impl<L: ?Sized> ObserverList<L> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers a listener.
    ///
    /// Returns `None` if the same `Rc` allocation is already registered.
    pub fn subscribe(&self, listener: Rc<L>) -> Option<SubscriptionId> {
        let mut registry = self.registry.borrow_mut();
        if registry
            .entries
            .iter()
            .any(|(_, existing)| Rc::ptr_eq(existing, &listener))
        {
            return None;
        }
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push((id, listener));
        Some(id)
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|(entry, _)| *entry != id);
        registry.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().entries.is_empty()
    }

    /// Invokes `f` for every listener registered at the time of the call.
    ///
    /// The registry is not borrowed while `f` runs.
    pub fn notify(&self, mut f: impl FnMut(&L)) {
        let snapshot: Vec<Rc<L>> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in &snapshot {
            f(listener);
        }
    }
}

impl<L: ?Sized> Clone for ObserverList<L> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<L: ?Sized> Default for ObserverList<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for ObserverList<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    trait Ping {
        fn ping(&self);
    }

    #[derive(Default)]
    struct Counter(Cell<u32>);

    impl Ping for Counter {
        fn ping(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct SelfRemover {
        list: ObserverList<dyn Ping>,
        id: Cell<Option<SubscriptionId>>,
        calls: Cell<u32>,
    }

    impl Ping for SelfRemover {
        fn ping(&self) {
            self.calls.set(self.calls.get() + 1);
            if let Some(id) = self.id.take() {
                self.list.unsubscribe(id);
            }
        }
    }

    #[test]
    fn duplicate_subscription_is_rejected() {
        let list: ObserverList<dyn Ping> = ObserverList::new();
        let counter = Rc::new(Counter::default());
        assert!(list.subscribe(counter.clone()).is_some());
        assert!(list.subscribe(counter.clone()).is_none());
        list.notify(|l| l.ping());
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn unsubscribe_during_dispatch_applies_next_time() {
        let list: ObserverList<dyn Ping> = ObserverList::new();
        let remover = Rc::new(SelfRemover {
            list: list.clone(),
            id: Cell::new(None),
            calls: Cell::new(0),
        });
        let counter = Rc::new(Counter::default());
        let id = list.subscribe(remover.clone());
        remover.id.set(id);
        list.subscribe(counter.clone());

        list.notify(|l| l.ping());
        assert_eq!(remover.calls.get(), 1);
        assert_eq!(counter.0.get(), 1);
        assert_eq!(list.len(), 1);

        list.notify(|l| l.ping());
        assert_eq!(remover.calls.get(), 1);
        assert_eq!(counter.0.get(), 2);
    }

    #[test]
    fn unknown_id_is_not_removed() {
        let list: ObserverList<dyn Ping> = ObserverList::new();
        let id = list.subscribe(Rc::new(Counter::default()));
        assert!(list.unsubscribe(id.unwrap()));
        assert!(!list.unsubscribe(id.unwrap()));
        assert!(list.is_empty());
    }
}
