//! Single-threaded observer plumbing.
//!
//! An [`EventEmitter`] fans an event out to its listeners. Each
//! [`Subscription`] removes its listener when unsubscribed or dropped, and a
//! [`Subscriptions`] scope releases a whole set at once on teardown.
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

type Listener<E> = Box<dyn FnMut(&E)>;

struct Listeners<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
    /// Ids unsubscribed while their listener was detached for an emit.
    removed_during_emit: HashSet<u64>,
    emitting: bool,
}

impl<E> Listeners<E> {
    fn remove(&mut self, id: u64) {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        if self.entries.len() == before && self.emitting {
            self.removed_during_emit.insert(id);
        }
    }
}

/// Clonable handle to a set of listeners for events of type `E`.
pub struct EventEmitter<E> {
    inner: Rc<RefCell<Listeners<E>>>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.inner.borrow().entries.len())
            .finish()
    }
}

impl<E: 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
                removed_during_emit: HashSet::new(),
                emitting: false,
            })),
        }
    }

    /// Register `f`; it stays registered for as long as the returned
    /// [`Subscription`] lives.
    pub fn subscribe(&self, f: impl FnMut(&E) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Box::new(f)));
            id
        };
        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Deliver `event` to every current listener, returning how many saw it.
    ///
    /// Listeners may subscribe or unsubscribe from inside the callback; such
    /// changes apply from the next emit on.
    pub fn emit(&self, event: &E) -> usize {
        let mut current = {
            let mut inner = self.inner.borrow_mut();
            inner.emitting = true;
            std::mem::take(&mut inner.entries)
        };
        for (_, listener) in current.iter_mut() {
            listener(event);
        }
        let delivered = current.len();

        let mut inner = self.inner.borrow_mut();
        let added = std::mem::take(&mut inner.entries);
        let removed = std::mem::take(&mut inner.removed_during_emit);
        current.retain(|(id, _)| !removed.contains(id));
        current.extend(added);
        inner.entries = current;
        inner.emitting = false;
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Handle to one registered listener.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Teardown scope owning every subscription a component made.
#[derive(Debug, Default)]
pub struct Subscriptions {
    held: Vec<Subscription>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sub: Subscription) {
        self.held.push(sub);
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Unsubscribe everything held by this scope.
    pub fn release_all(&mut self) {
        for sub in self.held.drain(..) {
            sub.unsubscribe();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_all_listeners() {
        let emitter = EventEmitter::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s1 = {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        let s2 = {
            let seen = Rc::clone(&seen);
            emitter.subscribe(move |v| seen.borrow_mut().push(("b", *v)))
        };
        assert_eq!(emitter.emit(&7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
        drop((s1, s2));
    }

    #[test]
    fn unsubscribe_and_drop_remove_listener() {
        let emitter = EventEmitter::<()>::new();
        let s1 = emitter.subscribe(|_| {});
        let s2 = emitter.subscribe(|_| {});
        assert_eq!(emitter.listener_count(), 2);
        s1.unsubscribe();
        assert_eq!(emitter.listener_count(), 1);
        drop(s2);
        assert_eq!(emitter.listener_count(), 0);
        assert_eq!(emitter.emit(&()), 0);
    }

    #[test]
    fn release_all_detaches_every_listener() {
        let a = EventEmitter::<u8>::new();
        let b = EventEmitter::<String>::new();
        let hits = Rc::new(RefCell::new(0));
        let mut scope = Subscriptions::new();
        {
            let hits = Rc::clone(&hits);
            scope.add(a.subscribe(move |_| *hits.borrow_mut() += 1));
        }
        {
            let hits = Rc::clone(&hits);
            scope.add(b.subscribe(move |_| *hits.borrow_mut() += 1));
        }
        assert_eq!(scope.len(), 2);
        scope.release_all();
        assert!(scope.is_empty());
        a.emit(&1);
        b.emit(&"x".to_string());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn unsubscribe_inside_callback_applies_after_emit() {
        let emitter = EventEmitter::<u32>::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(RefCell::new(0));
        let sub = {
            let slot = Rc::clone(&slot);
            let hits = Rc::clone(&hits);
            emitter.subscribe(move |_| {
                *hits.borrow_mut() += 1;
                if let Some(s) = slot.borrow_mut().take() {
                    s.unsubscribe();
                }
            })
        };
        *slot.borrow_mut() = Some(sub);
        emitter.emit(&1);
        emitter.emit(&2);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_emitter_is_harmless() {
        let emitter = EventEmitter::<u32>::new();
        let sub = emitter.subscribe(|_| {});
        drop(emitter);
        sub.unsubscribe();
    }
}
