//! Quiescence-window debouncer driven by explicit clock readings.
//!
//! The event loop feeds raw values with [`Debouncer::push`] and calls
//! [`Debouncer::poll`] on every tick; settled values go out through
//! [`Debouncer::settled`].
use std::time::{Duration, Instant};

use crate::events::EventEmitter;

/// Default stability window before a search term is accepted.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
    last_emitted: Option<T>,
    settled: EventEmitter<T>,
}

impl<T: Clone + PartialEq + 'static> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_emitted: None,
            settled: EventEmitter::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Emitter for values that survived the window.
    pub fn settled(&self) -> &EventEmitter<T> {
        &self.settled
    }

    /// Replace any pending value with `value` and restart the timer.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.window));
    }

    /// When the pending value (if any) becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Emit the pending value if its window has elapsed and it differs from
    /// the previous emission. Returns whether anything was emitted.
    pub fn poll(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some((_, at)) if now >= *at => {}
            _ => return false,
        }
        let Some((value, _)) = self.pending.take() else {
            return false;
        };
        if self.last_emitted.as_ref() == Some(&value) {
            return false;
        }
        self.last_emitted = Some(value.clone());
        self.settled.emit(&value);
        true
    }

    /// Drop any pending value and treat `seed` as already emitted.
    pub fn reset(&mut self, seed: T) {
        self.pending = None;
        self.last_emitted = Some(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collecting(d: &Debouncer<String>) -> (Rc<RefCell<Vec<String>>>, crate::events::Subscription) {
        let out = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&out);
        let sub = d.settled().subscribe(move |v: &String| sink.borrow_mut().push(v.clone()));
        (out, sub)
    }

    #[test]
    fn rapid_input_emits_only_last_value_after_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DEFAULT_WINDOW);
        let (out, _sub) = collecting(&d);

        d.push("a".to_string(), t0);
        d.push("an".to_string(), t0 + Duration::from_millis(100));
        d.push("ann".to_string(), t0 + Duration::from_millis(200));

        assert!(!d.poll(t0 + Duration::from_millis(300)));
        assert!(!d.poll(t0 + Duration::from_millis(499)));
        assert!(out.borrow().is_empty());

        assert!(d.poll(t0 + Duration::from_millis(500)));
        assert_eq!(*out.borrow(), vec!["ann".to_string()]);
        assert!(!d.is_pending());
    }

    #[test]
    fn unchanged_value_is_not_reemitted() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        let (out, _sub) = collecting(&d);

        d.push("bob".to_string(), t0);
        assert!(d.poll(t0 + Duration::from_millis(10)));
        d.push("bo".to_string(), t0 + Duration::from_millis(11));
        d.push("bob".to_string(), t0 + Duration::from_millis(12));
        assert!(!d.poll(t0 + Duration::from_millis(40)));
        assert_eq!(out.borrow().len(), 1);
    }

    #[test]
    fn reset_cancels_pending_and_seeds_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        let (out, _sub) = collecting(&d);

        d.push("x".to_string(), t0);
        d.reset("ann".to_string());
        assert!(d.deadline().is_none());
        assert!(!d.poll(t0 + Duration::from_secs(1)));

        d.push("ann".to_string(), t0);
        assert!(!d.poll(t0 + Duration::from_secs(1)));
        assert!(out.borrow().is_empty());
    }

    #[test]
    fn deadline_tracks_latest_push() {
        let t0 = Instant::now();
        let mut d: Debouncer<String> = Debouncer::new(DEFAULT_WINDOW);
        d.push("a".into(), t0);
        d.push("ab".into(), t0 + Duration::from_millis(50));
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(350)));
    }
}
