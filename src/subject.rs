//! Replay-one notification channel.
//!
//! A [`Subject`] always holds a value. Subscribing immediately hands the
//! current value to the new observer, later [`Subject::emit`] calls reach
//! every registered observer synchronously and in emission order.

use std::fmt;

/// Handle returned by [`Subject::subscribe`], used to unsubscribe again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

pub struct Subject<T> {
    latest: T,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Subject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            latest: initial,
            next_id: 0,
            observers: Vec::new(),
        }
    }

    /// Registers `observer` and delivers the latest value to it right away.
    pub fn subscribe<F>(&mut self, mut observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        observer(&self.latest);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Stores `value` as the latest one and pushes it to all observers.
    pub fn emit(&mut self, value: T) {
        self.latest = value;
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.latest);
        }
    }

    pub fn latest(&self) -> &T {
        &self.latest
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("latest", &self.latest)
            .field("observers", &self.observers.len())
            .finish()
    }
}
